pub mod admin;
pub mod balance;
pub mod init;
pub mod status;
pub mod transfer;
pub mod vault;
