use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Identity of a ledger holder, spender, or privileged component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Create an account id, rejecting empty names and names with
    /// whitespace or control characters.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidAccountId("account id is empty".into()));
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(CoreError::InvalidAccountId(format!(
                "account id must not contain whitespace or control characters, got: {:?}",
                id
            )));
        }
        Ok(Self(id))
    }

    /// Get the account id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl From<&str> for AccountId {
    /// Infallible conversion for literals; validation happens in [`AccountId::new`].
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an independent execution domain (chain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(pub u64);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain-{}", self.0)
    }
}

/// Per-second linear interest rate, as a fixed-point fraction of the
/// ledger's scale factor.
///
/// With a scale of `1e36`, a rate of `5e28` accrues `5e-8` of principal
/// per second.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct InterestRate(#[serde(with = "u128_string")] pub u128);

impl InterestRate {
    pub const ZERO: InterestRate = InterestRate(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Raw fixed-point value.
    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<u128> for InterestRate {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl FromStr for InterestRate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>()
            .map(Self)
            .map_err(|e| CoreError::InvalidAmount(format!("interest rate {:?}: {}", s, e)))
    }
}

impl fmt::Display for InterestRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount argument for burn, transfer and redeem operations.
///
/// `All` resolves to the holder's entire accrued balance at the moment
/// the operation settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amount {
    /// A concrete number of base units.
    Exact(#[serde(with = "u128_string")] u128),
    /// The holder's entire balance.
    All,
}

impl Amount {
    /// Resolve against a balance: `All` becomes `balance`.
    pub fn resolve(&self, balance: u128) -> u128 {
        match self {
            Self::Exact(value) => *value,
            Self::All => balance,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self::Exact(value)
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    /// Parses a decimal number of base units, or `all`/`max`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "max" => Ok(Self::All),
            other => other
                .parse::<u128>()
                .map(Self::Exact)
                .map_err(|e| CoreError::InvalidAmount(format!("{:?}: {}", s, e))),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => write!(f, "{}", value),
            Self::All => write!(f, "all"),
        }
    }
}

/// Serde helper carrying `u128` values as decimal strings.
///
/// Fixed-point quantities routinely exceed the integer range of TOML and
/// of most JSON consumers.
pub mod u128_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_validation() {
        assert!(AccountId::new("alice").is_ok());
        assert!(matches!(
            AccountId::new(""),
            Err(CoreError::InvalidAccountId(_))
        ));
        assert!(matches!(
            AccountId::new("al ice"),
            Err(CoreError::InvalidAccountId(_))
        ));
        assert!(AccountId::new("a\0b").is_err());
    }

    #[test]
    fn test_account_id_deserialize_validates() {
        let id: AccountId = serde_json::from_str(r#""alice""#).unwrap();
        assert_eq!(id.as_str(), "alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""alice""#);
        assert!(serde_json::from_str::<AccountId>(r#""""#).is_err());
        assert!(serde_json::from_str::<AccountId>(r#""al ice""#).is_err());

        // Map keys go through the same check.
        let map: std::collections::BTreeMap<AccountId, u8> =
            serde_json::from_str(r#"{"bob": 1}"#).unwrap();
        assert!(map.contains_key(&AccountId::from("bob")));
        assert!(serde_json::from_str::<std::collections::BTreeMap<AccountId, u8>>(r#"{" ": 1}"#)
            .is_err());
    }

    #[test]
    fn test_amount_parse() {
        assert_eq!("all".parse::<Amount>().unwrap(), Amount::All);
        assert_eq!("MAX".parse::<Amount>().unwrap(), Amount::All);
        assert_eq!("1500".parse::<Amount>().unwrap(), Amount::Exact(1500));
        assert!("-3".parse::<Amount>().is_err());
        assert!("ten".parse::<Amount>().is_err());
    }

    #[test]
    fn test_amount_resolve() {
        assert_eq!(Amount::All.resolve(42), 42);
        assert_eq!(Amount::Exact(7).resolve(42), 7);
    }

    #[test]
    fn test_interest_rate_serializes_as_string() {
        let rate = InterestRate(50_000_000_000_000_000_000_000_000_000);
        let json = serde_json::to_string(&rate).unwrap();
        assert_eq!(json, "\"50000000000000000000000000000\"");
        let back: InterestRate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rate);
    }

    #[test]
    fn test_amount_serde_shape() {
        let json = serde_json::to_string(&Amount::Exact(10)).unwrap();
        assert_eq!(json, r#"{"exact":"10"}"#);
        assert_eq!(serde_json::to_string(&Amount::All).unwrap(), r#""all""#);
    }

    #[test]
    fn test_domain_display() {
        assert_eq!(DomainId(11155111).to_string(), "domain-11155111");
    }
}
