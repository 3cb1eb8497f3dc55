use rebase_core::{AccountId, Amount, Clock, InterestRate, LedgerConfig};
use std::collections::HashMap;
use std::sync::Arc;

use crate::access::{AccessControl, Capability};
use crate::account::HolderAccount;
use crate::error::LedgerError;
use crate::events::{EventRecord, LedgerEvent};
use crate::rate_policy::{self, RatePolicy};
use crate::snapshot::{AllowanceEntry, LedgerSnapshot};

/// Outcome of settling one holder at a given instant, computed before any
/// state is written.
#[derive(Debug, Clone, Copy)]
struct Settlement {
    /// Principal after interest is materialized.
    accrued: u128,
    /// Interest materialized by this settlement.
    interest: u128,
}

/// The interest-accruing ledger.
///
/// Owns every holder account, the global rate, allowances and the
/// capability set. All mutation goes through `&mut self` methods, each of
/// which validates fully before writing, so a failed call leaves the
/// ledger untouched. Every state-changing call settles the holders it
/// touches first: pending interest at the old rate and principal is
/// written into principal before the principal or rate moves.
pub struct RebaseLedger {
    scale: u128,
    accounts: HashMap<AccountId, HolderAccount>,
    allowances: HashMap<(AccountId, AccountId), u128>,
    rate_policy: RatePolicy,
    access: AccessControl,
    total_principal: u128,
    events: Vec<EventRecord>,
    next_seq: u64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RebaseLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RebaseLedger")
            .field("scale", &self.scale)
            .field("global_rate", &self.rate_policy.global_rate())
            .field("holders", &self.accounts.len())
            .field("total_principal", &self.total_principal)
            .finish()
    }
}

impl RebaseLedger {
    /// Create an empty ledger owned by `config.owner`.
    pub fn new(config: &LedgerConfig, clock: Arc<dyn Clock>) -> Result<Self, LedgerError> {
        config
            .validate()
            .map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        tracing::info!(
            owner = %config.owner,
            initial_rate = %config.initial_rate,
            "rebase ledger created"
        );
        Ok(Self {
            scale: config.scale,
            accounts: HashMap::new(),
            allowances: HashMap::new(),
            rate_policy: RatePolicy::new(config.initial_rate),
            access: AccessControl::new(config.owner.clone()),
            total_principal: 0,
            events: Vec::new(),
            next_seq: 0,
            clock,
        })
    }

    /// Restore a ledger from persisted state.
    pub fn from_snapshot(
        snapshot: LedgerSnapshot,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        if snapshot.scale == 0 {
            return Err(LedgerError::InvalidConfig("scale must be non-zero".into()));
        }
        if snapshot.summed_principal() != Some(snapshot.total_principal) {
            return Err(LedgerError::InvalidConfig(
                "snapshot total principal does not match the holder table".into(),
            ));
        }
        let allowances = snapshot
            .allowances
            .into_iter()
            .map(|entry| ((entry.owner, entry.spender), entry.amount))
            .collect();
        Ok(Self {
            scale: snapshot.scale,
            accounts: snapshot.accounts.into_iter().collect(),
            allowances,
            rate_policy: snapshot.rate_policy,
            access: snapshot.access,
            total_principal: snapshot.total_principal,
            events: Vec::new(),
            next_seq: snapshot.next_seq,
            clock,
        })
    }

    /// Capture the durable state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut allowances: Vec<AllowanceEntry> = self
            .allowances
            .iter()
            .map(|((owner, spender), amount)| AllowanceEntry {
                owner: owner.clone(),
                spender: spender.clone(),
                amount: *amount,
            })
            .collect();
        allowances.sort_by(|a, b| (&a.owner, &a.spender).cmp(&(&b.owner, &b.spender)));
        LedgerSnapshot {
            scale: self.scale,
            rate_policy: self.rate_policy,
            access: self.access.clone(),
            total_principal: self.total_principal,
            accounts: self
                .accounts
                .iter()
                .map(|(id, account)| (id.clone(), *account))
                .collect(),
            allowances,
            next_seq: self.next_seq,
        }
    }

    // --- Views -----------------------------------------------------------

    /// Current time according to the ledger's clock.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn scale(&self) -> u128 {
        self.scale
    }

    /// Accrued balance: principal plus interest pending since the last
    /// settlement. Never writes.
    pub fn balance_of(&self, holder: &AccountId) -> Result<u128, LedgerError> {
        match self.accounts.get(holder) {
            Some(account) => account.accrued(self.now(), self.scale),
            None => Ok(0),
        }
    }

    /// Stored principal, without pending interest.
    pub fn principal_balance_of(&self, holder: &AccountId) -> u128 {
        self.accounts.get(holder).map(|a| a.principal).unwrap_or(0)
    }

    /// The holder's locked rate; zero for holders never touched.
    pub fn user_interest_rate(&self, holder: &AccountId) -> InterestRate {
        self.accounts
            .get(holder)
            .map(|a| a.locked_rate)
            .unwrap_or_default()
    }

    /// The global rate offered to new deposits.
    pub fn interest_rate(&self) -> InterestRate {
        self.rate_policy.global_rate()
    }

    pub fn account(&self, holder: &AccountId) -> Option<&HolderAccount> {
        self.accounts.get(holder)
    }

    /// Every holder the ledger has touched.
    pub fn holders(&self) -> impl Iterator<Item = &AccountId> {
        self.accounts.keys()
    }

    /// Issued principal across all holders, excluding unsettled interest.
    pub fn total_principal(&self) -> u128 {
        self.total_principal
    }

    /// Sum of accrued balances across all holders. Iterates the holder table.
    pub fn total_supply(&self) -> Result<u128, LedgerError> {
        let now = self.now();
        self.accounts.values().try_fold(0u128, |acc, account| {
            acc.checked_add(account.accrued(now, self.scale)?)
                .ok_or(LedgerError::Overflow("total supply"))
        })
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn owner(&self) -> &AccountId {
        self.access.owner()
    }

    pub fn has_capability(&self, account: &AccountId, capability: Capability) -> bool {
        self.access.has_capability(account, capability)
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Events recorded since creation or the last drain.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    // --- Privileged: mint / burn ----------------------------------------

    /// Settle `holder`, lock their rate to `rate`, then add `amount` to
    /// principal. Requires [`Capability::MintAndBurn`].
    ///
    /// The rate is relocked unconditionally: the vault passes the global
    /// rate, the gateway passes the rate carried from the source domain.
    pub fn mint(
        &mut self,
        caller: &AccountId,
        holder: &AccountId,
        amount: u128,
        rate: InterestRate,
    ) -> Result<(), LedgerError> {
        self.access.ensure(caller, Capability::MintAndBurn)?;
        let now = self.now();

        let settlement = self.plan_settlement(holder, now)?;
        let principal = settlement
            .accrued
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("holder principal"))?;
        let total = self
            .total_principal
            .checked_add(settlement.interest)
            .and_then(|t| t.checked_add(amount))
            .ok_or(LedgerError::Overflow("total principal"))?;

        self.apply_settlement(holder, settlement, now);
        self.lock_rate(holder, rate, now);
        self.account_mut(holder).principal = principal;
        self.total_principal = total;

        self.record(
            now,
            LedgerEvent::Minted {
                holder: holder.clone(),
                amount,
                rate,
            },
        );
        tracing::info!(caller = %caller, holder = %holder, amount, rate = %rate, "minted");
        Ok(())
    }

    /// Settle `holder`, then remove `amount` (or their whole balance) from
    /// principal. Requires [`Capability::MintAndBurn`]. Returns the amount
    /// burned.
    ///
    /// The locked rate is left in place; the next mint or transfer-in into
    /// the emptied holder reassigns it.
    pub fn burn(
        &mut self,
        caller: &AccountId,
        holder: &AccountId,
        amount: Amount,
    ) -> Result<u128, LedgerError> {
        self.access.ensure(caller, Capability::MintAndBurn)?;
        let now = self.now();

        let settlement = self.plan_settlement(holder, now)?;
        let resolved = amount.resolve(settlement.accrued);
        if resolved > settlement.accrued {
            return Err(LedgerError::InsufficientBalance {
                holder: holder.clone(),
                available: settlement.accrued,
                requested: resolved,
            });
        }
        let total = self
            .total_principal
            .checked_add(settlement.interest)
            .and_then(|t| t.checked_sub(resolved))
            .ok_or(LedgerError::Overflow("total principal"))?;

        self.apply_settlement(holder, settlement, now);
        if let Some(account) = self.accounts.get_mut(holder) {
            account.principal = settlement.accrued - resolved;
        }
        self.total_principal = total;

        self.record(
            now,
            LedgerEvent::Burned {
                holder: holder.clone(),
                amount: resolved,
            },
        );
        tracing::info!(caller = %caller, holder = %holder, amount = resolved, "burned");
        Ok(resolved)
    }

    // --- Holder surface ---------------------------------------------------

    /// Move `amount` (or the sender's whole balance) from `sender` to
    /// `recipient`. Returns the amount moved.
    pub fn transfer(
        &mut self,
        sender: &AccountId,
        recipient: &AccountId,
        amount: Amount,
    ) -> Result<u128, LedgerError> {
        let now = self.now();
        self.move_balance(sender, recipient, amount, now)
    }

    /// Move tokens out of `owner` on their behalf, spending `spender`'s
    /// allowance. An allowance of `u128::MAX` is never decremented.
    pub fn transfer_from(
        &mut self,
        spender: &AccountId,
        owner: &AccountId,
        recipient: &AccountId,
        amount: Amount,
    ) -> Result<u128, LedgerError> {
        let now = self.now();
        let resolved = amount.resolve(self.plan_settlement(owner, now)?.accrued);

        let allowed = self.allowance(owner, spender);
        if allowed != u128::MAX && allowed < resolved {
            return Err(LedgerError::InsufficientAllowance {
                owner: owner.clone(),
                spender: spender.clone(),
                allowed,
                requested: resolved,
            });
        }

        let moved = self.move_balance(owner, recipient, Amount::Exact(resolved), now)?;
        if allowed != u128::MAX {
            self.store_allowance(owner, spender, allowed - moved);
        }
        Ok(moved)
    }

    /// Set `spender`'s allowance on `owner`. `Amount::All` grants an
    /// unlimited allowance.
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount) {
        let value = amount.resolve(u128::MAX);
        self.store_allowance(owner, spender, value);
        let now = self.now();
        self.record(
            now,
            LedgerEvent::Approved {
                owner: owner.clone(),
                spender: spender.clone(),
                amount: value,
            },
        );
        tracing::debug!(owner = %owner, spender = %spender, amount = value, "allowance set");
    }

    // --- Owner surface ----------------------------------------------------

    /// Lower the global rate. Locked holder rates are untouched. Returns the
    /// previous rate.
    pub fn set_interest_rate(
        &mut self,
        caller: &AccountId,
        new_rate: InterestRate,
    ) -> Result<InterestRate, LedgerError> {
        self.access.ensure(caller, Capability::Owner)?;
        let old = self.rate_policy.decrease_to(new_rate)?;
        let now = self.now();
        self.record(now, LedgerEvent::InterestRateSet { old, new: new_rate });
        tracing::info!(old = %old, new = %new_rate, "global interest rate lowered");
        Ok(old)
    }

    /// Give `account` the mint/burn capability.
    pub fn grant_mint_and_burn(
        &mut self,
        caller: &AccountId,
        account: AccountId,
    ) -> Result<(), LedgerError> {
        self.access.ensure(caller, Capability::Owner)?;
        if self.access.grant_mint_and_burn(account.clone()) {
            let now = self.now();
            tracing::info!(account = %account, "mint/burn capability granted");
            self.record(
                now,
                LedgerEvent::CapabilityGranted {
                    account,
                    capability: Capability::MintAndBurn,
                },
            );
        }
        Ok(())
    }

    /// Take the mint/burn capability away from `account`.
    pub fn revoke_mint_and_burn(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
    ) -> Result<(), LedgerError> {
        self.access.ensure(caller, Capability::Owner)?;
        if self.access.revoke_mint_and_burn(account) {
            let now = self.now();
            tracing::info!(account = %account, "mint/burn capability revoked");
            self.record(
                now,
                LedgerEvent::CapabilityRevoked {
                    account: account.clone(),
                    capability: Capability::MintAndBurn,
                },
            );
        }
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<(), LedgerError> {
        self.access.ensure(caller, Capability::Owner)?;
        let previous = self.access.owner().clone();
        self.access.set_owner(new_owner.clone());
        let now = self.now();
        tracing::info!(previous = %previous, new = %new_owner, "ownership transferred");
        self.record(
            now,
            LedgerEvent::OwnershipTransferred {
                previous,
                new: new_owner,
            },
        );
        Ok(())
    }

    // --- Internals --------------------------------------------------------

    fn move_balance(
        &mut self,
        sender: &AccountId,
        recipient: &AccountId,
        amount: Amount,
        now: u64,
    ) -> Result<u128, LedgerError> {
        let from = self.plan_settlement(sender, now)?;
        let resolved = amount.resolve(from.accrued);
        if resolved > from.accrued {
            return Err(LedgerError::InsufficientBalance {
                holder: sender.clone(),
                available: from.accrued,
                requested: resolved,
            });
        }

        if sender == recipient {
            let total = self
                .total_principal
                .checked_add(from.interest)
                .ok_or(LedgerError::Overflow("total principal"))?;
            self.apply_settlement(sender, from, now);
            self.total_principal = total;
            self.record_transfer(sender, recipient, resolved, now);
            return Ok(resolved);
        }

        let to = self.plan_settlement(recipient, now)?;
        let recipient_principal = to
            .accrued
            .checked_add(resolved)
            .ok_or(LedgerError::Overflow("holder principal"))?;
        let total = self
            .total_principal
            .checked_add(from.interest)
            .and_then(|t| t.checked_add(to.interest))
            .ok_or(LedgerError::Overflow("total principal"))?;

        self.apply_settlement(sender, from, now);
        self.apply_settlement(recipient, to, now);
        self.total_principal = total;

        if resolved == 0 {
            self.record_transfer(sender, recipient, 0, now);
            return Ok(0);
        }

        let sender_rate = self.user_interest_rate(sender);
        let recipient_rate = self.user_interest_rate(recipient);
        let rate = rate_policy::inherited_rate(to.accrued, resolved, recipient_rate, sender_rate);
        if rate != recipient_rate {
            self.lock_rate(recipient, rate, now);
        }

        self.account_mut(sender).principal = from.accrued - resolved;
        self.account_mut(recipient).principal = recipient_principal;

        self.record_transfer(sender, recipient, resolved, now);
        Ok(resolved)
    }

    fn record_transfer(&mut self, from: &AccountId, to: &AccountId, amount: u128, now: u64) {
        self.record(
            now,
            LedgerEvent::Transferred {
                from: from.clone(),
                to: to.clone(),
                amount,
            },
        );
        tracing::info!(from = %from, to = %to, amount, "transferred");
    }

    /// Compute the settlement of `holder` at `now` without writing.
    fn plan_settlement(&self, holder: &AccountId, now: u64) -> Result<Settlement, LedgerError> {
        let Some(account) = self.accounts.get(holder) else {
            return Ok(Settlement {
                accrued: 0,
                interest: 0,
            });
        };
        let accrued = account.accrued(now, self.scale)?;
        Ok(Settlement {
            accrued,
            interest: accrued - account.principal,
        })
    }

    /// Write a planned settlement: materialize interest into principal and
    /// restart the accrual clock. The caller adjusts the principal total.
    /// Unknown holders with nothing to settle get no row.
    fn apply_settlement(&mut self, holder: &AccountId, settlement: Settlement, now: u64) {
        if settlement.accrued == 0 && !self.accounts.contains_key(holder) {
            return;
        }
        let account = self.account_mut(holder);
        account.principal = settlement.accrued;
        account.last_settlement = account.last_settlement.max(now);
        let rate = account.locked_rate;

        if settlement.interest > 0 {
            tracing::info!(
                caller = "settlement",
                holder = %holder,
                amount = settlement.interest,
                rate = %rate,
                "interest minted"
            );
            self.record(
                now,
                LedgerEvent::InterestMinted {
                    holder: holder.clone(),
                    amount: settlement.interest,
                },
            );
        }
    }

    fn lock_rate(&mut self, holder: &AccountId, rate: InterestRate, now: u64) {
        let account = self.account_mut(holder);
        if account.locked_rate == rate {
            return;
        }
        account.locked_rate = rate;
        self.record(
            now,
            LedgerEvent::RateLocked {
                holder: holder.clone(),
                rate,
            },
        );
    }

    fn store_allowance(&mut self, owner: &AccountId, spender: &AccountId, amount: u128) {
        let key = (owner.clone(), spender.clone());
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    fn account_mut(&mut self, holder: &AccountId) -> &mut HolderAccount {
        self.accounts.entry(holder.clone()).or_default()
    }

    fn record(&mut self, at: u64, event: LedgerEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(EventRecord { seq, at, event });
    }
}
