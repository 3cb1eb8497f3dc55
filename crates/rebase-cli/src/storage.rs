//! RocksDB storage backend for the ledger and vault state.

use anyhow::{Context, Result};
use rebase_core::AccountId;
use rebase_ledger::snapshot::AllowanceEntry;
use rebase_ledger::{AccessControl, EventRecord, HolderAccount, LedgerSnapshot, RatePolicy};
use rebase_vault::VaultState;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Column family names for different data types.
const CF_HOLDERS: &str = "holders";
const CF_LEDGER: &str = "ledger";
const CF_ALLOWANCES: &str = "allowances";
const CF_EVENTS: &str = "events";

/// Keys in the `ledger` column family.
const KEY_VERSION: &str = "version";
const KEY_SCALE: &str = "scale";
const KEY_RATE_POLICY: &str = "rate_policy";
const KEY_ACCESS: &str = "access";
const KEY_TOTAL_PRINCIPAL: &str = "total_principal";
const KEY_NEXT_SEQ: &str = "next_seq";
const KEY_VAULT: &str = "vault";

/// Current on-disk format version.
const STATE_VERSION: u32 = 1;

/// Everything the CLI keeps between invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedState {
    pub ledger: LedgerSnapshot,
    pub vault: VaultState,
}

impl PersistedState {
    pub fn new(ledger: LedgerSnapshot, vault: VaultState) -> Self {
        Self { ledger, vault }
    }
}

/// RocksDB-backed storage: one row per holder, one per allowance, one per
/// drained event, and the ledger scalars under fixed keys.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_HOLDERS, Options::default()),
            ColumnFamilyDescriptor::new(CF_LEDGER, Options::default()),
            ColumnFamilyDescriptor::new(CF_ALLOWANCES, Options::default()),
            ColumnFamilyDescriptor::new(CF_EVENTS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)
            .with_context(|| format!("opening ledger store at {}", path.display()))?;

        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", name))
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).with_context(|| {
                format!("decoding {}/{}", cf_name, String::from_utf8_lossy(key))
            })?)),
            None => Ok(None),
        }
    }

    fn require_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.get_json(CF_LEDGER, key.as_bytes())?
            .with_context(|| format!("ledger store is missing '{}'", key))
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<(Vec<u8>, T)>> {
        let cf = self.cf(cf_name)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let decoded = serde_json::from_slice(&value).with_context(|| {
                format!("decoding {}/{}", cf_name, String::from_utf8_lossy(&key))
            })?;
            rows.push((key.to_vec(), decoded));
        }
        Ok(rows)
    }

    fn keys(&self, cf_name: &str) -> Result<Vec<Vec<u8>>> {
        let cf = self.cf(cf_name)?;
        let mut keys = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _) = item?;
            keys.push(key.to_vec());
        }
        Ok(keys)
    }

    /// Whether a ledger has been written to this store.
    pub fn is_initialized(&self) -> Result<bool> {
        let cf = self.cf(CF_LEDGER)?;
        Ok(self.db.get_cf(cf, KEY_VERSION.as_bytes())?.is_some())
    }

    /// Load the state, or `None` if no ledger has been written yet.
    pub fn load(&self) -> Result<Option<PersistedState>> {
        let Some(version) = self.get_json::<u32>(CF_LEDGER, KEY_VERSION.as_bytes())? else {
            return Ok(None);
        };
        if version != STATE_VERSION {
            anyhow::bail!(
                "unsupported ledger store version {} (expected {})",
                version,
                STATE_VERSION
            );
        }

        let scale: String = self.require_json(KEY_SCALE)?;
        let total_principal: String = self.require_json(KEY_TOTAL_PRINCIPAL)?;
        let rate_policy: RatePolicy = self.require_json(KEY_RATE_POLICY)?;
        let access: AccessControl = self.require_json(KEY_ACCESS)?;
        let next_seq: u64 = self.require_json(KEY_NEXT_SEQ)?;
        let vault: VaultState = self.require_json(KEY_VAULT)?;

        let mut accounts = BTreeMap::new();
        for (key, account) in self.scan_json::<HolderAccount>(CF_HOLDERS)? {
            let holder = String::from_utf8(key).context("holder key is not UTF-8")?;
            accounts.insert(AccountId::new(holder)?, account);
        }
        let allowances = self
            .scan_json::<AllowanceEntry>(CF_ALLOWANCES)?
            .into_iter()
            .map(|(_, entry)| entry)
            .collect();

        let ledger = LedgerSnapshot {
            scale: scale.parse().context("decoding ledger/scale")?,
            rate_policy,
            access,
            total_principal: total_principal
                .parse()
                .context("decoding ledger/total_principal")?,
            accounts,
            allowances,
            next_seq,
        };
        Ok(Some(PersistedState { ledger, vault }))
    }

    /// Write the full state and append `events` in one atomic batch.
    ///
    /// Holder and allowance rows missing from `state` are deleted.
    pub fn save(&self, state: &PersistedState, events: &[EventRecord]) -> Result<()> {
        let snapshot = &state.ledger;
        let mut batch = WriteBatch::default();

        let ledger_cf = self.cf(CF_LEDGER)?;
        put_json(&mut batch, ledger_cf, KEY_VERSION.as_bytes(), &STATE_VERSION)?;
        put_json(&mut batch, ledger_cf, KEY_SCALE.as_bytes(), &snapshot.scale.to_string())?;
        put_json(
            &mut batch,
            ledger_cf,
            KEY_TOTAL_PRINCIPAL.as_bytes(),
            &snapshot.total_principal.to_string(),
        )?;
        put_json(&mut batch, ledger_cf, KEY_RATE_POLICY.as_bytes(), &snapshot.rate_policy)?;
        put_json(&mut batch, ledger_cf, KEY_ACCESS.as_bytes(), &snapshot.access)?;
        put_json(&mut batch, ledger_cf, KEY_NEXT_SEQ.as_bytes(), &snapshot.next_seq)?;
        put_json(&mut batch, ledger_cf, KEY_VAULT.as_bytes(), &state.vault)?;

        let holders_cf = self.cf(CF_HOLDERS)?;
        let live: BTreeSet<Vec<u8>> = snapshot
            .accounts
            .keys()
            .map(|holder| holder.as_str().as_bytes().to_vec())
            .collect();
        for stale in self.keys(CF_HOLDERS)?.into_iter().filter(|k| !live.contains(k)) {
            batch.delete_cf(holders_cf, stale);
        }
        for (holder, account) in &snapshot.accounts {
            put_json(&mut batch, holders_cf, holder.as_str().as_bytes(), account)?;
        }

        let allowances_cf = self.cf(CF_ALLOWANCES)?;
        let live: BTreeSet<Vec<u8>> = snapshot
            .allowances
            .iter()
            .map(|entry| allowance_key(&entry.owner, &entry.spender))
            .collect();
        for stale in self
            .keys(CF_ALLOWANCES)?
            .into_iter()
            .filter(|k| !live.contains(k))
        {
            batch.delete_cf(allowances_cf, stale);
        }
        for entry in &snapshot.allowances {
            put_json(
                &mut batch,
                allowances_cf,
                &allowance_key(&entry.owner, &entry.spender),
                entry,
            )?;
        }

        let events_cf = self.cf(CF_EVENTS)?;
        for record in events {
            put_json(&mut batch, events_cf, &record.seq.to_be_bytes(), record)?;
        }

        self.db.write(batch)?;
        tracing::debug!(
            holders = snapshot.accounts.len(),
            events = events.len(),
            "ledger state committed"
        );
        Ok(())
    }

    /// Persisted events in sequence order.
    pub fn events(&self) -> Result<Vec<EventRecord>> {
        Ok(self
            .scan_json::<EventRecord>(CF_EVENTS)?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }
}

fn put_json<T: Serialize>(
    batch: &mut WriteBatch,
    cf: &ColumnFamily,
    key: &[u8],
    value: &T,
) -> Result<()> {
    batch.put_cf(cf, key, serde_json::to_vec(value)?);
    Ok(())
}

/// `owner \0 spender`; account ids never contain NUL.
fn allowance_key(owner: &AccountId, spender: &AccountId) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner.as_str().len() + spender.as_str().len() + 1);
    key.extend_from_slice(owner.as_str().as_bytes());
    key.push(0);
    key.extend_from_slice(spender.as_str().as_bytes());
    key
}
