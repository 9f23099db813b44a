//! Read-only views over the stored state.

use bearer_store::KvStore;
use bearer_types::{HolderId, HolderKind, Institution, Merchant, Transaction};

use crate::error::EngineError;
use crate::ledger::TransactionLedger;
use crate::registry::HolderRegistry;

pub struct QueryLayer<'a, S> {
    store: &'a S,
}

impl<'a, S: KvStore> QueryLayer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Number of tokens held by holder `id` of `kind`.
    pub fn get_balance(&self, kind: HolderKind, id: HolderId) -> Result<u64, EngineError> {
        let registry = HolderRegistry::new(self.store);
        let balance = match kind {
            HolderKind::Institution => registry.get::<Institution>(id)?.tokens.len(),
            HolderKind::Merchant => registry.get::<Merchant>(id)?.tokens.len(),
        };
        tracing::debug!(%kind, %id, balance, "balance lookup");
        Ok(balance as u64)
    }

    /// The full ledger, or only the entries involving `holder` when
    /// `exclusive` is set.
    pub fn get_transactions(&self, exclusive: bool, holder: Option<HolderId>) -> Result<Vec<Transaction>, EngineError> {
        let ledger = TransactionLedger::new(self.store);
        if !exclusive {
            return ledger.list_all();
        }
        match holder {
            Some(id) => ledger.list_filtered(id),
            None => Err(EngineError::InvalidArgument {
                name: "holder",
                value: String::new(),
            }),
        }
    }

    /// Stored bytes under `key`, unparsed.
    pub fn read_raw(&self, key: &str) -> Result<Vec<u8>, EngineError> {
        self.store
            .get(key)?
            .ok_or_else(|| EngineError::KeyNotFound(key.to_string()))
    }

    /// Tokens held across every institution and merchant.
    pub fn total_supply(&self) -> Result<u64, EngineError> {
        let registry = HolderRegistry::new(self.store);
        let institutions: u64 = registry.list::<Institution>()?.iter().map(|i| i.tokens.len() as u64).sum();
        let merchants: u64 = registry.list::<Merchant>()?.iter().map(|m| m.tokens.len() as u64).sum();
        Ok(institutions + merchants)
    }
}
