//! Append-only audit log of completed operations, stored as one list under
//! `_transacoes`.

use bearer_store::{KvStore, WriteSet};
use bearer_types::keys::TRANSACTIONS_KEY;
use bearer_types::{HolderId, Transaction};

use crate::codec::{encode, load_list};
use crate::error::EngineError;

pub struct TransactionLedger<'a, S> {
    store: &'a S,
}

impl<'a, S: KvStore> TransactionLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Every transaction in insertion order. A missing ledger is empty.
    pub fn list_all(&self) -> Result<Vec<Transaction>, EngineError> {
        load_list(self.store, TRANSACTIONS_KEY)
    }

    /// Transactions where `holder` is buyer or seller, in ledger order.
    pub fn list_filtered(&self, holder: HolderId) -> Result<Vec<Transaction>, EngineError> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|tx| tx.involves(holder))
            .collect())
    }

    pub fn len(&self) -> Result<usize, EngineError> {
        Ok(self.list_all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, EngineError> {
        Ok(self.len()? == 0)
    }

    pub fn append(&self, tx: Transaction) -> Result<(), EngineError> {
        let mut batch = WriteSet::new();
        self.stage_append(&mut batch, tx)?;
        self.store.commit(batch)?;
        Ok(())
    }

    /// Stage the ledger with `tx` appended. Returns the new length.
    pub fn stage_append(&self, batch: &mut WriteSet, tx: Transaction) -> Result<usize, EngineError> {
        let mut all = self.list_all()?;
        all.push(tx);
        stage_ledger(batch, &all)?;
        Ok(all.len())
    }
}

pub(crate) fn stage_ledger(batch: &mut WriteSet, transactions: &[Transaction]) -> Result<(), EngineError> {
    batch.put(TRANSACTIONS_KEY, encode(TRANSACTIONS_KEY, transactions)?);
    Ok(())
}
