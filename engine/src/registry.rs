//! Holder registry.
//!
//! Each holder kind is stored twice: as one entry in its collection
//! (`_payments` / `_merchants`) and as a standalone snapshot under its numeric
//! id. The collection is what lookups read; snapshots are rewritten in the
//! same commit so the two never drift apart through this API.

use bearer_store::{KvStore, WriteSet};
use bearer_types::keys::holder_key;
use bearer_types::{Holder, HolderId};

use crate::codec::{encode, load, load_list};
use crate::error::EngineError;

pub struct HolderRegistry<'a, S> {
    store: &'a S,
}

impl<'a, S: KvStore> HolderRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Full collection for `H`, in stored order.
    pub fn list<H: Holder>(&self) -> Result<Vec<H>, EngineError> {
        load_list(self.store, H::KIND.collection_key())
    }

    pub fn find<H: Holder>(&self, id: HolderId) -> Result<Option<H>, EngineError> {
        Ok(self.list::<H>()?.into_iter().find(|h| h.id() == id))
    }

    pub fn get<H: Holder>(&self, id: HolderId) -> Result<H, EngineError> {
        self.find(id)?.ok_or(EngineError::HolderNotFound { kind: H::KIND, id })
    }

    /// The standalone snapshot stored under the holder's id, if any.
    pub fn snapshot<H: Holder>(&self, id: HolderId) -> Result<Option<H>, EngineError> {
        load(self.store, &holder_key(id))
    }

    /// Insert or replace one holder.
    pub fn put<H: Holder>(&self, holder: &H) -> Result<(), EngineError> {
        let mut all = self.list::<H>()?;
        match position(&all, holder.id()) {
            Some(index) => all[index] = holder.clone(),
            None => all.push(holder.clone()),
        }

        let mut batch = WriteSet::new();
        stage_holder(&mut batch, holder)?;
        stage_collection(&mut batch, &all)?;
        self.store.commit(batch)?;
        tracing::debug!(kind = %H::KIND, id = %holder.id(), "stored holder");
        Ok(())
    }

    /// Replace the whole collection for `H`, rewriting every snapshot.
    pub fn put_collection<H: Holder>(&self, holders: &[H]) -> Result<(), EngineError> {
        let mut batch = WriteSet::new();
        for holder in holders {
            stage_holder(&mut batch, holder)?;
        }
        stage_collection(&mut batch, holders)?;
        self.store.commit(batch)?;
        tracing::debug!(kind = %H::KIND, count = holders.len(), "stored holder collection");
        Ok(())
    }

    /// Ids whose snapshot is missing or differs from the collection entry.
    pub fn mirror_mismatches<H: Holder + PartialEq>(&self) -> Result<Vec<HolderId>, EngineError> {
        let mut mismatched = Vec::new();
        for holder in self.list::<H>()? {
            if self.snapshot::<H>(holder.id())?.as_ref() != Some(&holder) {
                mismatched.push(holder.id());
            }
        }
        Ok(mismatched)
    }
}

pub(crate) fn position<H: Holder>(holders: &[H], id: HolderId) -> Option<usize> {
    holders.iter().position(|h| h.id() == id)
}

pub(crate) fn stage_holder<H: Holder>(batch: &mut WriteSet, holder: &H) -> Result<(), EngineError> {
    let key = holder_key(holder.id());
    let value = encode(&key, holder)?;
    batch.put(key, value);
    Ok(())
}

pub(crate) fn stage_collection<H: Holder>(batch: &mut WriteSet, holders: &[H]) -> Result<(), EngineError> {
    let key = H::KIND.collection_key();
    batch.put(key, encode(key, holders)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bearer_nullables::NullStore;
    use bearer_types::{HolderKind, Institution, Merchant, Token, TokenValue};

    fn merchant(id: i64) -> Merchant {
        Merchant::new(HolderId::new(id), format!("merchant {id}"), "00.000.000/0001-00")
    }

    #[test]
    fn test_get_unknown_holder_is_not_found() {
        let store = NullStore::new();
        let registry = HolderRegistry::new(&store);
        let err = registry.get::<Merchant>(HolderId::new(11)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::HolderNotFound { kind: HolderKind::Merchant, id } if id == HolderId::new(11)
        ));
    }

    #[test]
    fn test_put_writes_collection_and_snapshot() {
        let store = NullStore::new();
        let registry = HolderRegistry::new(&store);
        let mut m = merchant(11);
        m.tokens.push(Token::new(TokenValue::new("abcdefghij"), m.id));

        registry.put(&m).unwrap();

        assert_eq!(registry.get::<Merchant>(m.id).unwrap(), m);
        assert_eq!(registry.snapshot::<Merchant>(m.id).unwrap(), Some(m));
        assert!(store.contains("_merchants"));
        assert!(store.contains("11"));
    }

    #[test]
    fn test_put_replaces_in_place() {
        let store = NullStore::new();
        let registry = HolderRegistry::new(&store);
        registry.put_collection(&[merchant(11), merchant(12), merchant(13)]).unwrap();

        let mut renamed = merchant(12);
        renamed.name = "renamed".into();
        registry.put(&renamed).unwrap();

        let ids: Vec<_> = registry.list::<Merchant>().unwrap().iter().map(|m| m.id.as_i64()).collect();
        assert_eq!(ids, vec![11, 12, 13]);
        assert_eq!(registry.get::<Merchant>(HolderId::new(12)).unwrap().name, "renamed");
    }

    #[test]
    fn test_kinds_are_separate_collections() {
        let store = NullStore::new();
        let registry = HolderRegistry::new(&store);
        registry.put(&Institution::new(HolderId::new(1), "Bank", "")).unwrap();

        assert!(registry.find::<Merchant>(HolderId::new(1)).unwrap().is_none());
        assert!(registry.find::<Institution>(HolderId::new(1)).unwrap().is_some());
    }

    #[test]
    fn test_mirror_mismatch_detected() {
        let store = NullStore::new();
        let registry = HolderRegistry::new(&store);
        registry.put_collection(&[merchant(11), merchant(12)]).unwrap();
        assert!(registry.mirror_mismatches::<Merchant>().unwrap().is_empty());

        store.delete("12").unwrap();
        assert_eq!(registry.mirror_mismatches::<Merchant>().unwrap(), vec![HolderId::new(12)]);
    }

    #[test]
    fn test_failed_commit_leaves_registry_unchanged() {
        let store = NullStore::new();
        let registry = HolderRegistry::new(&store);
        registry.put(&merchant(11)).unwrap();
        let before = store.snapshot();

        store.fail_after_writes(1);
        assert!(matches!(registry.put(&merchant(12)), Err(EngineError::Store(_))));
        assert_eq!(store.snapshot(), before);
    }
}
