//! Custody and transfer operations over a [`KvStore`].
//!
//! Every mutating operation loads the collections it needs, applies the
//! change to local copies, stages the full result into one [`WriteSet`] and
//! commits it once. Validation failures return before anything is staged.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::RngCore;

use bearer_store::{KvStore, WriteSet};
use bearer_types::keys::{holder_key, COLLECTION_KEYS, TOKENS_KEY};
use bearer_types::{Holder, HolderKind, Institution, Merchant, Token, TokenValue, Transaction};

use crate::codec::{encode, load_list};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::ledger::{stage_ledger, TransactionLedger};
use crate::pool::{self, TokenPool};
use crate::query::QueryLayer;
use crate::registry::{position, stage_collection, stage_holder, HolderRegistry};
use crate::request::{CashIn, CashOut, DemoSeed, TokenTransfer};

pub struct TransferEngine<S, R = StdRng> {
    store: S,
    pool: TokenPool<R>,
    config: EngineConfig,
}

impl<S: KvStore> TransferEngine<S, StdRng> {
    /// Engine whose token generator follows `config.rng_seed`.
    pub fn new(store: S, config: EngineConfig) -> Self {
        let pool = TokenPool::from_config(&config);
        Self { store, pool, config }
    }
}

impl<S: KvStore, R: RngCore> TransferEngine<S, R> {
    pub fn with_pool(store: S, pool: TokenPool<R>, config: EngineConfig) -> Self {
        Self { store, pool, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> HolderRegistry<'_, S> {
        HolderRegistry::new(&self.store)
    }

    pub fn ledger(&self) -> TransactionLedger<'_, S> {
        TransactionLedger::new(&self.store)
    }

    pub fn queries(&self) -> QueryLayer<'_, S> {
        QueryLayer::new(&self.store)
    }

    /// Move tokens into `req.buyer`.
    ///
    /// A merchant buyer receives existing tokens from institution
    /// `req.seller`. Any other buyer must be an institution, which mints
    /// `req.quantity` new tokens into its own pool; `req.seller` is then only
    /// recorded on the transaction.
    pub fn cash_in(&mut self, req: &CashIn) -> Result<Transaction, EngineError> {
        if req.buyer == req.seller {
            return Err(EngineError::SameHolder(req.buyer));
        }

        let registry = self.registry();
        let mut merchants: Vec<Merchant> = registry.list()?;
        let mut institutions: Vec<Institution> = registry.list()?;
        let mut flat: Vec<Token> = load_list(&self.store, TOKENS_KEY)?;
        let mut batch = WriteSet::new();

        let tx = match position(&merchants, req.buyer) {
            Some(m) => {
                let i = position(&institutions, req.seller).ok_or(EngineError::HolderNotFound {
                    kind: HolderKind::Institution,
                    id: req.seller,
                })?;
                let merchant = &mut merchants[m];
                let institution = &mut institutions[i];
                let moved = pool::transfer(institution, merchant, req.quantity)?;
                pool::reassign(&mut flat, &moved, merchant.id);

                stage_holder(&mut batch, &*merchant)?;
                stage_holder(&mut batch, &*institution)?;
                record(req, merchant.balance(), institution.balance())
            }
            None => {
                let i = position(&institutions, req.buyer).ok_or(EngineError::HolderNotFound {
                    kind: HolderKind::Institution,
                    id: req.buyer,
                })?;
                let mut taken = pool::value_set(&flat);
                taken.extend(circulating(&institutions, &merchants));
                let minted = self.pool.mint(req.buyer, req.quantity, &taken)?;

                let institution = &mut institutions[i];
                flat.extend(minted.iter().cloned());
                institution.tokens.extend(minted);

                stage_holder(&mut batch, &*institution)?;
                let balance = institution.balance();
                record(req, balance, balance)
            }
        };

        stage_collection(&mut batch, &merchants)?;
        stage_collection(&mut batch, &institutions)?;
        stage_tokens(&mut batch, &flat)?;
        let entries = self.ledger().stage_append(&mut batch, tx.clone())?;
        self.commit(batch, "cashin")?;

        tracing::info!(
            tx_id = tx.id,
            buyer = %tx.buyer,
            seller = %tx.seller,
            quantity = tx.quantity,
            ledger_len = entries,
            "cash-in completed"
        );
        Ok(tx)
    }

    /// Return tokens from `req.merchant` to `req.institution`. The
    /// transaction lists the institution as buyer.
    pub fn cash_out(&mut self, req: &CashOut) -> Result<Transaction, EngineError> {
        let registry = self.registry();
        let mut merchants: Vec<Merchant> = registry.list()?;
        let mut institutions: Vec<Institution> = registry.list()?;

        let m = position(&merchants, req.merchant).ok_or(EngineError::HolderNotFound {
            kind: HolderKind::Merchant,
            id: req.merchant,
        })?;
        let i = position(&institutions, req.institution).ok_or(EngineError::HolderNotFound {
            kind: HolderKind::Institution,
            id: req.institution,
        })?;

        let merchant = &mut merchants[m];
        let institution = &mut institutions[i];
        let moved = pool::transfer(merchant, institution, req.quantity)?;
        let mut flat: Vec<Token> = load_list(&self.store, TOKENS_KEY)?;
        pool::reassign(&mut flat, &moved, institution.id);

        let tx = Transaction {
            id: req.tx_id,
            buyer: req.institution,
            seller: req.merchant,
            quantity: count(req.quantity),
            quote: req.quote,
            timestamp: req.timestamp.clone(),
            buyer_cash: req.institution_cash,
            seller_cash: req.merchant_cash,
            buyer_tokens: count(institution.balance()),
            seller_tokens: count(merchant.balance()),
        };

        let mut batch = WriteSet::new();
        stage_holder(&mut batch, &*merchant)?;
        stage_holder(&mut batch, &*institution)?;
        stage_collection(&mut batch, &merchants)?;
        stage_collection(&mut batch, &institutions)?;
        stage_tokens(&mut batch, &flat)?;
        let entries = self.ledger().stage_append(&mut batch, tx.clone())?;
        self.commit(batch, "cashOut")?;

        tracing::info!(
            tx_id = tx.id,
            merchant = %req.merchant,
            institution = %req.institution,
            quantity = tx.quantity,
            ledger_len = entries,
            "cash-out completed"
        );
        Ok(tx)
    }

    /// Move tokens from merchant `req.supplier` to merchant `req.receiver`.
    pub fn transfer_tokens(&mut self, req: &TokenTransfer) -> Result<Transaction, EngineError> {
        if req.receiver == req.supplier {
            return Err(EngineError::SameHolder(req.receiver));
        }

        let mut merchants: Vec<Merchant> = self.registry().list()?;
        let r = position(&merchants, req.receiver).ok_or(EngineError::HolderNotFound {
            kind: HolderKind::Merchant,
            id: req.receiver,
        })?;
        let s = position(&merchants, req.supplier).ok_or(EngineError::HolderNotFound {
            kind: HolderKind::Merchant,
            id: req.supplier,
        })?;

        let (receiver, supplier) = pair_mut(&mut merchants, r, s);
        let moved = pool::transfer(supplier, receiver, req.quantity)?;
        let mut flat: Vec<Token> = load_list(&self.store, TOKENS_KEY)?;
        pool::reassign(&mut flat, &moved, receiver.id);

        let tx = Transaction {
            id: req.tx_id,
            buyer: req.receiver,
            seller: req.supplier,
            quantity: count(req.quantity),
            quote: 0.0,
            timestamp: req.timestamp.clone(),
            buyer_cash: req.receiver_cash,
            seller_cash: req.supplier_cash,
            buyer_tokens: count(receiver.balance()),
            seller_tokens: count(supplier.balance()),
        };

        let mut batch = WriteSet::new();
        stage_holder(&mut batch, &*receiver)?;
        stage_holder(&mut batch, &*supplier)?;
        stage_collection(&mut batch, &merchants)?;
        stage_tokens(&mut batch, &flat)?;
        let entries = self.ledger().stage_append(&mut batch, tx.clone())?;
        self.commit(batch, "transferTokens")?;

        tracing::info!(
            tx_id = tx.id,
            receiver = %req.receiver,
            supplier = %req.supplier,
            quantity = tx.quantity,
            ledger_len = entries,
            "token transfer completed"
        );
        Ok(tx)
    }

    /// Replace all holders with `seed`, mint their opening balances and
    /// restart the ledger at the genesis transaction.
    pub fn seed_demo(&mut self, seed: &DemoSeed) -> Result<(), EngineError> {
        let mut seen = HashSet::new();
        for id in seed.ids() {
            if !seen.insert(id) {
                return Err(EngineError::DuplicateHolder(id));
            }
        }

        let mut taken: HashSet<TokenValue> = HashSet::new();
        let mut flat: Vec<Token> = Vec::new();

        let mut institutions = Vec::with_capacity(seed.institutions.len());
        for s in &seed.institutions {
            let mut institution = Institution::new(s.id, s.name.clone(), s.tax_id.clone());
            institution.tokens = self.pool.mint(s.id, s.tokens, &taken)?;
            taken.extend(pool::value_set(&institution.tokens));
            flat.extend(institution.tokens.iter().cloned());
            institutions.push(institution);
        }

        let mut merchants = Vec::with_capacity(seed.merchants.len());
        for s in &seed.merchants {
            let h = &s.holder;
            let affiliate = institutions
                .iter_mut()
                .find(|i| i.id == s.institution)
                .ok_or(EngineError::HolderNotFound {
                    kind: HolderKind::Institution,
                    id: s.institution,
                })?;
            affiliate.merchants.push(h.id);

            let mut merchant = Merchant::new(h.id, h.name.clone(), h.tax_id.clone());
            merchant.tokens = self.pool.mint(h.id, h.tokens, &taken)?;
            taken.extend(pool::value_set(&merchant.tokens));
            flat.extend(merchant.tokens.iter().cloned());
            merchants.push(merchant);
        }

        let mut batch = WriteSet::new();
        for institution in &institutions {
            stage_holder(&mut batch, institution)?;
        }
        for merchant in &merchants {
            stage_holder(&mut batch, merchant)?;
        }
        stage_collection(&mut batch, &merchants)?;
        stage_collection(&mut batch, &institutions)?;
        stage_tokens(&mut batch, &flat)?;
        stage_ledger(&mut batch, &[Transaction::genesis()])?;
        self.commit(batch, "initdemo")?;

        tracing::info!(
            institutions = institutions.len(),
            merchants = merchants.len(),
            tokens = flat.len(),
            "demo state seeded"
        );
        Ok(())
    }

    /// Delete a single key. Deleting an absent key succeeds.
    pub fn delete_state(&self, key: &str) -> Result<(), EngineError> {
        self.store.delete(key)?;
        tracing::info!(key, "state deleted");
        Ok(())
    }

    /// Delete every collection key and the holder snapshots in the
    /// configured id range. Returns the number of keys removed or absent.
    pub fn reset_all(&self) -> Result<usize, EngineError> {
        let mut batch = WriteSet::new();
        for key in COLLECTION_KEYS {
            batch.delete(key);
        }
        for id in self.config.reset_ids() {
            batch.delete(holder_key(id));
        }
        let keys = batch.len();
        self.commit(batch, "resetAll")?;
        tracing::info!(keys, "state reset");
        Ok(keys)
    }

    fn commit(&self, batch: WriteSet, operation: &'static str) -> Result<(), EngineError> {
        let writes = batch.len();
        let atomic = self.store.supports_atomic_commit();
        tracing::debug!(operation, writes, atomic, "committing write set");
        self.store.commit(batch)?;
        Ok(())
    }
}

fn record(req: &CashIn, buyer_tokens: u64, seller_tokens: u64) -> Transaction {
    Transaction {
        id: req.tx_id,
        buyer: req.buyer,
        seller: req.seller,
        quantity: count(req.quantity),
        quote: req.quote,
        timestamp: req.timestamp.clone(),
        buyer_cash: req.buyer_cash,
        seller_cash: req.seller_cash,
        buyer_tokens: count(buyer_tokens),
        seller_tokens: count(seller_tokens),
    }
}

/// Token count as stored on a ledger record.
fn count(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn stage_tokens(batch: &mut WriteSet, flat: &[Token]) -> Result<(), EngineError> {
    batch.put(TOKENS_KEY, encode(TOKENS_KEY, flat)?);
    Ok(())
}

/// Values currently held by any holder.
fn circulating(institutions: &[Institution], merchants: &[Merchant]) -> HashSet<TokenValue> {
    institutions
        .iter()
        .flat_map(|i| i.tokens())
        .chain(merchants.iter().flat_map(|m| m.tokens()))
        .map(|t| t.value.clone())
        .collect()
}

/// Two distinct mutable elements of one slice.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "pair_mut needs two distinct indices");
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
