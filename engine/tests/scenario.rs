//! End-to-end flows through the engine with the in-memory store.

use bearer_engine::{
    CashIn, CashOut, DemoSeed, EngineConfig, EngineError, HolderSeed, MerchantSeed, TokenPool, TokenTransfer,
    TransferEngine,
};
use bearer_nullables::NullStore;
use bearer_store::KvStore;
use bearer_types::keys::TOKENS_KEY;
use bearer_types::{HolderId, HolderKind, Institution, Merchant, Token, Transaction};

const BANK: i64 = 1;
const SHOP: i64 = 11;
const CAFE: i64 = 12;

fn id(n: i64) -> HolderId {
    HolderId::new(n)
}

fn engine_on(store: NullStore) -> TransferEngine<NullStore> {
    let mut engine = TransferEngine::with_pool(store, TokenPool::seeded(2024), EngineConfig::default());
    engine
        .seed_demo(&DemoSeed {
            institutions: vec![HolderSeed::new(BANK, "Bank", "11.111.111/0001-11", 0)],
            merchants: vec![
                MerchantSeed {
                    holder: HolderSeed::new(SHOP, "Shop", "22.222.222/0001-22", 0),
                    institution: id(BANK),
                },
                MerchantSeed {
                    holder: HolderSeed::new(CAFE, "Cafe", "33.333.333/0001-33", 0),
                    institution: id(BANK),
                },
            ],
        })
        .unwrap();
    engine
}

fn cash_in(buyer: i64, quantity: u64, seller: i64, tx_id: i64) -> CashIn {
    CashIn {
        buyer: id(buyer),
        quantity,
        seller: id(seller),
        quote: 3.5,
        timestamp: format!("14900000{tx_id:05}"),
        buyer_cash: 100.0,
        seller_cash: 200.0,
        tx_id,
    }
}

fn transfer(receiver: i64, quantity: u64, supplier: i64, tx_id: i64) -> TokenTransfer {
    TokenTransfer {
        receiver: id(receiver),
        quantity,
        supplier: id(supplier),
        timestamp: "1490000000000".into(),
        receiver_cash: 1.0,
        supplier_cash: 2.0,
        tx_id,
    }
}

fn cash_out(merchant: i64, quantity: u64, institution: i64, tx_id: i64) -> CashOut {
    CashOut {
        merchant: id(merchant),
        quantity,
        institution: id(institution),
        quote: 3.5,
        timestamp: "1490000000000".into(),
        merchant_cash: 5.0,
        institution_cash: 6.0,
        tx_id,
    }
}

fn balance<S: KvStore>(engine: &TransferEngine<S>, kind: HolderKind, holder: i64) -> u64 {
    engine.queries().get_balance(kind, id(holder)).unwrap()
}

/// Ledger entries after the genesis record.
fn entries<S: KvStore>(engine: &TransferEngine<S>) -> Vec<Transaction> {
    engine.ledger().list_all().unwrap().into_iter().skip(1).collect()
}

#[test]
fn issue_cash_in_transfer_cash_out() {
    let mut engine = engine_on(NullStore::new());

    engine.cash_in(&cash_in(BANK, 3, 0, 1)).unwrap();
    assert_eq!(balance(&engine, HolderKind::Institution, BANK), 3);
    assert_eq!(entries(&engine).len(), 1);

    engine.cash_in(&cash_in(SHOP, 2, BANK, 2)).unwrap();
    assert_eq!(balance(&engine, HolderKind::Institution, BANK), 1);
    assert_eq!(balance(&engine, HolderKind::Merchant, SHOP), 2);
    assert_eq!(entries(&engine).len(), 2);

    engine.transfer_tokens(&transfer(CAFE, 1, SHOP, 3)).unwrap();
    assert_eq!(balance(&engine, HolderKind::Merchant, SHOP), 1);
    assert_eq!(balance(&engine, HolderKind::Merchant, CAFE), 1);
    assert_eq!(entries(&engine).len(), 3);

    engine.cash_out(&cash_out(SHOP, 1, BANK, 4)).unwrap();
    assert_eq!(balance(&engine, HolderKind::Merchant, SHOP), 0);
    assert_eq!(balance(&engine, HolderKind::Institution, BANK), 2);
    assert_eq!(entries(&engine).len(), 4);

    assert_eq!(engine.queries().total_supply().unwrap(), 3);
    assert!(engine.registry().mirror_mismatches::<Merchant>().unwrap().is_empty());
    assert!(engine.registry().mirror_mismatches::<Institution>().unwrap().is_empty());
}

#[test]
fn ledger_records_roles_per_operation() {
    let mut engine = engine_on(NullStore::new());
    engine.cash_in(&cash_in(BANK, 3, 0, 1)).unwrap();
    engine.cash_in(&cash_in(SHOP, 2, BANK, 2)).unwrap();
    engine.transfer_tokens(&transfer(CAFE, 1, SHOP, 3)).unwrap();
    engine.cash_out(&cash_out(SHOP, 1, BANK, 4)).unwrap();

    let roles: Vec<_> = entries(&engine)
        .iter()
        .map(|tx| (tx.id, tx.buyer.as_i64(), tx.seller.as_i64(), tx.buyer_tokens, tx.seller_tokens))
        .collect();
    assert_eq!(
        roles,
        vec![
            (1, BANK, 0, 3, 3),
            (2, SHOP, BANK, 2, 1),
            (3, CAFE, SHOP, 1, 1),
            (4, BANK, SHOP, 2, 0),
        ]
    );

    let cash_out_tx = &entries(&engine)[3];
    assert_eq!(cash_out_tx.buyer_cash, 6.0);
    assert_eq!(cash_out_tx.seller_cash, 5.0);
    assert_eq!(entries(&engine)[2].quote, 0.0);
}

#[test]
fn filtered_listing_is_a_subsequence() {
    let mut engine = engine_on(NullStore::new());
    engine.cash_in(&cash_in(BANK, 3, 0, 1)).unwrap();
    engine.cash_in(&cash_in(SHOP, 2, BANK, 2)).unwrap();
    engine.transfer_tokens(&transfer(CAFE, 1, SHOP, 3)).unwrap();

    let queries = engine.queries();
    let all = queries.get_transactions(false, None).unwrap();
    let cafe = queries.get_transactions(true, Some(id(CAFE))).unwrap();
    assert_eq!(cafe.len(), 1);
    assert_eq!(cafe[0].id, 3);

    let shop_ids: Vec<_> = queries
        .get_transactions(true, Some(id(SHOP)))
        .unwrap()
        .iter()
        .map(|tx| tx.id)
        .collect();
    let expected: Vec<_> = all.iter().filter(|tx| tx.involves(id(SHOP))).map(|tx| tx.id).collect();
    assert_eq!(shop_ids, expected);
    assert_eq!(shop_ids, vec![2, 3]);
}

#[test]
fn flat_token_list_tracks_owners() {
    let mut engine = engine_on(NullStore::new());
    engine.cash_in(&cash_in(BANK, 4, 0, 1)).unwrap();
    engine.cash_in(&cash_in(SHOP, 3, BANK, 2)).unwrap();
    engine.transfer_tokens(&transfer(CAFE, 2, SHOP, 3)).unwrap();

    let raw = engine.queries().read_raw(TOKENS_KEY).unwrap();
    let flat: Vec<Token> = serde_json::from_slice(&raw).unwrap();
    assert_eq!(flat.len(), 4);

    let cafe: Merchant = engine.registry().get(id(CAFE)).unwrap();
    for token in &cafe.tokens {
        let entry = flat.iter().find(|t| t.value == token.value).unwrap();
        assert_eq!(entry.owner, id(CAFE));
    }
}

#[test]
fn rejected_operations_change_nothing() {
    let mut engine = engine_on(NullStore::new());
    engine.cash_in(&cash_in(BANK, 2, 0, 1)).unwrap();
    let before = engine.store().snapshot();

    assert!(matches!(
        engine.cash_in(&cash_in(SHOP, 3, BANK, 2)),
        Err(EngineError::InsufficientBalance { needed: 3, available: 2, .. })
    ));
    assert!(matches!(
        engine.transfer_tokens(&transfer(CAFE, 1, SHOP, 3)),
        Err(EngineError::EmptyBalance(holder)) if holder == id(SHOP)
    ));
    assert!(matches!(
        engine.cash_out(&cash_out(99, 1, BANK, 4)),
        Err(EngineError::HolderNotFound { kind: HolderKind::Merchant, .. })
    ));
    assert!(matches!(
        engine.cash_out(&cash_out(SHOP, 1, 98, 5)),
        Err(EngineError::HolderNotFound { kind: HolderKind::Institution, .. })
    ));
    assert!(matches!(
        engine.transfer_tokens(&transfer(BANK, 1, SHOP, 6)),
        Err(EngineError::HolderNotFound { kind: HolderKind::Merchant, .. })
    ));

    assert_eq!(engine.store().snapshot(), before);
}

#[test]
fn store_failure_mid_commit_rolls_back() {
    let store = NullStore::new();
    let mut engine = engine_on(store);
    engine.cash_in(&cash_in(BANK, 3, 0, 1)).unwrap();
    let before = engine.store().snapshot();

    engine.store().fail_after_writes(2);
    let err = engine.cash_in(&cash_in(SHOP, 2, BANK, 2)).unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));
    assert_eq!(engine.store().snapshot(), before);

    engine.store().clear_failure();
    engine.cash_in(&cash_in(SHOP, 2, BANK, 2)).unwrap();
    assert_eq!(balance(&engine, HolderKind::Merchant, SHOP), 2);
}

#[test]
fn sequential_store_failure_leaves_a_prefix() {
    let mut engine = engine_on(NullStore::sequential());
    engine.cash_in(&cash_in(BANK, 3, 0, 1)).unwrap();

    // Snapshots are staged first, so two writes land before the failure.
    engine.store().fail_after_writes(2);
    assert!(engine.cash_in(&cash_in(SHOP, 2, BANK, 2)).is_err());
    engine.store().clear_failure();

    let shop_snapshot: Merchant = engine.registry().snapshot(id(SHOP)).unwrap().unwrap();
    assert_eq!(shop_snapshot.tokens.len(), 2);
    assert_eq!(balance(&engine, HolderKind::Merchant, SHOP), 0);
    assert_eq!(engine.registry().mirror_mismatches::<Merchant>().unwrap(), vec![id(SHOP)]);
    assert_eq!(entries(&engine).len(), 1);
}

#[test]
fn reseeding_restarts_the_ledger() {
    let mut engine = engine_on(NullStore::new());
    engine.cash_in(&cash_in(BANK, 3, 0, 1)).unwrap();

    engine
        .seed_demo(&DemoSeed {
            institutions: vec![HolderSeed::new(BANK, "Bank", "", 5)],
            merchants: vec![MerchantSeed {
                holder: HolderSeed::new(SHOP, "Shop", "", 2),
                institution: id(BANK),
            }],
        })
        .unwrap();

    assert_eq!(engine.ledger().list_all().unwrap(), vec![Transaction::genesis()]);
    assert_eq!(balance(&engine, HolderKind::Institution, BANK), 5);
    assert_eq!(balance(&engine, HolderKind::Merchant, SHOP), 2);

    let bank: Institution = engine.registry().get(id(BANK)).unwrap();
    assert_eq!(bank.merchants, vec![id(SHOP)]);
    let shop: Merchant = engine.registry().get(id(SHOP)).unwrap();
    assert!(shop.tokens.iter().all(|t| t.owner == id(SHOP)));
}

#[test]
fn reset_then_empty_queries() {
    let mut engine = engine_on(NullStore::new());
    engine.cash_in(&cash_in(BANK, 3, 0, 1)).unwrap();
    engine.reset_all().unwrap();

    assert!(engine.store().is_empty());
    assert!(engine.queries().get_transactions(false, None).unwrap().is_empty());
    assert!(engine
        .queries()
        .get_balance(HolderKind::Institution, id(BANK))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn ledger_with_negative_counts_stays_usable() {
    let mut engine = engine_on(NullStore::new());
    let legacy = br#"[
        {"id":-1,"id_comprador":0,"id_fornecedor":0,"qtd_tokens":0,"valor_cotacao":0,
         "horario_transacao":"Genesis Transaction","saldo_atual_reais_comprador":0,
         "saldo_atual_reais_vendedor":0,"saldo_atual_tokens_comprador":0,"saldo_atual_tokens_vendedor":0},
        {"id":7,"id_comprador":11,"id_fornecedor":1,"qtd_tokens":-1,"valor_cotacao":2.5,
         "horario_transacao":"1490000000000","saldo_atual_reais_comprador":0,
         "saldo_atual_reais_vendedor":0,"saldo_atual_tokens_comprador":-1,"saldo_atual_tokens_vendedor":1}
    ]"#;
    engine.store().put("_transacoes", legacy).unwrap();

    let all = engine.queries().get_transactions(false, None).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].quantity, -1);

    engine.cash_in(&cash_in(BANK, 2, 0, 8)).unwrap();
    let ids: Vec<_> = engine.ledger().list_all().unwrap().iter().map(|tx| tx.id).collect();
    assert_eq!(ids, vec![-1, 7, 8]);
    assert_eq!(engine.queries().get_transactions(true, Some(id(SHOP))).unwrap().len(), 1);
}
