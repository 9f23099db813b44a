//! Audit record appended for every token movement.

use serde::{Deserialize, Serialize};

use crate::HolderId;

/// Caller-supplied transaction id. Not assigned or checked for uniqueness.
pub type TransactionId = i64;

/// Immutable audit record.
///
/// `buyer`/`seller` follow the per-operation mapping of the transfer engine,
/// which does not always match "who received the tokens" (cash-out records
/// the institution as buyer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "id_comprador")]
    pub buyer: HolderId,
    #[serde(rename = "id_fornecedor")]
    pub seller: HolderId,
    /// Signed because older deployments accepted negative counts.
    #[serde(rename = "qtd_tokens")]
    pub quantity: i64,
    #[serde(rename = "valor_cotacao")]
    pub quote: f64,
    /// External timestamp string, stored verbatim.
    #[serde(rename = "horario_transacao")]
    pub timestamp: String,
    #[serde(rename = "saldo_atual_reais_comprador")]
    pub buyer_cash: f64,
    #[serde(rename = "saldo_atual_reais_vendedor")]
    pub seller_cash: f64,
    /// Buyer token balance after the operation.
    #[serde(rename = "saldo_atual_tokens_comprador")]
    pub buyer_tokens: i64,
    /// Seller token balance after the operation.
    #[serde(rename = "saldo_atual_tokens_vendedor")]
    pub seller_tokens: i64,
}

impl Transaction {
    pub const GENESIS_ID: TransactionId = -1;
    pub const GENESIS_TIMESTAMP: &'static str = "Genesis Transaction";

    /// The placeholder record a freshly seeded ledger starts with.
    pub fn genesis() -> Self {
        Self {
            id: Self::GENESIS_ID,
            buyer: HolderId::new(0),
            seller: HolderId::new(0),
            quantity: 0,
            quote: 0.0,
            timestamp: Self::GENESIS_TIMESTAMP.to_string(),
            buyer_cash: 0.0,
            seller_cash: 0.0,
            buyer_tokens: 0,
            seller_tokens: 0,
        }
    }

    /// Whether `holder` is the buyer or the seller of this record.
    pub fn involves(&self, holder: HolderId) -> bool {
        self.buyer == holder || self.seller == holder
    }
}
