//! Token holders: issuing institutions and merchants.
//!
//! Both variants serialize with the field names of the deployed schema so
//! existing store contents stay readable.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::keys::{INSTITUTIONS_KEY, MERCHANTS_KEY};
use crate::token::Token;

/// Numeric holder id.
///
/// Institutions and merchants share the single-holder key namespace, so an id
/// should be used by at most one holder of either kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(i64);

impl HolderId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for HolderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for HolderId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which registry a holder lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HolderKind {
    Institution,
    Merchant,
}

impl HolderKind {
    /// Store key of the full collection for this kind.
    pub fn collection_key(&self) -> &'static str {
        match self {
            Self::Institution => INSTITUTIONS_KEY,
            Self::Merchant => MERCHANTS_KEY,
        }
    }

    /// Inverse of [`HolderKind::collection_key`]; the command surface names
    /// holder kinds by their collection key.
    pub fn from_collection_key(key: &str) -> Option<Self> {
        match key {
            INSTITUTIONS_KEY => Some(Self::Institution),
            MERCHANTS_KEY => Some(Self::Merchant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Institution => "institution",
            Self::Merchant => "merchant",
        }
    }
}

impl fmt::Display for HolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common view over both holder variants.
///
/// The token sequence is a stack: the last element is the most recently
/// received token and the first to leave on a transfer.
pub trait Holder: Clone + fmt::Debug + Serialize + DeserializeOwned {
    const KIND: HolderKind;

    fn id(&self) -> HolderId;
    fn tokens(&self) -> &[Token];
    fn tokens_mut(&mut self) -> &mut Vec<Token>;

    fn balance(&self) -> u64 {
        self.tokens().len() as u64
    }
}

/// An issuing institution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    #[serde(rename = "id_payment")]
    pub id: HolderId,
    #[serde(rename = "desc_payment")]
    pub name: String,
    #[serde(rename = "cnpj", default)]
    pub tax_id: String,
    #[serde(rename = "Token", default, deserialize_with = "nullable_vec")]
    pub tokens: Vec<Token>,
    /// Merchants affiliated with this institution.
    #[serde(rename = "clientes", default, deserialize_with = "affiliates")]
    pub merchants: Vec<HolderId>,
}

impl Institution {
    pub fn new(id: HolderId, name: impl Into<String>, tax_id: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tax_id: tax_id.into(),
            tokens: Vec::new(),
            merchants: Vec::new(),
        }
    }
}

impl Holder for Institution {
    const KIND: HolderKind = HolderKind::Institution;

    fn id(&self) -> HolderId {
        self.id
    }

    fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn tokens_mut(&mut self) -> &mut Vec<Token> {
        &mut self.tokens
    }
}

/// A merchant account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    #[serde(rename = "id_merchant")]
    pub id: HolderId,
    #[serde(rename = "razao_social")]
    pub name: String,
    #[serde(rename = "cnpj", default)]
    pub tax_id: String,
    #[serde(rename = "Token", default, deserialize_with = "nullable_vec")]
    pub tokens: Vec<Token>,
}

impl Merchant {
    pub fn new(id: HolderId, name: impl Into<String>, tax_id: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tax_id: tax_id.into(),
            tokens: Vec::new(),
        }
    }
}

impl Holder for Merchant {
    const KIND: HolderKind = HolderKind::Merchant;

    fn id(&self) -> HolderId {
        self.id
    }

    fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn tokens_mut(&mut self) -> &mut Vec<Token> {
        &mut self.tokens
    }
}

// ── Serde helpers ──────────────────────────────────────────────────────

/// Empty lists were historically written as JSON `null`.
fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Older records embed full merchant documents in `clientes`; only the id is kept.
fn affiliates<'de, D>(deserializer: D) -> Result<Vec<HolderId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Affiliate {
        Id(HolderId),
        Record {
            #[serde(rename = "id_merchant")]
            id: HolderId,
        },
    }

    let entries: Vec<Affiliate> = nullable_vec(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Affiliate::Id(id) | Affiliate::Record { id } => id,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenValue;

    #[test]
    fn merchant_uses_deployed_field_names() {
        let mut merchant = Merchant::new(HolderId::new(11), "Padaria", "12.345/0001");
        merchant
            .tokens
            .push(Token::new(TokenValue::new("abcdefghij"), HolderId::new(11)));
        let json = serde_json::to_value(&merchant).unwrap();
        assert_eq!(json["id_merchant"], 11);
        assert_eq!(json["razao_social"], "Padaria");
        assert_eq!(json["cnpj"], "12.345/0001");
        assert_eq!(json["Token"][0]["token_value"], "abcdefghij");
    }

    #[test]
    fn institution_uses_deployed_field_names() {
        let mut institution = Institution::new(HolderId::new(1), "Banco", "");
        institution.merchants.push(HolderId::new(11));
        let json = serde_json::to_value(&institution).unwrap();
        assert_eq!(json["id_payment"], 1);
        assert_eq!(json["desc_payment"], "Banco");
        assert_eq!(json["clientes"][0], 11);
    }

    #[test]
    fn null_lists_decode_as_empty() {
        let merchant: Merchant =
            serde_json::from_str(r#"{"id_merchant":5,"razao_social":"x","cnpj":"y","Token":null}"#)
                .unwrap();
        assert!(merchant.tokens.is_empty());

        let institution: Institution =
            serde_json::from_str(r#"{"id_payment":1,"desc_payment":"b","Token":null,"clientes":null}"#)
                .unwrap();
        assert!(institution.tokens.is_empty());
        assert!(institution.merchants.is_empty());
        assert_eq!(institution.tax_id, "");
    }

    #[test]
    fn embedded_merchant_documents_decode_to_ids() {
        let json = r#"{
            "id_payment": 1,
            "desc_payment": "Banco",
            "Token": [],
            "clientes": [
                {"id_merchant": 11, "razao_social": "a", "cnpj": "b", "Token": null},
                13
            ]
        }"#;
        let institution: Institution = serde_json::from_str(json).unwrap();
        assert_eq!(institution.merchants, vec![HolderId::new(11), HolderId::new(13)]);
    }

    #[test]
    fn kind_round_trips_through_collection_key() {
        for kind in [HolderKind::Institution, HolderKind::Merchant] {
            assert_eq!(HolderKind::from_collection_key(kind.collection_key()), Some(kind));
        }
        assert_eq!(HolderKind::from_collection_key("_tokens"), None);
    }

    #[test]
    fn holder_id_parses_signed_decimal() {
        assert_eq!("42".parse::<HolderId>().unwrap(), HolderId::new(42));
        assert_eq!("-1".parse::<HolderId>().unwrap(), HolderId::new(-1));
        assert!("4x".parse::<HolderId>().is_err());
    }
}
