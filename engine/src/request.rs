//! Typed operation requests and their positional string-argument forms.

use std::str::FromStr;

use bearer_types::{HolderId, TransactionId};

use crate::error::EngineError;

/// Tokens moving into `buyer`, either from institution `seller` (when the
/// buyer is a merchant) or freshly minted (when the buyer is an institution).
#[derive(Clone, Debug, PartialEq)]
pub struct CashIn {
    pub buyer: HolderId,
    pub quantity: u64,
    pub seller: HolderId,
    pub quote: f64,
    pub timestamp: String,
    pub buyer_cash: f64,
    pub seller_cash: f64,
    pub tx_id: TransactionId,
}

/// Tokens returning from a merchant to an institution.
#[derive(Clone, Debug, PartialEq)]
pub struct CashOut {
    pub merchant: HolderId,
    pub quantity: u64,
    pub institution: HolderId,
    pub quote: f64,
    pub timestamp: String,
    pub merchant_cash: f64,
    pub institution_cash: f64,
    pub tx_id: TransactionId,
}

/// Tokens moving between two merchants.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenTransfer {
    pub receiver: HolderId,
    pub quantity: u64,
    pub supplier: HolderId,
    pub timestamp: String,
    pub receiver_cash: f64,
    pub supplier_cash: f64,
    pub tx_id: TransactionId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HolderSeed {
    pub id: HolderId,
    pub name: String,
    pub tax_id: String,
    pub tokens: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerchantSeed {
    pub holder: HolderSeed,
    /// Institution the merchant is listed under.
    pub institution: HolderId,
}

/// Initial holders for a fresh deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemoSeed {
    pub institutions: Vec<HolderSeed>,
    pub merchants: Vec<MerchantSeed>,
}

impl CashIn {
    pub const ARGS: usize = 8;

    pub fn from_args(args: &[String]) -> Result<Self, EngineError> {
        expect_args("cashin", args, Self::ARGS)?;
        Ok(Self {
            buyer: parse(args, 0, "buyer")?,
            quantity: parse(args, 1, "quantity")?,
            seller: parse(args, 2, "seller")?,
            quote: parse_amount(args, 3, "quote")?,
            timestamp: args[4].clone(),
            buyer_cash: parse_amount(args, 5, "buyer_cash")?,
            seller_cash: parse_amount(args, 6, "seller_cash")?,
            tx_id: parse(args, 7, "tx_id")?,
        })
    }
}

impl CashOut {
    pub const ARGS: usize = 8;

    pub fn from_args(args: &[String]) -> Result<Self, EngineError> {
        expect_args("cashOut", args, Self::ARGS)?;
        Ok(Self {
            merchant: parse(args, 0, "merchant")?,
            quantity: parse(args, 1, "quantity")?,
            institution: parse(args, 2, "institution")?,
            quote: parse_amount(args, 3, "quote")?,
            timestamp: args[4].clone(),
            merchant_cash: parse_amount(args, 5, "merchant_cash")?,
            institution_cash: parse_amount(args, 6, "institution_cash")?,
            tx_id: parse(args, 7, "tx_id")?,
        })
    }
}

impl TokenTransfer {
    pub const ARGS: usize = 7;

    pub fn from_args(args: &[String]) -> Result<Self, EngineError> {
        expect_args("transferTokens", args, Self::ARGS)?;
        Ok(Self {
            receiver: parse(args, 0, "receiver")?,
            quantity: parse(args, 1, "quantity")?,
            supplier: parse(args, 2, "supplier")?,
            timestamp: args[3].clone(),
            receiver_cash: parse_amount(args, 4, "receiver_cash")?,
            supplier_cash: parse_amount(args, 5, "supplier_cash")?,
            tx_id: parse(args, 6, "tx_id")?,
        })
    }
}

impl HolderSeed {
    pub fn new(id: i64, name: impl Into<String>, tax_id: impl Into<String>, tokens: u64) -> Self {
        Self {
            id: HolderId::new(id),
            name: name.into(),
            tax_id: tax_id.into(),
            tokens,
        }
    }

    fn from_args(args: &[String], start: usize) -> Result<Self, EngineError> {
        Ok(Self {
            id: parse(args, start, "id")?,
            name: args[start + 1].clone(),
            tax_id: args[start + 2].clone(),
            tokens: parse(args, start + 3, "tokens")?,
        })
    }
}

impl DemoSeed {
    pub const ARGS: usize = 20;

    /// Groups of `id, name, tax id, token count` for institution A,
    /// institution B, then three merchants affiliated with A, B and A.
    pub fn from_args(args: &[String]) -> Result<Self, EngineError> {
        expect_args("initdemo", args, Self::ARGS)?;
        let first = HolderSeed::from_args(args, 0)?;
        let second = HolderSeed::from_args(args, 4)?;
        let affiliations = [first.id, second.id, first.id];

        let mut merchants = Vec::with_capacity(affiliations.len());
        for (n, institution) in affiliations.into_iter().enumerate() {
            merchants.push(MerchantSeed {
                holder: HolderSeed::from_args(args, 8 + 4 * n)?,
                institution,
            });
        }
        Ok(Self {
            institutions: vec![first, second],
            merchants,
        })
    }

    /// Every seeded id, institutions first.
    pub fn ids(&self) -> impl Iterator<Item = HolderId> + '_ {
        self.institutions
            .iter()
            .map(|s| s.id)
            .chain(self.merchants.iter().map(|m| m.holder.id))
    }
}

pub(crate) fn expect_args(command: &str, args: &[String], expected: usize) -> Result<(), EngineError> {
    if args.len() != expected {
        return Err(EngineError::WrongArgumentCount {
            command: command.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

pub(crate) fn parse<T: FromStr>(args: &[String], index: usize, name: &'static str) -> Result<T, EngineError> {
    args[index].parse().map_err(|_| EngineError::InvalidArgument {
        name,
        value: args[index].clone(),
    })
}

/// Decimal amount. Must be finite so it survives a JSON round trip.
fn parse_amount(args: &[String], index: usize, name: &'static str) -> Result<f64, EngineError> {
    let value: f64 = parse(args, index, name)?;
    if !value.is_finite() {
        return Err(EngineError::InvalidArgument {
            name,
            value: args[index].clone(),
        });
    }
    Ok(value)
}

/// Boolean flag in any of the spellings `1 t T TRUE true True` /
/// `0 f F FALSE false False`.
pub(crate) fn parse_flag(args: &[String], index: usize, name: &'static str) -> Result<bool, EngineError> {
    match args[index].as_str() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(EngineError::InvalidArgument {
            name,
            value: other.to_string(),
        }),
    }
}
