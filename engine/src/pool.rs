//! Token minting and movement between holders.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use bearer_types::{Holder, HolderId, Token, TokenValue, TOKEN_ALPHABET, TOKEN_LENGTH};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Draws token values and mints batches of fresh tokens.
pub struct TokenPool<R = StdRng> {
    rng: R,
    max_attempts: usize,
}

impl TokenPool<StdRng> {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let pool = match config.rng_seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        };
        pool.with_max_attempts(config.max_mint_attempts)
    }
}

impl<R: RngCore> TokenPool<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            max_attempts: EngineConfig::default().max_mint_attempts,
        }
    }

    /// At least one draw is always made.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// One value of [`TOKEN_LENGTH`] characters, each uniform over [`TOKEN_ALPHABET`].
    pub fn draw_value(&mut self) -> TokenValue {
        let value: String = (0..TOKEN_LENGTH)
            .map(|_| TOKEN_ALPHABET[self.rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
            .collect();
        TokenValue::new(value)
    }

    /// Mint `count` tokens owned by `owner`.
    ///
    /// Every value is distinct from `existing` and from the rest of the batch;
    /// a colliding draw is retried until the attempt budget runs out.
    pub fn mint(
        &mut self,
        owner: HolderId,
        count: u64,
        existing: &HashSet<TokenValue>,
    ) -> Result<Vec<Token>, EngineError> {
        let mut fresh: HashSet<TokenValue> = HashSet::new();
        let mut minted = Vec::new();
        for _ in 0..count {
            let value = self.draw_unique(existing, &fresh)?;
            fresh.insert(value.clone());
            minted.push(Token::new(value, owner));
        }
        Ok(minted)
    }

    fn draw_unique(
        &mut self,
        existing: &HashSet<TokenValue>,
        fresh: &HashSet<TokenValue>,
    ) -> Result<TokenValue, EngineError> {
        for attempt in 1..=self.max_attempts {
            let value = self.draw_value();
            if !existing.contains(&value) && !fresh.contains(&value) {
                return Ok(value);
            }
            tracing::debug!(attempt, value = %value, "token value collision, redrawing");
        }
        Err(EngineError::TokenCollision {
            attempts: self.max_attempts,
        })
    }
}

/// Move the `count` most recently received tokens of `from` to the end of
/// `to`, keeping their relative order and re-stamping their owner.
///
/// Returns the moved values. Nothing changes on error.
pub fn transfer<F: Holder, T: Holder>(from: &mut F, to: &mut T, count: u64) -> Result<Vec<TokenValue>, EngineError> {
    let available = from.balance();
    if available == 0 {
        return Err(EngineError::EmptyBalance(from.id()));
    }
    if available < count {
        return Err(EngineError::InsufficientBalance {
            holder: from.id(),
            needed: count,
            available,
        });
    }

    let split_at = from.tokens().len() - count as usize;
    let mut moved = from.tokens_mut().split_off(split_at);
    let owner = to.id();
    for token in &mut moved {
        token.owner = owner;
    }
    let values = moved.iter().map(|t| t.value.clone()).collect();
    to.tokens_mut().extend(moved);
    Ok(values)
}

/// Update the owner of `moved` in the flat token list.
///
/// Values missing from the list (written before it was maintained) are
/// appended so the list keeps covering every token in circulation.
pub fn reassign(flat: &mut Vec<Token>, moved: &[TokenValue], owner: HolderId) {
    let index: HashMap<TokenValue, usize> = flat
        .iter()
        .enumerate()
        .map(|(i, t)| (t.value.clone(), i))
        .collect();
    for value in moved {
        match index.get(value) {
            Some(&i) => flat[i].owner = owner,
            None => flat.push(Token::new(value.clone(), owner)),
        }
    }
}

/// Values of `tokens` as a set.
pub fn value_set<'t>(tokens: impl IntoIterator<Item = &'t Token>) -> HashSet<TokenValue> {
    tokens.into_iter().map(|t| t.value.clone()).collect()
}
