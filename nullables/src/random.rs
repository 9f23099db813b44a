//! Nullable random: scripted random number generation.

use rand::RngCore;

/// A deterministic [`RngCore`] for testing.
///
/// Returns the configured words in order, cycling when exhausted. A constant
/// source makes every token draw identical, which is how collision handling
/// is exercised.
pub struct NullRandom {
    outputs: Vec<u64>,
    index: usize,
}

impl NullRandom {
    /// Create with a sequence of deterministic words.
    pub fn new(outputs: Vec<u64>) -> Self {
        Self { outputs, index: 0 }
    }

    /// Create with a single word that is returned for every call.
    pub fn constant(value: u64) -> Self {
        Self::new(vec![value])
    }
}

impl RngCore for NullRandom {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        if self.outputs.is_empty() {
            return 0;
        }
        let value = self.outputs[self.index % self.outputs.len()];
        self.index += 1;
        value
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let word = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
