// Token Provider Port (client identity tokens)

use rand::Rng;

/// Lowercase base36 alphabet
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// 16 base36 characters ~= 82.7 bits of entropy
pub const TOKEN_LENGTH: usize = 16;

/// Token provider interface (allows deterministic tokens in tests)
pub trait TokenProvider: Send + Sync {
    /// Generate a new opaque client token
    fn generate_token(&self) -> String;
}

/// Random base36 tokens from the thread-local CSPRNG (production)
pub struct RandomTokenProvider;

impl TokenProvider for RandomTokenProvider {
    fn generate_token(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..TOKEN_LENGTH)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}
