pub mod cracking;
pub mod error;
pub mod oracles;
pub mod prng;
pub mod stream;

pub use cracking::{
    clone_from_outputs, clone_from_stream, crack_seed, crack_time_seed, par_crack_seed,
};
pub use error::PrngError;
pub use prng::{temper, untemper, MT19937};
pub use stream::{
    decrypt, encrypt, generate_token, is_time_seeded_token, keystream, recover_key,
};

/// Seeds a fresh generator.
pub fn seed(seed: u32) -> MT19937 {
    MT19937::new(seed)
}

fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter().cycle()).map(|(a, b)| a ^ b).collect()
}
