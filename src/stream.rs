use rand_core::RngCore;

use crate::cracking::first_output;
use crate::error::PrngError;
use crate::prng::MT19937;
use crate::xor;

/// Keystream bytes taken from each generator output, low byte first.
pub const BLOCK_LEN: usize = 4;
pub const TOKEN_LEN: usize = 16;

/// Keystream bytes `offset..offset + len` for a generator seeded with `key`.
///
/// Words are laid out little-endian; the unused tail of the last word is dropped.
fn keystream_window(key: u32, offset: usize, len: usize) -> Vec<u8> {
    let mut rng = MT19937::new(key);
    for _ in 0..offset / BLOCK_LEN {
        rng.extract_number();
    }

    let skip = offset % BLOCK_LEN;
    let mut stream = Vec::with_capacity(skip + len + BLOCK_LEN);
    while stream.len() < skip + len {
        stream.extend_from_slice(&rng.extract_number().to_le_bytes());
    }
    stream.truncate(skip + len);
    stream.split_off(skip)
}

pub fn keystream(key: u32, len: usize) -> Vec<u8> {
    keystream_window(key, 0, len)
}

/// XORs `plaintext` with the MT19937 keystream for `key`.
pub fn encrypt<K: Into<u32>>(plaintext: &[u8], key: K) -> Vec<u8> {
    let stream = keystream(key.into(), plaintext.len());
    xor(plaintext, &stream)
}

pub fn decrypt<K: Into<u32>>(ciphertext: &[u8], key: K) -> Vec<u8> {
    encrypt(ciphertext, key)
}

/// Recovers the key of a ciphertext that ends with `known_suffix`.
///
/// The keystream under the suffix is recovered by XOR, then each candidate is
/// tried in order and the first one that reproduces that whole span wins. The
/// suffix should be several bytes long; a short span lets wrong keys match.
pub fn recover_key<K, I>(
    ciphertext: &[u8],
    known_suffix: &[u8],
    candidates: I,
) -> Result<K, PrngError>
where
    K: Into<u32> + Copy,
    I: IntoIterator<Item = K>,
{
    if known_suffix.is_empty() || known_suffix.len() > ciphertext.len() {
        return Err(PrngError::InvalidKnownPlaintext {
            suffix_len: known_suffix.len(),
            ciphertext_len: ciphertext.len(),
        });
    }

    let offset = ciphertext.len() - known_suffix.len();
    let recovered = xor(&ciphertext[offset..], known_suffix);

    candidates
        .into_iter()
        .find(|&key| keystream_window(key.into(), offset, recovered.len()) == recovered)
        .ok_or(PrngError::KeyNotFound)
}

/// A password reset token: the first `TOKEN_LEN` bytes from a generator seeded with `time`.
pub fn generate_token(time: u32) -> [u8; TOKEN_LEN] {
    let mut token = [0u8; TOKEN_LEN];
    MT19937::new(time).fill_bytes(&mut token);
    token
}

/// Whether `token` came from a generator seeded with a time within `window` seconds of `now`.
pub fn is_time_seeded_token(token: &[u8; TOKEN_LEN], now: u32, window: u32) -> bool {
    let first = u32::from_le_bytes([token[0], token[1], token[2], token[3]]);
    (now.saturating_sub(window)..=now.saturating_add(window))
        .any(|time| first_output(time) == first && generate_token(time) == *token)
}
