use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{ensure, Context, Result};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;
use rand::{Rng, RngCore};

use crate::prng::MT19937;
use crate::stream::{encrypt, generate_token, TOKEN_LEN};

/// Shortest suffix `KnownSuffixOracle` will encrypt; anything shorter makes
/// false key matches likely.
pub const MIN_KNOWN_SUFFIX: usize = 4;
/// How far either side of "now" token checks look, in seconds.
pub const TOKEN_WINDOW: u32 = 3600;

pub fn unix_now() -> Result<u32> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("Clock is before the epoch")?
        .as_secs();
    Ok(secs as u32)
}

/// Seeds an MT19937 with a timestamp some seconds before `now` and
/// hands out only its first output.
pub struct TimeSeedOracle {
    seed: u32,
    pub now: u32,
    pub clue: u32,
}

impl TimeSeedOracle {
    pub fn new(now: u32) -> TimeSeedOracle {
        let waited = Uniform::new_inclusive(40, 1000).sample(&mut OsRng);
        let seed = now.saturating_sub(waited);

        let mut rng = MT19937::new(seed);
        let clue = rng.extract_number();

        TimeSeedOracle { seed, now, clue }
    }

    pub fn from_clock() -> Result<TimeSeedOracle> {
        Ok(TimeSeedOracle::new(unix_now()?))
    }

    pub fn assert_success(&self, guess: u32) {
        assert_eq!(self.seed, guess);
    }
}

/// Encrypts `random prefix || suffix` under a hidden 16-bit MT19937 stream key.
pub struct KnownSuffixOracle {
    key: u16,
    prefix: Vec<u8>,
}

impl KnownSuffixOracle {
    pub fn new() -> KnownSuffixOracle {
        let prefix_range = Uniform::new_inclusive(5, 20);
        let mut prefix = vec![];
        prefix.resize_with(prefix_range.sample(&mut OsRng), || OsRng.gen());

        KnownSuffixOracle {
            key: OsRng.gen(),
            prefix,
        }
    }

    pub fn encrypt(&self, suffix: &[u8]) -> Result<Vec<u8>> {
        ensure!(
            suffix.len() >= MIN_KNOWN_SUFFIX,
            "Suffix must be at least {} bytes",
            MIN_KNOWN_SUFFIX
        );

        let mut plaintext = self.prefix.clone();
        plaintext.extend_from_slice(suffix);
        Ok(encrypt(&plaintext, self.key))
    }

    pub fn assert_success(&self, guess: u16) {
        assert_eq!(self.key, guess);
    }
}

impl Default for KnownSuffixOracle {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out a password reset token that is either time-seeded or pure noise.
pub struct TokenOracle {
    time_seeded: bool,
    pub now: u32,
    pub token: [u8; TOKEN_LEN],
}

impl TokenOracle {
    pub fn new(now: u32) -> TokenOracle {
        let time_seeded: bool = OsRng.gen();
        let mut token = [0u8; TOKEN_LEN];
        if time_seeded {
            let age = Uniform::new(0, TOKEN_WINDOW).sample(&mut OsRng);
            token = generate_token(now.saturating_sub(age));
        } else {
            OsRng.fill_bytes(&mut token);
        }

        TokenOracle {
            time_seeded,
            now,
            token,
        }
    }

    pub fn assert_success(&self, guess: bool) {
        assert_eq!(self.time_seeded, guess);
    }
}
