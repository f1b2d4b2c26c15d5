use std::ops::Range;

use rayon::prelude::*;

use crate::error::PrngError;
use crate::prng::{seed_word, temper, twist_word, untemper, M, MT19937, N};

/// Rebuilds a generator from exactly `N` consecutive outputs of another one.
///
/// The clone's state is the untempered outputs with the cursor parked at the end, so
/// its first call twists and continues right where the observed generator is.
pub fn clone_from_outputs(outputs: &[u32]) -> Result<MT19937, PrngError> {
    if outputs.len() != N {
        return Err(PrngError::InvalidInputLength {
            expected: N,
            actual: outputs.len(),
        });
    }

    let state: Vec<u32> = outputs.iter().map(|&y| untemper(y)).collect();
    MT19937::from_state(&state, N)
}

/// Like `clone_from_outputs`, but takes any run of at least `N` consecutive outputs
/// and clones from the last `N` of them.
///
/// The observed window doesn't need to start on a twist boundary: the twist is a
/// recurrence over the infinite word sequence, so any `N` consecutive words are a
/// valid state.
pub fn clone_from_stream(outputs: &[u32]) -> Result<MT19937, PrngError> {
    if outputs.len() < N {
        return Err(PrngError::InvalidInputLength {
            expected: N,
            actual: outputs.len(),
        });
    }
    clone_from_outputs(&outputs[outputs.len() - N..])
}

/// First output of a generator seeded with `seed`.
///
/// Only words 0, 1 and `M` take part in the first twist step, so the rest of the
/// seeding is skipped.
pub(crate) fn first_output(seed: u32) -> u32 {
    let mut words = [0u32; M + 1];
    words[0] = seed;
    for i in 1..=M {
        words[i] = seed_word(words[i - 1], i);
    }
    temper(twist_word(words[0], words[1], words[M]))
}

/// Returns the first candidate, in iteration order, whose generator starts with `observed`.
pub fn crack_seed<I>(observed: u32, candidates: I) -> Result<u32, PrngError>
where
    I: IntoIterator<Item = u32>,
{
    candidates
        .into_iter()
        .find(|&seed| first_output(seed) == observed)
        .ok_or(PrngError::SeedNotFound)
}

/// Parallel version of `crack_seed` over a range. Still returns the lowest matching
/// seed, not whichever worker finished first.
pub fn par_crack_seed(observed: u32, candidates: Range<u32>) -> Result<u32, PrngError> {
    candidates
        .into_par_iter()
        .find_first(|&seed| first_output(seed) == observed)
        .ok_or(PrngError::SeedNotFound)
}

/// Recovers a seed taken from a clock reading at most `window` seconds before `now`.
/// Newer timestamps are tried first.
pub fn crack_time_seed(observed: u32, now: u32, window: u32) -> Result<u32, PrngError> {
    crack_seed(observed, (now.saturating_sub(window)..=now).rev())
}
