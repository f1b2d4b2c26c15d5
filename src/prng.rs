use rand_core::{impls, RngCore};

use crate::error::PrngError;

pub const W: u32 = 32;
pub const N: usize = 624;
pub const M: usize = 397;
pub const R: u32 = 31;
pub const A: u32 = 0x9908B0DF;
pub const U: u32 = 11;
pub const D: u32 = 0xFFFFFFFF;
pub const S: u32 = 7;
pub const B: u32 = 0x9D2C5680;
pub const T: u32 = 15;
pub const C: u32 = 0xEFC60000;
pub const L: u32 = 18;
pub const F: u32 = 1812433253;
const LOWER_MASK: u32 = (1 << R) - 1;
const UPPER_MASK: u32 = !LOWER_MASK;

/// Seed used by `MT19937::default()`, the one the reference implementation falls back to.
pub const DEFAULT_SEED: u32 = 5489;

const KEY_SEED: u32 = 19650218;
const KEY_MULT_1: u32 = 1664525;
const KEY_MULT_2: u32 = 1566083941;

/// 32-bit Mersenne Twister.
///
/// Every instance owns its state outright. `Clone` copies the whole array, so a
/// cloned generator never shares storage with the one it came from.
#[derive(Clone)]
pub struct MT19937 {
    state: [u32; N],
    index: usize,
}

impl MT19937 {
    pub fn new(seed: u32) -> MT19937 {
        let mut state = [0u32; N];
        state[0] = seed;

        let mut prev_value = seed;
        for (i, mt) in state.iter_mut().enumerate().skip(1) {
            prev_value = seed_word(prev_value, i);
            *mt = prev_value;
        }

        MT19937 { state, index: N }
    }

    /// Seeds from an array of words (`init_by_array` in the reference code).
    ///
    /// An empty key is treated as `[0]`.
    pub fn from_key(key: &[u32]) -> MT19937 {
        let key: &[u32] = if key.is_empty() { &[0] } else { key };
        let mut rng = MT19937::new(KEY_SEED);
        let mt = &mut rng.state;

        let mut i = 1;
        let mut j = 0;
        for _ in 0..N.max(key.len()) {
            let prev = mt[i - 1] ^ (mt[i - 1] >> 30);
            mt[i] = (mt[i] ^ prev.wrapping_mul(KEY_MULT_1))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = mt[i - 1] ^ (mt[i - 1] >> 30);
            mt[i] = (mt[i] ^ prev.wrapping_mul(KEY_MULT_2)).wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                mt[0] = mt[N - 1];
                i = 1;
            }
        }
        mt[0] = UPPER_MASK;

        rng
    }

    /// Builds a generator directly from raw (untempered) state words and a cursor.
    pub fn from_state(state: &[u32], index: usize) -> Result<MT19937, PrngError> {
        if state.len() != N {
            return Err(PrngError::InvalidInputLength {
                expected: N,
                actual: state.len(),
            });
        }
        if index > N {
            return Err(PrngError::InvalidState { index });
        }

        let mut words = [0u32; N];
        words.copy_from_slice(state);
        Ok(MT19937 {
            state: words,
            index,
        })
    }

    /// Snapshot of the raw state words and cursor.
    pub fn state(&self) -> ([u32; N], usize) {
        (self.state, self.index)
    }

    pub fn extract_number(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }

        let y = temper(self.state[self.index]);
        self.index += 1;
        y
    }

    fn twist(&mut self) {
        for i in 0..N {
            self.state[i] = twist_word(
                self.state[i],
                self.state[(i + 1) % N],
                self.state[(i + M) % N],
            );
        }
        self.index = 0
    }

    /// The top `nbits` bits of the next output. Zero bits consumes nothing.
    pub fn gen_bits(&mut self, nbits: u32) -> u32 {
        assert!(nbits <= W, "cannot draw {} bits from a {} bit word", nbits, W);
        if nbits == 0 {
            return 0;
        }
        self.extract_number() >> (W - nbits)
    }

    /// Uniform value in `[0, n)` by rejection sampling on the fewest bits that cover `n`.
    pub fn gen_below(&mut self, n: u32) -> Result<u32, PrngError> {
        if n == 0 {
            return Err(PrngError::EmptyRange);
        }
        let nbits = W - n.leading_zeros();
        loop {
            let r = self.gen_bits(nbits);
            if r < n {
                return Ok(r);
            }
        }
    }

    /// Uniform value in `[low, high)`.
    pub fn gen_range(&mut self, low: u32, high: u32) -> Result<u32, PrngError> {
        if high <= low {
            return Err(PrngError::EmptyRange);
        }
        Ok(low + self.gen_below(high - low)?)
    }
}

impl Default for MT19937 {
    fn default() -> Self {
        MT19937::new(DEFAULT_SEED)
    }
}

impl Iterator for MT19937 {
    type Item = u32;

    /// Never returns `None`.
    fn next(&mut self) -> Option<u32> {
        Some(self.extract_number())
    }
}

impl RngCore for MT19937 {
    fn next_u32(&mut self) -> u32 {
        self.extract_number()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Word `i` of a freshly seeded state, given word `i - 1`.
pub(crate) fn seed_word(prev: u32, i: usize) -> u32 {
    F.wrapping_mul(prev ^ (prev >> (W - 2))).wrapping_add(i as u32)
}

/// One step of the twist recurrence: the replacement for `current`, given its
/// successor and the word `M` places ahead.
pub(crate) fn twist_word(current: u32, next: u32, ahead: u32) -> u32 {
    let x = (current & UPPER_MASK) | (next & LOWER_MASK);
    let mut x_a = x >> 1;
    if x % 2 != 0 {
        x_a ^= A;
    }
    ahead ^ x_a
}

pub fn temper(mut y: u32) -> u32 {
    y ^= (y >> U) & D;
    y ^= (y << S) & B;
    y ^= (y << T) & C;
    y ^= y >> L;
    y
}

/// Recovers the raw state word behind one tempered output.
pub fn untemper(y: u32) -> u32 {
    // L > W / 2, so the shifted copy only touches bits that are still intact.
    let y = y ^ (y >> L);
    let y = undo_shift_left_xor(y, T, C);
    let y = undo_shift_left_xor(y, S, B);
    undo_shift_right_xor(y, U)
}

fn chunk_mask(low: u32, width: u32) -> u32 {
    if width >= W {
        !0
    } else {
        ((1 << width) - 1) << low
    }
}

/// Inverts `y = x ^ (x >> shift)`, recovering `x` from the top down in `shift`-wide chunks.
fn undo_shift_right_xor(y: u32, shift: u32) -> u32 {
    let mut x = 0u32;
    let mut recovered = 0;
    while recovered < W {
        let width = shift.min(W - recovered);
        let chunk = chunk_mask(W - recovered - width, width);
        x |= (y ^ (x >> shift)) & chunk;
        recovered += width;
    }
    x
}

/// Inverts `y = x ^ ((x << shift) & mask)`, recovering `x` from the bottom up in `shift`-wide chunks.
fn undo_shift_left_xor(y: u32, shift: u32, mask: u32) -> u32 {
    let mut x = 0u32;
    let mut recovered = 0;
    while recovered < W {
        let width = shift.min(W - recovered);
        let chunk = chunk_mask(recovered, width);
        x |= (y ^ ((x << shift) & mask)) & chunk;
        recovered += width;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, RngCore};

    #[test]
    fn kats() {
        let kats = [
            (
                1u32,
                [
                    1791095845, 4282876139, 3093770124, 4005303368, 491263, 550290313, 1298508491,
                    4290846341, 630311759, 1013994432,
                ],
            ),
            (
                42,
                [
                    1608637542, 3421126067, 4083286876, 787846414, 3143890026, 3348747335,
                    2571218620, 2563451924, 670094950, 1914837113,
                ],
            ),
            (
                2147483647,
                [
                    1689602031, 3831148394, 2820341149, 2744746572, 370616153, 3004629480,
                    4141996784, 3942456616, 2667712047, 1179284407,
                ],
            ),
            (
                0xffffffff,
                [
                    419326371, 479346978, 3918654476, 2416749639, 3388880820, 2260532800,
                    3350089942, 3309765114, 77050329, 1217888032,
                ],
            ),
        ];

        for (seed, results) in kats.iter() {
            let mut rng = MT19937::new(*seed);
            for r in results {
                assert_eq!(*r, rng.extract_number());
            }
        }
    }

    #[test]
    fn reference_default_seed() {
        let mut rng = MT19937::default();
        assert_eq!(3499211612, rng.extract_number());

        // The 10000th output crosses several twists.
        let mut rng = MT19937::default();
        let last = rng.by_ref().take(10000).last();
        assert_eq!(Some(4123659995), last);
    }

    #[test]
    fn zero_seed_is_not_remapped() {
        let (state, index) = MT19937::new(0).state();
        assert_eq!(0, state[0]);
        assert_eq!(1, state[1]);
        assert_eq!(N, index);
        assert_eq!(2357136044, MT19937::new(0).extract_number());
    }

    #[test]
    fn seeding_wraps() {
        let (state, _) = MT19937::new(0xffffffff).state();
        let expected = (F as u64 * (0xffffffffu64 ^ (0xffffffffu64 >> 30)) + 1) & 0xffffffff;
        assert_eq!(expected as u32, state[1]);
    }

    #[test]
    fn key_seeding() {
        let mut rng = MT19937::from_key(&[0x123, 0x234, 0x345, 0x456]);
        for expected in [1067595299u32, 955945823, 477289528, 4107218783, 4228976476].iter() {
            assert_eq!(*expected, rng.extract_number());
        }
        assert_eq!(
            MT19937::from_key(&[]).state().0.to_vec(),
            MT19937::from_key(&[0]).state().0.to_vec()
        );
    }

    #[test]
    fn untemper_edges() {
        for y in [0u32, 1, 0x7fffffff, 0x80000000, 0xffffffff, B, C, 0xABBABAAB].iter() {
            assert_eq!(*y, temper(untemper(*y)));
            assert_eq!(*y, untemper(temper(*y)));
        }
    }

    #[test]
    fn untemper_random() {
        let mut rng = thread_rng();
        for _ in 0..100_000 {
            let y = rng.next_u32();
            assert_eq!(y, temper(untemper(y)));
        }
    }

    #[test]
    #[ignore = "slow"]
    fn untemper_exhaustive() {
        for y in 0..=u32::MAX {
            assert_eq!(y, temper(untemper(y)));
        }
    }

    #[test]
    fn untemper_single_steps() {
        let x = thread_rng().next_u32();
        assert_eq!(x, undo_shift_right_xor(x ^ (x >> U), U));
        assert_eq!(x, undo_shift_left_xor(x ^ ((x << S) & B), S, B));
        assert_eq!(x, undo_shift_left_xor(x ^ ((x << T) & C), T, C));
        assert_eq!(x, undo_shift_right_xor(x ^ (x >> L), L));
    }

    #[test]
    fn untemper_recovers_state() {
        let mut rng = MT19937::new(5489);
        let out = rng.extract_number();
        let (state, index) = rng.state();
        assert_eq!(1, index);
        assert_eq!(state[0], untemper(out));
    }

    #[test]
    fn restore_state() {
        let mut original = MT19937::new(1234);
        for _ in 0..700 {
            original.extract_number();
        }
        let (state, index) = original.state();
        let mut restored = MT19937::from_state(&state, index).unwrap();
        for _ in 0..1000 {
            assert_eq!(original.extract_number(), restored.extract_number());
        }
    }

    #[test]
    fn restore_rejects_bad_input() {
        assert_eq!(
            Some(PrngError::InvalidInputLength {
                expected: N,
                actual: 3
            }),
            MT19937::from_state(&[1, 2, 3], 0).err()
        );
        assert_eq!(
            Some(PrngError::InvalidState { index: N + 1 }),
            MT19937::from_state(&[0u32; N], N + 1).err()
        );
    }

    #[test]
    fn clones_are_independent() {
        let mut a = MT19937::new(7);
        let mut b = a.clone();
        a.extract_number();
        a.extract_number();
        let first_b = b.extract_number();
        assert_eq!(first_b, MT19937::new(7).extract_number());
        assert_ne!(a.state().1, b.state().1);
    }

    #[test]
    fn bounded_draws() {
        let mut rng = MT19937::new(99);
        assert_eq!(0, rng.gen_bits(0));
        let top = MT19937::new(99).extract_number() >> 24;
        assert_eq!(top, rng.gen_bits(8));

        for _ in 0..1000 {
            assert!(rng.gen_below(10).unwrap() < 10);
            let v = rng.gen_range(100, 105).unwrap();
            assert!((100..105).contains(&v));
        }
        assert_eq!(Err(PrngError::EmptyRange), rng.gen_below(0));
        assert_eq!(Err(PrngError::EmptyRange), rng.gen_range(5, 5));
    }

    #[test]
    fn fill_bytes_is_little_endian() {
        let mut words = MT19937::new(31337);
        let mut expected = vec![];
        for _ in 0..3 {
            expected.extend_from_slice(&words.extract_number().to_le_bytes());
        }

        let mut rng = MT19937::new(31337);
        let mut buf = [0u8; 12];
        rng.fill_bytes(&mut buf);
        assert_eq!(&expected[..], &buf[..]);
    }
}
