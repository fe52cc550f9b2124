//! Client-side generation of time-ordered record keys.
//!
//! A push key is 20 characters: 8 encode the current time in milliseconds
//! and 12 are random. Keys generated later sort after earlier ones; within
//! the same millisecond the random part is incremented instead of redrawn
//! so ordering still holds.

use std::sync::{Mutex, PoisonError};

use rand::Rng;

/// Alphabet in ascending ASCII order, so lexical order matches time order.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

struct GeneratorState {
    last_millis: i64,
    last_random: [u8; RANDOM_CHARS],
}

/// Stateful push key generator.
///
/// Remembers the last timestamp and random digits so keys generated in the
/// same millisecond keep ascending.
pub struct PushKeyGenerator {
    state: Mutex<GeneratorState>,
}

impl PushKeyGenerator {
    /// Create a generator with no history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(GeneratorState {
                last_millis: i64::MIN,
                last_random: [0; RANDOM_CHARS],
            }),
        }
    }

    /// Generate a push key for the given epoch-millisecond timestamp.
    pub fn next_at(&self, millis: i64) -> String {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if millis == state.last_millis {
            increment(&mut state.last_random);
        } else {
            state.last_millis = millis;
            let mut rng = rand::rng();
            for slot in &mut state.last_random {
                *slot = rng.random_range(0..64);
            }
        }

        let mut key = String::with_capacity(TIME_CHARS + RANDOM_CHARS);
        key.extend(encode_time(millis).iter().map(|&c| char::from(c)));
        key.extend(state.last_random.iter().map(|&i| char::from(push_char(i))));
        key
    }
}

impl Default for PushKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

static GENERATOR: PushKeyGenerator = PushKeyGenerator::new();

/// Generate a new push key for the current time.
#[must_use]
pub fn generate() -> String {
    GENERATOR.next_at(chrono::Utc::now().timestamp_millis())
}

/// Encode the timestamp into 8 base-64 digits, most significant first.
fn encode_time(millis: i64) -> [u8; TIME_CHARS] {
    let mut out = [PUSH_CHARS[0]; TIME_CHARS];
    let mut remaining = millis.max(0);
    for slot in out.iter_mut().rev() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // always 0..64
        let digit = (remaining % 64) as u8;
        *slot = push_char(digit);
        remaining /= 64;
    }
    out
}

/// Add one to the random digits, carrying from the right.
fn increment(digits: &mut [u8; RANDOM_CHARS]) {
    for digit in digits.iter_mut().rev() {
        if *digit < 63 {
            *digit += 1;
            return;
        }
        *digit = 0;
    }
}

fn push_char(index: u8) -> u8 {
    PUSH_CHARS.get(usize::from(index)).copied().unwrap_or(b'-')
}
