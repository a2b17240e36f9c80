//! Deterministic pseudo-random values keyed by strings.

use geocoin_core::CellCoord;
use sha2::{Digest, Sha256};

const UNIT_SCALE: f64 = 1.0 / ((1u64 << 53) as f64);

/// Keyed source of reproducible values in `[0, 1)`.
///
/// The same seed and key always produce the same value, across calls and
/// across process restarts. Keys that differ by a single character hash to
/// unrelated values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Luck {
    seed: u64,
}

impl Luck {
    /// Creates a luck source salted with the provided seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed mixed into every roll.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the value associated with `key`.
    #[must_use]
    pub fn roll(&self, key: &str) -> f64 {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let value = u64::from_le_bytes(bytes) >> 11;
        value as f64 * UNIT_SCALE
    }
}

/// Key deciding whether a cell hosts a cache.
#[must_use]
pub fn spawn_key(cell: CellCoord) -> String {
    format!("{},{}", cell.i(), cell.j())
}

/// Key deciding how many coins a freshly discovered cache starts with.
#[must_use]
pub fn coin_count_key(cell: CellCoord) -> String {
    format!("{},{},initialValue", cell.i(), cell.j())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_are_reproducible() {
        let luck = Luck::new(7);
        let again = Luck::new(7);
        for key in ["0,0", "12,-4", "", "a longer key with spaces"] {
            assert_eq!(luck.roll(key).to_bits(), again.roll(key).to_bits());
        }
    }

    #[test]
    fn rolls_stay_in_unit_interval() {
        let luck = Luck::new(0);
        for index in 0..2_000 {
            let value = luck.roll(&format!("key-{index}"));
            assert!((0.0..1.0).contains(&value), "{value} escaped [0, 1)");
        }
    }

    #[test]
    fn suffixed_keys_show_no_ordering() {
        let luck = Luck::new(0);
        let values: Vec<f64> = ["k", "ka", "kb", "kc", "kd", "ke", "kf", "kg"]
            .iter()
            .map(|key| luck.roll(key))
            .collect();

        let ascending = values.windows(2).all(|pair| pair[0] <= pair[1]);
        let descending = values.windows(2).all(|pair| pair[0] >= pair[1]);
        assert!(!ascending && !descending, "values are monotonic: {values:?}");

        let deltas: Vec<f64> = values.windows(2).map(|pair| pair[1] - pair[0]).collect();
        assert!(
            deltas.windows(2).any(|pair| (pair[0] - pair[1]).abs() > 1e-9),
            "values form an arithmetic progression"
        );
    }

    #[test]
    fn mean_is_close_to_one_half() {
        let luck = Luck::new(99);
        let samples = 10_000;
        let total: f64 = (0..samples).map(|index| luck.roll(&index.to_string())).sum();
        let mean = total / f64::from(samples);
        assert!((0.45..0.55).contains(&mean), "mean {mean} drifted");
    }

    #[test]
    fn seed_changes_outcomes() {
        let first = Luck::new(1);
        let second = Luck::new(2);
        let differing = (0..64)
            .filter(|index| {
                let key = index.to_string();
                first.roll(&key) != second.roll(&key)
            })
            .count();
        assert_eq!(differing, 64);
    }

    #[test]
    fn spawn_and_coin_keys_are_distinct() {
        let cell = CellCoord::new(3, -8);
        assert_eq!(spawn_key(cell), "3,-8");
        assert_eq!(coin_count_key(cell), "3,-8,initialValue");
        assert_ne!(spawn_key(cell), coin_count_key(cell));
    }
}
