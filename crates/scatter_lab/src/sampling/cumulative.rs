//! Prefix-sum table for weight-proportional selection.
use rand::RngCore;

use crate::sampling::rand01;

/// Cumulative weights (polygon areas, segment lengths) supporting proportional lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CumulativeTable {
    cumulative: Vec<f32>,
}

impl CumulativeTable {
    /// Builds the running sum of `weights`. Negative and non-finite weights count as zero.
    pub fn new(weights: impl IntoIterator<Item = f32>) -> Self {
        let mut running = 0.0f32;
        let cumulative = weights
            .into_iter()
            .map(|w| {
                if w.is_finite() && w > 0.0 {
                    running += w;
                }
                running
            })
            .collect();
        Self { cumulative }
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Sum of all weights.
    pub fn total(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Running sum up to but excluding entry `index`.
    pub fn start_of(&self, index: usize) -> f32 {
        if index == 0 {
            0.0
        } else {
            self.cumulative.get(index - 1).copied().unwrap_or(self.total())
        }
    }

    /// Index of the first entry whose running sum is `>= value`.
    ///
    /// Values past the end resolve to the last entry. Returns `None` for an empty table.
    pub fn locate(&self, value: f32) -> Option<usize> {
        if self.cumulative.is_empty() {
            return None;
        }
        let idx = self.cumulative.partition_point(|&c| c < value);
        Some(idx.min(self.cumulative.len() - 1))
    }

    /// Draws `r` uniformly in `[0, total)` and returns the entry index with `r`.
    pub fn pick(&self, rng: &mut dyn RngCore) -> Option<(usize, f32)> {
        let r = rand01(rng) * self.total();
        self.locate(r).map(|idx| (idx, r))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn total_and_start_offsets() {
        let table = CumulativeTable::new([1.0, 2.0, 3.0]);
        assert_eq!(table.total(), 6.0);
        assert_eq!(table.start_of(0), 0.0);
        assert_eq!(table.start_of(1), 1.0);
        assert_eq!(table.start_of(2), 3.0);
    }

    #[test]
    fn locate_uses_first_entry_reaching_value() {
        let table = CumulativeTable::new([1.0, 2.0, 3.0]);
        assert_eq!(table.locate(0.0), Some(0));
        assert_eq!(table.locate(1.0), Some(0));
        assert_eq!(table.locate(1.0001), Some(1));
        assert_eq!(table.locate(5.9), Some(2));
        assert_eq!(table.locate(100.0), Some(2));
    }

    #[test]
    fn empty_table_locates_nothing() {
        let table = CumulativeTable::new(std::iter::empty());
        assert!(table.is_empty());
        assert_eq!(table.total(), 0.0);
        assert_eq!(table.locate(0.5), None);
    }

    #[test]
    fn invalid_weights_count_as_zero() {
        let table = CumulativeTable::new([1.0, -4.0, f32::NAN, 2.0]);
        assert_eq!(table.total(), 3.0);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn selection_frequency_converges_to_weight_share() {
        let weights = [1.0f32, 3.0, 6.0];
        let table = CumulativeTable::new(weights);
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 200_000;
        let mut counts = [0usize; 3];
        for _ in 0..n {
            let (idx, _) = table.pick(&mut rng).unwrap();
            counts[idx] += 1;
        }
        for (i, w) in weights.iter().enumerate() {
            let expected = w / table.total();
            let observed = counts[i] as f32 / n as f32;
            assert!(
                (observed - expected).abs() < 0.01,
                "entry {i}: observed {observed}, expected {expected}"
            );
        }
    }
}
