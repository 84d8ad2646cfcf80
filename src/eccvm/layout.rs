use crate::eccvm::{
    ADDITIONS_PER_ROW, NUM_SCALAR_BITS, NUM_WNAF_DIGIT_BITS, NUM_WNAF_DIGITS_PER_SCALAR,
    WNAF_DIGITS_PER_ROW,
};

/// Row-sizing parameters of the ECCVM circuit layout.
///
/// The queue itself never hard-codes these values; the row-count formulas are
/// methods on the layout so they can be exercised against arbitrary
/// configurations. [`EccvmLayout::default`] yields the canonical ECCVM
/// constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EccvmLayout {
    /// Number of point additions a single MSM row can hold.
    pub additions_per_row: usize,
    /// Bit length of the (decomposed) scalars handled by the ECCVM.
    pub num_scalar_bits: usize,
    /// Bits per wNAF digit.
    pub wnaf_digit_bits: usize,
    /// Number of wNAF digits a scalar decomposes into.
    pub wnaf_digits_per_scalar: usize,
    /// Number of wNAF digits written per precompute table row.
    pub wnaf_digits_per_row: usize,
}

impl Default for EccvmLayout {
    fn default() -> Self {
        Self {
            additions_per_row: ADDITIONS_PER_ROW,
            num_scalar_bits: NUM_SCALAR_BITS,
            wnaf_digit_bits: NUM_WNAF_DIGIT_BITS,
            wnaf_digits_per_scalar: NUM_WNAF_DIGITS_PER_SCALAR,
            wnaf_digits_per_row: WNAF_DIGITS_PER_ROW,
        }
    }
}

impl EccvmLayout {
    /// Number of rows in the 'msm' column section needed for a single MSM of
    /// `msm_count` half-length scalar muls. One extra round accounts for the
    /// final skew correction, and `num_rounds - 1` rows for the doubling steps
    /// between rounds.
    pub fn msm_row_count(&self, msm_count: usize) -> usize {
        if msm_count == 0 {
            return 0;
        }
        let rows_per_round = msm_count.div_ceil(self.additions_per_row);
        let num_rounds = self.num_scalar_bits / self.wnaf_digit_bits;
        (num_rounds + 1) * rows_per_round + (num_rounds - 1)
    }

    /// Number of precompute table rows needed for a single MSM of `msm_count`
    /// half-length scalar muls.
    pub fn precompute_table_row_count(&self, msm_count: usize) -> usize {
        msm_count * (self.wnaf_digits_per_scalar / self.wnaf_digits_per_row)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn row_counts_are_zero_for_empty_msm() {
        let layout = EccvmLayout::default();
        assert_eq!(layout.msm_row_count(0), 0);
        assert_eq!(layout.precompute_table_row_count(0), 0);
    }

    #[test]
    fn row_counts_match_canonical_layout() {
        // 32 rounds, 4 additions per row: 33 * ceil(m / 4) + 31.
        let layout = EccvmLayout::default();
        assert_eq!(layout.msm_row_count(1), 33 + 31);
        assert_eq!(layout.msm_row_count(4), 33 + 31);
        assert_eq!(layout.msm_row_count(5), 66 + 31);
        assert_eq!(layout.msm_row_count(10), 99 + 31);
        assert_eq!(layout.precompute_table_row_count(1), 8);
        assert_eq!(layout.precompute_table_row_count(10), 80);
    }

    #[test]
    fn row_counts_are_monotone() {
        let layout = EccvmLayout::default();
        for m in 0..64 {
            assert!(layout.msm_row_count(m) <= layout.msm_row_count(m + 1));
            assert!(
                layout.precompute_table_row_count(m) <= layout.precompute_table_row_count(m + 1)
            );
        }
    }

    #[test]
    fn row_counts_follow_the_layout_value() {
        let layout = EccvmLayout {
            additions_per_row: 2,
            num_scalar_bits: 16,
            wnaf_digit_bits: 4,
            wnaf_digits_per_scalar: 4,
            wnaf_digits_per_row: 2,
        };
        // 4 rounds, 2 additions per row: 5 * ceil(m / 2) + 3.
        assert_eq!(layout.msm_row_count(3), 10 + 3);
        assert_eq!(layout.precompute_table_row_count(3), 6);
    }
}
