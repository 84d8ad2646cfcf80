use ark_ec::CurveGroup;
use ark_ff::Zero;

use crate::eccvm::layout::EccvmLayout;
use crate::eccvm::ops::VMOperation;

/// The MSM batching state. A contiguous run of mul ops forms one MSM; the
/// queue keeps its mul count here until a non-mul op closes the batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MsmBatch {
    Idle,
    /// An open batch; the count is always nonzero.
    Accumulating(u32),
}

/// Incrementally tracks the number of rows in each ECCVM circuit section, as
/// well as the number of multiplications performed. This avoids O(n) rescans
/// of the op transcript when the circuit is sized during witness computation.
#[derive(Clone, Debug)]
pub struct EccvmRowTracker {
    layout: EccvmLayout,
    cached_num_muls: u32,
    num_transcript_rows: u32,
    num_precompute_table_rows: u32,
    num_msm_rows: u32,
    batch: MsmBatch,
}

impl Default for EccvmRowTracker {
    fn default() -> Self {
        Self::new(EccvmLayout::default())
    }
}

impl EccvmRowTracker {
    pub fn new(layout: EccvmLayout) -> Self {
        Self {
            layout,
            cached_num_muls: 0,
            num_transcript_rows: 0,
            num_precompute_table_rows: 0,
            num_msm_rows: 0,
            batch: MsmBatch::Idle,
        }
    }

    pub fn layout(&self) -> &EccvmLayout {
        &self.layout
    }

    pub fn num_transcript_rows(&self) -> u32 {
        self.num_transcript_rows
    }

    pub fn cached_num_muls(&self) -> u32 {
        self.cached_num_muls
    }

    pub fn batch_state(&self) -> MsmBatch {
        self.batch
    }

    /// Number of muls in the currently open MSM batch, 0 when idle.
    pub fn cached_active_msm_count(&self) -> u32 {
        match self.batch {
            MsmBatch::Idle => 0,
            MsmBatch::Accumulating(count) => count,
        }
    }

    /// Count a newly appended op: bump the transcript row count and step the
    /// MSM batch state machine. A mul op contributes one mul per nonzero
    /// decomposed scalar half; any other op closes an open batch and folds its
    /// row counts into the finalized totals.
    pub fn record_op<P: CurveGroup>(&mut self, op: &VMOperation<P>) {
        self.num_transcript_rows += 1;
        self.batch = match (self.batch, op.op_code.mul) {
            (MsmBatch::Idle, true) => match Self::nonzero_scalar_halves(op) {
                0 => MsmBatch::Idle,
                muls => MsmBatch::Accumulating(muls),
            },
            (MsmBatch::Accumulating(count), true) => {
                MsmBatch::Accumulating(count + Self::nonzero_scalar_halves(op))
            }
            (MsmBatch::Accumulating(count), false) => {
                self.flush_batch(count);
                MsmBatch::Idle
            }
            (MsmBatch::Idle, false) => MsmBatch::Idle,
        };
    }

    fn nonzero_scalar_halves<P: CurveGroup>(op: &VMOperation<P>) -> u32 {
        !op.z1.is_zero() as u32 + !op.z2.is_zero() as u32
    }

    fn flush_batch(&mut self, count: u32) {
        self.num_msm_rows += self.layout.msm_row_count(count as usize) as u32;
        self.num_precompute_table_rows +=
            self.layout.precompute_table_row_count(count as usize) as u32;
        self.cached_num_muls += count;
    }

    /// Total number of muls recorded, including the open batch.
    pub fn get_number_of_muls(&self) -> u32 {
        self.cached_num_muls + self.cached_active_msm_count()
    }

    /// Number of rows in the 'msm' column section, for all MSMs recorded so
    /// far. Includes the contribution of a still-open batch, so the count is
    /// correct mid-batch without forcing a flush.
    pub fn get_num_msm_rows(&self) -> usize {
        self.num_msm_rows as usize
            + 2
            + self
                .layout
                .msm_row_count(self.cached_active_msm_count() as usize)
    }

    /// Number of rows of the ECCVM circuit: the maximum over the transcript,
    /// msm and precompute sections, each padded by its boundary rows.
    pub fn get_num_rows(&self) -> usize {
        let open_count = self.cached_active_msm_count() as usize;
        let transcript_rows = self.num_transcript_rows as usize + 2;
        let msm_rows = self.num_msm_rows as usize + 2 + self.layout.msm_row_count(open_count);
        let precompute_rows = self.num_precompute_table_rows as usize
            + 1
            + self.layout.precompute_table_row_count(open_count);
        transcript_rows.max(msm_rows).max(precompute_rows)
    }

    /// Fold the finalized counters of a predecessor tracker into this one.
    /// The predecessor must have no open batch and must have been built
    /// against the same layout.
    pub(crate) fn merge_finalized(&mut self, previous: &EccvmRowTracker) {
        assert_eq!(
            self.layout, previous.layout,
            "merging op queues built against different layouts"
        );
        assert_eq!(
            previous.batch,
            MsmBatch::Idle,
            "merging an op queue with an active msm batch"
        );
        self.cached_num_muls += previous.cached_num_muls;
        self.num_msm_rows += previous.num_msm_rows;
        self.num_precompute_table_rows += previous.num_precompute_table_rows;
        self.num_transcript_rows += previous.num_transcript_rows;
    }
}

#[cfg(test)]
mod test {
    use ark_bn254::G1Affine;
    use ark_ec::AffineRepr;
    use num_bigint::BigUint;

    use super::*;
    use crate::eccvm::ops::EccOpCode;

    type Bn254G1 = ark_bn254::G1Projective;

    fn mul_op(z1: u64, z2: u64) -> VMOperation<Bn254G1> {
        VMOperation {
            op_code: EccOpCode {
                mul: true,
                ..Default::default()
            },
            base_point: G1Affine::generator(),
            z1: BigUint::from(z1),
            z2: BigUint::from(z2),
            mul_scalar_full: ark_bn254::Fr::from(z1),
        }
    }

    fn add_op() -> VMOperation<Bn254G1> {
        VMOperation {
            op_code: EccOpCode {
                add: true,
                ..Default::default()
            },
            base_point: G1Affine::generator(),
            ..Default::default()
        }
    }

    #[test]
    fn batch_opens_per_nonzero_half() {
        let mut tracker = EccvmRowTracker::default();
        assert_eq!(tracker.batch_state(), MsmBatch::Idle);

        tracker.record_op(&mul_op(3, 0));
        assert_eq!(tracker.batch_state(), MsmBatch::Accumulating(1));

        tracker.record_op(&mul_op(3, 5));
        assert_eq!(tracker.batch_state(), MsmBatch::Accumulating(3));

        // A zero scalar mul contributes nothing but does not close the batch.
        tracker.record_op(&mul_op(0, 0));
        assert_eq!(tracker.batch_state(), MsmBatch::Accumulating(3));
        assert_eq!(tracker.num_transcript_rows(), 3);
    }

    #[test]
    fn zero_scalar_mul_does_not_open_a_batch() {
        let mut tracker = EccvmRowTracker::default();
        tracker.record_op(&mul_op(0, 0));
        assert_eq!(tracker.batch_state(), MsmBatch::Idle);
        assert_eq!(tracker.get_number_of_muls(), 0);
    }

    #[test]
    fn non_mul_op_flushes_the_batch() {
        let layout = EccvmLayout::default();
        let mut tracker = EccvmRowTracker::new(layout);
        for _ in 0..5 {
            tracker.record_op(&mul_op(3, 5));
        }
        assert_eq!(tracker.cached_active_msm_count(), 10);
        assert_eq!(tracker.cached_num_muls(), 0);

        tracker.record_op(&add_op());
        assert_eq!(tracker.batch_state(), MsmBatch::Idle);
        assert_eq!(tracker.cached_num_muls(), 10);
        assert_eq!(
            tracker.get_num_msm_rows(),
            layout.msm_row_count(10) + 2
        );
        assert_eq!(
            tracker.get_num_rows(),
            layout.msm_row_count(10) + 2
        );
    }

    #[test]
    fn row_counts_are_stable_across_a_flush() {
        let mut tracker = EccvmRowTracker::default();
        for _ in 0..3 {
            tracker.record_op(&mul_op(7, 9));
        }
        let mid_batch_msm_rows = tracker.get_num_msm_rows();
        let mid_batch_rows = tracker.get_num_rows();
        let mid_batch_muls = tracker.get_number_of_muls();

        let mut flushed = tracker.clone();
        flushed.record_op(&add_op());
        assert_eq!(flushed.get_num_msm_rows(), mid_batch_msm_rows);
        assert_eq!(flushed.get_number_of_muls(), mid_batch_muls);
        // The extra add op only affects the transcript section, which is far
        // from the maximum here.
        assert_eq!(flushed.get_num_rows(), mid_batch_rows);
    }

    #[test]
    fn empty_tracker_counts_boundary_rows_only() {
        let tracker = EccvmRowTracker::default();
        assert_eq!(tracker.get_num_msm_rows(), 2);
        assert_eq!(tracker.get_num_rows(), 2);
    }

    #[test]
    fn merge_sums_finalized_counters() {
        let mut a = EccvmRowTracker::default();
        for _ in 0..2 {
            a.record_op(&mul_op(3, 5));
        }
        a.record_op(&add_op());

        let mut b = EccvmRowTracker::default();
        b.record_op(&mul_op(1, 2));
        b.record_op(&add_op());

        let muls = a.cached_num_muls() + b.cached_num_muls();
        let transcript = a.num_transcript_rows() + b.num_transcript_rows();
        b.merge_finalized(&a);
        assert_eq!(b.cached_num_muls(), muls);
        assert_eq!(b.num_transcript_rows(), transcript);
    }

    #[test]
    #[should_panic(expected = "active msm batch")]
    fn merge_rejects_an_open_batch() {
        let mut open = EccvmRowTracker::default();
        open.record_op(&mul_op(3, 5));
        let mut tracker = EccvmRowTracker::default();
        tracker.merge_finalized(&open);
    }
}
