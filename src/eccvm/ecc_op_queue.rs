use std::array;

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{One, PrimeField, UniformRand, Zero};
use ark_std::rand::Rng;
use num_bigint::BigUint;

use crate::TranscriptFieldType;
use crate::eccvm::TABLE_WIDTH;
use crate::eccvm::layout::EccvmLayout;
use crate::eccvm::ops::{EccOpCode, UltraOp, VMOperation};
use crate::eccvm::row_tracker::EccvmRowTracker;
use crate::eccvm::scalar_split::compute_zetas;

/// Curve hook for the one place the queue must build an affine point from raw
/// base field coordinates.
pub trait OpQueueCurve<Des: PrimeField>: CurveGroup<BaseField: PrimeField> {
    fn g1_affine_from_xy(x: Self::BaseField, y: Self::BaseField) -> Self::Affine;
}

impl OpQueueCurve<ark_bn254::Fr> for ark_bn254::G1Projective {
    fn g1_affine_from_xy(x: ark_bn254::Fq, y: ark_bn254::Fq) -> ark_bn254::G1Affine {
        ark_bn254::G1Affine::new(x, y)
    }
}

/// Used to construct execution trace representations of elliptic curve
/// operations.
///
/// Operations are performed natively as they are appended (the result is kept
/// in `accumulator`), stored as raw ops for the ECCVM, and stored in the
/// width-4 Ultra column format once a circuit builder has encoded them via
/// [`UltraOp::from_operation`] and [`Self::populate_ultra_ops`]. The raw op
/// log and the Ultra columns are deliberately populated in two phases: the
/// builder owns witness-index bookkeeping the queue knows nothing about, so
/// the builder must commit exactly one encoded op per raw op.
pub struct ECCOpQueue<P: CurveGroup<ScalarField = TranscriptFieldType, BaseField: PrimeField>> {
    // The operations written to the queue are also performed natively; the
    // result is stored in accumulator.
    accumulator: P::Affine,
    raw_ops: Vec<VMOperation<P>>,
    ultra_ops: [Vec<P::ScalarField>; TABLE_WIDTH],

    current_ultra_ops_size: usize,  // M_i
    previous_ultra_ops_size: usize, // M_{i-1}

    ultra_ops_commitments: [P::Affine; TABLE_WIDTH],

    row_tracker: EccvmRowTracker,
}

impl<P: CurveGroup<ScalarField = TranscriptFieldType, BaseField: PrimeField>> Default
    for ECCOpQueue<P>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P: CurveGroup<ScalarField = TranscriptFieldType, BaseField: PrimeField>> ECCOpQueue<P> {
    pub fn new() -> Self {
        Self::with_layout(EccvmLayout::default())
    }

    pub fn with_layout(layout: EccvmLayout) -> Self {
        Self {
            accumulator: P::Affine::zero(),
            raw_ops: Vec::new(),
            ultra_ops: array::from_fn(|_| Vec::new()),
            current_ultra_ops_size: 0,
            previous_ultra_ops_size: 0,
            ultra_ops_commitments: array::from_fn(|_| P::Affine::zero()),
            row_tracker: EccvmRowTracker::new(layout),
        }
    }

    pub fn get_accumulator(&self) -> P::Affine {
        self.accumulator
    }

    pub fn raw_ops(&self) -> &[VMOperation<P>] {
        &self.raw_ops
    }

    pub fn row_tracker(&self) -> &EccvmRowTracker {
        &self.row_tracker
    }

    /// Number of rows in the 'msm' column section, for all MSMs recorded so far.
    pub fn get_num_msm_rows(&self) -> usize {
        self.row_tracker.get_num_msm_rows()
    }

    /// Number of rows for the current ECCVM circuit.
    pub fn get_num_rows(&self) -> usize {
        self.row_tracker.get_num_rows()
    }

    /// Number of muls recorded so far, including the open MSM batch.
    pub fn get_number_of_muls(&self) -> u32 {
        self.row_tracker.get_number_of_muls()
    }

    fn append_raw_op(&mut self, op: VMOperation<P>) {
        self.row_tracker.record_op(&op);
        self.raw_ops.push(op);
    }

    /// Write a point addition op to the queue and natively perform the
    /// addition.
    pub fn add_accumulate(&mut self, to_add: P::Affine) {
        self.accumulator = (to_add + self.accumulator).into_affine();

        self.append_raw_op(VMOperation {
            op_code: EccOpCode {
                add: true,
                ..Default::default()
            },
            base_point: to_add,
            ..Default::default()
        });
    }

    /// Write a multiply-and-add op to the queue and natively perform the
    /// operation. The scalar is stored both in full and as its two
    /// endomorphism-decomposed halves.
    pub fn mul_accumulate(&mut self, to_mul: P::Affine, scalar: P::ScalarField) {
        self.accumulator = (to_mul * scalar + self.accumulator).into_affine();

        let (z1, z2) = compute_zetas(scalar);
        self.append_raw_op(VMOperation {
            op_code: EccOpCode {
                mul: true,
                ..Default::default()
            },
            base_point: to_mul,
            z1: BigUint::from(z1),
            z2: BigUint::from(z2),
            mul_scalar_full: scalar,
        });
    }

    /// Write an equality op using the internal accumulator point, and reset
    /// the accumulator to the point at infinity.
    ///
    /// The reset is deliberate: the recorded op carries both the eq and the
    /// reset flag, so asserting the accumulated result always begins a fresh
    /// accumulation.
    ///
    /// Returns the accumulator value prior to the reset.
    pub fn eq_and_reset(&mut self) -> P::Affine {
        let expected = self.accumulator;
        self.accumulator = P::Affine::zero();

        self.append_raw_op(VMOperation {
            op_code: EccOpCode {
                eq: true,
                reset: true,
                ..Default::default()
            },
            base_point: expected,
            ..Default::default()
        });
        expected
    }

    /// Write a reset op and reset the accumulator to the point at infinity.
    pub fn reset(&mut self) {
        self.accumulator = P::Affine::zero();

        self.append_raw_op(VMOperation {
            op_code: EccOpCode {
                reset: true,
                ..Default::default()
            },
            ..Default::default()
        });
    }

    /// Write an empty row to the queue.
    pub fn empty_row(&mut self) {
        self.append_raw_op(VMOperation::default());
    }

    /// Populate two rows of the ultra ops columns, representing one complete
    /// ECC operation. The opcode column is only utilized on the first row of
    /// the pair.
    pub fn populate_ultra_ops(&mut self, tuple: UltraOp<P>) {
        self.ultra_ops[0].push(P::ScalarField::from(tuple.op_code.value()));
        self.ultra_ops[1].push(tuple.x_lo);
        self.ultra_ops[2].push(tuple.x_hi);
        self.ultra_ops[3].push(tuple.y_lo);

        self.ultra_ops[0].push(P::ScalarField::zero());
        self.ultra_ops[1].push(tuple.y_hi);
        self.ultra_ops[2].push(tuple.z_1);
        self.ultra_ops[3].push(tuple.z_2);
    }

    /// Set the current and previous size of the ultra ops transcript.
    ///
    /// `previous_ultra_ops_size` (M_{i-1}) is needed to extract the previous
    /// aggregate transcript T_{i-1} from the current one T_i. This method must
    /// be called exactly once per circuit, when the circuit is finalized and
    /// before any subsequent merge extends the columns.
    pub fn set_size_data(&mut self) {
        tracing::trace!("Op queue set size data");
        self.previous_ultra_ops_size = self.current_ultra_ops_size;
        self.current_ultra_ops_size = self.ultra_ops[0].len();
    }

    pub fn get_previous_size(&self) -> usize {
        self.previous_ultra_ops_size
    }

    pub fn get_current_size(&self) -> usize {
        self.current_ultra_ops_size
    }

    pub fn set_commitment_data(&mut self, commitments: [P::Affine; TABLE_WIDTH]) {
        self.ultra_ops_commitments = commitments;
    }

    pub fn get_commitment_data(&self) -> &[P::Affine; TABLE_WIDTH] {
        &self.ultra_ops_commitments
    }

    /// Prepend the full state of `previous` in front of this queue's own
    /// state, producing the combined history of two sequentially built
    /// circuits. The merged queue's accumulator and open batch are left
    /// untouched; they belong to the circuit currently under construction.
    ///
    /// Merging mid-accumulation would silently corrupt the native check
    /// value, so the predecessor must have closed its accumulator (its last
    /// raw op is an eq or reset) and must have no open MSM batch. Violations
    /// abort.
    pub fn prepend_previous_queue(&mut self, previous: &ECCOpQueue<P>) {
        tracing::debug!(
            previous_ops = previous.raw_ops.len(),
            own_ops = self.raw_ops.len(),
            "Prepending previous op queue"
        );
        if let Some(last) = previous.raw_ops.last() {
            // The eccvm does not directly constrain the hand-off to be in a
            // closed state; it has to be enforced at merge time.
            assert!(
                self.raw_ops.is_empty() || last.op_code.eq || last.op_code.reset,
                "merging an op queue that does not reset the accumulator"
            );
        }
        self.row_tracker.merge_finalized(&previous.row_tracker);

        let mut raw_ops_merged =
            Vec::with_capacity(previous.raw_ops.len() + self.raw_ops.len());
        raw_ops_merged.extend_from_slice(&previous.raw_ops);
        raw_ops_merged.append(&mut self.raw_ops);
        self.raw_ops = raw_ops_merged;

        for (column, previous_column) in self.ultra_ops.iter_mut().zip(&previous.ultra_ops) {
            let mut merged = Vec::with_capacity(previous_column.len() + column.len());
            merged.extend_from_slice(previous_column);
            merged.append(column);
            *column = merged;
        }

        self.current_ultra_ops_size += previous.ultra_ops[0].len();
        self.previous_ultra_ops_size += previous.ultra_ops[0].len();
        self.ultra_ops_commitments = previous.ultra_ops_commitments;
    }

    /// Exchange the entire state of two queues.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// A view of the current aggregate ultra ops transcript T_i.
    ///
    /// The returned slices borrow the queue's storage; any subsequent append
    /// or merge requires the view to be dropped first (enforced by the borrow
    /// checker).
    pub fn get_aggregate_transcript(&self) -> [&[P::ScalarField]; TABLE_WIDTH] {
        array::from_fn(|i| self.ultra_ops[i].as_slice())
    }

    /// A view of the previous aggregate ultra ops transcript T_{i-1}, i.e.
    /// each column truncated to the size recorded at the predecessor's
    /// finalization. Borrowing rules are as for
    /// [`Self::get_aggregate_transcript`].
    pub fn get_previous_aggregate_transcript(&self) -> [&[P::ScalarField]; TABLE_WIDTH] {
        array::from_fn(|i| &self.ultra_ops[i][..self.previous_ultra_ops_size])
    }

    /// TESTING PURPOSES ONLY: populate the queue with mock data as a stand-in
    /// for a previous circuit, so the prover of an arbitrary first circuit
    /// can behave as if it were not first in the stack. A single row of
    /// random values is added to each column and committed to as [1] * value,
    /// which keeps every column commitment away from the point at infinity.
    pub fn populate_with_mock_initial_data<R: Rng>(&mut self, rng: &mut R) {
        tracing::debug!("Populating op queue with mock initial data");
        let mut commitments = array::from_fn(|_| P::Affine::zero());
        for (column, commitment) in self.ultra_ops.iter_mut().zip(&mut commitments) {
            let mock_data = P::ScalarField::rand(rng);
            column.push(mock_data);
            *commitment = (P::Affine::generator() * mock_data).into_affine();
        }
        self.set_size_data();
        self.set_commitment_data(commitments);
    }
}

impl<P> ECCOpQueue<P>
where
    P: OpQueueCurve<TranscriptFieldType> + CurveGroup<ScalarField = TranscriptFieldType>,
{
    /// Append one mul of a fixed point by -1 followed by an equality op.
    ///
    /// Guarantees the head of a chain's transcript contains a nontrivial,
    /// non-identity entry, so that downstream column commitments never
    /// degenerate to a commitment of an all-zero column.
    pub fn append_nonzero_ops(&mut self) {
        let x = BigUint::parse_bytes(
            b"030644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd3",
            16,
        )
        .expect("valid hex constant");
        let y = BigUint::parse_bytes(
            b"1a76dae6d3272396d0cbe61fced2bc532edac647851e3ac53ce1cc9c7e645a83",
            16,
        )
        .expect("valid hex constant");
        let padding_element = P::g1_affine_from_xy(P::BaseField::from(x), P::BaseField::from(y));
        let padding_scalar = -P::ScalarField::one();

        self.mul_accumulate(padding_element, padding_scalar);
        self.eq_and_reset();
    }
}
