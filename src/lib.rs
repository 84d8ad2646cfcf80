//! Operation queue for elliptic curve group operations issued during circuit
//! construction.
//!
//! Every operation appended to the queue is performed natively (the result is
//! tracked in a running accumulator), recorded as a raw op for the ECCVM, and
//! encodable into the width-4 Ultra format via [`eccvm::ops::UltraOp`]. The
//! queue additionally keeps incrementally updated row counts so that the
//! circuits consuming the transcript can be sized without rescanning the full
//! operation history.

pub mod eccvm;
pub mod prelude;

/// The field over which the Ultra transcript columns are encoded.
pub type TranscriptFieldType = ark_bn254::Fr;
