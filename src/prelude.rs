pub use crate::TranscriptFieldType;
pub use crate::eccvm::ecc_op_queue::{ECCOpQueue, OpQueueCurve};
pub use crate::eccvm::layout::EccvmLayout;
pub use crate::eccvm::ops::{EccOpCode, UltraOp, VMOperation};
pub use crate::eccvm::row_tracker::{EccvmRowTracker, MsmBatch};
pub use crate::eccvm::scalar_split::{
    Bn254ParamsFq, Bn254ParamsFr, EndomorphismParams, compute_zetas,
    split_into_endomorphism_scalars,
};
