pub mod ecc_op_queue;
pub mod layout;
pub mod ops;
pub mod row_tracker;
pub mod scalar_split;

pub const NUM_LIMB_BITS_IN_FIELD_SIMULATION: usize = 68;
pub const NUM_SCALAR_BITS: usize = 128; // The length of scalars handled by the ECCVM
pub const NUM_WNAF_DIGIT_BITS: usize = 4; // Scalars are decomposed into base 16 in wNAF form
pub const NUM_WNAF_DIGITS_PER_SCALAR: usize = NUM_SCALAR_BITS / NUM_WNAF_DIGIT_BITS; // 32
pub const WNAF_DIGITS_PER_ROW: usize = 4;
pub const ADDITIONS_PER_ROW: usize = 4;
pub const TABLE_WIDTH: usize = 4; // dictated by the number of wires in the Ultra arithmetization
pub const NUM_ROWS_PER_OP: usize = 2; // A single ECC op is split across two width-4 rows
