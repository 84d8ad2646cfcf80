use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{One, PrimeField, Zero};
use num_bigint::BigUint;

use crate::TranscriptFieldType;
use crate::eccvm::NUM_LIMB_BITS_IN_FIELD_SIMULATION;
use crate::eccvm::scalar_split::compute_zetas;

#[derive(Default, PartialEq, Eq, Clone, Debug)]
pub struct EccOpCode {
    pub add: bool,
    pub mul: bool,
    pub eq: bool,
    pub reset: bool,
}

impl EccOpCode {
    /// Returns the value of the opcode as a 32-bit integer.
    pub fn value(&self) -> u32 {
        let mut res = self.add as u32;
        res = (res << 1) + self.mul as u32;
        res = (res << 1) + self.eq as u32;
        res = (res << 1) + self.reset as u32;
        res
    }
}

/// One logical operation as recorded in the raw op transcript. The operation
/// is also performed natively by the queue; `z1`/`z2` hold the canonical
/// values of the endomorphism-decomposed halves of a mul scalar.
#[derive(Clone, Default, Debug)]
pub struct VMOperation<P: CurveGroup> {
    pub op_code: EccOpCode,
    pub base_point: P::Affine,
    pub z1: BigUint,
    pub z2: BigUint,
    pub mul_scalar_full: P::ScalarField,
}

impl<P: CurveGroup> PartialEq for VMOperation<P> {
    fn eq(&self, other: &Self) -> bool {
        self.op_code == other.op_code
            && self.base_point == other.base_point
            && self.z1 == other.z1
            && self.z2 == other.z2
            && self.mul_scalar_full == other.mul_scalar_full
    }
}

/// An operation re-expressed in the width-4 Ultra format: two rows across
/// four columns, with the base point coordinates split into
/// 2 * [`NUM_LIMB_BITS_IN_FIELD_SIMULATION`] bit limbs.
#[derive(Clone, Debug)]
pub struct UltraOp<P: CurveGroup> {
    pub op_code: EccOpCode,
    pub x_lo: P::ScalarField,
    pub x_hi: P::ScalarField,
    pub y_lo: P::ScalarField,
    pub y_hi: P::ScalarField,
    pub z_1: P::ScalarField,
    pub z_2: P::ScalarField,
    pub return_is_infinity: bool,
}

impl<P: CurveGroup> PartialEq for UltraOp<P> {
    fn eq(&self, other: &Self) -> bool {
        self.op_code == other.op_code
            && self.x_lo == other.x_lo
            && self.x_hi == other.x_hi
            && self.y_lo == other.y_lo
            && self.y_hi == other.y_hi
            && self.z_1 == other.z_1
            && self.z_2 == other.z_2
            && self.return_is_infinity == other.return_is_infinity
    }
}

impl<P: CurveGroup<ScalarField = TranscriptFieldType, BaseField: PrimeField>> UltraOp<P> {
    /// Encode one logical operation into its two-row limb representation.
    ///
    /// This is a pure function of the raw op; a circuit builder converts each
    /// raw op exactly once and stores the result via
    /// [`ECCOpQueue::populate_ultra_ops`](crate::eccvm::ecc_op_queue::ECCOpQueue::populate_ultra_ops).
    /// The point at infinity encodes as zero limbs with the infinity flag set.
    pub fn from_operation(op: &VMOperation<P>) -> Self {
        const LOWER_BITS: usize = 2 * NUM_LIMB_BITS_IN_FIELD_SIMULATION;
        let lower_mask = (BigUint::one() << LOWER_BITS) - BigUint::one();

        let (x, y): (BigUint, BigUint) = match (op.base_point.x(), op.base_point.y()) {
            (Some(x), Some(y)) => (x.into(), y.into()),
            _ => (BigUint::zero(), BigUint::zero()),
        };

        let (z_1, z_2) = if op.op_code.mul {
            compute_zetas(op.mul_scalar_full)
        } else {
            (P::ScalarField::zero(), P::ScalarField::zero())
        };

        Self {
            op_code: op.op_code.clone(),
            x_lo: P::ScalarField::from(&x & &lower_mask),
            x_hi: P::ScalarField::from(&x >> LOWER_BITS),
            y_lo: P::ScalarField::from(&y & &lower_mask),
            y_hi: P::ScalarField::from(&y >> LOWER_BITS),
            z_1,
            z_2,
            return_is_infinity: op.base_point.is_zero(),
        }
    }

    /// Get the base point in standard form, i.e. as two base field
    /// coordinates, with the point at infinity mapped to (0, 0).
    pub fn get_base_point_standard_form(&self) -> [P::BaseField; 2] {
        if self.return_is_infinity {
            return [P::BaseField::zero(), P::BaseField::zero()];
        }
        let shift = 2 * NUM_LIMB_BITS_IN_FIELD_SIMULATION;
        let (x_lo, x_hi): (BigUint, BigUint) = (self.x_lo.into(), self.x_hi.into());
        let (y_lo, y_hi): (BigUint, BigUint) = (self.y_lo.into(), self.y_hi.into());
        let x = x_lo + (x_hi << shift);
        let y = y_lo + (y_hi << shift);
        [P::BaseField::from(x), P::BaseField::from(y)]
    }
}

#[cfg(test)]
mod test {
    use ark_bn254::G1Affine;
    use ark_ec::AffineRepr;
    use num_bigint::BigUint;

    use super::*;

    type Bn254G1 = ark_bn254::G1Projective;

    fn fr_from_hex(hex: &str) -> ark_bn254::Fr {
        let digits = hex.trim_start_matches("0x").as_bytes();
        ark_bn254::Fr::from(BigUint::parse_bytes(digits, 16).unwrap())
    }

    fn fq_from_hex(hex: &str) -> ark_bn254::Fq {
        let digits = hex.trim_start_matches("0x").as_bytes();
        ark_bn254::Fq::from(BigUint::parse_bytes(digits, 16).unwrap())
    }

    #[test]
    fn opcode_values() {
        let add = EccOpCode {
            add: true,
            ..Default::default()
        };
        let mul = EccOpCode {
            mul: true,
            ..Default::default()
        };
        let eq_reset = EccOpCode {
            eq: true,
            reset: true,
            ..Default::default()
        };
        assert_eq!(add.value(), 0b1000);
        assert_eq!(mul.value(), 0b0100);
        assert_eq!(eq_reset.value(), 0b0011);
        assert_eq!(EccOpCode::default().value(), 0);
    }

    #[test]
    fn encode_matches_reference_vector() {
        let point = G1Affine::new(
            fq_from_hex("0x211561d55817d8e259180a3e684611e49f458da76ade6a1f5a2bad3dd20ed047"),
            fq_from_hex("0x1eab68c1f7807f482ffc7dd13fd9a0ce3bf26240230270ac781e2dc5c5460b3f"),
        );
        let scalar =
            fr_from_hex("0x02d9b5973384d81dc3e502de86b99ff96c38b15c4b1c4520d2a3147c7777ce1f");
        let (z1, z2) = crate::eccvm::scalar_split::compute_zetas(scalar);

        let op = VMOperation::<Bn254G1> {
            op_code: EccOpCode {
                mul: true,
                ..Default::default()
            },
            base_point: point,
            z1: BigUint::from(z1),
            z2: BigUint::from(z2),
            mul_scalar_full: scalar,
        };

        let ultra_op = UltraOp::from_operation(&op);

        let expected = UltraOp::<Bn254G1> {
            op_code: op.op_code.clone(),
            x_lo: fr_from_hex("0x000000000000000000000000000000e49f458da76ade6a1f5a2bad3dd20ed047"),
            x_hi: fr_from_hex("0x0000000000000000000000000000000000211561d55817d8e259180a3e684611"),
            y_lo: fr_from_hex("0x000000000000000000000000000000ce3bf26240230270ac781e2dc5c5460b3f"),
            y_hi: fr_from_hex("0x00000000000000000000000000000000001eab68c1f7807f482ffc7dd13fd9a0"),
            z_1: fr_from_hex("0x0000000000000000000000000000000018ffbbc11990c665e3edc805f6d1ccf9"),
            z_2: fr_from_hex("0x000000000000000000000000000000004f9333cd430dea1bc75410733863e4f1"),
            return_is_infinity: false,
        };

        assert_eq!(ultra_op, expected);
    }

    #[test]
    fn encode_round_trips_the_base_point() {
        let point = G1Affine::generator();
        let op = VMOperation::<Bn254G1> {
            op_code: EccOpCode {
                add: true,
                ..Default::default()
            },
            base_point: point,
            ..Default::default()
        };
        let ultra_op = UltraOp::from_operation(&op);
        let [x, y] = ultra_op.get_base_point_standard_form();
        assert_eq!(G1Affine::new(x, y), point);
    }

    #[test]
    fn infinity_encodes_as_zero_limbs() {
        let op = VMOperation::<Bn254G1> {
            op_code: EccOpCode {
                reset: true,
                ..Default::default()
            },
            base_point: G1Affine::zero(),
            ..Default::default()
        };
        let ultra_op = UltraOp::from_operation(&op);
        assert!(ultra_op.return_is_infinity);
        assert_eq!(ultra_op.x_lo, ark_bn254::Fr::zero());
        assert_eq!(ultra_op.x_hi, ark_bn254::Fr::zero());
        assert_eq!(ultra_op.y_lo, ark_bn254::Fr::zero());
        assert_eq!(ultra_op.y_hi, ark_bn254::Fr::zero());
        assert_eq!(
            ultra_op.get_base_point_standard_form(),
            [ark_bn254::Fq::zero(), ark_bn254::Fq::zero()]
        );
    }
}
