use ark_ff::{BigInt, BigInteger, FftField, Field, PrimeField, Zero};

use crate::TranscriptFieldType;
use crate::eccvm::NUM_SCALAR_BITS;

/// Precomputed constants for the endomorphism decomposition of a scalar
/// field. Derived from the extended euclidean algorithm on (modulus, lambda).
pub trait EndomorphismParams {
    const ENDO_G1_LO: u64;
    const ENDO_G1_MID: u64;
    const ENDO_G1_HI: u64;
    const ENDO_G2_LO: u64;
    const ENDO_G2_MID: u64;
    const ENDO_MINUS_B1_LO: u64;
    const ENDO_MINUS_B1_MID: u64;
    const ENDO_B2_LO: u64;
    const ENDO_B2_MID: u64;
}

pub struct Bn254ParamsFr;
pub struct Bn254ParamsFq;

impl EndomorphismParams for Bn254ParamsFr {
    const ENDO_G1_LO: u64 = 0x7a7bd9d4391eb18d;
    const ENDO_G1_MID: u64 = 0x4ccef014a773d2cf;
    const ENDO_G1_HI: u64 = 0x0000000000000002;
    const ENDO_G2_LO: u64 = 0xd91d232ec7e0b3d7;
    const ENDO_G2_MID: u64 = 0x0000000000000002;
    const ENDO_MINUS_B1_LO: u64 = 0x8211bbeb7d4f1128;
    const ENDO_MINUS_B1_MID: u64 = 0x6f4d8248eeb859fc;
    const ENDO_B2_LO: u64 = 0x89d3256894d213e3;
    const ENDO_B2_MID: u64 = 0x0000000000000000;
}

impl EndomorphismParams for Bn254ParamsFq {
    const ENDO_G1_LO: u64 = 0x7a7bd9d4391eb18d;
    const ENDO_G1_MID: u64 = 0x4ccef014a773d2cf;
    const ENDO_G1_HI: u64 = 0x0000000000000002;
    const ENDO_G2_LO: u64 = 0xd91d232ec7e0b3d2;
    const ENDO_G2_MID: u64 = 0x0000000000000002;
    const ENDO_MINUS_B1_LO: u64 = 0x8211bbeb7d4f1129;
    const ENDO_MINUS_B1_MID: u64 = 0x6f4d8248eeb859fc;
    const ENDO_B2_LO: u64 = 0x89d3256894d213e2;
    const ENDO_B2_MID: u64 = 0x0000000000000000;
}

/**
 * For short Weierstrass curves y^2 = x^3 + b mod r, if there exists a cube root of unity mod r,
 * we can take advantage of an endomorphism to decompose a 254 bit scalar into 2 128 bit scalars.
 * \beta = cube root of 1, mod q (q = order of fq)
 * \lambda = cube root of 1, mod r (r = order of fr)
 *
 * For a point P1 = (X, Y), where Y^2 = X^3 + b, we know that
 * the point P2 = (X * \beta, Y) is also a point on the curve
 * We can represent P2 as a scalar multiplication of P1, where P2 = \lambda * P1
 *
 * For a generic multiplication of P1 by a 254 bit scalar k, we can decompose k
 * into 2 127 bit scalars (k1, k2), such that k = k1 - (k2 * \lambda)
 *
 * We can now represent (k * P1) as (k1 * P1) - (k2 * P2), where P2 = (X * \beta, Y).
 * As k1, k2 have half the bit length of k, we have reduced the number of loop iterations of our
 * scalar multiplication algorithm in half
 *
 * To find k1, k2, We use the extended euclidean algorithm to find 4 short scalars [a1, a2], [b1, b2] such that
 * modulus = (a1 * b2) - (b1 * a2)
 * We then compute scalars c1 = round(b2 * k / r), c2 = round(b1 * k / r), where
 * k1 = (c1 * a1) + (c2 * a2), k2 = -((c1 * b1) + (c2 * b2))
 * We pre-compute scalars g1 = (2^256 * b1) / n, g2 = (2^256 * b2) / n, to avoid having to perform long division
 * on 512-bit scalars
 **/
pub fn split_into_endomorphism_scalars<Params: EndomorphismParams>(
    scalar: TranscriptFieldType,
) -> (TranscriptFieldType, TranscriptFieldType) {
    let endo_g1 = BigInt([
        Params::ENDO_G1_LO,
        Params::ENDO_G1_MID,
        Params::ENDO_G1_HI,
        0,
    ]);

    let endo_g2 = BigInt([Params::ENDO_G2_LO, Params::ENDO_G2_MID, 0, 0]);

    let endo_minus_b1 = BigInt([Params::ENDO_MINUS_B1_LO, Params::ENDO_MINUS_B1_MID, 0, 0]);

    let endo_b2 = BigInt([Params::ENDO_B2_LO, Params::ENDO_B2_MID, 0, 0]);

    let scalar_bigint = to_montgomery_form(scalar).into_bigint();

    let c1 = endo_g2.mul_high(&scalar_bigint);
    let c2 = endo_g1.mul_high(&scalar_bigint);

    let q1 = c1.mul(&endo_minus_b1).0;
    let q2 = c2.mul(&endo_b2).0;

    let q1 = from_montgomery_form(
        TranscriptFieldType::from_bigint(q1).expect("q1 fits in the scalar field"),
    );
    let q2 = from_montgomery_form(
        TranscriptFieldType::from_bigint(q2).expect("q2 fits in the scalar field"),
    );

    let t1 = q2 - q1;
    let beta = TranscriptFieldType::get_root_of_unity(3).expect("cube root of unity exists");
    let t2 = t1 * beta + scalar;

    (t2, t1)
}

/// Decompose a full mul scalar into the two half-length values stored with a
/// mul op. Scalars whose canonical value already fits in
/// [`NUM_SCALAR_BITS`] bits short-circuit to `(scalar, 0)`. The returned
/// field elements satisfy `scalar = z1 - beta * z2` with `beta` the cube root
/// of unity mod r.
pub fn compute_zetas(
    scalar: TranscriptFieldType,
) -> (TranscriptFieldType, TranscriptFieldType) {
    let converted = from_montgomery_form(scalar);
    if converted.into_bigint().num_bits() as usize <= NUM_SCALAR_BITS {
        return (scalar, TranscriptFieldType::zero());
    }
    let (z1, z2) = split_into_endomorphism_scalars::<Bn254ParamsFr>(converted);
    (to_montgomery_form(z1), to_montgomery_form(z2))
}

fn from_montgomery_form(x: TranscriptFieldType) -> TranscriptFieldType {
    let mont_r: TranscriptFieldType = TranscriptFieldType::MODULUS.montgomery_r().into();
    x * mont_r.inverse().expect("montgomery R is invertible")
}

fn to_montgomery_form(x: TranscriptFieldType) -> TranscriptFieldType {
    let mont_r: TranscriptFieldType = TranscriptFieldType::MODULUS.montgomery_r().into();
    x * mont_r
}
