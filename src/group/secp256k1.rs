//! Adapter of the `k256` elliptic curve arithmetic to [`DlogGroup`].

use alloc::boxed::Box;

use crypto_bigint::{BoxedUint, U256};
use elliptic_curve::{
    ops::Reduce,
    sec1::{FromEncodedPoint, ToEncodedPoint},
    Field, PrimeField,
};
use k256::{EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use rand_core::CryptoRngCore;

use super::{DdhGroup, DlogGroup};

const ORDER_HEX: &str = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141";
const SCALAR_LEN: usize = 32;

/// The prime-order group of points of secp256k1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Secp256k1Group;

impl DlogGroup for Secp256k1Group {
    type Element = ProjectivePoint;
    type Scalar = Scalar;

    fn generator(&self) -> Self::Element {
        ProjectivePoint::GENERATOR
    }

    fn identity(&self) -> Self::Element {
        ProjectivePoint::IDENTITY
    }

    fn order(&self) -> BoxedUint {
        BoxedUint::from(U256::from_be_hex(ORDER_HEX))
    }

    fn exponentiate(&self, base: &Self::Element, exponent: &Self::Scalar) -> Self::Element {
        base * exponent
    }

    fn multiply(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a + b
    }

    fn is_member(&self, _element: &Self::Element) -> bool {
        // The curve has prime order and no cofactor: every decodable point is in the group.
        true
    }

    fn reconstruct(&self, encoding: &[u8]) -> Option<Self::Element> {
        let point = EncodedPoint::from_bytes(encoding).ok()?;
        Option::from(ProjectivePoint::from_encoded_point(&point))
    }

    fn encode(&self, element: &Self::Element) -> Box<[u8]> {
        element.to_affine().to_encoded_point(true).as_bytes().into()
    }

    fn random_scalar(&self, rng: &mut impl CryptoRngCore) -> Self::Scalar {
        Scalar::random(rng)
    }

    fn scalar_from_be_bytes(&self, bytes: &[u8]) -> Self::Scalar {
        // Fold in 32-byte chunks: `acc * 2^(8 * len) + chunk`.
        let shift = Scalar::from(256u64);
        bytes.chunks(SCALAR_LEN).fold(Scalar::ZERO, |acc, chunk| {
            let mut padded = FieldBytes::default();
            padded[SCALAR_LEN - chunk.len()..].copy_from_slice(chunk);
            let scale = (0..chunk.len()).fold(Scalar::ONE, |power, _| power * shift);
            acc * scale + <Scalar as Reduce<k256::U256>>::reduce_bytes(&padded)
        })
    }

    fn decode_scalar(&self, bytes: &[u8]) -> Option<Self::Scalar> {
        if bytes.len() != SCALAR_LEN {
            return None;
        }
        Option::from(Scalar::from_repr(FieldBytes::clone_from_slice(bytes)))
    }

    fn encode_scalar(&self, scalar: &Self::Scalar) -> Box<[u8]> {
        scalar.to_bytes().as_slice().into()
    }

    fn scalar_add(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar {
        a + b
    }

    fn scalar_mul(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar {
        a * b
    }

    fn scalar_neg(&self, a: &Self::Scalar) -> Self::Scalar {
        -*a
    }

    fn scalar_one(&self) -> Self::Scalar {
        Scalar::ONE
    }
}

impl DdhGroup for Secp256k1Group {}

#[cfg(test)]
mod tests {
    use rand_core::OsRng;

    use super::Secp256k1Group;
    use crate::group::DlogGroup;

    #[test]
    fn encoding_roundtrip_and_rejection() {
        let group = Secp256k1Group;
        let x = group.random_scalar(&mut OsRng);
        let point = group.exponentiate_generator(&x);

        let encoded = group.encode(&point);
        assert_eq!(encoded.len(), 33);
        assert_eq!(group.reconstruct(&encoded), Some(point));

        let mut corrupted = encoded.to_vec();
        corrupted[0] = 0x07;
        assert_eq!(group.reconstruct(&corrupted), None);

        // The point at infinity decodes and passes the membership check.
        let identity = group.encode(&group.identity());
        assert_eq!(group.reconstruct(&identity), Some(group.identity()));
    }

    #[test]
    fn short_challenges_are_not_reduced() {
        let group = Secp256k1Group;
        let e = group.scalar_from_be_bytes(&[0x01, 0x00]);
        let expected = group.scalar_add(&group.scalar_from_be_bytes(&[0xff]), &group.scalar_one());
        assert_eq!(e, expected);
        assert_eq!(group.order().bits(), 256);
    }
}
