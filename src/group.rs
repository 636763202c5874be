//! The discrete-log group capability consumed by all protocols.
//!
//! Protocols never construct group elements directly: they only use the
//! operations of [`DlogGroup`]. Backends adapt concrete arithmetic to this trait.

#[cfg(any(test, feature = "k256"))]
mod secp256k1;
mod zp;

use alloc::boxed::Box;
use core::fmt::Debug;

use crypto_bigint::BoxedUint;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use serde_encoded_bytes::{Hex, SliceLike};
use zeroize::Zeroize;

use crate::error::CheatAttempt;

#[cfg(any(test, feature = "k256"))]
pub use secp256k1::Secp256k1Group;
pub use zp::{ZpElement, ZpGroup, ZpScalar};

/// A cyclic group of prime order `q` in which the discrete logarithm problem is hard.
///
/// Exponents live in `Z_q` and are represented by [`DlogGroup::Scalar`];
/// all exponent arithmetic is reduced modulo the group order.
pub trait DlogGroup: Debug + Clone {
    /// A group element.
    type Element: Debug + Clone + PartialEq + Eq;

    /// An exponent in `Z_q`.
    type Scalar: Debug + Clone + PartialEq + Zeroize;

    /// The fixed generator `g`.
    fn generator(&self) -> Self::Element;

    /// The neutral element.
    fn identity(&self) -> Self::Element;

    /// The group order `q`.
    fn order(&self) -> BoxedUint;

    /// Computes `base^exponent`.
    fn exponentiate(&self, base: &Self::Element, exponent: &Self::Scalar) -> Self::Element;

    /// Computes the group operation `a · b`.
    fn multiply(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    /// Checks that the element belongs to the prime-order group.
    fn is_member(&self, element: &Self::Element) -> bool;

    /// Rebuilds an element from its canonical encoding.
    ///
    /// Returns `None` if the bytes do not describe an element of the ambient structure at all;
    /// membership in the prime-order group must still be checked with [`DlogGroup::is_member`].
    fn reconstruct(&self, encoding: &[u8]) -> Option<Self::Element>;

    /// Returns the canonical encoding of an element.
    fn encode(&self, element: &Self::Element) -> Box<[u8]>;

    /// Samples a uniformly random exponent.
    fn random_scalar(&self, rng: &mut impl CryptoRngCore) -> Self::Scalar;

    /// Interprets big-endian bytes as an integer and reduces it modulo `q`.
    fn scalar_from_be_bytes(&self, bytes: &[u8]) -> Self::Scalar;

    /// Decodes a canonical exponent encoding, rejecting integers `>= q`.
    fn decode_scalar(&self, bytes: &[u8]) -> Option<Self::Scalar>;

    /// Returns the canonical (fixed-width, big-endian) encoding of an exponent.
    fn encode_scalar(&self, scalar: &Self::Scalar) -> Box<[u8]>;

    /// `a + b mod q`
    fn scalar_add(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    /// `a · b mod q`
    fn scalar_mul(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    /// `-a mod q`
    fn scalar_neg(&self, a: &Self::Scalar) -> Self::Scalar;

    /// The exponent `1`.
    fn scalar_one(&self) -> Self::Scalar;

    /// Samples a uniformly random exponent from `[1, q)`.
    fn random_nonzero_scalar(&self, rng: &mut impl CryptoRngCore) -> Self::Scalar {
        let zero = self.scalar_from_be_bytes(&[]);
        loop {
            let scalar = self.random_scalar(rng);
            if scalar != zero {
                return scalar;
            }
        }
    }

    /// Computes `g^exponent`.
    fn exponentiate_generator(&self, exponent: &Self::Scalar) -> Self::Element {
        self.exponentiate(&self.generator(), exponent)
    }

    /// Computes `base^(-exponent)`.
    fn exponentiate_inverse(&self, base: &Self::Element, exponent: &Self::Scalar) -> Self::Element {
        self.exponentiate(base, &self.scalar_neg(exponent))
    }

    /// Decodes an element received from the peer and checks its membership.
    fn decode_member(&self, encoding: &EncodedElement, name: &'static str) -> Result<Self::Element, CheatAttempt> {
        self.reconstruct(encoding.as_bytes())
            .filter(|element| self.is_member(element))
            .ok_or(CheatAttempt::NotGroupMember(name))
    }

    /// Decodes an element received from the peer that must also differ from the identity.
    fn decode_nontrivial_member(
        &self,
        encoding: &EncodedElement,
        name: &'static str,
    ) -> Result<Self::Element, CheatAttempt> {
        let element = self.decode_member(encoding, name)?;
        if element == self.identity() {
            return Err(CheatAttempt::IdentityElement(name));
        }
        Ok(element)
    }

    /// Decodes an exponent received from the peer.
    fn decode_received_scalar(&self, encoding: &EncodedScalar, name: &'static str) -> Result<Self::Scalar, CheatAttempt> {
        self.decode_scalar(encoding.as_bytes())
            .ok_or(CheatAttempt::InvalidScalar(name))
    }
}

/// Marker for groups in which the decisional Diffie-Hellman problem is assumed to be hard.
///
/// Protocols whose security reduces to DDH (e.g. the oblivious transfer) require this bound,
/// so that the assumption is checked once, at compile time.
pub trait DdhGroup: DlogGroup {}

/// The wire form of a group element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedElement(#[serde(with = "SliceLike::<Hex>")] Box<[u8]>);

impl EncodedElement {
    /// Encodes an element with the group's canonical encoding.
    pub fn new<G: DlogGroup>(group: &G, element: &G::Element) -> Self {
        Self(group.encode(element))
    }

    /// Wraps raw bytes (which may not describe a valid element).
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// The wire form of an exponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedScalar(#[serde(with = "SliceLike::<Hex>")] Box<[u8]>);

impl EncodedScalar {
    /// Encodes an exponent with the group's canonical encoding.
    pub fn new<G: DlogGroup>(group: &G, scalar: &G::Scalar) -> Self {
        Self(group.encode_scalar(scalar))
    }

    /// Wraps raw bytes (which may not describe a valid exponent).
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Returns `true` if `2^bits < order`.
pub(crate) fn power_of_two_below(order: &BoxedUint, bits: u32) -> bool {
    // An integer with `bits + 1` significant bits is at least `2^bits`,
    // and equals it only if all the lower bits are zero.
    let significant = order.bits();
    significant > bits + 1 || (significant == bits + 1 && order.trailing_zeros() != bits)
}

#[cfg(test)]
mod tests {
    use crypto_bigint::{BoxedUint, U64};

    use super::power_of_two_below;

    fn uint(value: u64) -> BoxedUint {
        BoxedUint::from(U64::from_u64(value))
    }

    #[test]
    fn power_of_two_bound() {
        assert!(power_of_two_below(&uint(11), 3));
        assert!(!power_of_two_below(&uint(11), 4));
        assert!(!power_of_two_below(&uint(16), 4));
        assert!(power_of_two_below(&uint(17), 4));
        assert!(power_of_two_below(&uint(256), 7));
        assert!(!power_of_two_below(&uint(256), 8));
    }
}
