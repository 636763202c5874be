//! The subgroup of quadratic residues of `Z_p*` for a safe prime `p = 2q + 1`.
//!
//! Moduli are limited to 63 bits, so this backend is **for testing purposes only**:
//! it is small enough to run the protocols quickly, and to build hand-checked examples.

use alloc::boxed::Box;

use crypto_bigint::{
    modular::{MontyForm, MontyParams},
    BoxedUint, Odd, RandomMod, U64,
};
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use super::{DdhGroup, DlogGroup};
use crate::error::ConstructionError;

const LIMBS: usize = U64::LIMBS;
const ENCODING_LEN: usize = 8;

type Residue = MontyForm<LIMBS>;

const ORDER_11_P: Odd<U64> = Odd::<U64>::from_be_hex("0000000000000017");
const ORDER_11_Q: Odd<U64> = Odd::<U64>::from_be_hex("000000000000000b");
const TEST_62BIT_P: Odd<U64> = Odd::<U64>::from_be_hex("40000000000019c3");
const TEST_62BIT_Q: Odd<U64> = Odd::<U64>::from_be_hex("2000000000000ce1");

/// An element of [`ZpGroup`], a nonzero residue modulo `p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZpElement(Residue);

impl ZpElement {
    /// Returns the integer in `[1, p)` representing the element.
    pub fn value(&self) -> u64 {
        self.0.retrieve().into()
    }
}

/// An exponent of [`ZpGroup`], an integer in `[0, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct ZpScalar(U64);

impl ZpScalar {
    /// Returns the integer representing the exponent.
    pub fn value(&self) -> u64 {
        self.0.into()
    }
}

/// The order-`q` subgroup of `Z_p*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZpGroup {
    p: MontyParams<LIMBS>,
    q: Odd<U64>,
    q_params: MontyParams<LIMBS>,
    g: ZpElement,
}

impl ZpGroup {
    /// Creates the group from a safe prime `p = 2q + 1` and a generator `g` of the order-`q` subgroup.
    ///
    /// The primality of `p` and `q` is not checked.
    pub fn new(p: u64, q: u64, g: u64) -> Result<Self, ConstructionError> {
        if p >= 1 << 63 {
            return Err(ConstructionError::InvalidGroupParameters("p must be below 2^63"));
        }
        if q.checked_mul(2).and_then(|q2| q2.checked_add(1)) != Some(p) {
            return Err(ConstructionError::InvalidGroupParameters("p must equal 2q + 1"));
        }
        let p_odd = Option::<Odd<U64>>::from(Odd::new(U64::from_u64(p)))
            .ok_or(ConstructionError::InvalidGroupParameters("p must be odd"))?;
        let q_odd = Option::<Odd<U64>>::from(Odd::new(U64::from_u64(q)))
            .ok_or(ConstructionError::InvalidGroupParameters("q must be odd"))?;
        if g <= 1 || g >= p {
            return Err(ConstructionError::InvalidGroupParameters("g must lie in (1, p)"));
        }

        let group = Self::from_parts(p_odd, q_odd, g);
        if !group.is_member(&group.g) {
            return Err(ConstructionError::InvalidGroupParameters(
                "g must generate the order-q subgroup",
            ));
        }
        Ok(group)
    }

    fn from_parts(p: Odd<U64>, q: Odd<U64>, g: u64) -> Self {
        // The moduli are public, so variable-time setup is fine.
        let p = MontyParams::new_vartime(p);
        Self {
            p,
            q,
            q_params: MontyParams::new_vartime(q),
            g: ZpElement(Residue::new(&U64::from_u64(g), p)),
        }
    }

    /// The toy group `p = 23`, `q = 11`, `g = 2`.
    pub fn order_11() -> Self {
        Self::from_parts(ORDER_11_P, ORDER_11_Q, 2)
    }

    /// A group with a 62-bit prime order `q`, large enough for soundness parameters up to 56 bits.
    pub fn test_62bit() -> Self {
        Self::from_parts(TEST_62BIT_P, TEST_62BIT_Q, 4)
    }

    /// The modulus `p`.
    pub fn modulus(&self) -> u64 {
        self.p.modulus().get().into()
    }

    /// Builds an element from an integer, without checking subgroup membership.
    pub fn element(&self, value: u64) -> Option<ZpElement> {
        self.residue(&U64::from_u64(value))
    }

    /// Builds an exponent from an integer, reducing it modulo `q`.
    pub fn scalar(&self, value: u64) -> ZpScalar {
        ZpScalar(U64::from_u64(value).rem(self.q.as_nz_ref()))
    }

    fn residue(&self, value: &U64) -> Option<ZpElement> {
        (value != &U64::ZERO && value < self.p.modulus().as_ref()).then(|| ZpElement(Residue::new(value, self.p)))
    }

    fn exponent_residue(&self, scalar: &U64) -> Residue {
        Residue::new(scalar, self.q_params)
    }
}

impl DlogGroup for ZpGroup {
    type Element = ZpElement;
    type Scalar = ZpScalar;

    fn generator(&self) -> Self::Element {
        self.g
    }

    fn identity(&self) -> Self::Element {
        ZpElement(Residue::one(self.p))
    }

    fn order(&self) -> BoxedUint {
        BoxedUint::from(self.q.get())
    }

    fn exponentiate(&self, base: &Self::Element, exponent: &Self::Scalar) -> Self::Element {
        ZpElement(base.0.pow(&exponent.0))
    }

    fn multiply(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        ZpElement(a.0 * b.0)
    }

    fn is_member(&self, element: &Self::Element) -> bool {
        element.0.params() == &self.p && element.0.pow(self.q.as_ref()) == Residue::one(self.p)
    }

    fn reconstruct(&self, encoding: &[u8]) -> Option<Self::Element> {
        if encoding.len() != ENCODING_LEN {
            return None;
        }
        self.residue(&U64::from_be_slice(encoding))
    }

    fn encode(&self, element: &Self::Element) -> Box<[u8]> {
        element.0.retrieve().to_be_bytes().into()
    }

    fn random_scalar(&self, rng: &mut impl CryptoRngCore) -> Self::Scalar {
        ZpScalar(U64::random_mod(rng, self.q.as_nz_ref()))
    }

    fn scalar_from_be_bytes(&self, bytes: &[u8]) -> Self::Scalar {
        let radix = self.exponent_residue(&U64::from_u16(0x100));
        let reduced = bytes.iter().fold(Residue::zero(self.q_params), |acc, byte| {
            acc * radix + self.exponent_residue(&U64::from_u8(*byte))
        });
        ZpScalar(reduced.retrieve())
    }

    fn decode_scalar(&self, bytes: &[u8]) -> Option<Self::Scalar> {
        if bytes.len() != ENCODING_LEN {
            return None;
        }
        let value = U64::from_be_slice(bytes);
        (&value < self.q.as_ref()).then_some(ZpScalar(value))
    }

    fn encode_scalar(&self, scalar: &Self::Scalar) -> Box<[u8]> {
        scalar.0.to_be_bytes().into()
    }

    fn scalar_add(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar {
        ZpScalar(a.0.add_mod(&b.0, self.q.as_ref()))
    }

    fn scalar_mul(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar {
        ZpScalar((self.exponent_residue(&a.0) * self.exponent_residue(&b.0)).retrieve())
    }

    fn scalar_neg(&self, a: &Self::Scalar) -> Self::Scalar {
        ZpScalar(a.0.neg_mod(self.q.as_ref()))
    }

    fn scalar_one(&self) -> Self::Scalar {
        ZpScalar(U64::ONE)
    }
}

impl DdhGroup for ZpGroup {}
