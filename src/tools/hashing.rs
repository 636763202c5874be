use alloc::boxed::Box;

use digest::{ExtendableOutput, Update, XofReader};
use hashing_serializer::HashingSerializer;
use serde::{Deserialize, Serialize};
use serde_encoded_bytes::{Hex, SliceLike};

/// Marker for extendable-output hash functions that are collision resistant,
/// i.e. it is hard to find any `x != y` with `H(x) == H(y)`.
///
/// Implementing it for a type is a statement about the primitive, checked at compile time
/// wherever binding commitments are built from hashes.
pub trait CollisionResistant: ExtendableOutput + Update + Default + Clone {}

impl CollisionResistant for sha3::Shake256 {}
impl CollisionResistant for sha3::Shake128 {}

/// A digest object that takes byte slices or decomposable ([`Hashable`]) objects.
pub(crate) trait Chain: Sized {
    fn as_digest_mut(&mut self) -> &mut impl Update;

    /// Hash raw bytes.
    ///
    /// Note: only for impls in specific types, do not use directly.
    fn chain_raw_bytes(self, bytes: &[u8]) -> Self;

    /// Hash raw bytes in a collision-resistant way.
    fn chain_bytes(self, bytes: &(impl AsRef<[u8]> + ?Sized)) -> Self {
        // Hash the length too to prevent hash conflicts. (e.g. H(AB|CD) == H(ABC|D)).
        let len = (bytes.as_ref().len() as u64).to_be_bytes();
        self.chain_raw_bytes(&len).chain_raw_bytes(bytes.as_ref())
    }

    fn chain<T: Hashable>(self, hashable: &T) -> Self {
        hashable.chain(self)
    }
}

/// Wraps an extendable output hash for easier replacement, and standardizes the use of DST.
pub(crate) struct XofHasher<D: CollisionResistant>(D);

impl<D: CollisionResistant> Chain for XofHasher<D> {
    fn as_digest_mut(&mut self) -> &mut impl Update {
        &mut self.0
    }

    fn chain_raw_bytes(self, bytes: &[u8]) -> Self {
        let mut digest = self.0;
        digest.update(bytes);
        Self(digest)
    }
}

impl<D: CollisionResistant> XofHasher<D> {
    pub fn new_with_dst(dst: &[u8]) -> Self {
        Self(D::default()).chain_bytes(dst)
    }

    /// Finalizes into `len` output bytes.
    pub fn finalize(self, len: usize) -> HashOutput {
        let mut output = alloc::vec![0u8; len];
        self.0.finalize_xof().read(&mut output);
        HashOutput(output.into())
    }
}

/// A hash digest, serialized as hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashOutput(#[serde(with = "SliceLike::<Hex>")] Box<[u8]>);

impl AsRef<[u8]> for HashOutput {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A trait allowing complex objects to give access to their contents for hashing purposes
/// without the need of a conversion to a new form (e.g. serialization).
pub(crate) trait Hashable {
    fn chain<C: Chain>(&self, digest: C) -> C;
}

// Message and id types already implement `Serialize`,
// so there's no point in implementing `Hashable` for them separately.
impl<T: Serialize> Hashable for T {
    fn chain<C: Chain>(&self, digest: C) -> C {
        let mut digest = digest;

        let serializer = HashingSerializer {
            digest: digest.as_digest_mut(),
        };

        // The only way it can return an error is if there is
        // some non-serializable element encountered, which is 100% reproducible
        // and will be caught in tests.
        #[allow(clippy::expect_used)]
        self.serialize(serializer).expect("The type is serializable");

        digest
    }
}

#[cfg(test)]
mod tests {
    use sha3::Shake256;

    use super::{Chain, XofHasher};

    #[test]
    fn length_prefix_separates_inputs() {
        let ab_cd = XofHasher::<Shake256>::new_with_dst(b"test")
            .chain_bytes(b"AB")
            .chain_bytes(b"CD")
            .finalize(32);
        let abc_d = XofHasher::<Shake256>::new_with_dst(b"test")
            .chain_bytes(b"ABC")
            .chain_bytes(b"D")
            .finalize(32);
        assert_ne!(ab_cd, abc_d);
        assert_eq!(ab_cd.as_ref().len(), 32);
    }
}
