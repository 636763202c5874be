//! The key-derivation capability used to mask OT payloads.

use alloc::boxed::Box;
use core::fmt::Debug;

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::InvalidInput;

/// Deterministic expansion of a seed into a byte string of the requested length.
///
/// Implementations keep no state between calls.
pub trait KeyDerivation: Debug + Clone {
    /// The largest output length `derive` supports.
    fn max_output_len(&self) -> usize;

    /// Derives `output_len` bytes from `seed`.
    fn derive(&self, seed: &[u8], output_len: usize) -> Result<Box<[u8]>, InvalidInput>;
}

/// HKDF (RFC 5869) instantiated with HMAC-SHA256, with an empty salt and a fixed info string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HkdfSha256;

impl HkdfSha256 {
    const INFO: &'static [u8] = b"dlog-protocols KDF";
    // RFC 5869: L <= 255 * HashLen
    const MAX_OUTPUT_LEN: usize = 255 * 32;
}

impl KeyDerivation for HkdfSha256 {
    fn max_output_len(&self) -> usize {
        Self::MAX_OUTPUT_LEN
    }

    fn derive(&self, seed: &[u8], output_len: usize) -> Result<Box<[u8]>, InvalidInput> {
        let mut output = alloc::vec![0u8; output_len];
        Hkdf::<Sha256>::new(None, seed)
            .expand(Self::INFO, &mut output)
            .map_err(|_| InvalidInput::KdfOutputLength(output_len))?;
        Ok(output.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{HkdfSha256, KeyDerivation};
    use crate::error::InvalidInput;

    #[test]
    fn deterministic_and_length_exact() {
        let kdf = HkdfSha256;
        let a = kdf.derive(b"seed", 100).unwrap();
        let b = kdf.derive(b"seed", 100).unwrap();
        let c = kdf.derive(b"other seed", 100).unwrap();
        assert_eq!(a.len(), 100);
        assert_eq!(a, b);
        assert_ne!(a, c);

        // Shorter outputs are prefixes of longer ones.
        assert_eq!(&kdf.derive(b"seed", 10).unwrap()[..], &a[..10]);
    }

    #[test]
    fn output_limit() {
        let kdf = HkdfSha256;
        assert!(kdf.derive(b"seed", kdf.max_output_len()).is_ok());
        assert_eq!(
            kdf.derive(b"seed", kdf.max_output_len() + 1),
            Err(InvalidInput::KdfOutputLength(kdf.max_output_len() + 1))
        );
    }
}
