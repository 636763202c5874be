//! 1-out-of-2 oblivious transfer of byte strings.
//!
//! The sender holds `(x0, x1)`, the receiver a choice bit `σ`; the receiver learns `x_σ` only,
//! and the sender learns nothing about `σ`.

pub mod full_sim;

use alloc::boxed::Box;

use serde::{Deserialize, Serialize};
use serde_encoded_bytes::{Hex, SliceLike};
use tracing::Span;

use crate::{
    error::ConstructionError,
    group::EncodedElement,
    kdf::KeyDerivation,
    sigma::SigmaConfig,
};

/// Construction parameters of both OT roles.
#[derive(Debug, Clone)]
pub struct OtConfig {
    /// The soundness parameter of the receiver's proof during preprocessing.
    pub soundness_bits: u32,
    /// The longest payload either side accepts. Must not exceed the KDF output limit.
    pub max_payload_len: usize,
    /// The span all events of the role are recorded under.
    pub span: Span,
}

impl OtConfig {
    /// The default payload limit.
    pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 4096;

    /// A configuration with the given parameters and no tracing span.
    pub fn new(soundness_bits: u32, max_payload_len: usize) -> Self {
        Self {
            soundness_bits,
            max_payload_len,
            span: Span::none(),
        }
    }

    pub(crate) fn sigma_config(&self) -> SigmaConfig {
        SigmaConfig {
            soundness_bits: self.soundness_bits,
            span: self.span.clone(),
        }
    }

    pub(crate) fn check_payload_limit(&self, kdf: &impl KeyDerivation) -> Result<(), ConstructionError> {
        if self.max_payload_len > kdf.max_output_len() {
            return Err(ConstructionError::PayloadLimitTooLarge {
                requested: self.max_payload_len,
                supported: kdf.max_output_len(),
            });
        }
        Ok(())
    }
}

impl Default for OtConfig {
    fn default() -> Self {
        Self::new(SigmaConfig::DEFAULT_SOUNDNESS_BITS, Self::DEFAULT_MAX_PAYLOAD_LEN)
    }
}

/// The receiver's preprocessing message `(g1, h0, h1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverSetupMessage {
    pub(crate) g1: EncodedElement,
    pub(crate) h0: EncodedElement,
    pub(crate) h1: EncodedElement,
}

/// The receiver's transfer request `(g', h') = (g_σ^r, h_σ^r)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverTuple {
    pub(crate) g_prime: EncodedElement,
    pub(crate) h_prime: EncodedElement,
}

/// The sender's answer: the two randomized elements and the two masked payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderTuple {
    pub(crate) u0: EncodedElement,
    #[serde(with = "SliceLike::<Hex>")]
    pub(crate) c0: Box<[u8]>,
    pub(crate) u1: EncodedElement,
    #[serde(with = "SliceLike::<Hex>")]
    pub(crate) c1: Box<[u8]>,
}

/// The receiver's output `x_σ`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtOutput(Box<[u8]>);

impl OtOutput {
    pub(crate) fn new(bytes: Box<[u8]>) -> Self {
        Self(bytes)
    }

    /// The received payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the output, returning the payload.
    pub fn into_bytes(self) -> Box<[u8]> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::OtConfig;
    use crate::{error::ConstructionError, kdf::HkdfSha256};

    #[test]
    fn payload_limit_is_checked_against_kdf() {
        assert!(OtConfig::default().check_payload_limit(&HkdfSha256).is_ok());
        assert!(OtConfig::new(80, 255 * 32).check_payload_limit(&HkdfSha256).is_ok());
        assert_eq!(
            OtConfig::new(80, 255 * 32 + 1).check_payload_limit(&HkdfSha256),
            Err(ConstructionError::PayloadLimitTooLarge {
                requested: 255 * 32 + 1,
                supported: 255 * 32
            })
        );
    }
}
