//! Sigma-protocols: three-move proofs `(a, e, z)` of a relation between a public statement
//! and a secret exponent (the witness).
//!
//! The engine is generic over the relation ([`SigmaRelation`]); the relations used by the crate
//! are [`DlogRelation`] (knowledge of `w` with `h = g^w`) and [`DhRelation`]
//! (`(g, h, u, v)` is a Diffie-Hellman tuple, `u = g^w`, `v = h^w`).
//! Both are proofs for a group homomorphism `φ`: the prover sends `a = φ(r)`,
//! answers `z = r + e·w mod q`, and the verifier checks `φ(z) == a · Y^e`,
//! where `Y` is the public image of the witness.
//! The simulator picks `z` first and back-solves `a = φ(z) · Y^(-e)`.

mod dh;
mod dlog;
mod interactive;
mod zkpok;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use derive_where::derive_where;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use serde_encoded_bytes::{Hex, SliceLike};
use tracing::Span;

use crate::{
    error::{CheatAttempt, ConstructionError, InvalidInput, ProtocolError},
    group::{power_of_two_below, DlogGroup, EncodedElement, EncodedScalar},
    tools::Secret,
};

pub use dh::{DhFirstMessage, DhRelation, DhStatement};
pub use dlog::{DlogFirstMessage, DlogRelation, DlogStatement};
pub use interactive::{SigmaProver, SigmaVerifier};
pub use zkpok::{ZkPokProver, ZkPokResponse, ZkPokVerifier};

/// Construction parameters shared by all Sigma-protocol roles.
#[derive(Debug, Clone)]
pub struct SigmaConfig {
    /// The soundness parameter `t`: the bit length of the challenge.
    pub soundness_bits: u32,
    /// The span all events of the role are recorded under.
    pub span: Span,
}

impl SigmaConfig {
    /// The default soundness parameter.
    pub const DEFAULT_SOUNDNESS_BITS: u32 = 80;

    /// A configuration with the given soundness parameter and no tracing span.
    pub fn with_soundness(soundness_bits: u32) -> Self {
        Self {
            soundness_bits,
            span: Span::none(),
        }
    }
}

static_assertions::const_assert!(SigmaConfig::DEFAULT_SOUNDNESS_BITS % 8 == 0);

impl Default for SigmaConfig {
    fn default() -> Self {
        Self::with_soundness(Self::DEFAULT_SOUNDNESS_BITS)
    }
}

/// A soundness parameter `t` validated against a group: `t` is a positive multiple of 8 and `2^t < q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundnessParameter(u32);

impl SoundnessParameter {
    /// Validates `bits` for the given group.
    pub fn new<G: DlogGroup>(group: &G, bits: u32) -> Result<Self, ConstructionError> {
        if bits == 0 || bits % 8 != 0 {
            return Err(ConstructionError::SoundnessNotByteAligned(bits));
        }
        if !power_of_two_below(&group.order(), bits) {
            return Err(ConstructionError::SoundnessTooLarge(bits));
        }
        Ok(Self(bits))
    }

    /// The soundness parameter in bits.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// The challenge length in bytes.
    pub fn challenge_len(&self) -> usize {
        (self.0 / 8) as usize
    }
}

/// The verifier's challenge `e`, a uniformly random `t`-bit string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge(#[serde(with = "SliceLike::<Hex>")] Box<[u8]>);

impl Challenge {
    /// Samples a challenge of the length required by `soundness`.
    pub fn random(rng: &mut impl CryptoRngCore, soundness: SoundnessParameter) -> Self {
        let mut bytes = alloc::vec![0u8; soundness.challenge_len()];
        rng.fill_bytes(&mut bytes);
        Self(bytes.into())
    }

    /// Wraps raw bytes; the length is checked where the challenge is used.
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// Recovers a challenge from the canonical encoding of an exponent,
    /// as produced when the challenge is committed to as an element of `Z_q`.
    pub(crate) fn from_scalar_encoding(bytes: &[u8], soundness: SoundnessParameter) -> Result<Self, CheatAttempt> {
        let len = soundness.challenge_len();
        let split = bytes.len().checked_sub(len).ok_or(CheatAttempt::ChallengeLength {
            expected: len,
            actual: bytes.len(),
        })?;
        let (high, low) = bytes.split_at(split);
        if high.iter().any(|byte| *byte != 0) {
            return Err(CheatAttempt::ChallengeLength {
                expected: len,
                actual: bytes.len() - high.iter().take_while(|byte| **byte == 0).count(),
            });
        }
        Ok(Self(low.into()))
    }

    /// Returns the challenge bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Checks that the challenge is exactly `t/8` bytes long.
    pub fn check_len(&self, soundness: SoundnessParameter) -> Result<(), CheatAttempt> {
        if self.0.len() == soundness.challenge_len() {
            Ok(())
        } else {
            Err(CheatAttempt::ChallengeLength {
                expected: soundness.challenge_len(),
                actual: self.0.len(),
            })
        }
    }

    /// The challenge as an exponent. Since `2^t < q`, no reduction takes place.
    pub fn to_scalar<G: DlogGroup>(&self, group: &G) -> G::Scalar {
        group.scalar_from_be_bytes(&self.0)
    }
}

/// A relation provable with a Sigma-protocol over the group `G`.
pub trait SigmaRelation<G: DlogGroup> {
    /// The public statement.
    type Statement: Debug + Clone;

    /// The prover's first message `a`.
    type FirstMessage: Debug + Clone + PartialEq;

    /// The number of group elements in the first message.
    const ARITY: usize;

    /// Checks that `witness` satisfies the relation for `statement`.
    fn holds(group: &G, statement: &Self::Statement, witness: &G::Scalar) -> bool;

    /// Checks that every element of the statement is a group member.
    fn statement_is_valid(group: &G, statement: &Self::Statement) -> bool;

    /// Computes `φ(r)`.
    fn commit(group: &G, statement: &Self::Statement, randomness: &G::Scalar) -> Self::FirstMessage;

    /// Checks `φ(z) == a · Y^e`.
    fn check(group: &G, statement: &Self::Statement, a: &Self::FirstMessage, e: &G::Scalar, z: &G::Scalar) -> bool;

    /// Computes `a = φ(z) · Y^(-e)`.
    fn back_solve(group: &G, statement: &Self::Statement, e: &G::Scalar, z: &G::Scalar) -> Self::FirstMessage;

    /// The elements of the first message, in wire order.
    fn first_message_elements(a: &Self::FirstMessage) -> Vec<G::Element>;

    /// Rebuilds the first message from exactly [`SigmaRelation::ARITY`] elements.
    fn first_message_from_elements(elements: Vec<G::Element>) -> Option<Self::FirstMessage>;
}

/// The wire form of the first message: the encodings of its group elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigmaFirstMessage {
    elements: Vec<EncodedElement>,
}

impl SigmaFirstMessage {
    pub(crate) fn encode<G: DlogGroup, R: SigmaRelation<G>>(group: &G, a: &R::FirstMessage) -> Self {
        Self {
            elements: R::first_message_elements(a)
                .iter()
                .map(|element| EncodedElement::new(group, element))
                .collect(),
        }
    }

    pub(crate) fn decode<G: DlogGroup, R: SigmaRelation<G>>(&self, group: &G) -> Result<R::FirstMessage, CheatAttempt> {
        if self.elements.len() != R::ARITY {
            return Err(CheatAttempt::FirstMessageArity {
                expected: R::ARITY,
                actual: self.elements.len(),
            });
        }
        let elements = self
            .elements
            .iter()
            .map(|encoded| group.decode_member(encoded, "a"))
            .collect::<Result<Vec<_>, _>>()?;
        R::first_message_from_elements(elements).ok_or(CheatAttempt::FirstMessageArity {
            expected: R::ARITY,
            actual: self.elements.len(),
        })
    }
}

/// The wire form of the prover's response `z`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigmaResponse(EncodedScalar);

impl SigmaResponse {
    pub(crate) fn new<G: DlogGroup>(group: &G, z: &G::Scalar) -> Self {
        Self(EncodedScalar::new(group, z))
    }

    pub(crate) fn decode<G: DlogGroup>(&self, group: &G) -> Result<G::Scalar, CheatAttempt> {
        group.decode_received_scalar(&self.0, "z")
    }
}

/// An accepting transcript `(a, e, z)`.
#[derive_where(Debug, Clone)]
pub struct SigmaTranscript<G: DlogGroup, R: SigmaRelation<G>> {
    /// The first message.
    pub a: R::FirstMessage,
    /// The challenge.
    pub e: Challenge,
    /// The response.
    pub z: G::Scalar,
}

/// The prover's secret state between the first message and the response.
#[derive_where(Debug)]
pub struct SigmaProverState<G: DlogGroup> {
    randomness: Secret<G::Scalar>,
    witness: Secret<G::Scalar>,
}

/// The prover's computations, independent of the transport.
#[derive_where(Debug, Clone)]
pub struct SigmaProverComputation<G: DlogGroup, R: SigmaRelation<G>> {
    group: G,
    soundness: SoundnessParameter,
    span: Span,
    phantom: core::marker::PhantomData<fn() -> R>,
}

impl<G: DlogGroup, R: SigmaRelation<G>> SigmaProverComputation<G, R> {
    /// Creates the prover, validating the soundness parameter.
    pub fn new(group: G, config: SigmaConfig) -> Result<Self, ConstructionError> {
        let soundness = SoundnessParameter::new(&group, config.soundness_bits)?;
        Ok(Self {
            group,
            soundness,
            span: config.span,
            phantom: core::marker::PhantomData,
        })
    }

    /// The validated soundness parameter.
    pub fn soundness(&self) -> SoundnessParameter {
        self.soundness
    }

    /// Samples the randomness `r` and returns the first message `a = φ(r)`.
    ///
    /// A witness that does not satisfy the relation is rejected before anything is sent,
    /// with [`ProtocolError::InvalidInput`] holding [`InvalidInput::WitnessMismatch`].
    /// It is not a [`ProtocolError::Construction`] error.
    pub fn first_message(
        &self,
        rng: &mut impl CryptoRngCore,
        statement: &R::Statement,
        witness: &G::Scalar,
    ) -> Result<(SigmaProverState<G>, R::FirstMessage), ProtocolError> {
        if !R::holds(&self.group, statement, witness) {
            return Err(InvalidInput::WitnessMismatch.into());
        }
        let randomness = Secret::init_with(|| self.group.random_scalar(rng));
        let a = R::commit(&self.group, statement, randomness.expose_secret());
        tracing::trace!(parent: &self.span, "sigma first message computed");
        let state = SigmaProverState {
            randomness,
            witness: Secret::init_with(|| witness.clone()),
        };
        Ok((state, a))
    }

    /// Computes `z = r + e·w mod q`. The state is consumed so that `r` is never reused.
    pub fn respond(&self, state: SigmaProverState<G>, challenge: &Challenge) -> Result<G::Scalar, ProtocolError> {
        challenge.check_len(self.soundness)?;
        let e = challenge.to_scalar(&self.group);
        let ew = self.group.scalar_mul(&e, state.witness.expose_secret());
        Ok(self.group.scalar_add(state.randomness.expose_secret(), &ew))
    }
}

/// The verifier's computations, independent of the transport.
#[derive_where(Debug, Clone)]
pub struct SigmaVerifierComputation<G: DlogGroup, R: SigmaRelation<G>> {
    group: G,
    soundness: SoundnessParameter,
    span: Span,
    phantom: core::marker::PhantomData<fn() -> R>,
}

impl<G: DlogGroup, R: SigmaRelation<G>> SigmaVerifierComputation<G, R> {
    /// Creates the verifier, validating the soundness parameter.
    pub fn new(group: G, config: SigmaConfig) -> Result<Self, ConstructionError> {
        let soundness = SoundnessParameter::new(&group, config.soundness_bits)?;
        Ok(Self {
            group,
            soundness,
            span: config.span,
            phantom: core::marker::PhantomData,
        })
    }

    /// The validated soundness parameter.
    pub fn soundness(&self) -> SoundnessParameter {
        self.soundness
    }

    /// Samples `e` uniformly from `{0,1}^t`.
    pub fn sample_challenge(&self, rng: &mut impl CryptoRngCore) -> Challenge {
        Challenge::random(rng, self.soundness)
    }

    /// Accepts iff the transcript satisfies the relation's verification equations.
    pub fn verify(&self, statement: &R::Statement, a: &R::FirstMessage, e: &Challenge, z: &G::Scalar) -> bool {
        if e.check_len(self.soundness).is_err() {
            tracing::warn!(parent: &self.span, "challenge of invalid length");
            return false;
        }
        if !R::statement_is_valid(&self.group, statement) {
            tracing::warn!(parent: &self.span, "statement contains non-members");
            return false;
        }
        if !R::first_message_elements(a)
            .iter()
            .all(|element| self.group.is_member(element))
        {
            tracing::warn!(parent: &self.span, "first message contains non-members");
            return false;
        }
        let accepted = R::check(&self.group, statement, a, &e.to_scalar(&self.group), z);
        tracing::debug!(parent: &self.span, accepted, "sigma verification");
        accepted
    }
}

/// Produces accepting transcripts without the witness.
#[derive_where(Debug, Clone)]
pub struct SigmaSimulator<G: DlogGroup, R: SigmaRelation<G>> {
    group: G,
    soundness: SoundnessParameter,
    span: Span,
    phantom: core::marker::PhantomData<fn() -> R>,
}

impl<G: DlogGroup, R: SigmaRelation<G>> SigmaSimulator<G, R> {
    /// Creates the simulator, validating the soundness parameter.
    pub fn new(group: G, config: SigmaConfig) -> Result<Self, ConstructionError> {
        let soundness = SoundnessParameter::new(&group, config.soundness_bits)?;
        Ok(Self {
            group,
            soundness,
            span: config.span,
            phantom: core::marker::PhantomData,
        })
    }

    /// The validated soundness parameter.
    pub fn soundness(&self) -> SoundnessParameter {
        self.soundness
    }

    /// Samples `z` uniformly and back-solves `a` for the given challenge
    /// (or a freshly sampled one if `challenge` is `None`).
    ///
    /// A supplied challenge of the wrong length is a cheating attempt.
    pub fn simulate(
        &self,
        rng: &mut impl CryptoRngCore,
        statement: &R::Statement,
        challenge: Option<&Challenge>,
    ) -> Result<SigmaTranscript<G, R>, ProtocolError> {
        let e = match challenge {
            Some(challenge) => {
                if let Err(err) = challenge.check_len(self.soundness) {
                    tracing::warn!(parent: &self.span, %err, "simulator received an invalid challenge");
                    return Err(err.into());
                }
                challenge.clone()
            }
            None => Challenge::random(rng, self.soundness),
        };
        let z = self.group.random_scalar(rng);
        let a = R::back_solve(&self.group, statement, &e.to_scalar(&self.group), &z);
        Ok(SigmaTranscript { a, e, z })
    }
}
