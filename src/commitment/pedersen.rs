//! Pedersen commitments `c = g^r · h^x` to exponents `x ∈ Z_q`.
//!
//! The receiver picks the commitment key `h = g^τ` and keeps `τ` as a trapdoor:
//! the commitment is perfectly hiding, and binding as long as the committer
//! cannot compute `log_g h`. Whoever knows `τ` can open a commitment to any value,
//! which is what the zero-knowledge proof of knowledge relies on.

use alloc::vec;

use derive_where::derive_where;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use super::{
    CommitReceiver, CommitmentPhaseValues, Committer, CommitterWithProofs, ExponentValue, ReceiverWithProofs,
    SessionId, SessionStore,
};
use crate::{
    channel::Channel,
    error::{CheatAttempt, InvalidInput, ProtocolError},
    group::{DlogGroup, EncodedElement, EncodedScalar},
    sigma::{DlogRelation, DlogStatement, SigmaConfig, SigmaProver, SigmaVerifier, SoundnessParameter},
    tools::Secret,
};

/// The receiver's commitment key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedersenSetupMessage {
    h: EncodedElement,
}

/// The commit-phase message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedersenCommitmentMessage {
    id: SessionId,
    c: EncodedElement,
}

/// The decommit-phase message: the value and the randomness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedersenDecommitmentMessage {
    id: SessionId,
    x: EncodedScalar,
    r: EncodedScalar,
}

/// The value sent before a proof of the committed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedersenValueMessage {
    id: SessionId,
    x: EncodedScalar,
}

/// The commitment key `(g, h)`.
#[derive_where(Debug, Clone, PartialEq)]
pub struct PedersenKey<G: DlogGroup> {
    /// The group generator.
    pub g: G::Element,
    /// The receiver-chosen second base.
    pub h: G::Element,
}

/// Parses big-endian bytes of any length as an exponent, rejecting integers `>= q`.
fn exponent_from_bytes<G: DlogGroup>(group: &G, bytes: &[u8]) -> Option<G::Scalar> {
    let width = group.encode_scalar(&group.scalar_one()).len();
    let significant = bytes
        .iter()
        .position(|byte| *byte != 0)
        .map_or(&[][..], |start| &bytes[start..]);
    if significant.len() > width {
        return None;
    }
    let mut padded = vec![0u8; width];
    padded[width - significant.len()..].copy_from_slice(significant);
    group.decode_scalar(&padded)
}

fn commitment_element<G: DlogGroup>(group: &G, key: &PedersenKey<G>, x: &G::Scalar, r: &G::Scalar) -> G::Element {
    group.multiply(&group.exponentiate(&key.g, r), &group.exponentiate(&key.h, x))
}

/// The statement `c · h^(-x) = g^r` proven when revealing `x` without `r`.
fn opening_statement<G: DlogGroup>(group: &G, key: &PedersenKey<G>, c: &G::Element, x: &G::Scalar) -> DlogStatement<G> {
    DlogStatement {
        h: group.multiply(c, &group.exponentiate_inverse(&key.h, x)),
    }
}

type PedersenPhaseValues<G> =
    CommitmentPhaseValues<ExponentValue<G>, <G as DlogGroup>::Scalar, <G as DlogGroup>::Element>;

/// The committing side of the Pedersen scheme.
#[derive_where(Debug; C)]
pub struct PedersenCommitter<G: DlogGroup, C: Channel> {
    group: G,
    key: PedersenKey<G>,
    config: SigmaConfig,
    channel: C,
    sessions: SessionStore<PedersenPhaseValues<G>>,
}

impl<G: DlogGroup, C: Channel> PedersenCommitter<G, C> {
    /// Receives the commitment key from the receiver.
    ///
    /// The soundness parameter in `config` is used by [`CommitterWithProofs::prove_committed_value`].
    pub fn setup(group: G, config: SigmaConfig, mut channel: C) -> Result<Self, ProtocolError> {
        SoundnessParameter::new(&group, config.soundness_bits)?;

        let message: PedersenSetupMessage = channel.receive()?;
        let h = group
            .decode_member(&message.h, "h")
            .map_err(|err| err.report(&config.span))?;
        tracing::debug!(parent: &config.span, "pedersen commitment key received");

        Ok(Self {
            key: PedersenKey {
                g: group.generator(),
                h,
            },
            group,
            config,
            channel,
            sessions: SessionStore::new(),
        })
    }

    /// Checks a revealed trapdoor against the commitment key: `g^τ == h`.
    pub fn validate_trapdoor(&self, trapdoor: &G::Scalar) -> bool {
        self.group.exponentiate(&self.key.g, trapdoor) == self.key.h
    }

    pub(crate) fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    fn record(&self, id: SessionId) -> Result<&PedersenPhaseValues<G>, InvalidInput> {
        self.sessions.get(id).ok_or(InvalidInput::UnknownSessionId(id.value()))
    }
}

impl<G: DlogGroup, C: Channel> Committer for PedersenCommitter<G, C> {
    type Value = ExponentValue<G>;
    type Randomness = G::Scalar;
    type Commitment = G::Element;
    type PreProcessValues = PedersenKey<G>;

    fn commit(&mut self, rng: &mut impl CryptoRngCore, value: Self::Value, id: SessionId) -> Result<(), ProtocolError> {
        if self.sessions.get(id).is_some() {
            return Err(InvalidInput::DuplicateSessionId(id.value()).into());
        }

        let r = Secret::init_with(|| self.group.random_scalar(rng));
        let c = commitment_element(&self.group, &self.key, value.scalar(), r.expose_secret());
        self.channel.send(&PedersenCommitmentMessage {
            id,
            c: EncodedElement::new(&self.group, &c),
        })?;

        tracing::debug!(parent: &self.config.span, session = %id, "pedersen commitment sent");
        self.sessions
            .insert_new(id, CommitmentPhaseValues::new(value, r.expose_secret().clone(), c));
        Ok(())
    }

    fn decommit(&mut self, _rng: &mut impl CryptoRngCore, id: SessionId) -> Result<(), ProtocolError> {
        let record = self.sessions.get(id).ok_or(InvalidInput::UnknownSessionId(id.value()))?;
        self.channel.send(&PedersenDecommitmentMessage {
            id,
            x: EncodedScalar::new(&self.group, record.value().scalar()),
            r: EncodedScalar::new(&self.group, record.randomness()),
        })?;
        tracing::debug!(parent: &self.config.span, session = %id, "pedersen decommitment sent");
        Ok(())
    }

    fn sample_random_commit_value(&self, rng: &mut impl CryptoRngCore) -> Self::Value {
        ExponentValue::new(&self.group, self.group.random_scalar(rng))
    }

    fn generate_commit_value(&self, bytes: &[u8]) -> Result<Self::Value, ProtocolError> {
        let x = exponent_from_bytes(&self.group, bytes).ok_or(InvalidInput::CommitValueOutOfRange)?;
        Ok(ExponentValue::new(&self.group, x))
    }

    fn commitment_phase_values(&self, id: SessionId) -> Option<&PedersenPhaseValues<G>> {
        self.sessions.get(id)
    }

    fn pre_process_values(&self) -> &Self::PreProcessValues {
        &self.key
    }

    fn close_session(&mut self, id: SessionId) -> Option<PedersenPhaseValues<G>> {
        self.sessions.remove(id)
    }
}

impl<G: DlogGroup, C: Channel> CommitterWithProofs for PedersenCommitter<G, C> {
    fn prove_committed_value(&mut self, rng: &mut impl CryptoRngCore, id: SessionId) -> Result<(), ProtocolError> {
        let record = self.record(id)?.clone();
        let x = record.value().scalar();
        self.channel.send(&PedersenValueMessage {
            id,
            x: EncodedScalar::new(&self.group, x),
        })?;

        let statement = opening_statement(&self.group, &self.key, record.commitment(), x);
        let mut prover =
            SigmaProver::<G, DlogRelation, _>::new(self.group.clone(), self.config.clone(), &mut self.channel)?;
        prover.prove(rng, &statement, record.randomness())?;

        tracing::debug!(parent: &self.config.span, session = %id, "committed value proven");
        Ok(())
    }
}

/// The receiving side of the Pedersen scheme, holding the trapdoor `τ = log_g h`.
#[derive_where(Debug; C)]
pub struct PedersenReceiver<G: DlogGroup, C: Channel> {
    group: G,
    key: PedersenKey<G>,
    trapdoor: Secret<G::Scalar>,
    config: SigmaConfig,
    channel: C,
    commitments: SessionStore<G::Element>,
}

impl<G: DlogGroup, C: Channel> PedersenReceiver<G, C> {
    /// Samples the trapdoor `τ` and sends the commitment key `h = g^τ` to the committer.
    ///
    /// The soundness parameter in `config` is used by [`ReceiverWithProofs::verify_committed_value`].
    pub fn setup(
        rng: &mut impl CryptoRngCore,
        group: G,
        config: SigmaConfig,
        mut channel: C,
    ) -> Result<Self, ProtocolError> {
        SoundnessParameter::new(&group, config.soundness_bits)?;

        let trapdoor = Secret::init_with(|| group.random_scalar(rng));
        let key = PedersenKey {
            g: group.generator(),
            h: group.exponentiate_generator(trapdoor.expose_secret()),
        };
        channel.send(&PedersenSetupMessage {
            h: EncodedElement::new(&group, &key.h),
        })?;
        tracing::debug!(parent: &config.span, "pedersen commitment key sent");

        Ok(Self {
            group,
            key,
            trapdoor,
            config,
            channel,
            commitments: SessionStore::new(),
        })
    }

    /// The trapdoor `τ` with `h = g^τ`.
    pub fn trapdoor(&self) -> &G::Scalar {
        self.trapdoor.expose_secret()
    }

    pub(crate) fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    fn known_commitment(&self, id: SessionId) -> Result<G::Element, InvalidInput> {
        self.commitments
            .get(id)
            .cloned()
            .ok_or(InvalidInput::UnknownSessionId(id.value()))
    }

    fn check_session(&self, expected: SessionId, received: SessionId) -> Result<(), ProtocolError> {
        if expected == received {
            Ok(())
        } else {
            Err(CheatAttempt::SessionMismatch {
                expected: expected.value(),
                received: received.value(),
            }
            .report(&self.config.span))
        }
    }
}

impl<G: DlogGroup, C: Channel> CommitReceiver for PedersenReceiver<G, C> {
    type Value = ExponentValue<G>;
    type Commitment = G::Element;
    type PreProcessValues = PedersenKey<G>;

    fn receive_commitment(&mut self) -> Result<SessionId, ProtocolError> {
        let message: PedersenCommitmentMessage = self.channel.receive()?;
        let span = &self.config.span;
        let c = self.group.decode_member(&message.c, "c").map_err(|err| err.report(span))?;
        if !self.commitments.insert_new(message.id, c) {
            return Err(CheatAttempt::DuplicateCommitment(message.id.value()).report(span));
        }
        tracing::debug!(parent: span, session = %message.id, "pedersen commitment received");
        Ok(message.id)
    }

    fn receive_decommitment(
        &mut self,
        _rng: &mut impl CryptoRngCore,
        id: SessionId,
    ) -> Result<Self::Value, ProtocolError> {
        let c = self.known_commitment(id)?;
        let message: PedersenDecommitmentMessage = self.channel.receive()?;
        self.check_session(id, message.id)?;

        let span = &self.config.span;
        let x = self
            .group
            .decode_received_scalar(&message.x, "x")
            .map_err(|err| err.report(span))?;
        let r = self
            .group
            .decode_received_scalar(&message.r, "r")
            .map_err(|err| err.report(span))?;
        if commitment_element(&self.group, &self.key, &x, &r) != c {
            return Err(CheatAttempt::DecommitmentMismatch(id.value()).report(span));
        }

        tracing::debug!(parent: span, session = %id, "pedersen decommitment accepted");
        Ok(ExponentValue::new(&self.group, x))
    }

    fn commitment(&self, id: SessionId) -> Option<&Self::Commitment> {
        self.commitments.get(id)
    }

    fn pre_process_values(&self) -> &Self::PreProcessValues {
        &self.key
    }

    fn close_session(&mut self, id: SessionId) -> Option<Self::Commitment> {
        self.commitments.remove(id)
    }
}

impl<G: DlogGroup, C: Channel> ReceiverWithProofs for PedersenReceiver<G, C> {
    fn verify_committed_value(
        &mut self,
        rng: &mut impl CryptoRngCore,
        id: SessionId,
    ) -> Result<Self::Value, ProtocolError> {
        let c = self.known_commitment(id)?;
        let message: PedersenValueMessage = self.channel.receive()?;
        self.check_session(id, message.id)?;
        let x = self
            .group
            .decode_received_scalar(&message.x, "x")
            .map_err(|err| err.report(&self.config.span))?;

        let statement = opening_statement(&self.group, &self.key, &c, &x);
        let mut verifier =
            SigmaVerifier::<G, DlogRelation, _>::new(self.group.clone(), self.config.clone(), &mut self.channel)?;
        if !verifier.verify(rng, &statement)? {
            return Err(CheatAttempt::InvalidProof.report(&self.config.span));
        }

        tracing::debug!(parent: &self.config.span, session = %id, "committed value verified");
        Ok(ExponentValue::new(&self.group, x))
    }
}
