//! Hash-based commitments `c = H(id, r, x)` to byte strings,
//! with `r` fresh random bytes and `H` a collision-resistant XOF.
//!
//! Hiding holds in the random-oracle model; binding follows from collision resistance.

use alloc::boxed::Box;
use core::marker::PhantomData;

use derive_where::derive_where;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use serde_encoded_bytes::{Hex, SliceLike};
use sha3::Shake256;

use super::{
    ByteValue, CommitReceiver, CommitValue, CommitmentConfig, CommitmentPhaseValues, Committer, SessionId,
    SessionStore,
};
use crate::{
    channel::Channel,
    error::{CheatAttempt, InvalidInput, ProtocolError},
    tools::hashing::{Chain, CollisionResistant, HashOutput, XofHasher},
};

const HASH_DST: &[u8] = b"hash-commitment";
const RANDOMNESS_LEN: usize = 32;
const DIGEST_LEN: usize = 32;
const RANDOM_VALUE_LEN: usize = 32;

/// The commit-phase message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCommitmentMessage {
    id: SessionId,
    c: HashOutput,
}

/// The decommit-phase message: the randomness and the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDecommitmentMessage {
    id: SessionId,
    #[serde(with = "SliceLike::<Hex>")]
    r: Box<[u8]>,
    #[serde(with = "SliceLike::<Hex>")]
    x: Box<[u8]>,
}

fn digest<D: CollisionResistant>(id: SessionId, r: &[u8], x: &[u8]) -> HashOutput {
    XofHasher::<D>::new_with_dst(HASH_DST)
        .chain(&id)
        .chain_bytes(r)
        .chain_bytes(x)
        .finalize(DIGEST_LEN)
}

/// The committing side of the hash-based scheme.
#[derive_where(Debug; C)]
pub struct HashCommitter<C: Channel, D: CollisionResistant = Shake256> {
    config: CommitmentConfig,
    channel: C,
    sessions: SessionStore<CommitmentPhaseValues<ByteValue, [u8; RANDOMNESS_LEN], HashOutput>>,
    phantom: PhantomData<fn() -> D>,
}

impl<C: Channel, D: CollisionResistant> HashCommitter<C, D> {
    /// Creates the committer. The scheme needs no setup messages.
    pub fn new(config: CommitmentConfig, channel: C) -> Self {
        Self {
            config,
            channel,
            sessions: SessionStore::new(),
            phantom: PhantomData,
        }
    }
}

impl<C: Channel, D: CollisionResistant> Committer for HashCommitter<C, D> {
    type Value = ByteValue;
    type Randomness = [u8; RANDOMNESS_LEN];
    type Commitment = HashOutput;
    type PreProcessValues = ();

    fn commit(&mut self, rng: &mut impl CryptoRngCore, value: Self::Value, id: SessionId) -> Result<(), ProtocolError> {
        if self.sessions.get(id).is_some() {
            return Err(InvalidInput::DuplicateSessionId(id.value()).into());
        }

        let mut r = [0u8; RANDOMNESS_LEN];
        rng.fill_bytes(&mut r);
        let c = digest::<D>(id, &r, value.as_bytes());
        self.channel.send(&HashCommitmentMessage { id, c: c.clone() })?;

        tracing::debug!(parent: &self.config.span, session = %id, "hash commitment sent");
        self.sessions.insert_new(id, CommitmentPhaseValues::new(value, r, c));
        Ok(())
    }

    fn decommit(&mut self, _rng: &mut impl CryptoRngCore, id: SessionId) -> Result<(), ProtocolError> {
        let record = self.sessions.get(id).ok_or(InvalidInput::UnknownSessionId(id.value()))?;
        self.channel.send(&HashDecommitmentMessage {
            id,
            r: record.randomness().as_slice().into(),
            x: record.value().to_bytes(),
        })?;
        tracing::debug!(parent: &self.config.span, session = %id, "hash decommitment sent");
        Ok(())
    }

    fn sample_random_commit_value(&self, rng: &mut impl CryptoRngCore) -> Self::Value {
        let mut bytes = [0u8; RANDOM_VALUE_LEN];
        rng.fill_bytes(&mut bytes);
        ByteValue::new(bytes.as_slice())
    }

    fn generate_commit_value(&self, bytes: &[u8]) -> Result<Self::Value, ProtocolError> {
        Ok(ByteValue::new(bytes))
    }

    fn commitment_phase_values(
        &self,
        id: SessionId,
    ) -> Option<&CommitmentPhaseValues<Self::Value, Self::Randomness, Self::Commitment>> {
        self.sessions.get(id)
    }

    fn pre_process_values(&self) -> &Self::PreProcessValues {
        &()
    }

    fn close_session(
        &mut self,
        id: SessionId,
    ) -> Option<CommitmentPhaseValues<Self::Value, Self::Randomness, Self::Commitment>> {
        self.sessions.remove(id)
    }
}

/// The receiving side of the hash-based scheme.
#[derive_where(Debug; C)]
pub struct HashReceiver<C: Channel, D: CollisionResistant = Shake256> {
    config: CommitmentConfig,
    channel: C,
    commitments: SessionStore<HashOutput>,
    phantom: PhantomData<fn() -> D>,
}

impl<C: Channel, D: CollisionResistant> HashReceiver<C, D> {
    /// Creates the receiver. The scheme needs no setup messages.
    pub fn new(config: CommitmentConfig, channel: C) -> Self {
        Self {
            config,
            channel,
            commitments: SessionStore::new(),
            phantom: PhantomData,
        }
    }
}

impl<C: Channel, D: CollisionResistant> CommitReceiver for HashReceiver<C, D> {
    type Value = ByteValue;
    type Commitment = HashOutput;
    type PreProcessValues = ();

    fn receive_commitment(&mut self) -> Result<SessionId, ProtocolError> {
        let message: HashCommitmentMessage = self.channel.receive()?;
        let span = &self.config.span;
        if !self.commitments.insert_new(message.id, message.c) {
            return Err(CheatAttempt::DuplicateCommitment(message.id.value()).report(span));
        }
        tracing::debug!(parent: span, session = %message.id, "hash commitment received");
        Ok(message.id)
    }

    fn receive_decommitment(
        &mut self,
        _rng: &mut impl CryptoRngCore,
        id: SessionId,
    ) -> Result<Self::Value, ProtocolError> {
        let c = self
            .commitments
            .get(id)
            .cloned()
            .ok_or(InvalidInput::UnknownSessionId(id.value()))?;
        let message: HashDecommitmentMessage = self.channel.receive()?;

        let span = &self.config.span;
        if message.id != id {
            return Err(CheatAttempt::SessionMismatch {
                expected: id.value(),
                received: message.id.value(),
            }
            .report(span));
        }
        if digest::<D>(id, &message.r, &message.x) != c {
            return Err(CheatAttempt::DecommitmentMismatch(id.value()).report(span));
        }

        tracing::debug!(parent: span, session = %id, "hash decommitment accepted");
        Ok(ByteValue::new(message.x))
    }

    fn commitment(&self, id: SessionId) -> Option<&Self::Commitment> {
        self.commitments.get(id)
    }

    fn pre_process_values(&self) -> &Self::PreProcessValues {
        &()
    }

    fn close_session(&mut self, id: SessionId) -> Option<Self::Commitment> {
        self.commitments.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::ChaCha8Rng;
    use rand_core::{OsRng, SeedableRng};
    use sha3::{Shake128, Shake256};

    use super::{HashCommitter, HashDecommitmentMessage, HashReceiver};
    use crate::{
        channel::{Channel, LocalChannel},
        commitment::{ByteValue, CommitReceiver, CommitmentConfig, Committer, SessionId},
        error::{CheatAttempt, ProtocolError},
    };

    #[test]
    fn commit_and_decommit() {
        let (committer_channel, receiver_channel) = LocalChannel::pair();
        let mut committer = HashCommitter::<_, Shake256>::new(CommitmentConfig::default(), committer_channel);
        let mut receiver = HashReceiver::<_, Shake256>::new(CommitmentConfig::default(), receiver_channel);
        let id = SessionId::new(1);

        let value = committer.generate_commit_value(b"a committed value").unwrap();
        committer.commit(&mut OsRng, value.clone(), id).unwrap();
        assert_eq!(receiver.receive_commitment().unwrap(), id);
        committer.decommit(&mut OsRng, id).unwrap();
        assert_eq!(receiver.receive_decommitment(&mut OsRng, id).unwrap(), value);
    }

    #[test]
    fn commitments_of_equal_length_values_look_alike() {
        let (committer_channel, receiver_channel) = LocalChannel::pair();
        let mut committer = HashCommitter::<_, Shake128>::new(CommitmentConfig::default(), committer_channel);
        let mut receiver = HashReceiver::<_, Shake128>::new(CommitmentConfig::default(), receiver_channel);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (left, right) = (SessionId::new(1), SessionId::new(2));

        committer.commit(&mut rng, ByteValue::new(b"left".as_slice()), left).unwrap();
        committer.commit(&mut rng, ByteValue::new(b"rite".as_slice()), right).unwrap();
        assert_eq!(receiver.receive_commitment().unwrap(), left);
        assert_eq!(receiver.receive_commitment().unwrap(), right);

        let first: &[u8] = receiver.commitment(left).unwrap().as_ref();
        let second: &[u8] = receiver.commitment(right).unwrap().as_ref();
        assert_eq!(first.len(), second.len());
        assert_ne!(first, second);

        committer.decommit(&mut rng, left).unwrap();
        committer.decommit(&mut rng, right).unwrap();
        assert_eq!(receiver.receive_decommitment(&mut rng, left).unwrap(), ByteValue::new(b"left".as_slice()));
        assert_eq!(receiver.receive_decommitment(&mut rng, right).unwrap(), ByteValue::new(b"rite".as_slice()));
    }

    #[test]
    fn opening_to_another_value_is_cheating() {
        let (committer_channel, receiver_channel) = LocalChannel::pair();
        let mut committer = HashCommitter::<_, Shake256>::new(CommitmentConfig::default(), committer_channel);
        let mut receiver = HashReceiver::<_, Shake256>::new(CommitmentConfig::default(), receiver_channel);
        let id = SessionId::new(5);

        committer
            .commit(&mut OsRng, ByteValue::new(b"yes".as_slice()), id)
            .unwrap();
        receiver.receive_commitment().unwrap();

        let r = committer.commitment_phase_values(id).unwrap().randomness().as_slice().into();
        committer
            .channel
            .send(&HashDecommitmentMessage {
                id,
                r,
                x: b"no".as_slice().into(),
            })
            .unwrap();
        assert_eq!(
            receiver.receive_decommitment(&mut OsRng, id),
            Err(ProtocolError::CheatAttempt(CheatAttempt::DecommitmentMismatch(5)))
        );
    }
}
