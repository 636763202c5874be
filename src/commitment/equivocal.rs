//! Equivocal commitments built from any committer with proofs.
//!
//! The commit phase is the wrapped scheme's. The decommit phase sends the value and proves
//! in zero knowledge that the commitment opens to it, instead of revealing the randomness.
//! A simulator that can fake the proof can therefore open to a value chosen after the commit phase;
//! the honest roles below are a plain composition and hold no state of their own.

use rand_core::CryptoRngCore;

use super::{
    CommitReceiver, CommitmentPhaseValues, Committer, CommitterWithProofs, ReceiverWithProofs, SessionId,
};
use crate::error::ProtocolError;

/// The committer of the equivocal scheme.
#[derive(Debug)]
pub struct EquivocalCommitter<C: CommitterWithProofs>(C);

impl<C: CommitterWithProofs> EquivocalCommitter<C> {
    /// Wraps a committer with proofs.
    pub fn new(committer: C) -> Self {
        Self(committer)
    }

    /// Returns the wrapped committer.
    pub fn into_inner(self) -> C {
        self.0
    }
}

impl<C: CommitterWithProofs> Committer for EquivocalCommitter<C> {
    type Value = C::Value;
    type Randomness = C::Randomness;
    type Commitment = C::Commitment;
    type PreProcessValues = C::PreProcessValues;

    fn commit(&mut self, rng: &mut impl CryptoRngCore, value: Self::Value, id: SessionId) -> Result<(), ProtocolError> {
        self.0.commit(rng, value, id)
    }

    fn decommit(&mut self, rng: &mut impl CryptoRngCore, id: SessionId) -> Result<(), ProtocolError> {
        self.0.prove_committed_value(rng, id)
    }

    fn sample_random_commit_value(&self, rng: &mut impl CryptoRngCore) -> Self::Value {
        self.0.sample_random_commit_value(rng)
    }

    fn generate_commit_value(&self, bytes: &[u8]) -> Result<Self::Value, ProtocolError> {
        self.0.generate_commit_value(bytes)
    }

    fn commitment_phase_values(
        &self,
        id: SessionId,
    ) -> Option<&CommitmentPhaseValues<Self::Value, Self::Randomness, Self::Commitment>> {
        self.0.commitment_phase_values(id)
    }

    fn pre_process_values(&self) -> &Self::PreProcessValues {
        self.0.pre_process_values()
    }

    fn close_session(
        &mut self,
        id: SessionId,
    ) -> Option<CommitmentPhaseValues<Self::Value, Self::Randomness, Self::Commitment>> {
        self.0.close_session(id)
    }
}

/// The receiver of the equivocal scheme.
#[derive(Debug)]
pub struct EquivocalReceiver<R: ReceiverWithProofs>(R);

impl<R: ReceiverWithProofs> EquivocalReceiver<R> {
    /// Wraps a receiver with proofs.
    pub fn new(receiver: R) -> Self {
        Self(receiver)
    }

    /// Returns the wrapped receiver.
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: ReceiverWithProofs> CommitReceiver for EquivocalReceiver<R> {
    type Value = R::Value;
    type Commitment = R::Commitment;
    type PreProcessValues = R::PreProcessValues;

    fn receive_commitment(&mut self) -> Result<SessionId, ProtocolError> {
        self.0.receive_commitment()
    }

    fn receive_decommitment(
        &mut self,
        rng: &mut impl CryptoRngCore,
        id: SessionId,
    ) -> Result<Self::Value, ProtocolError> {
        self.0.verify_committed_value(rng, id)
    }

    fn commitment(&self, id: SessionId) -> Option<&Self::Commitment> {
        self.0.commitment(id)
    }

    fn pre_process_values(&self) -> &Self::PreProcessValues {
        self.0.pre_process_values()
    }

    fn close_session(&mut self, id: SessionId) -> Option<Self::Commitment> {
        self.0.close_session(id)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use rand_core::OsRng;

    use super::{EquivocalCommitter, EquivocalReceiver};
    use crate::{
        channel::LocalChannel,
        commitment::{
            pedersen::{tests::claim_other_value, PedersenCommitter, PedersenReceiver},
            CommitReceiver, Committer, SessionId,
        },
        error::{CheatAttempt, ProtocolError},
        group::ZpGroup,
        sigma::SigmaConfig,
    };

    fn pedersen() -> (PedersenCommitter<ZpGroup, LocalChannel>, PedersenReceiver<ZpGroup, LocalChannel>) {
        let group = ZpGroup::test_62bit();
        let (committer_channel, receiver_channel) = LocalChannel::pair();
        let receiver =
            PedersenReceiver::setup(&mut OsRng, group.clone(), SigmaConfig::with_soundness(40), receiver_channel)
                .unwrap();
        let committer = PedersenCommitter::setup(group, SigmaConfig::with_soundness(40), committer_channel).unwrap();
        (committer, receiver)
    }

    #[test]
    fn decommitment_is_a_proof_of_the_value() {
        let (committer, receiver) = pedersen();
        let mut committer = EquivocalCommitter::new(committer);
        let mut receiver = EquivocalReceiver::new(receiver);
        let id = SessionId::new(2);

        let value = committer.generate_commit_value(b"\x01\x02").unwrap();
        committer.commit(&mut OsRng, value.clone(), id).unwrap();
        assert_eq!(receiver.receive_commitment().unwrap(), id);

        let committer = thread::spawn(move || {
            committer.decommit(&mut OsRng, id).unwrap();
            committer
        });
        assert_eq!(receiver.receive_decommitment(&mut OsRng, id).unwrap(), value);

        // The randomness never crossed the channel, and the record stays with the committer.
        let committer = committer.join().unwrap();
        assert!(committer.commitment_phase_values(id).is_some());
        assert_eq!(receiver.commitment(id), committer.commitment_phase_values(id).map(|r| r.commitment()));
    }

    #[test]
    fn opening_to_another_value_is_rejected() {
        let (mut committer, receiver) = pedersen();
        let mut receiver = EquivocalReceiver::new(receiver);
        let id = SessionId::new(5);
        let value = committer.generate_commit_value(&[1]).unwrap();
        committer.commit(&mut OsRng, value, id).unwrap();
        receiver.receive_commitment().unwrap();

        let prover = thread::spawn(move || claim_other_value(&mut committer, id, 2));
        assert_eq!(
            receiver.receive_decommitment(&mut OsRng, id),
            Err(ProtocolError::CheatAttempt(CheatAttempt::InvalidProof))
        );
        prover.join().unwrap().unwrap();
    }
}
