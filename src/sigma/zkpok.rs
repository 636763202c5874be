//! Zero-knowledge proofs of knowledge from Sigma-protocols.
//!
//! The verifier commits to its challenge with a Pedersen commitment whose trapdoor the prover holds,
//! so the challenge is fixed before the prover's first message:
//!
//! 1. P → V: `h = g^τ`
//! 2. V → P: `Com_h(e)`
//! 3. P → V: `a`
//! 4. V → P: opening of `e`
//! 5. P → V: `z`, `τ`
//!
//! The verifier accepts iff `g^τ == h` and `(a, e, z)` is accepting.
//! A simulator knowing `τ` can equivocate the commitment, which makes the proof
//! zero-knowledge against any verifier, and extraction works by rewinding.

use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use super::{
    Challenge, SigmaConfig, SigmaFirstMessage, SigmaProverComputation, SigmaRelation, SigmaResponse,
    SigmaVerifierComputation,
};
use crate::{
    channel::Channel,
    commitment::{
        pedersen::{PedersenCommitter, PedersenReceiver},
        CommitReceiver, CommitValue, Committer, SessionId,
    },
    error::{CheatAttempt, ConstructionError, ProtocolError},
    group::{DlogGroup, EncodedScalar},
};

const CHALLENGE_SESSION: SessionId = SessionId::new(0);

/// The prover's last message: the Sigma response and the commitment trapdoor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkPokResponse {
    z: SigmaResponse,
    trapdoor: EncodedScalar,
}

/// The prover side of a zero-knowledge proof of knowledge.
#[derive(Debug)]
pub struct ZkPokProver<G: DlogGroup, R: SigmaRelation<G>, C: Channel> {
    computation: SigmaProverComputation<G, R>,
    config: SigmaConfig,
    channel: C,
}

impl<G: DlogGroup, R: SigmaRelation<G>, C: Channel> ZkPokProver<G, R, C> {
    /// Creates the prover, validating the soundness parameter.
    pub fn new(group: G, config: SigmaConfig, channel: C) -> Result<Self, ConstructionError> {
        Ok(Self {
            computation: SigmaProverComputation::new(group, config.clone())?,
            config,
            channel,
        })
    }

    /// Proves knowledge of `witness` for `statement`.
    pub fn prove(
        &mut self,
        rng: &mut impl CryptoRngCore,
        statement: &R::Statement,
        witness: &G::Scalar,
    ) -> Result<(), ProtocolError> {
        let group = &self.computation.group;
        // Fail on a bad witness before anything is sent.
        let (state, a) = self.computation.first_message(rng, statement, witness)?;

        let mut receiver = PedersenReceiver::setup(rng, group.clone(), self.config.clone(), &mut self.channel)?;
        let id = receiver.receive_commitment()?;
        if id != CHALLENGE_SESSION {
            return Err(CheatAttempt::SessionMismatch {
                expected: CHALLENGE_SESSION.value(),
                received: id.value(),
            }
            .report(&self.config.span));
        }

        receiver
            .channel_mut()
            .send(&SigmaFirstMessage::encode::<G, R>(group, &a))?;

        let committed = receiver.receive_decommitment(rng, id)?;
        let e = Challenge::from_scalar_encoding(&committed.to_bytes(), self.computation.soundness())
            .map_err(|err| err.report(&self.config.span))?;
        let z = self.computation.respond(state, &e)?;

        let response = ZkPokResponse {
            z: SigmaResponse::new(group, &z),
            trapdoor: EncodedScalar::new(group, receiver.trapdoor()),
        };
        receiver.channel_mut().send(&response)?;

        tracing::debug!(parent: &self.config.span, "zkpok sent");
        Ok(())
    }

    /// Releases the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

/// The verifier side of a zero-knowledge proof of knowledge.
#[derive(Debug)]
pub struct ZkPokVerifier<G: DlogGroup, R: SigmaRelation<G>, C: Channel> {
    computation: SigmaVerifierComputation<G, R>,
    config: SigmaConfig,
    channel: C,
}

impl<G: DlogGroup, R: SigmaRelation<G>, C: Channel> ZkPokVerifier<G, R, C> {
    /// Creates the verifier, validating the soundness parameter.
    pub fn new(group: G, config: SigmaConfig, channel: C) -> Result<Self, ConstructionError> {
        Ok(Self {
            computation: SigmaVerifierComputation::new(group, config.clone())?,
            config,
            channel,
        })
    }

    /// Runs the protocol and returns whether the prover convinced us.
    ///
    /// Malformed messages are reported as cheating attempts;
    /// a wrong trapdoor or a rejected transcript yield `Ok(false)`.
    pub fn verify(&mut self, rng: &mut impl CryptoRngCore, statement: &R::Statement) -> Result<bool, ProtocolError> {
        let group = &self.computation.group;
        let mut committer = PedersenCommitter::setup(group.clone(), self.config.clone(), &mut self.channel)?;

        let e = self.computation.sample_challenge(rng);
        let committed = committer.generate_commit_value(e.as_bytes())?;
        committer.commit(rng, committed, CHALLENGE_SESSION)?;

        let a = committer
            .channel_mut()
            .receive::<SigmaFirstMessage>()?
            .decode::<G, R>(group)
            .map_err(|err| err.report(&self.config.span))?;
        committer.decommit(rng, CHALLENGE_SESSION)?;

        let response: ZkPokResponse = committer.channel_mut().receive()?;
        let z = response.z.decode(group).map_err(|err| err.report(&self.config.span))?;
        let trapdoor = group
            .decode_received_scalar(&response.trapdoor, "trapdoor")
            .map_err(|err| err.report(&self.config.span))?;

        if !committer.validate_trapdoor(&trapdoor) {
            tracing::warn!(parent: &self.config.span, "{}", CheatAttempt::InvalidTrapdoor);
            return Ok(false);
        }
        Ok(self.computation.verify(statement, &a, &e, &z))
    }

    /// Releases the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use rand_core::OsRng;

    use super::{ZkPokProver, ZkPokVerifier};
    use crate::{
        channel::LocalChannel,
        error::{InvalidInput, ProtocolError},
        group::{DlogGroup, Secp256k1Group, ZpGroup},
        sigma::{DhRelation, DhStatement, DlogRelation, DlogStatement, SigmaConfig, SigmaRelation},
    };

    fn run<G, R>(group: G, bits: u32, statement: R::Statement, witness: G::Scalar) -> (Result<(), ProtocolError>, bool)
    where
        G: DlogGroup + Send + 'static,
        G::Scalar: Send + 'static,
        R: SigmaRelation<G> + 'static,
        R::Statement: Send + 'static,
    {
        let (prover_channel, verifier_channel) = LocalChannel::pair();
        let prover_group = group.clone();
        let prover_statement = statement.clone();
        let prover = thread::spawn(move || {
            let mut prover =
                ZkPokProver::<G, R, _>::new(prover_group, SigmaConfig::with_soundness(bits), prover_channel).unwrap();
            prover.prove(&mut OsRng, &prover_statement, &witness)
        });

        let mut verifier =
            ZkPokVerifier::<G, R, _>::new(group, SigmaConfig::with_soundness(bits), verifier_channel).unwrap();
        let accepted = verifier.verify(&mut OsRng, &statement);
        let proven = prover.join().unwrap();
        (proven, accepted.unwrap_or(false))
    }

    #[test]
    fn dh_tuple_proof() {
        let group = ZpGroup::test_62bit();
        let w = group.random_scalar(&mut OsRng);
        let h = group.exponentiate_generator(&group.random_scalar(&mut OsRng));
        let statement = DhStatement {
            u: group.exponentiate_generator(&w),
            v: group.exponentiate(&h, &w),
            h,
        };
        let (proven, accepted) = run::<_, DhRelation>(group, 40, statement, w);
        proven.unwrap();
        assert!(accepted);
    }

    #[test]
    fn dlog_proof_over_secp256k1() {
        let group = Secp256k1Group;
        let w = group.random_scalar(&mut OsRng);
        let statement = DlogStatement {
            h: group.exponentiate_generator(&w),
        };
        let (proven, accepted) = run::<_, DlogRelation>(group, SigmaConfig::DEFAULT_SOUNDNESS_BITS, statement, w);
        proven.unwrap();
        assert!(accepted);
    }

    #[test]
    fn invalid_witness_is_local_error() {
        let group = ZpGroup::test_62bit();
        let w = group.random_scalar(&mut OsRng);
        let statement = DlogStatement {
            h: group.exponentiate_generator(&group.scalar_add(&w, &group.scalar_one())),
        };

        let (prover_channel, _verifier_channel) = LocalChannel::pair();
        let mut prover =
            ZkPokProver::<_, DlogRelation, _>::new(group, SigmaConfig::with_soundness(40), prover_channel).unwrap();
        assert_eq!(
            prover.prove(&mut OsRng, &statement, &w),
            Err(ProtocolError::InvalidInput(InvalidInput::WitnessMismatch))
        );
    }
}
