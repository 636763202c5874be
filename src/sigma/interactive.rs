//! Running a Sigma-protocol over a channel: `a` → `e` → `z`.
//!
//! This is the plain (honest-verifier zero-knowledge) execution.
//! For a proof that stays zero-knowledge against a malicious verifier use [`super::ZkPokProver`].

use rand_core::CryptoRngCore;

use super::{
    Challenge, SigmaConfig, SigmaFirstMessage, SigmaProverComputation, SigmaRelation, SigmaResponse,
    SigmaVerifierComputation,
};
use crate::{
    channel::Channel,
    error::{ConstructionError, ProtocolError},
    group::DlogGroup,
};

/// The prover side of an interactive Sigma-protocol.
#[derive(Debug)]
pub struct SigmaProver<G: DlogGroup, R: SigmaRelation<G>, C: Channel> {
    computation: SigmaProverComputation<G, R>,
    channel: C,
}

impl<G: DlogGroup, R: SigmaRelation<G>, C: Channel> SigmaProver<G, R, C> {
    /// Creates the prover, validating the soundness parameter.
    pub fn new(group: G, config: SigmaConfig, channel: C) -> Result<Self, ConstructionError> {
        Ok(Self {
            computation: SigmaProverComputation::new(group, config)?,
            channel,
        })
    }

    /// Proves that `witness` satisfies the relation for `statement`.
    pub fn prove(
        &mut self,
        rng: &mut impl CryptoRngCore,
        statement: &R::Statement,
        witness: &G::Scalar,
    ) -> Result<(), ProtocolError> {
        let group = &self.computation.group;
        let (state, a) = self.computation.first_message(rng, statement, witness)?;
        self.channel.send(&SigmaFirstMessage::encode::<G, R>(group, &a))?;

        let e: Challenge = self.channel.receive()?;
        let z = self.computation.respond(state, &e).inspect_err(|err| {
            tracing::warn!(parent: &self.computation.span, %err, "sigma prover aborted");
        })?;
        self.channel.send(&SigmaResponse::new(group, &z))?;

        tracing::debug!(parent: &self.computation.span, "sigma proof sent");
        Ok(())
    }

    /// Releases the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

/// The verifier side of an interactive Sigma-protocol.
#[derive(Debug)]
pub struct SigmaVerifier<G: DlogGroup, R: SigmaRelation<G>, C: Channel> {
    computation: SigmaVerifierComputation<G, R>,
    channel: C,
}

impl<G: DlogGroup, R: SigmaRelation<G>, C: Channel> SigmaVerifier<G, R, C> {
    /// Creates the verifier, validating the soundness parameter.
    pub fn new(group: G, config: SigmaConfig, channel: C) -> Result<Self, ConstructionError> {
        Ok(Self {
            computation: SigmaVerifierComputation::new(group, config)?,
            channel,
        })
    }

    /// Runs the protocol and returns whether the prover convinced us.
    ///
    /// Malformed messages (non-member elements, non-canonical responses) are reported as
    /// cheating attempts; a well-formed but wrong proof yields `Ok(false)`.
    pub fn verify(&mut self, rng: &mut impl CryptoRngCore, statement: &R::Statement) -> Result<bool, ProtocolError> {
        let group = &self.computation.group;
        let span = &self.computation.span;
        let a = self
            .channel
            .receive::<SigmaFirstMessage>()?
            .decode::<G, R>(group)
            .map_err(|err| err.report(span))?;

        let e = self.computation.sample_challenge(rng);
        self.channel.send(&e)?;

        let z = self
            .channel
            .receive::<SigmaResponse>()?
            .decode(group)
            .map_err(|err| err.report(span))?;
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

    use super::{SigmaProver, SigmaVerifier};
    use crate::{
        channel::{Channel, LocalChannel},
        error::{CheatAttempt, ProtocolError},
        group::{DlogGroup, EncodedElement, ZpGroup},
        sigma::{Challenge, DhRelation, DhStatement, SigmaConfig, SigmaFirstMessage},
    };

    fn statement(group: &ZpGroup) -> (DhStatement<ZpGroup>, <ZpGroup as DlogGroup>::Scalar) {
        let w = group.random_scalar(&mut OsRng);
        let h = group.exponentiate_generator(&group.random_scalar(&mut OsRng));
        let statement = DhStatement {
            u: group.exponentiate_generator(&w),
            v: group.exponentiate(&h, &w),
            h,
        };
        (statement, w)
    }

    #[test]
    fn honest_run_is_accepted() {
        let group = ZpGroup::test_62bit();
        let (statement, w) = statement(&group);
        let (prover_channel, verifier_channel) = LocalChannel::pair();

        let prover_statement = statement.clone();
        let prover_group = group.clone();
        let prover = thread::spawn(move || {
            let mut prover =
                SigmaProver::<_, DhRelation, _>::new(prover_group, SigmaConfig::with_soundness(40), prover_channel)
                    .unwrap();
            prover.prove(&mut OsRng, &prover_statement, &w)
        });

        let mut verifier =
            SigmaVerifier::<_, DhRelation, _>::new(group, SigmaConfig::with_soundness(40), verifier_channel).unwrap();
        assert!(verifier.verify(&mut OsRng, &statement).unwrap());
        prover.join().unwrap().unwrap();
    }

    #[test]
    fn non_member_first_message_is_cheating() {
        let group = ZpGroup::test_62bit();
        let (statement, _) = statement(&group);
        let (mut prover_channel, verifier_channel) = LocalChannel::pair();

        // p - 1 is not a quadratic residue modulo a safe prime p = 3 mod 4
        let non_member = EncodedElement::from_bytes((group.modulus() - 1).to_be_bytes());
        let generator = EncodedElement::new(&group, &group.generator());
        prover_channel
            .send(&SigmaFirstMessage {
                elements: alloc::vec![generator, non_member],
            })
            .unwrap();

        let mut verifier =
            SigmaVerifier::<_, DhRelation, _>::new(group, SigmaConfig::with_soundness(40), verifier_channel).unwrap();
        assert_eq!(
            verifier.verify(&mut OsRng, &statement),
            Err(ProtocolError::CheatAttempt(CheatAttempt::NotGroupMember("a")))
        );
    }

    #[test]
    fn prover_rejects_short_challenge() {
        let group = ZpGroup::test_62bit();
        let (statement, w) = statement(&group);
        let (prover_channel, mut verifier_channel) = LocalChannel::pair();

        verifier_channel.send(&Challenge::from_bytes([0u8; 2])).unwrap();
        let mut prover =
            SigmaProver::<_, DhRelation, _>::new(group, SigmaConfig::with_soundness(40), prover_channel).unwrap();
        let result = prover.prove(&mut OsRng, &statement, &w);
        assert!(result.unwrap_err().is_cheat_attempt());
    }
}
