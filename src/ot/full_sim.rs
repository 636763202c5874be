//! 1-out-of-2 OT on byte strings with full simulation, based on DDH.
//!
//! Preprocessing (once per pair of parties):
//!
//! 1. R → S: `(g1, h0, h1) = (g^y, g^α0, g1^(α0 + 1))`
//! 2. R proves in zero knowledge that `(g, g1, h0, h1/g1)` is a DH tuple, with witness `α0`.
//!
//! Transfer (any number of times):
//!
//! 1. R → S: `(g', h') = (g_σ^r, h_σ^r)`, where `g_0 = g`.
//! 2. S → R: `(u_i, c_i)` for `i = 0, 1`, where `(u_i, v_i) = RAND(g_i, g', h_i, h')`
//!    and `c_i = x_i ⊕ KDF(v_i)`.
//! 3. R outputs `x_σ = c_σ ⊕ KDF(u_σ^r)`.
//!
//! Here `RAND(w, x, y, z) = (w^s · y^t, x^s · z^t)` with fresh random `s, t`.
//! The proof guarantees `h0 = g^α0` and `h1 = g1^(α0 + 1)`, so at most one of the tuples
//! `(g_i, h_i, g', h')` is a DH tuple. For the other index `v_i` is uniformly random,
//! and `x_i` stays hidden from the receiver.
//!
//! The pure cores ([`OtReceiverCore`], [`OtSenderCore`]) hold the computations;
//! [`OtFullSimReceiver`] and [`OtFullSimSender`] drive them over a channel.

use alloc::boxed::Box;

use derive_where::derive_where;
use rand_core::CryptoRngCore;
use tracing::Span;

use super::{OtConfig, OtOutput, ReceiverSetupMessage, ReceiverTuple, SenderTuple};
use crate::{
    channel::Channel,
    error::{CheatAttempt, ConstructionError, InvalidInput, ProtocolError},
    group::{DdhGroup, DlogGroup, EncodedElement},
    kdf::KeyDerivation,
    sigma::{DhRelation, DhStatement, SoundnessParameter, ZkPokProver, ZkPokVerifier},
    tools::{xor_in_place, Secret},
};

/// `b^s · d^t`
fn randomize<G: DlogGroup>(group: &G, b: &G::Element, d: &G::Element, s: &G::Scalar, t: &G::Scalar) -> G::Element {
    group.multiply(&group.exponentiate(b, s), &group.exponentiate(d, t))
}

/// `payload ⊕ KDF(encode(seed), |payload|)`
fn mask<G: DlogGroup, K: KeyDerivation>(
    group: &G,
    kdf: &K,
    seed: &G::Element,
    payload: &[u8],
) -> Result<Box<[u8]>, InvalidInput> {
    let key = kdf.derive(&group.encode(seed), payload.len())?;
    let mut masked: Box<[u8]> = payload.into();
    xor_in_place(&mut masked, &key);
    Ok(masked)
}

/// The statement the receiver proves during preprocessing: `(g, g1, h0, h1/g1)` is a DH tuple.
fn setup_statement<G: DlogGroup>(group: &G, g1: &G::Element, h0: &G::Element, h1: &G::Element) -> DhStatement<G> {
    DhStatement {
        h: g1.clone(),
        u: h0.clone(),
        v: group.multiply(h1, &group.exponentiate_inverse(g1, &group.scalar_one())),
    }
}

/// The receiver's preprocessing output.
#[derive_where(Debug, Clone)]
pub struct ReceiverPreprocess<G: DlogGroup> {
    g1: G::Element,
    h0: G::Element,
    h1: G::Element,
    alpha0: Secret<G::Scalar>,
    statement: DhStatement<G>,
}

impl<G: DlogGroup> ReceiverPreprocess<G> {
    /// The statement proven to the sender.
    pub fn statement(&self) -> &DhStatement<G> {
        &self.statement
    }
}

/// The sender's preprocessing output: the receiver's validated elements.
#[derive_where(Debug, Clone)]
pub struct SenderPreprocess<G: DlogGroup> {
    g1: G::Element,
    h0: G::Element,
    h1: G::Element,
    statement: DhStatement<G>,
}

impl<G: DlogGroup> SenderPreprocess<G> {
    /// The statement the receiver has to prove.
    pub fn statement(&self) -> &DhStatement<G> {
        &self.statement
    }
}

/// The receiver's computations, independent of the transport.
#[derive_where(Debug, Clone)]
pub struct OtReceiverCore<G: DdhGroup, K: KeyDerivation> {
    group: G,
    kdf: K,
    max_payload_len: usize,
    span: Span,
}

impl<G: DdhGroup, K: KeyDerivation> OtReceiverCore<G, K> {
    /// Creates the receiver, checking the payload limit against the KDF.
    pub fn new(group: G, kdf: K, config: &OtConfig) -> Result<Self, ConstructionError> {
        config.check_payload_limit(&kdf)?;
        Ok(Self {
            group,
            kdf,
            max_payload_len: config.max_payload_len,
            span: config.span.clone(),
        })
    }

    /// Samples `y, α0` and computes the preprocessing message.
    pub fn preprocess(&self, rng: &mut impl CryptoRngCore) -> (ReceiverPreprocess<G>, ReceiverSetupMessage) {
        let group = &self.group;
        // `g1` and every `g'` must differ from the identity, so `y` and `r` are nonzero.
        let y = Secret::init_with(|| group.random_nonzero_scalar(rng));
        let alpha0 = Secret::init_with(|| group.random_scalar(rng));
        let alpha1 = alpha0.map(|alpha0| group.scalar_add(alpha0, &group.scalar_one()));

        let g1 = group.exponentiate_generator(y.expose_secret());
        let h0 = group.exponentiate_generator(alpha0.expose_secret());
        let h1 = group.exponentiate(&g1, alpha1.expose_secret());

        let message = ReceiverSetupMessage {
            g1: EncodedElement::new(group, &g1),
            h0: EncodedElement::new(group, &h0),
            h1: EncodedElement::new(group, &h1),
        };
        let statement = setup_statement(group, &g1, &h0, &h1);
        tracing::debug!(parent: &self.span, "ot receiver preprocessing computed");
        (
            ReceiverPreprocess {
                g1,
                h0,
                h1,
                alpha0,
                statement,
            },
            message,
        )
    }

    /// Samples `r` and computes the transfer request for the choice bit `σ`.
    pub fn transfer_request(
        &self,
        rng: &mut impl CryptoRngCore,
        preprocess: &ReceiverPreprocess<G>,
        choice: bool,
    ) -> (OtReceiverTransfer<G, K, state::AwaitSenderTuple<G>>, ReceiverTuple) {
        let group = &self.group;
        let r = Secret::init_with(|| group.random_nonzero_scalar(rng));
        let (g_sigma, h_sigma) = if choice {
            (preprocess.g1.clone(), &preprocess.h1)
        } else {
            (group.generator(), &preprocess.h0)
        };

        let request = ReceiverTuple {
            g_prime: EncodedElement::new(group, &group.exponentiate(&g_sigma, r.expose_secret())),
            h_prime: EncodedElement::new(group, &group.exponentiate(h_sigma, r.expose_secret())),
        };
        let transfer = OtReceiverTransfer {
            core: self.clone(),
            state: state::AwaitSenderTuple { choice, r },
        };
        (transfer, request)
    }
}

/// One transfer on the receiver side, moving through the states in [`state`].
#[derive_where(Debug; S)]
pub struct OtReceiverTransfer<G: DdhGroup, K: KeyDerivation, S: state::State> {
    core: OtReceiverCore<G, K>,
    state: S,
}

impl<G: DdhGroup, K: KeyDerivation> OtReceiverTransfer<G, K, state::AwaitSenderTuple<G>> {
    /// Takes the sender's answer.
    pub fn receive_tuple(self, tuple: SenderTuple) -> OtReceiverTransfer<G, K, state::Validate<G>> {
        let state::AwaitSenderTuple { choice, r } = self.state;
        OtReceiverTransfer {
            core: self.core,
            state: state::Validate { choice, r, tuple },
        }
    }
}

impl<G: DdhGroup, K: KeyDerivation> OtReceiverTransfer<G, K, state::Validate<G>> {
    /// Checks the sender's answer before any of it is used:
    /// both elements are group members and both payloads have the same, acceptable, length.
    pub fn validate(self) -> Result<OtReceiverTransfer<G, K, state::DeriveOutput<G>>, ProtocolError> {
        let state::Validate { choice, r, tuple } = self.state;
        let core = self.core;
        let group = &core.group;

        let u0 = group.decode_member(&tuple.u0, "u0").map_err(|err| err.report(&core.span))?;
        let u1 = group.decode_member(&tuple.u1, "u1").map_err(|err| err.report(&core.span))?;
        if tuple.c0.len() != tuple.c1.len() {
            return Err(CheatAttempt::PayloadLengthMismatch(tuple.c0.len(), tuple.c1.len()).report(&core.span));
        }
        if tuple.c0.len() > core.max_payload_len {
            return Err(CheatAttempt::PayloadTooLong(core.max_payload_len).report(&core.span));
        }

        let (u, c) = if choice { (u1, tuple.c1) } else { (u0, tuple.c0) };
        Ok(OtReceiverTransfer {
            core,
            state: state::DeriveOutput { r, u, c },
        })
    }
}

impl<G: DdhGroup, K: KeyDerivation> OtReceiverTransfer<G, K, state::DeriveOutput<G>> {
    /// Unmasks the chosen payload with the key `KDF(u_σ^r)`.
    pub fn derive_output(self) -> Result<OtReceiverTransfer<G, K, state::Done>, ProtocolError> {
        let state::DeriveOutput { r, u, c } = self.state;
        let core = self.core;
        let seed = core.group.exponentiate(&u, r.expose_secret());
        let output = mask(&core.group, &core.kdf, &seed, &c)?;
        tracing::debug!(parent: &core.span, len = output.len(), "ot output derived");
        Ok(OtReceiverTransfer {
            core,
            state: state::Done {
                output: OtOutput::new(output),
            },
        })
    }
}

impl<G: DdhGroup, K: KeyDerivation> OtReceiverTransfer<G, K, state::Done> {
    /// The received payload `x_σ`.
    pub fn output(self) -> OtOutput {
        self.state.output
    }
}

/// The states of [`OtReceiverTransfer`].
pub mod state {
    use alloc::boxed::Box;

    use derive_where::derive_where;

    use crate::{
        group::DlogGroup,
        ot::{OtOutput, SenderTuple},
        tools::Secret,
    };

    mod sealed {
        pub trait Sealed {}

        impl<G: crate::group::DlogGroup> Sealed for super::AwaitSenderTuple<G> {}
        impl<G: crate::group::DlogGroup> Sealed for super::Validate<G> {}
        impl<G: crate::group::DlogGroup> Sealed for super::DeriveOutput<G> {}
        impl Sealed for super::Done {}
    }

    /// The receiver's transfer state.
    pub trait State: sealed::Sealed {}

    /// The request was sent; waiting for the sender's answer.
    #[derive_where(Debug)]
    pub struct AwaitSenderTuple<G: DlogGroup> {
        pub(super) choice: bool,
        pub(super) r: Secret<G::Scalar>,
    }

    impl<G: DlogGroup> State for AwaitSenderTuple<G> {}

    /// The answer arrived and has not been checked yet.
    #[derive_where(Debug)]
    pub struct Validate<G: DlogGroup> {
        pub(super) choice: bool,
        pub(super) r: Secret<G::Scalar>,
        pub(super) tuple: SenderTuple,
    }

    impl<G: DlogGroup> State for Validate<G> {}

    /// The answer was checked; the chosen half is kept.
    #[derive_where(Debug)]
    pub struct DeriveOutput<G: DlogGroup> {
        pub(super) r: Secret<G::Scalar>,
        pub(super) u: G::Element,
        pub(super) c: Box<[u8]>,
    }

    impl<G: DlogGroup> State for DeriveOutput<G> {}

    /// The transfer is complete.
    #[derive(Debug)]
    pub struct Done {
        pub(super) output: OtOutput,
    }

    impl State for Done {}
}

/// The sender's computations, independent of the transport.
#[derive_where(Debug, Clone)]
pub struct OtSenderCore<G: DdhGroup, K: KeyDerivation> {
    group: G,
    kdf: K,
    max_payload_len: usize,
    span: Span,
}

impl<G: DdhGroup, K: KeyDerivation> OtSenderCore<G, K> {
    /// Creates the sender, checking the payload limit against the KDF.
    pub fn new(group: G, kdf: K, config: &OtConfig) -> Result<Self, ConstructionError> {
        config.check_payload_limit(&kdf)?;
        Ok(Self {
            group,
            kdf,
            max_payload_len: config.max_payload_len,
            span: config.span.clone(),
        })
    }

    /// Validates the receiver's preprocessing message.
    pub fn preprocess(&self, message: &ReceiverSetupMessage) -> Result<SenderPreprocess<G>, ProtocolError> {
        let group = &self.group;
        let decode = |encoded: &EncodedElement, name: &'static str| group.decode_member(encoded, name).map_err(|err| err.report(&self.span));
        let g1 = group
            .decode_nontrivial_member(&message.g1, "g1")
            .map_err(|err| err.report(&self.span))?;
        let h0 = decode(&message.h0, "h0")?;
        let h1 = decode(&message.h1, "h1")?;
        let statement = setup_statement(group, &g1, &h0, &h1);
        Ok(SenderPreprocess { g1, h0, h1, statement })
    }

    /// Checks the sender's own inputs.
    pub fn check_inputs(&self, x0: &[u8], x1: &[u8]) -> Result<(), InvalidInput> {
        if x0.len() != x1.len() {
            return Err(InvalidInput::InputLengthMismatch(x0.len(), x1.len()));
        }
        if x0.len() > self.max_payload_len {
            return Err(InvalidInput::InputTooLong(self.max_payload_len));
        }
        Ok(())
    }

    /// Answers a transfer request with the masked inputs.
    pub fn transfer(
        &self,
        rng: &mut impl CryptoRngCore,
        preprocess: &SenderPreprocess<G>,
        request: &ReceiverTuple,
        x0: &[u8],
        x1: &[u8],
    ) -> Result<SenderTuple, ProtocolError> {
        self.check_inputs(x0, x1)?;

        let group = &self.group;
        // With `g' = 1` both tuples would be DH tuples, and both payloads would be unmasked.
        let g_prime = group
            .decode_nontrivial_member(&request.g_prime, "g'")
            .map_err(|err| err.report(&self.span))?;
        let h_prime = group
            .decode_member(&request.h_prime, "h'")
            .map_err(|err| err.report(&self.span))?;

        let mut masked_pair = |g_i: &G::Element, h_i: &G::Element, x_i: &[u8]| {
            let s = Secret::init_with(|| group.random_scalar(rng));
            let t = Secret::init_with(|| group.random_scalar(rng));
            let u_i = randomize(group, g_i, h_i, s.expose_secret(), t.expose_secret());
            let v_i = randomize(group, &g_prime, &h_prime, s.expose_secret(), t.expose_secret());
            mask(group, &self.kdf, &v_i, x_i).map(|c_i| (EncodedElement::new(group, &u_i), c_i))
        };
        let (u0, c0) = masked_pair(&group.generator(), &preprocess.h0, x0)?;
        let (u1, c1) = masked_pair(&preprocess.g1, &preprocess.h1, x1)?;

        tracing::debug!(parent: &self.span, len = x0.len(), "ot sender tuple computed");
        Ok(SenderTuple { u0, c0, u1, c1 })
    }
}

/// The OT receiver running over a channel.
#[derive_where(Debug; C)]
pub struct OtFullSimReceiver<G: DdhGroup, K: KeyDerivation, C: Channel> {
    core: OtReceiverCore<G, K>,
    preprocess: ReceiverPreprocess<G>,
    channel: C,
}

impl<G: DdhGroup, K: KeyDerivation, C: Channel> OtFullSimReceiver<G, K, C> {
    /// Validates the configuration and runs the preprocessing phase with the sender.
    pub fn setup(
        rng: &mut impl CryptoRngCore,
        group: G,
        kdf: K,
        config: OtConfig,
        mut channel: C,
    ) -> Result<Self, ProtocolError> {
        SoundnessParameter::new(&group, config.soundness_bits)?;
        let core = OtReceiverCore::new(group.clone(), kdf, &config)?;

        let (preprocess, message) = core.preprocess(rng);
        channel.send(&message)?;
        ZkPokProver::<G, DhRelation, _>::new(group, config.sigma_config(), &mut channel)?.prove(
            rng,
            preprocess.statement(),
            preprocess.alpha0.expose_secret(),
        )?;

        tracing::debug!(parent: &config.span, "ot receiver preprocessing done");
        Ok(Self {
            core,
            preprocess,
            channel,
        })
    }

    /// Receives `x_σ` for the choice bit `σ`.
    pub fn transfer(&mut self, rng: &mut impl CryptoRngCore, choice: bool) -> Result<OtOutput, ProtocolError> {
        let (transfer, request) = self.core.transfer_request(rng, &self.preprocess, choice);
        self.channel.send(&request)?;
        let tuple: SenderTuple = self.channel.receive()?;
        Ok(transfer.receive_tuple(tuple).validate()?.derive_output()?.output())
    }
}

/// The OT sender running over a channel.
#[derive_where(Debug; C)]
pub struct OtFullSimSender<G: DdhGroup, K: KeyDerivation, C: Channel> {
    core: OtSenderCore<G, K>,
    preprocess: SenderPreprocess<G>,
    channel: C,
}

impl<G: DdhGroup, K: KeyDerivation, C: Channel> OtFullSimSender<G, K, C> {
    /// Validates the configuration and runs the preprocessing phase with the receiver.
    ///
    /// A receiver whose proof is rejected is a cheating attempt.
    pub fn setup(
        rng: &mut impl CryptoRngCore,
        group: G,
        kdf: K,
        config: OtConfig,
        mut channel: C,
    ) -> Result<Self, ProtocolError> {
        SoundnessParameter::new(&group, config.soundness_bits)?;
        let core = OtSenderCore::new(group.clone(), kdf, &config)?;

        let message: ReceiverSetupMessage = channel.receive()?;
        let preprocess = core.preprocess(&message)?;
        let accepted = ZkPokVerifier::<G, DhRelation, _>::new(group, config.sigma_config(), &mut channel)?
            .verify(rng, preprocess.statement())?;
        if !accepted {
            return Err(CheatAttempt::InvalidProof.report(&config.span));
        }

        tracing::debug!(parent: &config.span, "ot sender preprocessing done");
        Ok(Self {
            core,
            preprocess,
            channel,
        })
    }

    /// Transfers `x0` and `x1`, which must have the same length.
    pub fn transfer(&mut self, rng: &mut impl CryptoRngCore, x0: &[u8], x1: &[u8]) -> Result<(), ProtocolError> {
        self.core.check_inputs(x0, x1)?;
        let request: ReceiverTuple = self.channel.receive()?;
        let tuple = self.core.transfer(rng, &self.preprocess, &request, x0, x1)?;
        self.channel.send(&tuple)?;
        Ok(())
    }
}
