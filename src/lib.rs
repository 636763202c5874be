#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    missing_docs,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_qualifications
)]
#![cfg_attr(not(test), warn(clippy::unwrap_used, clippy::indexing_slicing))]

/*!
## Features

`k256`: the secp256k1 group backend using the [`k256`](`::k256`) crate. See [`Secp256k1Group`].
*/

extern crate alloc;

mod channel;
mod commitment;
mod error;
mod group;
mod kdf;
mod ot;
mod sigma;
mod tools;

pub use channel::{Channel, LocalChannel};
pub use commitment::{
    equivocal::{EquivocalCommitter, EquivocalReceiver},
    hash::{HashCommitmentMessage, HashCommitter, HashDecommitmentMessage, HashReceiver},
    pedersen::{
        PedersenCommitmentMessage, PedersenCommitter, PedersenDecommitmentMessage, PedersenKey, PedersenReceiver,
        PedersenSetupMessage, PedersenValueMessage,
    },
    ByteValue, CommitReceiver, CommitValue, CommitmentConfig, CommitmentPhaseValues, Committer, CommitterWithProofs,
    ExponentValue, ReceiverWithProofs, SessionId,
};
pub use error::{ChannelError, CheatAttempt, ConstructionError, InvalidInput, ProtocolError};
#[cfg(feature = "k256")]
pub use group::Secp256k1Group;
pub use group::{DdhGroup, DlogGroup, EncodedElement, EncodedScalar, ZpElement, ZpGroup, ZpScalar};
pub use kdf::{HkdfSha256, KeyDerivation};
pub use ot::{
    full_sim::{
        state as ot_receiver_state, OtFullSimReceiver, OtFullSimSender, OtReceiverCore, OtReceiverTransfer,
        OtSenderCore, ReceiverPreprocess, SenderPreprocess,
    },
    OtConfig, OtOutput, ReceiverSetupMessage, ReceiverTuple, SenderTuple,
};
pub use sigma::{
    Challenge, DhFirstMessage, DhRelation, DhStatement, DlogFirstMessage, DlogRelation, DlogStatement, SigmaConfig,
    SigmaFirstMessage, SigmaProver, SigmaProverComputation, SigmaProverState, SigmaRelation, SigmaResponse,
    SigmaSimulator, SigmaTranscript, SigmaVerifier, SigmaVerifierComputation, SoundnessParameter, ZkPokProver,
    ZkPokResponse, ZkPokVerifier,
};
pub use tools::hashing::{CollisionResistant, HashOutput};
