//! Error taxonomy shared by all protocol roles.
//!
//! The variants separate who is to blame for a failure:
//! the local caller ([`ProtocolError::Construction`], [`ProtocolError::InvalidInput`]),
//! the remote peer ([`ProtocolError::CheatAttempt`]),
//! or the transport ([`ProtocolError::Channel`]).
//! A session that returned any of them must not be continued.

use alloc::string::String;

use tracing::Span;

/// Invalid parameters supplied when building a protocol role.
#[derive(displaydoc::Display, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// soundness parameter of {0} bits does not satisfy `2^t < q`
    SoundnessTooLarge(u32),
    /// soundness parameter of {0} bits is not a positive multiple of 8
    SoundnessNotByteAligned(u32),
    /// payload limit of {requested} bytes exceeds the KDF output limit of {supported} bytes
    PayloadLimitTooLarge {
        /// The requested limit.
        requested: usize,
        /// The maximum output length of the key derivation function.
        supported: usize,
    },
    /// invalid group parameters: {0}
    InvalidGroupParameters(&'static str),
}

/// A received value failed a mandatory validity check; the peer deviated from the protocol.
#[derive(displaydoc::Display, Debug, Clone, PartialEq, Eq)]
pub enum CheatAttempt {
    /// the received element `{0}` is not a member of the group
    NotGroupMember(&'static str),
    /// the received element `{0}` is the identity
    IdentityElement(&'static str),
    /// the received scalar `{0}` is not a canonical exponent
    InvalidScalar(&'static str),
    /// the masked payloads have different lengths ({0} and {1})
    PayloadLengthMismatch(usize, usize),
    /// the masked payload is longer than the configured limit of {0} bytes
    PayloadTooLong(usize),
    /// the challenge has {actual} bytes, expected {expected}
    ChallengeLength {
        /// Length required by the soundness parameter.
        expected: usize,
        /// Length actually received.
        actual: usize,
    },
    /// the first message has {actual} elements, expected {expected}
    FirstMessageArity {
        /// Number of elements the relation uses.
        expected: usize,
        /// Number of elements actually received.
        actual: usize,
    },
    /// the decommitment does not open the commitment of session {0}
    DecommitmentMismatch(u64),
    /// the decommitment refers to session {received}, expected {expected}
    SessionMismatch {
        /// The session the receiver was waiting for.
        expected: u64,
        /// The session named by the peer.
        received: u64,
    },
    /// a commitment for session {0} was already received
    DuplicateCommitment(u64),
    /// the proof was rejected
    InvalidProof,
    /// the revealed trapdoor does not match the commitment key
    InvalidTrapdoor,
}

/// Transport-level failure, not attributable to the peer's protocol logic.
#[derive(displaydoc::Display, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// the channel is closed
    Closed,
    /// failed to encode an outgoing message: {0}
    Encoding(String),
    /// failed to decode an incoming frame: {0}
    Malformed(String),
}

/// The local caller supplied an input that violates a precondition.
#[derive(displaydoc::Display, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    /// the witness does not satisfy the relation for the given statement
    WitnessMismatch,
    /// session {0} is already in use
    DuplicateSessionId(u64),
    /// session {0} is unknown
    UnknownSessionId(u64),
    /// the value does not fit into the commitment domain
    CommitValueOutOfRange,
    /// the sender inputs have different lengths ({0} and {1})
    InputLengthMismatch(usize, usize),
    /// the sender input is longer than the configured limit of {0} bytes
    InputTooLong(usize),
    /// the key derivation function cannot produce {0} bytes
    KdfOutputLength(usize),
}

/// The error type of every fallible protocol operation.
#[derive(displaydoc::Display, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// construction error: {0}
    Construction(ConstructionError),
    /// cheating attempt detected: {0}
    CheatAttempt(CheatAttempt),
    /// channel failure: {0}
    Channel(ChannelError),
    /// malformed local input: {0}
    InvalidInput(InvalidInput),
}

impl CheatAttempt {
    /// Records the cheating attempt under `span` and converts it for propagation.
    pub(crate) fn report(self, span: &Span) -> ProtocolError {
        tracing::warn!(parent: span, cheat = %self, "cheating attempt detected");
        ProtocolError::CheatAttempt(self)
    }
}

impl ProtocolError {
    /// Returns `true` if the failure is attributable to the remote party.
    pub fn is_cheat_attempt(&self) -> bool {
        matches!(self, Self::CheatAttempt(_))
    }
}

impl From<ConstructionError> for ProtocolError {
    fn from(source: ConstructionError) -> Self {
        Self::Construction(source)
    }
}

impl From<CheatAttempt> for ProtocolError {
    fn from(source: CheatAttempt) -> Self {
        Self::CheatAttempt(source)
    }
}

impl From<ChannelError> for ProtocolError {
    fn from(source: ChannelError) -> Self {
        Self::Channel(source)
    }
}

impl From<InvalidInput> for ProtocolError {
    fn from(source: InvalidInput) -> Self {
        Self::InvalidInput(source)
    }
}

impl std::error::Error for ConstructionError {}
impl std::error::Error for CheatAttempt {}
impl std::error::Error for ChannelError {}
impl std::error::Error for InvalidInput {}
impl std::error::Error for ProtocolError {}
