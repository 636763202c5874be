//! Two-phase commitment schemes: a committer binds itself to a value (commit phase)
//! and later reveals it (decommit phase) to a receiver that checks the opening.
//!
//! Each role keeps one record per [`SessionId`], so that several commitments can be open
//! at the same time over the same channel. Messages are exchanged in the order the caller
//! invokes the operations; session ids carried by the messages are checked against
//! the ones the caller expects.

pub mod equivocal;
pub mod hash;
pub mod pedersen;

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use core::fmt::{self, Debug, Display};

use derive_where::derive_where;
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};
use tracing::Span;
use zeroize::Zeroize;

use crate::{error::ProtocolError, group::DlogGroup, tools::Secret};

/// Identifies one commitment between a committer and a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a session id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The numeric value of the id.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SessionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Construction parameters of the commitment roles that run no sub-proofs.
#[derive(Debug, Clone)]
pub struct CommitmentConfig {
    /// The span all events of the role are recorded under.
    pub span: Span,
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self { span: Span::none() }
    }
}

/// A value a committer binds to.
pub trait CommitValue: Debug + Clone + PartialEq {
    /// The canonical byte form of the value.
    fn to_bytes(&self) -> Box<[u8]>;
}

/// A raw byte string, committed to by hash-based schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteValue(Box<[u8]>);

impl ByteValue {
    /// Wraps the bytes.
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// The committed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl CommitValue for ByteValue {
    fn to_bytes(&self) -> Box<[u8]> {
        self.0.clone()
    }
}

/// An exponent of a group, committed to by schemes built over that group.
#[derive_where(Debug, Clone, PartialEq)]
pub struct ExponentValue<G: DlogGroup> {
    scalar: G::Scalar,
    encoding: Box<[u8]>,
}

impl<G: DlogGroup> ExponentValue<G> {
    pub(crate) fn new(group: &G, scalar: G::Scalar) -> Self {
        let encoding = group.encode_scalar(&scalar);
        Self { scalar, encoding }
    }

    /// The committed exponent.
    pub fn scalar(&self) -> &G::Scalar {
        &self.scalar
    }
}

impl<G: DlogGroup> CommitValue for ExponentValue<G> {
    fn to_bytes(&self) -> Box<[u8]> {
        self.encoding.clone()
    }
}

/// What the committer remembers about one commitment: the value, the randomness
/// used to hide it, and the commitment that was sent.
#[derive_where(Debug, Clone)]
pub struct CommitmentPhaseValues<V, R, M>
where
    V: CommitValue,
    R: Zeroize + Clone,
    M: Debug + Clone,
{
    value: V,
    randomness: Secret<R>,
    commitment: M,
}

impl<V, R, M> CommitmentPhaseValues<V, R, M>
where
    V: CommitValue,
    R: Zeroize + Clone,
    M: Debug + Clone,
{
    pub(crate) fn new(value: V, randomness: R, commitment: M) -> Self {
        Self {
            value,
            randomness: Secret::init_with(|| randomness),
            commitment,
        }
    }

    /// The committed value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The randomness that hides the value.
    ///
    /// Anyone holding it can open the commitment.
    pub fn randomness(&self) -> &R {
        self.randomness.expose_secret()
    }

    /// The commitment sent to the receiver.
    pub fn commitment(&self) -> &M {
        &self.commitment
    }
}

/// Records indexed by session id that are never silently overwritten.
#[derive(Debug, Clone)]
pub(crate) struct SessionStore<T>(BTreeMap<SessionId, T>);

impl<T> SessionStore<T> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts the record if the id is free. Returns `false` if it was taken.
    pub fn insert_new(&mut self, id: SessionId, record: T) -> bool {
        if self.0.contains_key(&id) {
            return false;
        }
        self.0.insert(id, record);
        true
    }

    pub fn get(&self, id: SessionId) -> Option<&T> {
        self.0.get(&id)
    }

    pub fn remove(&mut self, id: SessionId) -> Option<T> {
        self.0.remove(&id)
    }
}

/// The committer of a two-phase commitment scheme.
pub trait Committer {
    /// The values this scheme commits to.
    type Value: CommitValue;
    /// The randomness hiding a committed value.
    type Randomness: Zeroize + Clone;
    /// The commitment sent in the commit phase.
    type Commitment: Debug + Clone;
    /// Values agreed on before the first commitment (e.g. commitment keys).
    type PreProcessValues: Debug;

    /// Binds `value` under fresh randomness, sends the commitment,
    /// and records it under `id`.
    fn commit(&mut self, rng: &mut impl CryptoRngCore, value: Self::Value, id: SessionId) -> Result<(), ProtocolError>;

    /// Opens the commitment recorded under `id`.
    fn decommit(&mut self, rng: &mut impl CryptoRngCore, id: SessionId) -> Result<(), ProtocolError>;

    /// Samples a uniformly random value of the scheme's value domain.
    fn sample_random_commit_value(&self, rng: &mut impl CryptoRngCore) -> Self::Value;

    /// Encodes caller-chosen bytes as a value of the scheme's value domain.
    fn generate_commit_value(&self, bytes: &[u8]) -> Result<Self::Value, ProtocolError>;

    /// The record of the commitment under `id`.
    fn commitment_phase_values(
        &self,
        id: SessionId,
    ) -> Option<&CommitmentPhaseValues<Self::Value, Self::Randomness, Self::Commitment>>;

    /// The values agreed on before the first commitment.
    fn pre_process_values(&self) -> &Self::PreProcessValues;

    /// Forgets the record of `id`, returning it.
    fn close_session(
        &mut self,
        id: SessionId,
    ) -> Option<CommitmentPhaseValues<Self::Value, Self::Randomness, Self::Commitment>>;
}

/// A committer that can prove what it committed to without revealing its randomness.
pub trait CommitterWithProofs: Committer {
    /// Sends the value committed under `id` and proves in zero knowledge
    /// that the commitment opens to it.
    fn prove_committed_value(&mut self, rng: &mut impl CryptoRngCore, id: SessionId) -> Result<(), ProtocolError>;
}

/// The receiver of a two-phase commitment scheme.
pub trait CommitReceiver {
    /// The values this scheme commits to.
    type Value: CommitValue;
    /// The commitment received in the commit phase.
    type Commitment: Debug + Clone;
    /// Values agreed on before the first commitment (e.g. commitment keys).
    type PreProcessValues: Debug;

    /// Receives the next commitment and returns the session it belongs to.
    fn receive_commitment(&mut self) -> Result<SessionId, ProtocolError>;

    /// Receives the opening of the commitment under `id` and returns the committed value.
    ///
    /// An opening that does not match the commitment is a cheating attempt.
    fn receive_decommitment(&mut self, rng: &mut impl CryptoRngCore, id: SessionId)
        -> Result<Self::Value, ProtocolError>;

    /// The commitment received under `id`.
    fn commitment(&self, id: SessionId) -> Option<&Self::Commitment>;

    /// The values agreed on before the first commitment.
    fn pre_process_values(&self) -> &Self::PreProcessValues;

    /// Forgets the commitment received under `id`, returning it.
    fn close_session(&mut self, id: SessionId) -> Option<Self::Commitment>;
}

/// A receiver that can verify a proof of the committed value.
pub trait ReceiverWithProofs: CommitReceiver {
    /// Receives the value committed under `id` and verifies the committer's proof that
    /// the commitment opens to it. A rejected proof is a cheating attempt.
    fn verify_committed_value(
        &mut self,
        rng: &mut impl CryptoRngCore,
        id: SessionId,
    ) -> Result<Self::Value, ProtocolError>;
}

#[cfg(test)]
mod tests {
    use super::{CommitValue, ExponentValue, SessionId, SessionStore};
    use crate::group::{DlogGroup, ZpGroup};

    #[test]
    fn session_store_refuses_overwrites() {
        let mut store = SessionStore::new();
        assert!(store.insert_new(SessionId::new(1), "first"));
        assert!(!store.insert_new(SessionId::new(1), "second"));
        assert_eq!(store.get(SessionId::new(1)), Some(&"first"));
        assert_eq!(store.remove(SessionId::new(1)), Some("first"));
        assert!(store.get(SessionId::new(1)).is_none());
        assert!(store.insert_new(SessionId::new(1), "third"));
    }

    #[test]
    fn exponent_value_bytes_are_canonical() {
        let group = ZpGroup::order_11();
        let value = ExponentValue::new(&group, group.scalar(7));
        assert_eq!(&*value.to_bytes(), &group.encode_scalar(&group.scalar(7))[..]);
    }
}
