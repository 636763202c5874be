use std::thread;

use rand_core::OsRng;
use sha3::Shake256;

use dlog_protocols::{
    ByteValue, CheatAttempt, CommitReceiver, CommitValue, CommitmentConfig, Committer, CommitterWithProofs,
    EquivocalCommitter, EquivocalReceiver, HashCommitter, HashReceiver, LocalChannel, PedersenCommitter,
    PedersenReceiver, ProtocolError, ReceiverWithProofs, SessionId, SigmaConfig, ZpGroup,
};

fn pedersen() -> (PedersenCommitter<ZpGroup, LocalChannel>, PedersenReceiver<ZpGroup, LocalChannel>) {
    let group = ZpGroup::test_62bit();
    let (committer_channel, receiver_channel) = LocalChannel::pair();
    let receiver =
        PedersenReceiver::setup(&mut OsRng, group.clone(), SigmaConfig::with_soundness(40), receiver_channel).unwrap();
    let committer = PedersenCommitter::setup(group, SigmaConfig::with_soundness(40), committer_channel).unwrap();
    (committer, receiver)
}

#[test_log::test]
fn pedersen_commit_prove_and_open() {
    let (mut committer, mut receiver) = pedersen();
    let proven = SessionId::new(1);
    let opened = SessionId::new(2);

    let first = committer.generate_commit_value(b"\x12\x34").unwrap();
    let second = committer.sample_random_commit_value(&mut OsRng);
    committer.commit(&mut OsRng, first.clone(), proven).unwrap();
    committer.commit(&mut OsRng, second.clone(), opened).unwrap();
    assert_eq!(receiver.receive_commitment().unwrap(), proven);
    assert_eq!(receiver.receive_commitment().unwrap(), opened);

    let committer = thread::spawn(move || {
        committer.prove_committed_value(&mut OsRng, proven)?;
        committer.decommit(&mut OsRng, opened)?;
        Ok::<_, ProtocolError>(committer)
    });

    let value = receiver.verify_committed_value(&mut OsRng, proven).unwrap();
    assert_eq!(&*value.to_bytes(), &[0, 0, 0, 0, 0, 0, 0x12, 0x34]);
    assert_eq!(receiver.receive_decommitment(&mut OsRng, opened).unwrap(), second);

    let mut committer = committer.join().unwrap().unwrap();
    assert_eq!(committer.close_session(proven).map(|record| record.value().clone()), Some(first));
    assert!(receiver.close_session(proven).is_some());
    assert!(receiver.commitment(proven).is_none());
}

#[test]
fn equivocal_commitment_over_pedersen() {
    let (committer, receiver) = pedersen();
    let mut committer = EquivocalCommitter::new(committer);
    let mut receiver = EquivocalReceiver::new(receiver);
    let id = SessionId::new(9);

    let value = committer.sample_random_commit_value(&mut OsRng);
    committer.commit(&mut OsRng, value.clone(), id).unwrap();
    receiver.receive_commitment().unwrap();

    let committer = thread::spawn(move || committer.decommit(&mut OsRng, id));
    assert_eq!(receiver.receive_decommitment(&mut OsRng, id).unwrap(), value);
    committer.join().unwrap().unwrap();
}

#[test]
fn hash_commitment_binds_the_session() {
    let (committer_channel, receiver_channel) = LocalChannel::pair();
    let mut committer = HashCommitter::<_, Shake256>::new(CommitmentConfig::default(), committer_channel);
    let mut receiver = HashReceiver::<_, Shake256>::new(CommitmentConfig::default(), receiver_channel);

    committer
        .commit(&mut OsRng, ByteValue::new(b"left".as_slice()), SessionId::new(1))
        .unwrap();
    committer
        .commit(&mut OsRng, ByteValue::new(b"right".as_slice()), SessionId::new(2))
        .unwrap();
    receiver.receive_commitment().unwrap();
    receiver.receive_commitment().unwrap();

    committer.decommit(&mut OsRng, SessionId::new(2)).unwrap();
    assert_eq!(
        receiver.receive_decommitment(&mut OsRng, SessionId::new(1)),
        Err(ProtocolError::CheatAttempt(CheatAttempt::SessionMismatch {
            expected: 1,
            received: 2
        }))
    );
}
