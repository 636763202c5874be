use std::thread;

use rand_core::{OsRng, RngCore};
use serde::Serialize;

use dlog_protocols::{
    Channel, CheatAttempt, DhRelation, DlogGroup, EncodedElement, HkdfSha256, LocalChannel, OtConfig,
    OtFullSimReceiver, OtFullSimSender, OtSenderCore, ProtocolError, ReceiverSetupMessage, ReceiverTuple, SigmaConfig,
    ZkPokVerifier, ZpGroup,
};

fn config() -> OtConfig {
    OtConfig::new(40, 256)
}

#[test_log::test]
fn repeated_transfers() {
    let group = ZpGroup::test_62bit();
    let (sender_channel, receiver_channel) = LocalChannel::pair();
    let choices = [true, false, false, true];

    let receiver_group = group.clone();
    let receiver = thread::spawn(move || {
        let mut receiver = OtFullSimReceiver::setup(&mut OsRng, receiver_group, HkdfSha256, config(), receiver_channel)?;
        let mut outputs = Vec::new();
        for choice in choices {
            outputs.push(receiver.transfer(&mut OsRng, choice)?);
        }
        // Empty payloads are allowed.
        outputs.push(receiver.transfer(&mut OsRng, true)?);
        Ok::<_, ProtocolError>(outputs)
    });

    let mut sender = OtFullSimSender::setup(&mut OsRng, group, HkdfSha256, config(), sender_channel).unwrap();
    let mut inputs = Vec::new();
    for len in [1, 16, 100, 256] {
        let mut x0 = vec![0u8; len];
        let mut x1 = vec![0u8; len];
        OsRng.fill_bytes(&mut x0);
        OsRng.fill_bytes(&mut x1);
        sender.transfer(&mut OsRng, &x0, &x1).unwrap();
        inputs.push((x0, x1));
    }
    sender.transfer(&mut OsRng, &[], &[]).unwrap();

    let outputs = receiver.join().unwrap().unwrap();
    for ((choice, (x0, x1)), output) in choices.iter().zip(inputs.iter()).zip(outputs.iter()) {
        let expected = if *choice { x1 } else { x0 };
        assert_eq!(output.as_bytes(), expected.as_slice());
    }
    assert!(outputs[4].as_bytes().is_empty());
}

/// Same wire layout as the sender's answer, with arbitrary contents.
#[derive(Serialize)]
struct ForgedTuple {
    u0: EncodedElement,
    c0: EncodedElement,
    u1: EncodedElement,
    c1: EncodedElement,
}

#[test]
fn receiver_detects_a_cheating_sender() {
    let group = ZpGroup::test_62bit();
    let (mut sender_channel, receiver_channel) = LocalChannel::pair();

    let receiver_group = group.clone();
    let receiver = thread::spawn(move || {
        let mut receiver = OtFullSimReceiver::setup(&mut OsRng, receiver_group, HkdfSha256, config(), receiver_channel)?;
        receiver.transfer(&mut OsRng, false)
    });

    let core = OtSenderCore::new(group.clone(), HkdfSha256, &config()).unwrap();
    let message: ReceiverSetupMessage = sender_channel.receive().unwrap();
    let preprocess = core.preprocess(&message).unwrap();
    let sigma_config = SigmaConfig::with_soundness(40);
    let accepted = ZkPokVerifier::<_, DhRelation, _>::new(group.clone(), sigma_config, &mut sender_channel)
        .unwrap()
        .verify(&mut OsRng, preprocess.statement())
        .unwrap();
    assert!(accepted);

    let _request: ReceiverTuple = sender_channel.receive().unwrap();
    let member = EncodedElement::new(&group, &group.generator());
    let forged = ForgedTuple {
        u0: EncodedElement::from_bytes((group.modulus() - 1).to_be_bytes()),
        c0: EncodedElement::from_bytes([0u8; 8]),
        u1: member,
        c1: EncodedElement::from_bytes([0u8; 8]),
    };
    sender_channel.send(&forged).unwrap();

    assert_eq!(
        receiver.join().unwrap(),
        Err(ProtocolError::CheatAttempt(CheatAttempt::NotGroupMember("u0")))
    );
}
