use std::thread;

use rand_chacha::ChaCha8Rng;
use rand_core::{OsRng, SeedableRng};

use dlog_protocols::{
    DhRelation, DhStatement, DlogGroup, DlogRelation, DlogStatement, LocalChannel, SigmaConfig, SigmaProver,
    SigmaSimulator, SigmaVerifier, SigmaVerifierComputation, ZkPokProver, ZkPokVerifier, ZpGroup, ZpScalar,
};

const T: u32 = 40;

fn dh_instance(group: &ZpGroup, rng: &mut ChaCha8Rng) -> (DhStatement<ZpGroup>, ZpScalar) {
    let w = group.random_scalar(rng);
    let h = group.exponentiate_generator(&group.random_scalar(rng));
    let statement = DhStatement {
        u: group.exponentiate_generator(&w),
        v: group.exponentiate(&h, &w),
        h,
    };
    (statement, w)
}

#[test_log::test]
fn interactive_dh_proof() {
    let group = ZpGroup::test_62bit();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let (statement, w) = dh_instance(&group, &mut rng);
    let (prover_channel, verifier_channel) = LocalChannel::pair();

    let prover_group = group.clone();
    let prover_statement = statement.clone();
    let prover = thread::spawn(move || {
        let mut prover =
            SigmaProver::<_, DhRelation, _>::new(prover_group, SigmaConfig::with_soundness(T), prover_channel).unwrap();
        prover.prove(&mut OsRng, &prover_statement, &w)
    });

    let mut verifier =
        SigmaVerifier::<_, DhRelation, _>::new(group, SigmaConfig::with_soundness(T), verifier_channel).unwrap();
    assert!(verifier.verify(&mut OsRng, &statement).unwrap());
    prover.join().unwrap().unwrap();
}

#[test_log::test]
fn zkpok_of_a_dh_tuple() {
    let group = ZpGroup::test_62bit();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let (statement, w) = dh_instance(&group, &mut rng);
    let (prover_channel, verifier_channel) = LocalChannel::pair();

    let prover_group = group.clone();
    let prover_statement = statement.clone();
    let prover = thread::spawn(move || {
        let mut prover =
            ZkPokProver::<_, DhRelation, _>::new(prover_group, SigmaConfig::with_soundness(T), prover_channel).unwrap();
        prover.prove(&mut OsRng, &prover_statement, &w)
    });

    let mut verifier =
        ZkPokVerifier::<_, DhRelation, _>::new(group, SigmaConfig::with_soundness(T), verifier_channel).unwrap();
    assert!(verifier.verify(&mut OsRng, &statement).unwrap());
    prover.join().unwrap().unwrap();
}

#[test]
fn zkpok_of_another_statement_is_rejected() {
    let group = ZpGroup::test_62bit();
    let w = group.random_scalar(&mut OsRng);
    let proven = DlogStatement {
        h: group.exponentiate_generator(&w),
    };
    let claimed = DlogStatement {
        h: group.multiply(&proven.h, &group.generator()),
    };
    let (prover_channel, verifier_channel) = LocalChannel::pair();

    let prover_group = group.clone();
    let prover = thread::spawn(move || {
        let mut prover =
            ZkPokProver::<_, DlogRelation, _>::new(prover_group, SigmaConfig::with_soundness(T), prover_channel).unwrap();
        prover.prove(&mut OsRng, &proven, &w)
    });

    let mut verifier =
        ZkPokVerifier::<_, DlogRelation, _>::new(group, SigmaConfig::with_soundness(T), verifier_channel).unwrap();
    assert!(!verifier.verify(&mut OsRng, &claimed).unwrap());
    prover.join().unwrap().unwrap();
}

#[test]
fn simulation_needs_no_witness() {
    let group = ZpGroup::test_62bit();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let (statement, _) = dh_instance(&group, &mut rng);

    let simulator = SigmaSimulator::<_, DhRelation>::new(group.clone(), SigmaConfig::with_soundness(T)).unwrap();
    let verifier = SigmaVerifierComputation::<_, DhRelation>::new(group, SigmaConfig::with_soundness(T)).unwrap();
    for _ in 0..16 {
        let transcript = simulator.simulate(&mut rng, &statement, None).unwrap();
        assert!(verifier.verify(&statement, &transcript.a, &transcript.e, &transcript.z));
    }
}
