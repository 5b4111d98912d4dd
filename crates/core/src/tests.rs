//! End-to-end tests across codec, sponges, nonce search and signatures

use std::thread;
use std::time::{Duration, Instant};

use crate::{
    CancelToken, Error, ErrorKind, Field, HASH_LENGTH, Kerl, NONCE_OFFSET, PearlDiver, PowState,
    SecurityLevel, Sponge, TRANSACTION_TRYTES, Transaction, add_checksum, checksum, digest,
    generate_address, generate_addresses, generate_signature, pad_trytes, trailing_zeros,
    trits_to_trytes, trytes_to_trits, validate_signature,
};

const SEED: &str =
    "NXAZBDBCCFZUSZMGKZCVNGMMKMCEXOGRLNNMXOIUMKDXTTVDBWGRBYVYZXMWSVLNYIADFTPWYUWJSG9HF";
const BUNDLE: &str =
    "JEGPJQCCCEUBLSFGBBISRCHFUHBXMCVGDXLHSQQBMSWRZYLBPBVDKHEJSAEXWCMDPDNCRLFZWHTHHBCYG";

/// A deterministic, non-trivial transaction
fn sample_transaction() -> String {
    let mut tx = Transaction::from_trytes(&"9".repeat(TRANSACTION_TRYTES)).unwrap();
    tx.set_field_trytes(Field::Address, &pad_trytes("RECEIVER9ADDRESS", 81))
        .unwrap();
    tx.set_field_trytes(Field::Tag, &pad_trytes("POWTEST", 27))
        .unwrap();
    tx.set_value(Field::Value, 1000).unwrap();
    tx.set_value(Field::Timestamp, 1_550_000_000).unwrap();
    tx.set_field_trytes(Field::Bundle, BUNDLE).unwrap();
    tx.to_trytes().unwrap()
}

#[test]
fn test_digest_vector() {
    assert_eq!(
        digest(&"A".repeat(81)).unwrap(),
        "XAL9SMWRVVMYNSIIUVHXH9LBAHYHUWXRRKOTWECQULPRVVHMJXIIHAKPMZZGUFQPJNNAWBRUMZMRLFXNP"
    );
}

#[test]
fn test_zero_input_digest() {
    // the all-zero state is a fixed point of the permutation
    assert_eq!(digest("").unwrap(), "9".repeat(81));
    assert_eq!(digest(&"9".repeat(81)).unwrap(), "9".repeat(81));
}

#[test]
fn test_digest_is_deterministic() {
    let a = digest("DETERMINISTIC9INPUT").unwrap();
    let b = digest("DETERMINISTIC9INPUT").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_avalanche_effect() {
    // one tryte changed: about two thirds of output trits should change
    let d1 = trytes_to_trits(&digest(&"A".repeat(81)).unwrap()).unwrap();
    let d2 = trytes_to_trits(&digest(&format!("B{}", "A".repeat(80))).unwrap()).unwrap();

    let differing = d1.iter().zip(&d2).filter(|(a, b)| a != b).count();
    assert!(
        (110..=214).contains(&differing),
        "Avalanche effect: {} of 243 trits differ (expected ~162)",
        differing
    );
}

#[test]
fn test_checksum_suffix_property() {
    let input = "SOMECHECKSUMMEDPAYLOAD";
    let full = digest(input).unwrap();
    for n in 1..=81 {
        assert_eq!(checksum(input, n).unwrap(), full[81 - n..]);
    }
}

#[test]
fn test_address_vectors() {
    assert_eq!(
        generate_address(SEED, 0, SecurityLevel::Medium).unwrap(),
        "T9NLAUZQWWICLJ9NTIYUKUWXIHPSCGVY9DFPTCSKWHGOLXULXEGSAYCTC9F9DXVKLREZBYMLWXHMFAYSX"
    );
    assert_eq!(
        generate_address(SEED, 1, SecurityLevel::Medium).unwrap(),
        "VXERFYCOPFKSHIBYQEPQMKYRMIJATHKKTVZQK9VHVZUQQSNFKLIIBJFXPYHSQUKHUYXPL9XKAVKVVPHFC"
    );
    assert_eq!(
        generate_address(SEED, 0, SecurityLevel::Low).unwrap(),
        "MMLVOWFNFRVBHARMFBPURH9TESIRT9DQRMYRWQUXLKPPPQXVOFRTMQPRPTHYXYSXYNICZAFPQ9VDQYHCD"
    );
}

#[test]
fn test_address_depends_on_seed() {
    // change a single tryte of the seed
    let other_seed = format!("M{}", &SEED[1..]);
    assert_ne!(other_seed, SEED);
    for level in [SecurityLevel::Low, SecurityLevel::Medium] {
        assert_ne!(
            generate_address(SEED, 0, level).unwrap(),
            generate_address(&other_seed, 0, level).unwrap()
        );
    }

    let last_changed = format!("{}A", &SEED[..80]);
    assert_ne!(
        generate_address(SEED, 0, SecurityLevel::Low).unwrap(),
        generate_address(&last_changed, 0, SecurityLevel::Low).unwrap()
    );
}

#[test]
fn test_batch_addresses_match_single() {
    let batch = generate_addresses(SEED, 0, 2, SecurityLevel::Medium).unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0], generate_address(SEED, 0, SecurityLevel::Medium).unwrap());
    assert_eq!(batch[1], generate_address(SEED, 1, SecurityLevel::Medium).unwrap());
}

#[test]
fn test_signature_vector_and_verification() {
    let address = generate_address(SEED, 0, SecurityLevel::Medium).unwrap();
    let signature = generate_signature(SEED, 0, SecurityLevel::Medium, BUNDLE).unwrap();

    assert_eq!(signature.len(), 2 * 2187);
    assert_eq!(
        &signature[..81],
        "REQIMBWVKKGWOGIZUAGTFBNJUQOHBPZODFQ9XDKL9QMIXAURNBKGNRJ9NEVYIWKFAPWMIXKYSTUUBULGB"
    );
    assert!(validate_signature(&address, &signature, BUNDLE).unwrap());

    // a checksummed address is accepted too
    let with_checksum = add_checksum(&address).unwrap();
    assert!(validate_signature(&with_checksum, &signature, BUNDLE).unwrap());
}

#[test]
fn test_signature_rejected_for_other_address_or_bundle() {
    let signature = generate_signature(SEED, 0, SecurityLevel::Low, BUNDLE).unwrap();
    let own = generate_address(SEED, 0, SecurityLevel::Low).unwrap();
    let other = generate_address(SEED, 1, SecurityLevel::Low).unwrap();
    assert!(validate_signature(&own, &signature, BUNDLE).unwrap());
    assert!(!validate_signature(&other, &signature, BUNDLE).unwrap());

    let other_bundle = digest(BUNDLE).unwrap();
    assert!(!validate_signature(&own, &signature, &other_bundle).unwrap());
}

#[test]
fn test_signature_length_scales_with_security_level() {
    for level in [SecurityLevel::Low, SecurityLevel::Medium, SecurityLevel::High] {
        let signature = generate_signature(SEED, 2, level, BUNDLE).unwrap();
        assert_eq!(signature.len(), level as usize * 2187);
    }
}

#[test]
fn test_signing_is_deterministic() {
    let a = generate_signature(SEED, 5, SecurityLevel::Low, BUNDLE).unwrap();
    let b = generate_signature(SEED, 5, SecurityLevel::Low, BUNDLE).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_proof_of_work_mwm_9() {
    let tx = sample_transaction();
    let diver = PearlDiver::new(4);
    let attached = diver.search_trytes(&tx, 9).unwrap();

    assert_eq!(attached.len(), TRANSACTION_TRYTES);
    assert_eq!(attached[..NONCE_OFFSET / 3], tx[..NONCE_OFFSET / 3]);
    assert_eq!(diver.state(), PowState::Found);

    // re-digest the whole transaction and check the trailing zeros
    let hash = trytes_to_trits(&digest(&attached).unwrap()).unwrap();
    assert_eq!(hash.len(), HASH_LENGTH);
    assert!(
        trailing_zeros(&hash) >= 9,
        "hash {} does not meet mwm 9",
        trits_to_trytes(&hash).unwrap()
    );
}

#[test]
fn test_proof_of_work_single_thread() {
    let tx = sample_transaction();
    let attached = PearlDiver::new(1).search_trytes(&tx, 5).unwrap();
    let hash = Transaction::from_trytes(&attached).unwrap().hash();
    assert!(trailing_zeros(&hash) >= 5);
}

#[test]
fn test_cancellation_stops_search() {
    let token = CancelToken::new();
    let diver = PearlDiver::with_cancel_token(2, token.clone());
    let tx = sample_transaction();

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        token.cancel();
    });

    let started = Instant::now();
    let result = diver.search_trytes(&tx, 243);
    canceller.join().unwrap();

    assert_eq!(result, Err(Error::Cancelled));
    assert_eq!(result.unwrap_err().kind(), ErrorKind::ResourceExhaustion);
    assert_eq!(diver.state(), PowState::Cancelled);
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "cancellation took {:?}",
        started.elapsed()
    );
}

#[test]
fn test_invalid_inputs_are_reported() {
    assert_eq!(
        digest("HELLO world").unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
    assert_eq!(checksum("ABC", 0).unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(
        PearlDiver::new(1)
            .search_trytes("ABC", 5)
            .unwrap_err()
            .kind(),
        ErrorKind::InvalidInput
    );
    assert_eq!(
        PearlDiver::new(1)
            .search_trytes(&sample_transaction(), 244)
            .unwrap_err(),
        Error::InvalidMinWeightMagnitude {
            value: 244,
            max: 243
        }
    );
    assert!(generate_address(&SEED.to_lowercase(), 0, SecurityLevel::Low).is_err());
}

#[test]
fn test_sponges_share_interface() {
    let input = trytes_to_trits(SEED).unwrap();
    let mut sponges: Vec<Box<dyn Sponge>> = vec![Box::new(crate::Curl::p81()), Box::new(Kerl::new())];
    let outputs: Vec<_> = sponges.iter_mut().map(|s| s.hash(&input)).collect();
    assert_eq!(outputs[0].len(), HASH_LENGTH);
    assert_eq!(outputs[1].len(), HASH_LENGTH);
    assert_ne!(outputs[0], outputs[1]);
}

/// Timing breakdown, not part of the normal run
#[test]
#[ignore] // Run with: cargo test timing_breakdown -- --ignored --nocapture
fn timing_breakdown() {
    use crate::{transform, transform_bct};

    let iterations = 100;

    let mut state = [1i8; 729];
    let start = Instant::now();
    for _ in 0..iterations {
        transform(&mut state, 81);
    }
    let scalar = start.elapsed() / iterations;

    let mut low = [0u64; 729];
    let mut high = [u64::MAX; 729];
    let start = Instant::now();
    for _ in 0..iterations {
        transform_bct(&mut low, &mut high, 81);
    }
    let sliced = start.elapsed() / iterations;

    let start = Instant::now();
    let _ = generate_address(SEED, 0, SecurityLevel::Medium);
    let address = start.elapsed();

    println!("\n=== Timing Breakdown ===");
    println!("Curl-P-81 scalar transform:     {:?}", scalar);
    println!("Curl-P-81 bit-sliced transform: {:?} (64 states)", sliced);
    println!(
        "Bit-sliced speedup per state:   {:.1}x",
        scalar.as_secs_f64() * 64.0 / sliced.as_secs_f64().max(1e-12)
    );
    println!("Address (security 2):           {:?}", address);
}
