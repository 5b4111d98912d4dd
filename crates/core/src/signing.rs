//! Winternitz-style one-time signatures
//!
//! A seed and an index give a subseed; the subseed expands into a private
//! key of 1 to 3 fragments (the security level), each 27 chunks of 243
//! trits. Hashing every chunk 26 times commits to the key; the address is
//! the hash of those commitments. A signature reveals each chunk hashed
//! `13 - n` times, where `n` is the matching normalized bundle-hash tryte,
//! so a verifier can finish the remaining `n + 13` rounds.
//!
//! The trit-level functions are generic over the [`Sponge`]; the protocol
//! uses [`Kerl`], which the tryte-level API fixes.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::bundle::normalized_bundle;
use crate::curl::Sponge;
use crate::error::{Error, Result, expect_length};
use crate::kerl::Kerl;
use crate::params::{
    ADDRESS_CHECKSUM_TRYTES, FRAGMENT_CHUNKS, FRAGMENT_LENGTH, FRAGMENT_TRYTES, HASH_LENGTH,
    HASH_TRYTES, KEY_CHUNK_ROUNDS, MAX_TRYTE_VALUE, SEED_TRYTES,
};
use crate::trits::{
    Trit, add_trits, balanced_digits, check_trits, trits_to_trytes, trytes_to_trits,
    validate_trytes,
};

/// Number of key fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum SecurityLevel {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
}

impl SecurityLevel {
    pub fn fragments(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(SecurityLevel::Low),
            2 => Ok(SecurityLevel::Medium),
            3 => Ok(SecurityLevel::High),
            other => Err(Error::InvalidSecurityLevel(other)),
        }
    }
}

/// Hash a 243-trit chunk `rounds` times in place, each with a fresh sponge
fn hash_chain<S: Sponge + Default>(chunk: &mut [Trit], rounds: usize) {
    let mut sponge = S::default();
    for _ in 0..rounds {
        sponge.reset();
        sponge.absorb(chunk);
        sponge.squeeze_into(chunk);
    }
}

/// Number of whole fragments in a key or signature, 1..=3
fn fragment_count(what: &'static str, length: usize) -> Result<usize> {
    if length == 0 || length % FRAGMENT_LENGTH != 0 {
        return Err(Error::NotMultipleOf {
            what,
            multiple: FRAGMENT_LENGTH,
            actual: length,
        });
    }
    let fragments = length / FRAGMENT_LENGTH;
    if fragments > SecurityLevel::High.fragments() {
        return Err(Error::InvalidLength {
            what,
            expected: SecurityLevel::High.fragments() * FRAGMENT_LENGTH,
            actual: length,
        });
    }
    Ok(fragments)
}

/// Subseed for `index`: hash of `seed + index` in balanced ternary
pub fn subseed<S: Sponge + Default>(seed: &[Trit], index: u64) -> Result<Vec<Trit>> {
    expect_length("seed", HASH_LENGTH, seed.len())?;
    check_trits(seed)?;
    let indexed = add_trits(seed, &balanced_digits(index as i128));

    let mut sponge = S::default();
    sponge.absorb(&indexed);
    Ok(sponge.squeeze(HASH_LENGTH))
}

/// Private key: the subseed's sponge squeezed for `level` fragments
pub fn key_from_seed<S: Sponge + Default>(
    seed: &[Trit],
    index: u64,
    level: SecurityLevel,
) -> Result<Vec<Trit>> {
    let subseed = subseed::<S>(seed, index)?;
    let mut sponge = S::default();
    sponge.absorb(&subseed);
    Ok(sponge.squeeze(level.fragments() * FRAGMENT_LENGTH))
}

fn fragment_digest<S: Sponge + Default>(fragment: &[Trit]) -> Vec<Trit> {
    let mut hashed = fragment.to_vec();
    for chunk in hashed.chunks_mut(HASH_LENGTH) {
        hash_chain::<S>(chunk, KEY_CHUNK_ROUNDS);
    }
    S::default().hash(&hashed)
}

/// Public commitment of each key fragment (243 trits per fragment)
#[cfg(feature = "parallel")]
pub fn digests<S: Sponge + Default>(key: &[Trit]) -> Result<Vec<Trit>> {
    fragment_count("key", key.len())?;
    check_trits(key)?;
    let per_fragment: Vec<Vec<Trit>> = key
        .par_chunks(FRAGMENT_LENGTH)
        .map(fragment_digest::<S>)
        .collect();
    Ok(per_fragment.concat())
}

/// Public commitment of each key fragment (sequential fallback)
#[cfg(not(feature = "parallel"))]
pub fn digests<S: Sponge + Default>(key: &[Trit]) -> Result<Vec<Trit>> {
    fragment_count("key", key.len())?;
    check_trits(key)?;
    Ok(key
        .chunks(FRAGMENT_LENGTH)
        .flat_map(fragment_digest::<S>)
        .collect())
}

/// Address of a set of fragment digests
pub fn address_from_digests<S: Sponge + Default>(digests: &[Trit]) -> Result<Vec<Trit>> {
    if digests.is_empty() || digests.len() % HASH_LENGTH != 0 {
        return Err(Error::NotMultipleOf {
            what: "digests",
            multiple: HASH_LENGTH,
            actual: digests.len(),
        });
    }
    check_trits(digests)?;
    Ok(S::default().hash(digests))
}

/// Address of a private key
pub fn address_from_key<S: Sponge + Default>(key: &[Trit]) -> Result<Vec<Trit>> {
    address_from_digests::<S>(&digests::<S>(key)?)
}

/// Sign a 243-trit bundle hash; the signature has the key's length
pub fn signature_from_key<S: Sponge + Default>(key: &[Trit], bundle_hash: &[Trit]) -> Result<Vec<Trit>> {
    fragment_count("key", key.len())?;
    check_trits(key)?;
    let normalized = normalized_bundle(bundle_hash)?;

    let mut signature = key.to_vec();
    for (i, fragment) in signature.chunks_mut(FRAGMENT_LENGTH).enumerate() {
        let third = &normalized[(i % 3) * FRAGMENT_CHUNKS..][..FRAGMENT_CHUNKS];
        for (chunk, &n) in fragment.chunks_mut(HASH_LENGTH).zip(third) {
            hash_chain::<S>(chunk, (MAX_TRYTE_VALUE - n) as usize);
        }
    }
    Ok(signature)
}

/// Recover the fragment digest committed to by one signature fragment
///
/// `normalized_third` holds the 27 normalized bundle values the fragment
/// was signed with.
pub fn digest_from_signature<S: Sponge + Default>(
    normalized_third: &[i8],
    fragment: &[Trit],
) -> Result<Vec<Trit>> {
    expect_length("normalized bundle fragment", FRAGMENT_CHUNKS, normalized_third.len())?;
    expect_length("signature fragment", FRAGMENT_LENGTH, fragment.len())?;
    check_trits(fragment)?;

    let mut outer = S::default();
    let mut chunk = [0 as Trit; HASH_LENGTH];
    for (source, &n) in fragment.chunks(HASH_LENGTH).zip(normalized_third) {
        chunk.copy_from_slice(source);
        hash_chain::<S>(&mut chunk, (n + MAX_TRYTE_VALUE) as usize);
        outer.absorb(&chunk);
    }
    Ok(outer.squeeze(HASH_LENGTH))
}

/// Check a signature against the address it claims to belong to
pub fn validate_signature_trits<S: Sponge + Default>(
    address: &[Trit],
    signature: &[Trit],
    bundle_hash: &[Trit],
) -> Result<bool> {
    expect_length("address", HASH_LENGTH, address.len())?;
    check_trits(address)?;
    fragment_count("signature", signature.len())?;
    let normalized = normalized_bundle(bundle_hash)?;

    let mut digests = Vec::with_capacity(signature.len() / FRAGMENT_CHUNKS);
    for (i, fragment) in signature.chunks(FRAGMENT_LENGTH).enumerate() {
        let third = &normalized[(i % 3) * FRAGMENT_CHUNKS..][..FRAGMENT_CHUNKS];
        digests.extend(digest_from_signature::<S>(third, fragment)?);
    }
    Ok(address_from_digests::<S>(&digests)? == address)
}

fn seed_trits(seed: &str) -> Result<Vec<Trit>> {
    validate_trytes(seed, "seed", Some(SEED_TRYTES))?;
    trytes_to_trits(seed)
}

/// Address (81 trytes, no checksum) for a seed and index
pub fn generate_address(seed: &str, index: u64, level: SecurityLevel) -> Result<String> {
    let key = key_from_seed::<Kerl>(&seed_trits(seed)?, index, level)?;
    trits_to_trytes(&address_from_key::<Kerl>(&key)?)
}

/// Addresses for `count` consecutive indexes starting at `start`
#[cfg(feature = "parallel")]
pub fn generate_addresses(
    seed: &str,
    start: u64,
    count: u64,
    level: SecurityLevel,
) -> Result<Vec<String>> {
    seed_trits(seed)?;
    (start..start.saturating_add(count))
        .into_par_iter()
        .map(|index| generate_address(seed, index, level))
        .collect()
}

/// Addresses for `count` consecutive indexes starting at `start`
#[cfg(not(feature = "parallel"))]
pub fn generate_addresses(
    seed: &str,
    start: u64,
    count: u64,
    level: SecurityLevel,
) -> Result<Vec<String>> {
    seed_trits(seed)?;
    (start..start.saturating_add(count))
        .map(|index| generate_address(seed, index, level))
        .collect()
}

/// Signature of a bundle hash (`level × 2187` trytes)
pub fn generate_signature(
    seed: &str,
    index: u64,
    level: SecurityLevel,
    bundle_hash: &str,
) -> Result<String> {
    validate_trytes(bundle_hash, "bundle hash", Some(HASH_TRYTES))?;
    let key = key_from_seed::<Kerl>(&seed_trits(seed)?, index, level)?;
    let signature = signature_from_key::<Kerl>(&key, &trytes_to_trits(bundle_hash)?)?;
    trits_to_trytes(&signature)
}

/// Verify a tryte signature; a checksummed (90-tryte) address is accepted
pub fn validate_signature(address: &str, signature: &str, bundle_hash: &str) -> Result<bool> {
    let address = if address.len() == HASH_TRYTES + ADDRESS_CHECKSUM_TRYTES {
        address.get(..HASH_TRYTES).unwrap_or(address)
    } else {
        address
    };
    validate_trytes(address, "address", Some(HASH_TRYTES))?;
    validate_trytes(bundle_hash, "bundle hash", Some(HASH_TRYTES))?;
    if signature.len() % FRAGMENT_TRYTES != 0 {
        return Err(Error::NotMultipleOf {
            what: "signature",
            multiple: FRAGMENT_TRYTES,
            actual: signature.len(),
        });
    }

    validate_signature_trits::<Kerl>(
        &trytes_to_trits(address)?,
        &trytes_to_trits(signature)?,
        &trytes_to_trits(bundle_hash)?,
    )
}

/// Append the 9-tryte checksum (tail of the address's Kerl hash)
pub fn add_checksum(address: &str) -> Result<String> {
    validate_trytes(address, "address", Some(HASH_TRYTES))?;
    let hash = trits_to_trytes(&Kerl::new().hash(&trytes_to_trits(address)?))?;
    Ok(format!("{}{}", address, &hash[HASH_TRYTES - ADDRESS_CHECKSUM_TRYTES..]))
}

/// Whether a 90-tryte address carries a valid checksum
pub fn is_valid_checksum(address: &str) -> Result<bool> {
    validate_trytes(
        address,
        "checksummed address",
        Some(HASH_TRYTES + ADDRESS_CHECKSUM_TRYTES),
    )?;
    Ok(add_checksum(&address[..HASH_TRYTES])? == address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curl::Curl;

    const SEED: &str =
        "NXAZBDBCCFZUSZMGKZCVNGMMKMCEXOGRLNNMXOIUMKDXTTVDBWGRBYVYZXMWSVLNYIADFTPWYUWJSG9HF";
    const BUNDLE: &str =
        "JEGPJQCCCEUBLSFGBBISRCHFUHBXMCVGDXLHSQQBMSWRZYLBPBVDKHEJSAEXWCMDPDNCRLFZWHTHHBCYG";

    #[test]
    fn test_security_level_conversion() {
        assert_eq!(SecurityLevel::try_from(1), Ok(SecurityLevel::Low));
        assert_eq!(SecurityLevel::try_from(3), Ok(SecurityLevel::High));
        assert_eq!(
            SecurityLevel::try_from(4),
            Err(Error::InvalidSecurityLevel(4))
        );
        assert_eq!(SecurityLevel::try_from(0), Err(Error::InvalidSecurityLevel(0)));
        assert_eq!(SecurityLevel::default().fragments(), 2);
    }

    #[test]
    fn test_subseed_vector() {
        let seed = trytes_to_trits(SEED).unwrap();
        let sub = subseed::<Kerl>(&seed, 0).unwrap();
        assert_eq!(
            trits_to_trytes(&sub).unwrap(),
            "TDNHMJLDSSPAVXMSPQJAJXXWYKEVODCRFEYZCZEEIYAVMSXITQMOMQWWBLVAQFXYPJIMDURWZKYTWJBAW"
        );
    }

    #[test]
    fn test_key_length_follows_security_level() {
        let seed = trytes_to_trits(SEED).unwrap();
        for level in [SecurityLevel::Low, SecurityLevel::Medium, SecurityLevel::High] {
            let key = key_from_seed::<Kerl>(&seed, 3, level).unwrap();
            assert_eq!(key.len(), level.fragments() * FRAGMENT_LENGTH);
        }
    }

    #[test]
    fn test_checksum_vector() {
        let address =
            "T9NLAUZQWWICLJ9NTIYUKUWXIHPSCGVY9DFPTCSKWHGOLXULXEGSAYCTC9F9DXVKLREZBYMLWXHMFAYSX";
        let with_checksum = add_checksum(address).unwrap();
        assert_eq!(&with_checksum[81..], "EADBUYSWZ");
        assert!(is_valid_checksum(&with_checksum).unwrap());

        let mut tampered = with_checksum.clone();
        tampered.replace_range(89..90, "A");
        assert!(!is_valid_checksum(&tampered).unwrap());
    }

    #[test]
    fn test_signature_fragment_and_key_shape_errors() {
        let bundle = trytes_to_trits(BUNDLE).unwrap();
        assert!(matches!(
            signature_from_key::<Kerl>(&[0; 100], &bundle),
            Err(Error::NotMultipleOf { .. })
        ));
        assert!(matches!(
            signature_from_key::<Kerl>(&vec![0; 4 * FRAGMENT_LENGTH], &bundle),
            Err(Error::InvalidLength { .. })
        ));
        assert!(generate_signature(SEED, 0, SecurityLevel::Low, "TOOSHORT").is_err());
        assert!(generate_address("SHORTSEED", 0, SecurityLevel::Low).is_err());
    }

    #[test]
    fn test_out_of_range_trits_rejected() {
        let bundle = trytes_to_trits(BUNDLE).unwrap();
        let bad_key = vec![3 as Trit; FRAGMENT_LENGTH];
        let invalid = Err(Error::InvalidTrit { index: 0, value: 3 });

        assert_eq!(address_from_key::<Curl>(&bad_key), invalid);
        assert_eq!(digests::<Kerl>(&bad_key), invalid);
        assert_eq!(signature_from_key::<Kerl>(&bad_key, &bundle), invalid);
        assert_eq!(subseed::<Kerl>(&[3; HASH_LENGTH], 0), invalid);
        assert_eq!(address_from_digests::<Kerl>(&[3; HASH_LENGTH]), invalid);

        let normalized = normalized_bundle(&bundle).unwrap();
        assert_eq!(
            digest_from_signature::<Kerl>(&normalized[..FRAGMENT_CHUNKS], &bad_key),
            invalid
        );
        assert_eq!(
            validate_signature_trits::<Kerl>(&[0; HASH_LENGTH], &bad_key, &bundle),
            Err(Error::InvalidTrit { index: 0, value: 3 })
        );
    }

    #[test]
    fn test_scheme_works_with_curl() {
        let seed = trytes_to_trits(SEED).unwrap();
        let bundle = trytes_to_trits(BUNDLE).unwrap();
        let key = key_from_seed::<Curl>(&seed, 7, SecurityLevel::Low).unwrap();
        let address = address_from_key::<Curl>(&key).unwrap();
        let signature = signature_from_key::<Curl>(&key, &bundle).unwrap();
        assert!(validate_signature_trits::<Curl>(&address, &signature, &bundle).unwrap());
        // a Kerl verifier does not accept a Curl signature
        assert!(!validate_signature_trits::<Kerl>(&address, &signature, &bundle).unwrap());
    }
}
