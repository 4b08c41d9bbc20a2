//! Salted PBKDF2-SHA256 password hashes in the
//! `pbkdf2_sha256$<iterations>$<salt>$<base64 hash>` text format.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::distributions::{Alphanumeric, DistString};
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::CryptoError;

pub const HASH_ALGORITHM: &str = "pbkdf2_sha256";
pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 22;

fn derive(password: &str, salt: &str, iterations: u32) -> Zeroizing<[u8; HASH_LENGTH]> {
    let mut out = Zeroizing::new([0u8; HASH_LENGTH]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, out.as_mut());
    out
}

/// Hash `password` with a fresh salt drawn from `rng`.
pub fn hash_password<R: Rng + ?Sized>(
    password: &str,
    iterations: u32,
    rng: &mut R,
) -> Result<String, CryptoError> {
    if iterations == 0 {
        return Err(CryptoError::InvalidIterations);
    }
    let salt = Alphanumeric.sample_string(rng, SALT_LENGTH);
    let hash = derive(password, &salt, iterations);
    Ok(format!(
        "{HASH_ALGORITHM}${iterations}${salt}${}",
        STANDARD.encode(hash.as_ref())
    ))
}

/// Check `password` against an encoded hash produced by [`hash_password`].
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, CryptoError> {
    let mut parts = encoded.split('$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(CryptoError::MalformedHash);
    };
    if algorithm != HASH_ALGORITHM {
        return Err(CryptoError::UnsupportedAlgorithm(algorithm.to_string()));
    }
    let iterations: u32 = iterations.parse().map_err(|_| CryptoError::MalformedHash)?;
    if iterations == 0 {
        return Err(CryptoError::InvalidIterations);
    }
    let expected = STANDARD.decode(hash)?;
    let actual = derive(password, salt, iterations);
    Ok(actual[..].ct_eq(&expected[..]).into())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn hash_round_trips() {
        let mut rng = StdRng::seed_from_u64(7);
        let encoded = hash_password("password123", 1_000, &mut rng).unwrap();
        assert!(encoded.starts_with("pbkdf2_sha256$1000$"));
        assert!(verify_password("password123", &encoded).unwrap());
        assert!(!verify_password("password124", &encoded).unwrap());
    }

    #[test]
    fn same_seed_same_hash() {
        let a = hash_password("pw", 10, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = hash_password("pw", 10, &mut StdRng::seed_from_u64(1)).unwrap();
        let c = hash_password("pw", 10, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn salt_has_expected_shape() {
        let encoded = hash_password("pw", 10, &mut StdRng::seed_from_u64(3)).unwrap();
        let salt = encoded.split('$').nth(2).unwrap();
        assert_eq!(salt.len(), SALT_LENGTH);
        assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn zero_iterations_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            hash_password("pw", 0, &mut rng),
            Err(CryptoError::InvalidIterations)
        ));
    }

    #[test]
    fn malformed_hashes_rejected() {
        assert!(matches!(
            verify_password("pw", "not-a-hash"),
            Err(CryptoError::MalformedHash)
        ));
        assert!(matches!(
            verify_password("pw", "bcrypt$10$salt$hash"),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            verify_password("pw", "pbkdf2_sha256$10$salt$***"),
            Err(CryptoError::Encoding(_))
        ));
    }
}
