use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Freshly generated password: the plain text goes to the member once, only
/// the hash is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedPassword {
    pub plain: String,
    pub hash: String,
}

/// Eight digits, never starting with zero.
pub fn generate_password() -> String {
    rand::thread_rng()
        .gen_range(10_000_000u32..=99_999_999)
        .to_string()
}

#[derive(Clone)]
pub struct PasswordIssuer {
    hasher: Argon2<'static>,
}

impl Default for PasswordIssuer {
    fn default() -> Self {
        Self {
            hasher: Argon2::default(),
        }
    }
}

impl PasswordIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit cost parameters. Tests use the minimum cost.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| CredentialError::Hash(err.to_string()))?;
        Ok(Self {
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, plain: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hash(err.to_string()))
    }

    pub fn issue(&self) -> Result<IssuedPassword, CredentialError> {
        let plain = generate_password();
        let hash = self.hash(&plain)?;
        Ok(IssuedPassword { plain, hash })
    }

    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                self.hasher
                    .verify_password(plain.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_passwords_are_eight_digits() {
        for _ in 0..50 {
            let password = generate_password();
            assert_eq!(password.len(), 8);
            assert!(password.bytes().all(|byte| byte.is_ascii_digit()));
            assert_ne!(password.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn issued_hash_verifies_only_the_plain_text() {
        let issuer = PasswordIssuer::with_params(8, 1, 1).expect("valid params");
        let issued = issuer.issue().expect("hashes");
        assert_ne!(issued.hash, issued.plain);
        assert!(issuer.verify(&issued.plain, &issued.hash));
        assert!(!issuer.verify("00000000", &issued.hash));
        assert!(!issuer.verify(&issued.plain, "not-a-hash"));
    }
}
