//! Password hashing (argon2)

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a plaintext password using argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verify a plaintext password against a stored argon2 digest
pub fn verify_password(password: &str, digest: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(digest)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a random initial password for invited users who do not
/// have an account yet
pub fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let digest = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &digest).unwrap());
        assert!(!verify_password("wrong password", &digest).unwrap());
    }

    #[test]
    fn test_random_password_length() {
        let pw = generate_random_password(12);
        assert_eq!(pw.len(), 12);
        assert_ne!(pw, generate_random_password(12));
    }
}
