use anyhow::Result;
use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};

pub async fn hash_pw(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let argon2 = Argon2::default();
        let salt = SaltString::generate(&mut OsRng);
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|password_hash| password_hash.to_string())
            .map_err(|e| anyhow::anyhow!(e))
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::crypto::verify_pw::verify_pw;

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hash = hash_pw("correct horse".to_string()).await.unwrap();
        assert!(verify_pw("correct horse", &hash).await.unwrap());
        assert!(!verify_pw("battery staple", &hash).await.unwrap());
    }
}
