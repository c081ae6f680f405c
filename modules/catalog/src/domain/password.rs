use crate::domain::error::DomainError;

/// bcrypt wrapper. Hashing is CPU-bound, so it runs on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, plain: &str) -> Result<String, DomainError> {
        let plain = plain.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(|e| DomainError::password_hash(e.to_string()))?
            .map_err(|e| DomainError::password_hash(e.to_string()))
    }

    pub async fn verify(&self, plain: &str, hash: &str) -> Result<bool, DomainError> {
        let plain = plain.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
            .await
            .map_err(|e| DomainError::password_hash(e.to_string()))?
            .map_err(|e| DomainError::password_hash(e.to_string()))
    }
}
