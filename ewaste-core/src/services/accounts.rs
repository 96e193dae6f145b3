use super::error::{ServiceError, ServiceResult};
use crate::entities::user::{InsertUser, UserRecord};
use crate::store::UserStore;
use crate::validation::required;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use ewaste_sdk::objects::{LoginBody, RegisterBody};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Create an account with an argon2 hashed password.
    pub async fn register(&self, body: RegisterBody) -> ServiceResult<UserRecord> {
        let name = required("name", body.name)?;
        let email = required("email", body.email)?;
        let password = required("password", body.password)?;

        let password_hash = run_blocking(move || hash_password(&password)).await?;
        let user = self
            .users
            .insert_user(InsertUser {
                name,
                email,
                password_hash,
            })
            .await?;
        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Check credentials. An unknown email and a wrong password are
    /// indistinguishable to the caller.
    pub async fn login(&self, body: LoginBody) -> ServiceResult<UserRecord> {
        let email = required("email", body.email)?;
        let password = required("password", body.password)?;

        let Some(user) = self.users.find_user_by_email(&email).await? else {
            debug!("Login for unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        let stored_hash = user.password_hash.clone();
        let matches = run_blocking(move || Ok(verify_password(&password, &stored_hash))).await?;
        if !matches {
            debug!(user_id = user.id, "Login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }
        Ok(user)
    }
}

async fn run_blocking<T, F>(f: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Hashing(e.to_string()))?
}

fn hash_password(plaintext: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Hashing(e.to_string()))
}

fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::validation::ValidationError;

    fn register_body(email: &str) -> RegisterBody {
        RegisterBody {
            name: Some("Ana".to_string()),
            email: Some(email.to_string()),
            password: Some("hunter2".to_string()),
        }
    }

    fn login_body(email: &str, password: &str) -> LoginBody {
        LoginBody {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let service = AccountService::new(Arc::new(InMemoryStore::new()));
        let user = service.register(register_body("ana@example.com")).await.unwrap();

        assert!(user.password_hash.starts_with("$argon2"));
        assert_ne!(user.password_hash, "hunter2");
    }

    #[tokio::test]
    async fn test_login_accepts_correct_password_only() {
        let service = AccountService::new(Arc::new(InMemoryStore::new()));
        let registered = service.register(register_body("ana@example.com")).await.unwrap();

        let user = service
            .login(login_body("ana@example.com", "hunter2"))
            .await
            .unwrap();
        assert_eq!(user.id, registered.id);

        assert!(matches!(
            service.login(login_body("ana@example.com", "wrong")).await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login(login_body("nobody@example.com", "hunter2")).await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_constraint_violation() {
        let service = AccountService::new(Arc::new(InMemoryStore::new()));
        service.register(register_body("ana@example.com")).await.unwrap();

        assert!(matches!(
            service.register(register_body("ana@example.com")).await,
            Err(ServiceError::ConstraintViolation("users.email"))
        ));
    }

    #[tokio::test]
    async fn test_missing_password_is_validation_error() {
        let service = AccountService::new(Arc::new(InMemoryStore::new()));
        let body = RegisterBody {
            password: None,
            ..register_body("ana@example.com")
        };

        assert!(matches!(
            service.register(body).await,
            Err(ServiceError::Validation(ValidationError::MissingField("password")))
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }
}
