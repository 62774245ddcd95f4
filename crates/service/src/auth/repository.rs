use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, NewUser};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Lookup by normalized (lowercased) email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, input: NewUser) -> Result<AuthUser, AuthError>;
    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError>;
}

/// Simple in-memory mock repository for tests and local wiring
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;

    fn poisoned<T>(_: T) -> AuthError { AuthError::Repository("lock poisoned".into()) }

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, (AuthUser, String)>>, // key: user_id, value: (user, password hash)
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().map_err(poisoned)?;
            Ok(users.values().find(|(u, _)| u.email == email).map(|(u, _)| u.clone()))
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().map_err(poisoned)?;
            Ok(users.get(&id).map(|(u, _)| u.clone()))
        }

        async fn create_user(&self, input: NewUser) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().map_err(poisoned)?;
            if users.values().any(|(u, _)| u.email == input.email) {
                return Err(AuthError::Conflict);
            }
            let now = Utc::now().fixed_offset();
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: input.email,
                name: input.name,
                role: input.role,
                email_verified: input.email_verified,
                created_at: now,
                updated_at: now,
            };
            users.insert(user.id, (user.clone(), input.password_hash));
            Ok(user)
        }

        async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
            let users = self.users.lock().map_err(poisoned)?;
            Ok(users.get(&user_id).map(|(_, h)| h.clone()))
        }
    }

    impl MockAuthRepository {
        /// Remove a user, simulating deletion between login and refresh.
        pub fn remove(&self, id: Uuid) {
            if let Ok(mut users) = self.users.lock() {
                users.remove(&id);
            }
        }
    }
}
