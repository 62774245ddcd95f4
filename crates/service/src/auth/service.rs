use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use tracing::{info, debug, warn, instrument};

use models::user::{normalize_email, validate_email, validate_name, ROLE_USER};

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession, NewUser, RefreshedToken, VerifiedToken};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token::{TokenManager, TokenType};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Hash a password with Argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Verified against when the account or its hash is missing, so misses cost one Argon2 check too.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("unused-dummy-password").ok());

fn burn_password_check(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    tokens: TokenManager,
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, tokens: TokenManager) -> Self { Self { repo, tokens } }

    /// Register a new user with a hashed password and role `user`.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        validate_email(&input.email)?;
        validate_name(&input.name)?;
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        let email = normalize_email(&input.email);
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let password_hash = hash_password(&input.password)?;
        let user = self.repo.create_user(NewUser {
            email,
            name: input.name.trim().to_string(),
            password_hash,
            role: ROLE_USER.to_string(),
            email_verified: false,
        }).await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue an access/refresh token pair.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&input.email);
        let Some(user) = self.repo.find_user_by_email(&email).await? else {
            burn_password_check(&input.password);
            warn!("login_failed");
            return Err(AuthError::Unauthorized);
        };

        let Some(hash) = self.repo.get_password_hash(user.id).await? else {
            burn_password_check(&input.password);
            warn!(user_id = %user.id, "login_failed");
            return Err(AuthError::Unauthorized);
        };
        if !verify_password(&input.password, &hash)? {
            warn!(user_id = %user.id, "login_failed");
            return Err(AuthError::Unauthorized);
        }

        let access_token = self.tokens.issue_access(user.id, &user.role)?;
        let refresh_token = self.tokens.issue_refresh(user.id)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.tokens.access_ttl_secs(),
            user,
        })
    }

    /// Exchange a refresh token for a new access token carrying the user's current role.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, AuthError> {
        let claims = self.tokens.decode_as(refresh_token, TokenType::Refresh)?;
        let user = self.repo
            .find_user_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("user no longer exists".into()))?;
        let access_token = self.tokens.issue_access(user.id, &user.role)?;
        debug!(user_id = %user.id, "access_token_refreshed");
        Ok(RefreshedToken {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.tokens.access_ttl_secs(),
        })
    }

    /// Validate an access token and report its identity.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        let claims = self.tokens.decode_as(token, TokenType::Access)?;
        Ok(VerifiedToken {
            valid: true,
            user_id: claims.user_id,
            role: claims.role.clone(),
            expires_at: claims.expires_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use chrono::Duration;

    fn svc() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        let tokens = TokenManager::new("unit-secret", Duration::minutes(15), Duration::hours(168));
        (repo.clone(), AuthService::new(repo, tokens))
    }

    fn reg(email: &str) -> RegisterInput {
        RegisterInput { email: email.into(), password: "secret1".into(), name: "Ada".into() }
    }

    #[tokio::test]
    async fn register_normalizes_and_defaults_role() {
        let (_, svc) = svc();
        let user = svc.register(reg("  Ada@Example.COM ")).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, "user");
        assert!(!user.email_verified);
    }

    #[tokio::test]
    async fn duplicate_registration_rejected() {
        let (_, svc) = svc();
        svc.register(reg("dup@example.com")).await.unwrap();
        let err = svc.register(reg("DUP@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let (_, svc) = svc();
        let short = RegisterInput { password: "12345".into(), ..reg("a@b.com") };
        assert!(matches!(svc.register(short).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.register(reg("nope")).await, Err(AuthError::Validation(_))));
        let nameless = RegisterInput { name: "  ".into(), ..reg("c@d.com") };
        assert!(matches!(svc.register(nameless).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn login_issues_token_pair() {
        let (_, svc) = svc();
        svc.register(reg("u@e.com")).await.unwrap();
        let session = svc.login(LoginInput { email: "U@E.com".into(), password: "secret1".into() }).await.unwrap();
        assert_eq!(session.token_type, "Bearer");
        assert_eq!(session.expires_in, 900);
        let verified = svc.verify(&session.access_token).unwrap();
        assert_eq!(verified.user_id, session.user.id);
        assert_eq!(verified.role.as_deref(), Some("user"));
        // refresh tokens are not accepted as access tokens
        assert!(svc.verify(&session.refresh_token).is_err());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (_, svc) = svc();
        svc.register(reg("u@e.com")).await.unwrap();
        let wrong = svc.login(LoginInput { email: "u@e.com".into(), password: "bad-pass".into() }).await.unwrap_err();
        let unknown = svc.login(LoginInput { email: "x@e.com".into(), password: "secret1".into() }).await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AuthError::Unauthorized));
    }

    #[test]
    fn dummy_hash_is_a_real_argon2_hash() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!verify_password("secret1", hash).unwrap());
    }

    #[tokio::test]
    async fn unknown_email_login_does_comparable_hashing_work() {
        let (_, svc) = svc();
        svc.register(reg("t@e.com")).await.unwrap();
        let wrong = LoginInput { email: "t@e.com".into(), password: "bad-pass".into() };
        let unknown = LoginInput { email: "nobody@e.com".into(), password: "bad-pass".into() };
        let _ = svc.login(unknown.clone()).await;

        let start = std::time::Instant::now();
        let _ = svc.login(wrong).await;
        let wrong_elapsed = start.elapsed();

        let start = std::time::Instant::now();
        assert!(matches!(svc.login(unknown).await, Err(AuthError::Unauthorized)));
        let unknown_elapsed = start.elapsed();

        assert!(unknown_elapsed * 4 >= wrong_elapsed, "unknown {unknown_elapsed:?} vs wrong {wrong_elapsed:?}");
    }

    #[tokio::test]
    async fn refresh_requires_refresh_token_and_live_user() {
        let (repo, svc) = svc();
        svc.register(reg("r@e.com")).await.unwrap();
        let session = svc.login(LoginInput { email: "r@e.com".into(), password: "secret1".into() }).await.unwrap();

        let refreshed = svc.refresh(&session.refresh_token).await.unwrap();
        assert!(svc.verify(&refreshed.access_token).is_ok());

        assert!(matches!(svc.refresh(&session.access_token).await, Err(AuthError::InvalidToken(_))));

        repo.remove(session.user.id);
        assert!(matches!(svc.refresh(&session.refresh_token).await, Err(AuthError::InvalidToken(_))));
    }
}
