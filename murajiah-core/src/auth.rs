use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use log::warn;
use rand::rngs::OsRng;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    util::random_string, Database, DatabaseError, NewSession, NewUser, PrimaryKey, Role,
    SessionData, UpdatedUser, UserData,
};

pub struct Auth<Db> {
    db: Arc<Db>,
    argon: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password is incorrect
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("An owner account already exists")]
    OwnerExists,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
    #[error("HashError: {0}")]
    HashError(String),
}

impl<Db> Auth<Db>
where
    Db: Database,
{
    const SESSION_DURATION_IN_DAYS: usize = 7;

    pub fn new(db: &Arc<Db>) -> Self {
        Self {
            db: db.clone(),
            argon: Argon2::default(),
        }
    }

    /// Logs in a user, returning a new session
    pub async fn login(&self, credentials: Credentials) -> Result<SessionData, AuthError> {
        self.clear_expired().await;

        let user = self
            .db
            .user_by_username(&credentials.username)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound {
                    resource: _,
                    identifier: _,
                } => AuthError::InvalidCredentials,
                err => AuthError::Db(err),
            })?;

        let stored_password = PasswordHash::parse(&user.password, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(credentials.password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let expires_at = Utc::now() + Duration::days(Self::SESSION_DURATION_IN_DAYS as i64);

        let new_session = NewSession {
            token: random_string(32),
            user_id: user.id,
            expires_at,
        };

        let new_session = self
            .db
            .create_session(new_session)
            .await
            .map_err(AuthError::Db)?;

        Ok(new_session)
    }

    /// Deletes the associated session, if it exists
    pub async fn logout(&self, token: &str) -> Result<(), DatabaseError> {
        self.db.delete_session_by_token(token).await
    }

    /// Creates a basic user account
    pub async fn register(&self, new_user: NewPlainUser) -> Result<UserData, AuthError> {
        self.create_user(NewUser {
            username: new_user.username,
            password: new_user.password,
            display_name: new_user.display_name,
            role: Role::User,
        })
        .await
    }

    /// Creates the owner account, if it doesn't already exist
    pub async fn register_owner(&self, new_user: NewPlainUser) -> Result<UserData, AuthError> {
        let has_owner = self.db.check_for_owner().await.map_err(AuthError::Db)?;

        if has_owner {
            return Err(AuthError::OwnerExists);
        }

        self.create_user(NewUser {
            username: new_user.username,
            password: new_user.password,
            display_name: new_user.display_name,
            role: Role::Owner,
        })
        .await
    }

    /// Updates a user
    pub async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData, DatabaseError> {
        self.db.update_user(updated_user).await
    }

    /// Deletes a user completely
    pub async fn delete_user(&self, user_id: PrimaryKey) -> Result<(), DatabaseError> {
        self.db.delete_user(user_id).await
    }

    /// Returns a session if it exists
    pub async fn session(&self, token: &str) -> Result<SessionData, DatabaseError> {
        self.db.session_by_token(token).await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = self
            .argon
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        self.db
            .create_user(NewUser {
                username: new_user.username,
                password: hashed_password,
                display_name: new_user.display_name,
                role: new_user.role,
            })
            .await
            .map_err(AuthError::Db)
    }

    async fn clear_expired(&self) {
        if let Err(e) = self.db.clear_expired_sessions().await {
            warn!("Failed to clear expired sessions: {e}");
        }
    }
}

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewPlainUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDatabase;

    fn auth() -> Auth<MemoryDatabase> {
        Auth::new(&Arc::new(MemoryDatabase::default()))
    }

    fn plain_user(username: &str) -> NewPlainUser {
        NewPlainUser {
            username: username.to_string(),
            password: "correct horse".to_string(),
            display_name: username.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let auth = auth();

        let user = auth.register(plain_user("amira")).await.expect("registers");
        assert_eq!(user.role, Role::User);
        assert_ne!(user.password, "correct horse", "password is stored hashed");

        let session = auth
            .login(Credentials {
                username: "amira".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .expect("logs in");

        assert_eq!(session.user.id, user.id);
        assert_eq!(session.token.len(), 32);

        let looked_up = auth.session(&session.token).await.expect("session exists");
        assert_eq!(looked_up.id, session.id);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let auth = auth();
        auth.register(plain_user("amira")).await.expect("registers");

        let result = auth
            .login(Credentials {
                username: "amira".to_string(),
                password: "wrong horse".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        let result = auth
            .login(Credentials {
                username: "nobody".to_string(),
                password: "correct horse".to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(AuthError::InvalidCredentials)),
            "unknown user looks identical to a wrong password"
        );
    }

    #[tokio::test]
    async fn test_owner_can_only_be_registered_once() {
        let auth = auth();

        let owner = auth
            .register_owner(plain_user("amira"))
            .await
            .expect("registers owner");
        assert_eq!(owner.role, Role::Owner);

        let result = auth.register_owner(plain_user("badr")).await;
        assert!(matches!(result, Err(AuthError::OwnerExists)));
    }

    #[tokio::test]
    async fn test_logout_deletes_session() {
        let auth = auth();
        auth.register(plain_user("amira")).await.expect("registers");

        let session = auth
            .login(Credentials {
                username: "amira".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .expect("logs in");

        auth.logout(&session.token).await.expect("logs out");
        assert!(auth.session(&session.token).await.is_err());
    }
}
