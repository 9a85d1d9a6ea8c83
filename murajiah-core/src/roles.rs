use log::warn;
use std::sync::Arc;

use crate::{Database, DatabaseError, PrimaryKey, Role};

/// Resolves account roles and answers the privilege questions admin actions
/// gate on. Every call re-resolves from the database, nothing is cached.
pub struct RolePolicy<Db> {
    db: Arc<Db>,
}

impl<Db> RolePolicy<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Resolves the role of a user. A missing profile, an empty role column,
    /// or a lookup failure all resolve to [Role::User], never to an error.
    pub async fn resolve_role(&self, user_id: PrimaryKey) -> Role {
        match self.db.user_by_id(user_id).await {
            Ok(user) => user.role,
            Err(DatabaseError::NotFound {
                resource: _,
                identifier: _,
            }) => Role::User,
            Err(e) => {
                warn!("Role lookup for user {user_id} failed, treating as user: {e}");
                Role::User
            }
        }
    }

    pub async fn is_admin(&self, user_id: PrimaryKey) -> bool {
        self.resolve_role(user_id).await.is_admin()
    }

    pub async fn is_owner(&self, user_id: PrimaryKey) -> bool {
        self.resolve_role(user_id).await.is_owner()
    }

    pub async fn has_moderation_rights(&self, user_id: PrimaryKey) -> bool {
        self.resolve_role(user_id).await.has_moderation_rights()
    }
}

impl<Db> Clone for RolePolicy<Db> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDatabase;
    use crate::NewUser;

    async fn user_with_role(db: &Arc<MemoryDatabase>, username: &str, role: Role) -> PrimaryKey {
        db.create_user(NewUser {
            username: username.to_string(),
            password: "hash".to_string(),
            display_name: username.to_string(),
            role,
        })
        .await
        .expect("creates user")
        .id
    }

    #[tokio::test]
    async fn test_missing_profile_resolves_to_user() {
        let db = Arc::new(MemoryDatabase::default());
        let policy = RolePolicy::new(&db);

        assert_eq!(policy.resolve_role(999).await, Role::User);
        assert!(!policy.is_admin(999).await);
        assert!(!policy.has_moderation_rights(999).await);
    }

    #[tokio::test]
    async fn test_predicates_follow_the_role_tiers() {
        let db = Arc::new(MemoryDatabase::default());
        let policy = RolePolicy::new(&db);

        let owner = user_with_role(&db, "owner", Role::Owner).await;
        let admin = user_with_role(&db, "admin", Role::Admin).await;
        let moderator = user_with_role(&db, "moderator", Role::Moderator).await;
        let plain = user_with_role(&db, "plain", Role::User).await;

        assert!(policy.is_admin(owner).await);
        assert!(policy.is_admin(admin).await);
        assert!(!policy.is_admin(moderator).await);

        assert!(policy.is_owner(owner).await);
        assert!(!policy.is_owner(admin).await);

        assert!(policy.has_moderation_rights(moderator).await);
        assert!(!policy.has_moderation_rights(plain).await);
    }
}
