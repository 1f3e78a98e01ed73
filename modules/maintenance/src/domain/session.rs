use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::contract::model::{Role, User};
use crate::domain::error::DomainError;
use crate::domain::repo::{SessionRepository, UsersRepository};

/// Explicit "who is using the app" context.
///
/// The pointer is a copy of a user record and lives independently of the
/// user store: it is not refreshed if the directory changes.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionRepository>,
    users: Arc<dyn UsersRepository>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionRepository>, users: Arc<dyn UsersRepository>) -> Self {
        Self { store, users }
    }

    /// Load the current user. If nobody is logged in, the first admin in the
    /// user store becomes current: demo-mode auto-login, not a security feature.
    #[instrument(name = "maintenance.session.init", skip(self))]
    pub async fn init(&self) -> Result<Option<User>, DomainError> {
        if let Some(user) = self.current().await? {
            debug!(user_id = %user.id, "Restored session");
            return Ok(Some(user));
        }

        let admin = self
            .users
            .list()
            .await
            .map_err(DomainError::repository)?
            .into_iter()
            .find(|u| u.role == Role::Admin);

        match admin {
            Some(admin) => {
                info!(user_id = %admin.id, "No session, auto-login as demo admin");
                self.set_current(Some(&admin)).await?;
                Ok(Some(admin))
            }
            None => {
                debug!("No session and no admin user to fall back to");
                Ok(None)
            }
        }
    }

    pub async fn current(&self) -> Result<Option<User>, DomainError> {
        self.store
            .load()
            .await
            .map_err(DomainError::repository)
    }

    pub async fn set_current(&self, user: Option<&User>) -> Result<(), DomainError> {
        self.store
            .store(user)
            .await
            .map_err(DomainError::repository)
    }

    #[instrument(name = "maintenance.session.logout", skip(self))]
    pub async fn logout(&self) -> Result<(), DomainError> {
        self.set_current(None).await?;
        info!("Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct BrokenStore;

    #[async_trait]
    impl SessionRepository for BrokenStore {
        async fn load(&self) -> anyhow::Result<Option<User>> {
            Err(anyhow::anyhow!("disk unplugged")).context("failed to read current user")
        }

        async fn store(&self, _user: Option<&User>) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("read-only volume")).context("failed to write current user")
        }
    }

    struct NoUsers;

    #[async_trait]
    impl UsersRepository for NoUsers {
        async fn list(&self) -> anyhow::Result<Vec<User>> {
            Ok(Vec::new())
        }

        async fn find_by_id(&self, _id: Uuid) -> anyhow::Result<Option<User>> {
            Ok(None)
        }

        async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
            Ok(None)
        }

        async fn insert(&self, _user: User) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn storage_errors_keep_the_whole_chain() {
        let session = Session::new(Arc::new(BrokenStore), Arc::new(NoUsers));

        match session.current().await.unwrap_err() {
            DomainError::Storage { message } => {
                assert_eq!(message, "failed to read current user: disk unplugged")
            }
            other => panic!("expected storage error, got {other:?}"),
        }

        match session.logout().await.unwrap_err() {
            DomainError::Storage { message } => {
                assert!(message.contains("failed to write current user"));
                assert!(message.contains("read-only volume"));
            }
            other => panic!("expected storage error, got {other:?}"),
        }
    }
}
