//! Authentication gate
//!
//! Verifies bearer tokens minted by the external identity service and
//! resolves them to a local user record. Resolution has a documented side
//! effect: the first authenticated request from an unknown identity creates
//! its local account.

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{User, UserClaims},
    },
    repository::Repository,
};

/// The resolved caller: local user record plus the role claimed by the
/// identity service.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user: User,
    pub role: Role,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Verify a raw bearer token and return its claims
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }

    /// Resolve the claims to a local user, creating one on first contact.
    ///
    /// Two concurrent first requests from the same identity can race on the
    /// insert; the loser re-fetches the row the winner created.
    pub async fn resolve_caller(&self, claims: &UserClaims) -> AppResult<CallerIdentity> {
        if let Some(user) = self.repository.users.get_by_email(&claims.sub).await? {
            return Ok(CallerIdentity {
                user,
                role: claims.role,
            });
        }

        tracing::info!(email = %claims.sub, "auto-provisioning local user");

        let user = match self
            .repository
            .users
            .provision(
                claims.auth_id.as_deref(),
                &claims.sub,
                claims.provisional_name(),
            )
            .await
        {
            Ok(user) => user,
            Err(AppError::Conflict(_)) => {
                // A concurrent request provisioned this identity first
                self.repository
                    .users
                    .get_by_email(&claims.sub)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "User {} vanished after duplicate provision",
                            claims.sub
                        ))
                    })?
            }
            Err(e) => return Err(e),
        };

        Ok(CallerIdentity {
            user,
            role: claims.role,
        })
    }

    /// Fail with `Forbidden` unless the caller holds the admin role
    pub fn require_admin(&self, caller: &CallerIdentity) -> AppResult<()> {
        if caller.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin role required".to_string()))
        }
    }
}
