//! User model and bearer-token claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{Role, UserStatus};

/// User model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    /// Identifier of this user in the external identity system, when known
    pub auth_id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: UserStatus,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    pub auth_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub status: Option<UserStatus>,
}

/// Update user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub auth_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub status: Option<UserStatus>,
}

/// Claims carried by a bearer token from the external identity service.
///
/// Contract: `sub` holds the caller's email (the identity-resolution key),
/// `auth_id` the external account id when the issuer provides one, and
/// `role` is either `USER` or `ADMIN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    #[serde(default)]
    pub auth_id: Option<String>,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Parse and verify a JWT token (HS256 signature and expiry).
    ///
    /// This service only verifies tokens; issuing them is the identity
    /// service's job.
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// The display name to use when auto-provisioning a local account:
    /// the local part of the subject email.
    pub fn provisional_name(&self) -> &str {
        self.sub.split('@').next().unwrap_or(&self.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn make_token(claims: &UserClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(role: Role, exp_offset: i64) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "user@library.com".to_string(),
            auth_id: Some("42".to_string()),
            role,
            exp: now + exp_offset,
            iat: now,
        }
    }

    #[test]
    fn valid_token_round_trips() {
        let token = make_token(&claims(Role::Admin, 3600), SECRET);
        let parsed = UserClaims::from_token(&token, SECRET).unwrap();
        assert_eq!(parsed.sub, "user@library.com");
        assert_eq!(parsed.auth_id.as_deref(), Some("42"));
        assert!(parsed.role.is_admin());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = make_token(&claims(Role::User, -3600), SECRET);
        assert!(UserClaims::from_token(&token, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = make_token(&claims(Role::User, 3600), "other-secret");
        assert!(UserClaims::from_token(&token, SECRET).is_err());
    }

    #[test]
    fn missing_auth_id_defaults_to_none() {
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::default(),
            &serde_json::json!({
                "sub": "reader@library.com",
                "role": "USER",
                "exp": now + 3600,
                "iat": now,
            }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let parsed = UserClaims::from_token(&token, SECRET).unwrap();
        assert_eq!(parsed.auth_id, None);
        assert_eq!(parsed.role, Role::User);
    }

    #[test]
    fn provisional_name_is_email_local_part() {
        let c = claims(Role::User, 3600);
        assert_eq!(c.provisional_name(), "user");
    }
}
