//! Bearer token authentication
//!
//! Access tokens are issued by the auth service and signed with HS256 using
//! the shared `ACCESS_SECRET`. This service only verifies them.
//!
//! ```ignore
//! // 401 without a valid token
//! async fn handler(user: AuthUser) -> String {
//!     format!("Hello, {}!", user.name)
//! }
//!
//! // 403 unless the token carries the admin role
//! async fn report(AdminUser(user): AdminUser) -> String { .. }
//! ```

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use catering_types::{Role, UserId};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

/// Verifies HS256 access tokens
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier for tokens signed with `secret`
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decode and validate a token, including its expiry
    pub fn verify(&self, token: &str) -> Result<AccessClaims, ApiError> {
        decode::<AccessClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                ApiError::Unauthorized("invalid or expired access token".to_string())
            })
    }
}

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<AccessClaims> for AuthUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.user_id.into(),
            name: claims.name,
            email: claims.email,
            role: claims.role,
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("malformed Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("expected a Bearer token".to_string()))
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let token = bearer_token(parts)?;
        verifier.verify(token).map(Into::into)
    }
}

/// Authenticated caller with the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            tracing::warn!(user_id = %user.user_id, "Non-admin access to admin route");
            return Err(ApiError::Forbidden("admin role required".to_string()));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-access-secret";

    fn token(role: Role, exp_offset: i64, secret: &[u8]) -> String {
        let claims = AccessClaims {
            user_id: Uuid::new_v4(),
            name: "Budi".to_string(),
            email: "budi@example.com".to_string(),
            role,
            exp: chrono::Utc::now().timestamp() + exp_offset,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn parts(authorization: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/subscriptions");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn state() -> Arc<TokenVerifier> {
        Arc::new(TokenVerifier::new(SECRET))
    }

    #[tokio::test]
    async fn test_valid_token_authenticates() {
        let mut parts = parts(Some(format!("Bearer {}", token(Role::User, 3600, SECRET))));

        let user = AuthUser::from_request_parts(&mut parts, &state()).await.unwrap();

        assert_eq!(user.email, "budi@example.com");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_rejects_missing_wrong_and_expired_tokens() {
        let cases = [
            None,
            Some("Basic dXNlcjpwYXNz".to_string()),
            Some("Bearer ".to_string()),
            Some(format!("Bearer {}", token(Role::User, 3600, b"other-secret"))),
            Some(format!("Bearer {}", token(Role::User, -3600, SECRET))),
        ];

        for authorization in cases {
            let mut parts = parts(authorization.clone());
            let err = AuthUser::from_request_parts(&mut parts, &state())
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized(_)), "{authorization:?}");
        }
    }

    #[tokio::test]
    async fn test_admin_requires_admin_role() {
        let mut user_parts = parts(Some(format!("Bearer {}", token(Role::User, 3600, SECRET))));
        let err = AdminUser::from_request_parts(&mut user_parts, &state())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let mut admin_parts = parts(Some(format!("Bearer {}", token(Role::Admin, 3600, SECRET))));
        let AdminUser(admin) = AdminUser::from_request_parts(&mut admin_parts, &state())
            .await
            .unwrap();
        assert!(admin.role.is_admin());
    }
}
