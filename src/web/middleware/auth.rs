//! JWT authentication middleware.
//!
//! Tokens are issued elsewhere; this module only verifies them and turns the
//! subject into a [`Principal`].

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::file::Principal;
use crate::web::error::ApiError;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
}

/// Application state for JWT authentication.
#[derive(Clone)]
pub struct JwtState {
    /// Encoding key for issuing tokens.
    pub encoding_key: EncodingKey,
    /// Decoding key for JWT verification.
    pub decoding_key: DecodingKey,
    /// Validation settings.
    pub validation: Validation,
}

impl JwtState {
    /// Create a new JWT state from a secret key.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `user_id` valid for `ttl_secs` seconds.
    pub fn issue(&self, user_id: i64, ttl_secs: u64) -> crate::Result<String> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user_id,
            iat: now,
            exp: now + ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| crate::CabinetError::Auth(format!("failed to issue token: {e}")))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, ApiError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                ApiError::unauthorized("Invalid or expired token")
            })
    }
}

/// Find the bearer token in the Authorization header, or the `token` query
/// parameter (for download links).
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(auth_header) = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        return auth_header
            .strip_prefix("Bearer ")
            .map(|t| t.trim().to_string());
    }

    parts.uri.query().and_then(|query| {
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key == "token" {
                urlencoding::decode(value).ok().map(|s| s.into_owned())
            } else {
                None
            }
        })
    })
}

fn jwt_state(parts: &Parts) -> Result<Arc<JwtState>, ApiError> {
    parts
        .extensions
        .get::<Arc<JwtState>>()
        .cloned()
        .ok_or_else(|| ApiError::internal("JWT state not configured"))
}

/// Extractor for authenticated users.
///
/// Rejects the request with 401 when there is no valid token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

impl AuthUser {
    /// The principal for this user.
    pub fn principal(&self) -> Principal {
        Principal::User(self.0.sub)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token =
                extract_token(parts).ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;
            let claims = jwt_state(parts)?.verify(&token)?;
            Ok(AuthUser(claims))
        })
    }
}

/// Extractor that yields the request's [`Principal`].
///
/// No token means [`Principal::Anonymous`]. A token that is present but
/// invalid or expired is still rejected with 401.
#[derive(Debug, Clone, Copy)]
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = match extract_token(parts) {
                Some(token) => Some(jwt_state(parts)?.verify(&token)?.sub),
                None => None,
            };
            Ok(CurrentPrincipal(Principal::from_user_id(user_id)))
        })
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::error::ErrorCode;

    fn parts_for(uri: &str, auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_jwt_state_new() {
        let state = JwtState::new("test-secret");
        assert!(state.validation.validate_exp);
    }

    #[test]
    fn test_issue_and_verify_token() {
        let state = JwtState::new("test-secret");

        let token = state.issue(7, 3600).unwrap();
        let claims = state.verify(&token).unwrap();

        assert_eq!(claims.sub, 7);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token() {
        let state = JwtState::new("test-secret");
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: 1,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::default(), &claims, &state.encoding_key).unwrap();

        let err = state.verify(&token).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn test_invalid_secret() {
        let token = JwtState::new("secret1").issue(1, 3600).unwrap();
        let state = JwtState::new("secret2");

        assert!(state.verify(&token).is_err());
    }

    #[test]
    fn test_extract_token_from_header_and_query() {
        let parts = parts_for("/api/files", Some("Bearer abc.def"));
        assert_eq!(extract_token(&parts).as_deref(), Some("abc.def"));

        let parts = parts_for("/api/files/1/download?x=1&token=a%2Eb", None);
        assert_eq!(extract_token(&parts).as_deref(), Some("a.b"));

        let parts = parts_for("/api/files", Some("Basic dXNlcg=="));
        assert_eq!(extract_token(&parts), None);

        let parts = parts_for("/api/files", None);
        assert_eq!(extract_token(&parts), None);
    }
}
