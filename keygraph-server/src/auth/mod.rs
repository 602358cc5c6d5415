// Copyright 2025 Keygraph Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use url::form_urlencoded;

/// Authentication context attached to each authenticated request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Token subject when a JWT was presented; None for API keys and
    /// disabled auth.
    pub subject: Option<String>,
}

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication credentials")]
    MissingCredentials,

    #[error("Invalid authentication credentials")]
    InvalidCredentials,

    #[error("JWT token validation failed: {0}")]
    JwtValidation(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub exp: usize,  // Expiration time
}

/// Authenticator trait for pluggable auth strategies
pub trait Authenticator: Send + Sync {
    /// Authenticate request by examining headers (synchronous)
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError>;
}

/// API Key authenticator
pub struct ApiKeyAuth {
    keys: HashSet<String>,
}

impl ApiKeyAuth {
    pub fn new(api_keys: Vec<String>) -> Self {
        Self {
            keys: api_keys
                .into_iter()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect(),
        }
    }
}

impl Authenticator for ApiKeyAuth {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let api_key = headers
            .get("X-API-Key")
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingCredentials)?;

        if !self.keys.contains(api_key) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(AuthContext { subject: None })
    }
}

/// Bearer token (JWT) authenticator
pub struct BearerTokenAuth {
    jwt_secret: Vec<u8>,
}

impl BearerTokenAuth {
    pub fn new(jwt_secret: String) -> Self {
        Self {
            jwt_secret: jwt_secret.into_bytes(),
        }
    }
}

impl Authenticator for BearerTokenAuth {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let auth_header = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingCredentials)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MissingCredentials)?;

        let token_data = jsonwebtoken::decode::<Claims>(
            token,
            &jsonwebtoken::DecodingKey::from_secret(&self.jwt_secret),
            &jsonwebtoken::Validation::default(),
        )
        .map_err(|e| AuthError::JwtValidation(e.to_string()))?;

        Ok(AuthContext {
            subject: Some(token_data.claims.sub),
        })
    }
}

/// Multi-strategy authenticator (tries multiple auth methods)
pub struct MultiAuth {
    strategies: Vec<Arc<dyn Authenticator>>,
}

impl MultiAuth {
    pub fn new(strategies: Vec<Arc<dyn Authenticator>>) -> Self {
        Self { strategies }
    }
}

impl Authenticator for MultiAuth {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        for strategy in &self.strategies {
            if let Ok(ctx) = strategy.authenticate(headers) {
                return Ok(ctx);
            }
        }
        Err(AuthError::InvalidCredentials)
    }
}

/// No-op authenticator for development (no auth required)
pub struct NoAuth;

impl Authenticator for NoAuth {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        Ok(AuthContext { subject: None })
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    auth: axum::Extension<Arc<dyn Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    match auth.authenticate(req.headers()) {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            Ok(next.run(req).await)
        }
        Err(primary_err) => {
            // Browser-friendly fallback: accept the API key as a query
            // parameter when headers cannot be set.
            if let Some(api_key) = extract_api_key_from_query(req.uri()) {
                let mut headers = HeaderMap::new();
                if let Ok(value) = HeaderValue::from_str(&api_key) {
                    headers.insert("X-API-Key", value);
                    if let Ok(ctx) = auth.authenticate(&headers) {
                        req.extensions_mut().insert(ctx);
                        return Ok(next.run(req).await);
                    }
                }
            }

            Err(primary_err)
        }
    }
}

fn extract_api_key_from_query(uri: &axum::http::Uri) -> Option<String> {
    let query = uri.query()?;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let key = key.to_ascii_lowercase();
        if key == "api_key" || key == "x-api-key" {
            return Some(value.into_owned());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn token_for(secret: &str, sub: &str, exp_offset_secs: i64) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let claims = Claims {
            sub: sub.to_string(),
            exp: (now + exp_offset_secs) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_api_key_auth() {
        let auth = ApiKeyAuth::new(vec!["test_key".to_string(), " padded ".to_string()]);

        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", "test_key".parse().unwrap());
        assert!(auth.authenticate(&headers).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", "padded".parse().unwrap());
        assert!(auth.authenticate(&headers).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert("X-API-Key", "wrong".parse().unwrap());
        assert!(matches!(
            auth.authenticate(&headers),
            Err(AuthError::InvalidCredentials)
        ));

        assert!(matches!(
            auth.authenticate(&HeaderMap::new()),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_roundtrip() {
        let auth = BearerTokenAuth::new("secret".to_string());
        let token = token_for("secret", "user-1", 3600);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );

        let ctx = auth.authenticate(&headers).unwrap();
        assert_eq!(ctx.subject.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = BearerTokenAuth::new("secret".to_string());
        let token = token_for("secret", "user-1", -3600);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );

        assert!(matches!(
            auth.authenticate(&headers),
            Err(AuthError::JwtValidation(_))
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let auth = BearerTokenAuth::new("secret".to_string());
        let token = token_for("other-secret", "user-1", 3600);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );

        assert!(auth.authenticate(&headers).is_err());
    }

    #[test]
    fn test_multi_auth_tries_strategies_in_order() {
        let auth = MultiAuth::new(vec![
            Arc::new(ApiKeyAuth::new(vec!["key".to_string()])),
            Arc::new(BearerTokenAuth::new("secret".to_string())),
        ]);

        let mut headers = HeaderMap::new();
        let token = token_for("secret", "user-2", 3600);
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let ctx = auth.authenticate(&headers).unwrap();
        assert_eq!(ctx.subject.as_deref(), Some("user-2"));

        assert!(auth.authenticate(&HeaderMap::new()).is_err());
    }

    #[test]
    fn test_no_auth() {
        let ctx = NoAuth.authenticate(&HeaderMap::new()).unwrap();
        assert_eq!(ctx.subject, None);
    }
}
