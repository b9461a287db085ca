use crate::{AppState, errors::ApiError};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // Subject (user ID)
    pub iat: usize,
    pub exp: usize,
}

/// Identity of the caller, attached to the request by [`require_session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
}

/// Sign a session token for `user_id`, already prefixed with `Bearer `
pub fn create_token(user_id: &Uuid, secret: &str, lifetime: Duration) -> Result<String, ApiError> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(lifetime)
        .ok_or_else(|| ApiError::InternalError("Failed to calculate expiration".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: *user_id,
        iat: now.timestamp() as usize,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map(|token| format!("Bearer {}", token))
    .map_err(|e| ApiError::InternalError(format!("Token Creation failed: {}", e)))
}

/// Check signature and expiry of a bare token (without the `Bearer ` part)
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!("Rejected token: {}", e);
        ApiError::InvalidToken
    })
}

/// Gate for private routes
///
/// The header is split on its first space and the second half is taken as
/// the token, so the scheme word itself is not checked.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::MissingToken)?
        .to_str()
        .map_err(|_| ApiError::InvalidToken)?;

    let token = auth_header
        .split_once(' ')
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::InvalidToken)?;

    let claims = verify_token(token, &state.config.jwt_secret)?;

    request.extensions_mut().insert(Session {
        user_id: claims.sub,
    });

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .copied()
            .ok_or(ApiError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips_user_id() {
        let id = Uuid::new_v4();
        let token = create_token(&id, SECRET, Duration::hours(1)).unwrap();

        let bare = token.strip_prefix("Bearer ").unwrap();
        let claims = verify_token(bare, SECRET).unwrap();
        assert_eq!(claims.sub, id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(&Uuid::new_v4(), SECRET, Duration::hours(1)).unwrap();
        let bare = token.strip_prefix("Bearer ").unwrap();
        assert!(matches!(
            verify_token(bare, "other-secret"),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s leeway
        let token = create_token(&Uuid::new_v4(), SECRET, Duration::minutes(-5)).unwrap();
        let bare = token.strip_prefix("Bearer ").unwrap();
        assert!(matches!(
            verify_token(bare, SECRET),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify_token("not-a-jwt", SECRET).is_err());
    }
}
