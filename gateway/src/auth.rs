//! Bearer-token authentication. Every API request must resolve to an
//! organization, a caller, and a role before anything else runs.

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::warn;

use copilot_core::{Caller, Role};

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct Claims {
    /// Caller id.
    sub: String,
    /// Organization id.
    org: String,
    role: String,
    #[allow(dead_code)]
    exp: usize,
}

/// The authenticated caller, extracted from the `Authorization: Bearer` header.
pub struct AuthCaller(pub Caller);

impl FromRequestParts<AppState> for AuthCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(ApiError::unauthorized)?;

        let data = decode::<Claims>(
            token,
            &state.jwt_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            warn!(error = %e, "rejected bearer token");
            ApiError::unauthorized()
        })?;

        let claims = data.claims;
        let role = Role::parse(&claims.role).ok_or_else(|| {
            warn!(role = %claims.role, "token carries an unknown role");
            ApiError::unauthorized()
        })?;

        Ok(AuthCaller(Caller {
            organization_id: claims.org,
            caller_id: claims.sub,
            role,
        }))
    }
}

/// Builds the verification key from the shared secret.
pub fn decoding_key(secret: &str) -> DecodingKey {
    DecodingKey::from_secret(secret.as_bytes())
}
