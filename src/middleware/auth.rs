use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

pub const ROLE_MANAGER: &str = "manager";

#[derive(Debug, Clone)]
pub struct AuthOperator {
    pub operator_id: Uuid,
    pub role: String,
}

pub fn ensure_role(operator: &AuthOperator, role: &str) -> Result<(), AppError> {
    if operator.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_manager(operator: &AuthOperator) -> Result<(), AppError> {
    ensure_role(operator, ROLE_MANAGER)
}

impl FromRequestParts<AppState> for AuthOperator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("invalid Authorization scheme".into()))?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))?;

        let operator_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("invalid operator id in token".into()))?;

        Ok(AuthOperator {
            operator_id,
            role: decoded.claims.role,
        })
    }
}
