//! Middleware de autenticación JWT
//!
//! El colaborador de identidad externo emite los tokens; este middleware
//! solo los verifica y extrae la identidad (user_id, rol). El core confía
//! en esa identidad para autorizar transiciones.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{models::user::UserRole, state::AppState, utils::errors::AppError};

/// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    // Decodificar y validar JWT
    let token_data = decode::<Claims>(
        auth_header,
        &DecodingKey::from_secret(state.config.jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))?;

    let claims = token_data.claims;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("ID de usuario inválido".to_string()))?;

    let role: UserRole = claims
        .role
        .parse()
        .map_err(|_| AppError::Unauthorized("Rol desconocido".to_string()))?;

    // Inyectar usuario autenticado en las extensions
    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id, role });

    Ok(next.run(request).await)
}

/// Middleware para rutas reservadas al staff (staff o admin)
pub async fn staff_only_middleware(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.role.is_staff() {
        return Err(AppError::Forbidden(
            "Se requieren permisos de staff".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// Función para generar JWT token (usada por herramientas y tests;
/// la emisión real corre a cargo del colaborador de identidad)
pub fn generate_jwt_token(
    user_id: Uuid,
    role: UserRole,
    jwt_secret: &str,
    expires_in_hours: i64,
) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::hours(expires_in_hours);

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::Jwt(format!("Error generando JWT: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_identity() {
        let user_id = Uuid::new_v4();
        let token = generate_jwt_token(user_id, UserRole::Staff, "test-secret", 1).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("test-secret".as_ref()),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, user_id.to_string());
        assert_eq!(decoded.claims.role, "staff");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token =
            generate_jwt_token(Uuid::new_v4(), UserRole::Customer, "test-secret", 1).unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("other-secret".as_ref()),
            &Validation::default(),
        );

        assert!(result.is_err());
    }
}
