//! API handlers for Lendpool REST endpoints

pub mod auth;
pub mod equipment;
pub mod health;
pub mod openapi;

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppResult, models::Credential, AppState};

/// Bearer credential taken from the Authorization header, if any.
///
/// Extraction never fails; the gateway decides what a missing credential means.
pub struct Bearer(pub Option<Credential>);

impl Bearer {
    pub fn credential(&self) -> Option<&Credential> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Bearer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Credential(token.to_string()));

        Ok(Bearer(credential))
    }
}

/// Check the credential before any body or path rejection is reported
pub(crate) async fn require_session(state: &AppState, bearer: &Bearer) -> AppResult<()> {
    state.gateway.me(bearer.credential()).await?;
    Ok(())
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Equipment
        .route(
            "/equipments",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route(
            "/equipments/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        .route("/equipments/:id/borrow", post(equipment::borrow_equipment))
        .route("/equipments/:id/return", post(equipment::return_equipment))
        // OpenAPI document
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
