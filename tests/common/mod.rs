//! Shared helpers for integration tests

#![allow(dead_code)]

use lendpool_server::{
    models::{equipment::EquipmentInput, user::RegisterRequest, Credential, Equipment},
    AppConfig, AppState, Gateway,
};
use serde_json::json;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin-pass";

/// Fresh in-memory instance with a bootstrap administrator
pub async fn test_state() -> AppState {
    let mut config = AppConfig::in_memory();
    config.bootstrap.admin_username = Some(ADMIN_USER.to_string());
    config.bootstrap.admin_password = Some(ADMIN_PASS.to_string());
    config.bootstrap.admin_display_name = Some("Lab Admin".to_string());

    AppState::build(&config).await.expect("failed to build test state")
}

pub async fn admin_token(gateway: &Gateway) -> Credential {
    use lendpool_server::gateway::Authenticator;
    gateway
        .login(ADMIN_USER, ADMIN_PASS)
        .await
        .expect("admin login failed")
        .token
}

pub async fn staff_token(gateway: &Gateway, username: &str) -> Credential {
    gateway
        .register(RegisterRequest {
            username: username.to_string(),
            display_name: format!("{} (staff)", username),
            password: "staff-pass".to_string(),
        })
        .await
        .expect("staff registration failed")
        .token
}

pub fn input(item_name: &str, category: &str, qty: i64) -> EquipmentInput {
    serde_json::from_value(json!({
        "itemName": item_name,
        "category": category,
        "qty": qty,
    }))
    .expect("invalid equipment input")
}

pub async fn create_item(gateway: &Gateway, admin: &Credential, item_name: &str) -> Equipment {
    gateway
        .create_equipment(Some(admin), input(item_name, "Computer", 1))
        .await
        .expect("create failed")
}
