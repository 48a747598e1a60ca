//! Request gateway
//!
//! Entry point for every external action. Resolves the attached credential,
//! then hands off to the authorization policy and the equipment registry.
//! HTTP handlers and in-process callers both go through here.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        equipment::{BorrowRequest, DeleteResponse, Equipment, EquipmentInput},
        user::{AuthResponse, Credential, LoginRequest, Principal, RegisterRequest},
    },
    services::Services,
};

/// Something that can exchange a username and password for a session
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> AppResult<AuthResponse>;
}

#[derive(Clone)]
pub struct Gateway {
    services: Arc<Services>,
}

impl Gateway {
    pub fn new(services: Services) -> Self {
        Self {
            services: Arc::new(services),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        self.services.auth.register(request).await
    }

    pub async fn authenticate(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        self.services.auth.authenticate(request).await
    }

    pub async fn me(&self, credential: Option<&Credential>) -> AppResult<Principal> {
        self.services.auth.resolve(credential).await
    }

    pub async fn list_equipment(&self, credential: Option<&Credential>) -> AppResult<Vec<Equipment>> {
        let principal = self.services.auth.resolve(credential).await?;
        self.services.equipment.list(&principal).await
    }

    pub async fn get_equipment(&self, credential: Option<&Credential>, id: i64) -> AppResult<Equipment> {
        let principal = self.services.auth.resolve(credential).await?;
        self.services.equipment.get_by_id(&principal, id).await
    }

    pub async fn create_equipment(
        &self,
        credential: Option<&Credential>,
        input: EquipmentInput,
    ) -> AppResult<Equipment> {
        let principal = self.services.auth.resolve(credential).await?;
        self.services.equipment.create(&principal, input).await
    }

    pub async fn update_equipment(
        &self,
        credential: Option<&Credential>,
        id: i64,
        input: EquipmentInput,
    ) -> AppResult<Equipment> {
        let principal = self.services.auth.resolve(credential).await?;
        self.services.equipment.update(&principal, id, input).await
    }

    pub async fn delete_equipment(&self, credential: Option<&Credential>, id: i64) -> AppResult<DeleteResponse> {
        let principal = self.services.auth.resolve(credential).await?;
        self.services.equipment.delete(&principal, id).await?;
        Ok(DeleteResponse { ok: true })
    }

    pub async fn borrow_equipment(
        &self,
        credential: Option<&Credential>,
        id: i64,
        request: BorrowRequest,
    ) -> AppResult<Equipment> {
        let principal = self.services.auth.resolve(credential).await?;
        self.services
            .equipment
            .borrow(&principal, id, &request.borrower_name)
            .await
    }

    pub async fn return_equipment(&self, credential: Option<&Credential>, id: i64) -> AppResult<Equipment> {
        let principal = self.services.auth.resolve(credential).await?;
        self.services.equipment.return_item(&principal, id).await
    }
}

#[async_trait]
impl Authenticator for Gateway {
    async fn login(&self, username: &str, password: &str) -> AppResult<AuthResponse> {
        self.authenticate(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await
    }
}
