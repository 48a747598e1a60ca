//! Equipment registry: inventory management and the borrow/return lifecycle

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{normalize_borrower_name, Equipment, EquipmentInput},
        Principal,
    },
    policy,
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, principal: &Principal) -> AppResult<Vec<Equipment>> {
        policy::can_list(Some(principal)).require()?;
        self.repository.equipment.list().await
    }

    pub async fn get_by_id(&self, principal: &Principal, id: i64) -> AppResult<Equipment> {
        policy::can_list(Some(principal)).require()?;
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn create(&self, principal: &Principal, input: EquipmentInput) -> AppResult<Equipment> {
        policy::can_create(Some(principal)).require()?;
        let draft = input.into_draft()?;

        let equipment = self.repository.equipment.create(&draft).await?;
        tracing::info!(
            "Equipment {} ({}, {}) created by {}",
            equipment.id,
            equipment.item_name,
            equipment.category,
            principal.username
        );
        Ok(equipment)
    }

    pub async fn update(&self, principal: &Principal, id: i64, input: EquipmentInput) -> AppResult<Equipment> {
        policy::can_edit(Some(principal)).require()?;
        let draft = input.into_draft()?;

        let equipment = self.repository.equipment.update(id, &draft).await?;
        tracing::info!("Equipment {} updated by {}", id, principal.username);
        Ok(equipment)
    }

    pub async fn delete(&self, principal: &Principal, id: i64) -> AppResult<()> {
        policy::can_delete(Some(principal)).require()?;
        self.repository.equipment.delete(id).await?;
        tracing::info!("Equipment {} deleted by {}", id, principal.username);
        Ok(())
    }

    /// Borrow an available item on behalf of `borrower_name`
    pub async fn borrow(&self, principal: &Principal, id: i64, borrower_name: &str) -> AppResult<Equipment> {
        let current = self.repository.equipment.get_by_id(id).await?;
        policy::can_borrow(&current, Some(principal)).require()?;
        let borrower_name = normalize_borrower_name(borrower_name)?;

        match self
            .repository
            .equipment
            .mark_borrowed(id, &borrower_name, Utc::now())
            .await?
        {
            Some(equipment) => {
                tracing::info!(
                    "Equipment {} borrowed by {} (recorded by {})",
                    id,
                    borrower_name,
                    principal.username
                );
                Ok(equipment)
            }
            // Lost the race: someone else borrowed or deleted it in between
            None => {
                self.repository.equipment.get_by_id(id).await?;
                Err(AppError::AlreadyBorrowed)
            }
        }
    }

    /// Return a borrowed item. Anyone signed in may return it.
    pub async fn return_item(&self, principal: &Principal, id: i64) -> AppResult<Equipment> {
        let current = self.repository.equipment.get_by_id(id).await?;
        policy::can_return(&current, Some(principal)).require()?;

        match self.repository.equipment.mark_returned(id).await? {
            Some(equipment) => {
                tracing::info!(
                    "Equipment {} returned from {} (recorded by {})",
                    id,
                    current.borrower_name,
                    principal.username
                );
                Ok(equipment)
            }
            None => {
                self.repository.equipment.get_by_id(id).await?;
                Err(AppError::NotBorrowed)
            }
        }
    }
}
