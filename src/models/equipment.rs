//! Equipment model

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

/// Minimum trimmed length for item and borrower names
pub const MIN_NAME_LEN: usize = 2;

/// Equipment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
pub enum Category {
    Computer,
    Network,
    Electronics,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Computer => "Computer",
            Category::Network => "Network",
            Category::Electronics => "Electronics",
            Category::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Computer" => Ok(Category::Computer),
            "Network" => Ok(Category::Network),
            "Electronics" => Ok(Category::Electronics),
            "Other" => Ok(Category::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Availability status driving the borrow/return lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Available,
    Borrowed,
}

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: i64,
    pub item_name: String,
    pub category: Category,
    pub qty: i64,
    pub status: EquipmentStatus,
    /// Empty unless the item is borrowed
    pub borrower_name: String,
    pub borrowed_at: Option<DateTime<Utc>>,
}

impl Equipment {
    pub fn is_available(&self) -> bool {
        self.status == EquipmentStatus::Available
    }
}

/// Create or update equipment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentInput {
    #[serde(default)]
    #[validate(custom(function = "validate_item_name"))]
    pub item_name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_category"))]
    pub category: String,
    /// Integer, or anything that coerces to one
    #[serde(default)]
    #[validate(custom(function = "validate_qty"))]
    #[schema(value_type = i64)]
    pub qty: Value,
}

/// Validated equipment fields, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentDraft {
    pub item_name: String,
    pub category: Category,
    pub qty: i64,
}

impl EquipmentInput {
    /// Validate every field and normalize into a draft
    pub fn into_draft(self) -> AppResult<EquipmentDraft> {
        self.validate().map_err(|errors| match AppError::from(errors) {
            AppError::Validation { field, message } if field == "item_name" => {
                AppError::validation("itemName", message)
            }
            other => other,
        })?;

        let category = self
            .category
            .parse()
            .map_err(|e: String| AppError::validation("category", e))?;
        let qty = coerce_qty(&self.qty)
            .ok_or_else(|| AppError::validation("qty", "Quantity must be an integer"))?;

        Ok(EquipmentDraft {
            item_name: self.item_name.trim().to_string(),
            category,
            qty,
        })
    }
}

/// Borrow request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    #[serde(default)]
    pub borrower_name: String,
}

/// Delete acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// Trim a borrower name and check its length
pub fn normalize_borrower_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(AppError::validation(
            "borrowerName",
            "Borrower name must be at least 2 characters",
        ));
    }
    Ok(trimmed.to_string())
}

/// Coerce a JSON quantity into an integer: integers, integral floats and numeric strings
fn coerce_qty(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_item_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(invalid("length", "Item name must be at least 2 characters"));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    Category::from_str(category)
        .map(|_| ())
        .map_err(|_| invalid("category", "Category must be one of Computer, Network, Electronics, Other"))
}

fn validate_qty(qty: &Value) -> Result<(), ValidationError> {
    match coerce_qty(qty) {
        None => Err(invalid("type", "Quantity must be an integer")),
        Some(n) if n < 1 => Err(invalid("range", "Quantity must be at least 1")),
        Some(_) => Ok(()),
    }
}
