//! Authorization policy
//!
//! Pure predicates deciding whether a principal may act on the equipment
//! pool. Every mutating path goes through these, including borrow and return.

use crate::{
    error::AppError,
    models::{Equipment, EquipmentStatus, Principal},
};

/// Inventory actions reserved to administrators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Edit,
    Delete,
}

/// Why a permission was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NoSession,
    AdminOnly(Action),
    AlreadyBorrowed,
    NotBorrowed,
}

impl Denial {
    /// Human-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            Denial::NoSession => "Authentication required",
            Denial::AdminOnly(Action::Create) => "Only administrators can add equipment",
            Denial::AdminOnly(Action::Edit) => "Only administrators can edit equipment",
            Denial::AdminOnly(Action::Delete) => "Only administrators can delete equipment",
            Denial::AlreadyBorrowed => "This item is already borrowed",
            Denial::NotBorrowed => "This item has not been borrowed",
        }
    }
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::NoSession => AppError::Unauthenticated(denial.reason().to_string()),
            Denial::AdminOnly(_) => AppError::Forbidden(denial.reason().to_string()),
            Denial::AlreadyBorrowed => AppError::AlreadyBorrowed,
            Denial::NotBorrowed => AppError::NotBorrowed,
        }
    }
}

/// Outcome of a policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Allowed,
    Denied(Denial),
}

impl Permission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Permission::Allowed)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Permission::Allowed => None,
            Permission::Denied(denial) => Some(denial.reason()),
        }
    }

    /// Turn a denial into the matching error
    pub fn require(self) -> Result<(), AppError> {
        match self {
            Permission::Allowed => Ok(()),
            Permission::Denied(denial) => Err(denial.into()),
        }
    }
}

fn require_admin(principal: Option<&Principal>, action: Action) -> Permission {
    match principal {
        None => Permission::Denied(Denial::NoSession),
        Some(p) if p.is_admin() => Permission::Allowed,
        Some(_) => Permission::Denied(Denial::AdminOnly(action)),
    }
}

pub fn can_list(principal: Option<&Principal>) -> Permission {
    match principal {
        Some(_) => Permission::Allowed,
        None => Permission::Denied(Denial::NoSession),
    }
}

pub fn can_create(principal: Option<&Principal>) -> Permission {
    require_admin(principal, Action::Create)
}

pub fn can_edit(principal: Option<&Principal>) -> Permission {
    require_admin(principal, Action::Edit)
}

pub fn can_delete(principal: Option<&Principal>) -> Permission {
    require_admin(principal, Action::Delete)
}

/// Any authenticated principal may borrow an available item
pub fn can_borrow(item: &Equipment, principal: Option<&Principal>) -> Permission {
    match principal {
        None => Permission::Denied(Denial::NoSession),
        Some(_) if item.is_available() => Permission::Allowed,
        Some(_) => Permission::Denied(Denial::AlreadyBorrowed),
    }
}

/// Any authenticated principal may return a borrowed item, not only its borrower
pub fn can_return(item: &Equipment, principal: Option<&Principal>) -> Permission {
    match (principal, item.status) {
        (None, _) => Permission::Denied(Denial::NoSession),
        (Some(_), EquipmentStatus::Borrowed) => Permission::Allowed,
        (Some(_), EquipmentStatus::Available) => Permission::Denied(Denial::NotBorrowed),
    }
}
