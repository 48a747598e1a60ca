//! Data models for Lendpool

pub mod equipment;
pub mod user;

// Re-export commonly used types
pub use equipment::{Category, Equipment, EquipmentInput, EquipmentStatus};
pub use user::{AuthResponse, Credential, Principal, Role, User};
