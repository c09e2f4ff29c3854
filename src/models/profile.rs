//! Profile and role request/response models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::profiles::{self, Role};

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    /// None until the user has picked a role
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl From<profiles::Model> for ProfileResponse {
    fn from(model: profiles::Model) -> Self {
        Self {
            id: model.id,
            role: model.role,
            full_name: model.full_name,
        }
    }
}

/// Body of PUT /api/profile/role. Unknown role strings are rejected at
/// deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
    /// Optional display name, stored alongside the role
    pub full_name: Option<String>,
}

impl SetRoleRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                return Err("full_name cannot be blank".to_string());
            }
            if name.len() > 255 {
                return Err("full_name cannot exceed 255 characters".to_string());
            }
        }
        Ok(())
    }
}
