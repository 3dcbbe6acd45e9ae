use crate::error::HrError;
use strum_macros::{Display, EnumString};

/// Caller capability, as asserted by the gateway in front of this service.
/// Authentication itself happens upstream; see `api::caller`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Employee,
}

impl Role {
    /// Manual attendance corrections are an HR task, so both desks qualify.
    pub fn require_hr_or_admin(self) -> Result<(), HrError> {
        if matches!(self, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(HrError::PermissionDenied("HR or administrator capability required"))
        }
    }
}
