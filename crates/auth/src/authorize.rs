use thiserror::Error;

use firstshift_core::EmployeeId;

use crate::{Capabilities, Capability};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("no active organization")]
    NoActiveOrganization,

    #[error("forbidden: missing capability '{0}'")]
    Forbidden(Capability),

    #[error("forbidden: availability of employee {target} belongs to someone else")]
    NotOwnAvailability { target: EmployeeId },
}

/// Advisory check that the active role offers `required`.
///
/// - No IO
/// - No panics
/// - Not a security boundary: the backend re-checks every mutation
pub fn authorize(capabilities: &Capabilities, required: Capability) -> Result<(), AuthzError> {
    if capabilities.role().is_none() {
        return Err(AuthzError::NoActiveOrganization);
    }

    if capabilities.allows(required) {
        Ok(())
    } else {
        tracing::debug!(capability = %required, "capability not offered for role");
        Err(AuthzError::Forbidden(required))
    }
}

/// Advisory check for editing `target`'s availability.
pub fn authorize_availability_edit(
    capabilities: &Capabilities,
    target: &EmployeeId,
    my_employee_id: Option<&EmployeeId>,
) -> Result<(), AuthzError> {
    if capabilities.role().is_none() {
        return Err(AuthzError::NoActiveOrganization);
    }

    if capabilities.can_edit_availability_for(target, my_employee_id) {
        Ok(())
    } else {
        Err(AuthzError::NotOwnAvailability { target: *target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn missing_role_reports_no_active_organization() {
        let caps = Capabilities::for_role(None);
        assert_eq!(
            authorize(&caps, Capability::SubmitTimeOff),
            Err(AuthzError::NoActiveOrganization)
        );
    }

    #[test]
    fn employee_cannot_approve_time_off() {
        let caps = Capabilities::for_role(Some(Role::Employee));
        assert_eq!(
            authorize(&caps, Capability::ApproveTimeOff),
            Err(AuthzError::Forbidden(Capability::ApproveTimeOff))
        );
        assert!(authorize(&caps, Capability::SubmitTimeOff).is_ok());
    }

    #[test]
    fn admin_is_offered_everything() {
        let caps = Capabilities::for_role(Some(Role::Admin));
        for cap in [
            Capability::ManageSchedule,
            Capability::ApproveTimeOff,
            Capability::ManageEmployees,
            Capability::SubmitTimeOff,
        ] {
            assert!(authorize(&caps, cap).is_ok());
        }
    }

    #[test]
    fn availability_edit_of_another_employee_is_rejected() {
        let caps = Capabilities::for_role(Some(Role::Employee));
        let mine = EmployeeId::new();
        let other = EmployeeId::new();
        assert!(authorize_availability_edit(&caps, &mine, Some(&mine)).is_ok());
        assert_eq!(
            authorize_availability_edit(&caps, &other, Some(&mine)),
            Err(AuthzError::NotOwnAvailability { target: other })
        );
    }
}
