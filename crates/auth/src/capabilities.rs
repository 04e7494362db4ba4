//! Role → capability mapping.

use serde::Serialize;

use firstshift_core::{EmployeeId, ValueObject};

use crate::Role;

/// A single client-side capability.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageSchedule,
    ApproveTimeOff,
    ManageEmployees,
    SubmitTimeOff,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageSchedule => "manage_schedule",
            Capability::ApproveTimeOff => "approve_time_off",
            Capability::ManageEmployees => "manage_employees",
            Capability::SubmitTimeOff => "submit_time_off",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability flags derived from the role held in the active organization.
///
/// Cheap to derive; callers re-derive it from the current role instead of
/// caching it. Only [`Capabilities::for_role`] builds one, so the aliased
/// management flags always agree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    #[serde(skip)]
    role: Option<Role>,
    can_manage_schedule: bool,
    can_approve_time_off: bool,
    can_manage_employees: bool,
    can_submit_time_off: bool,
}

impl Capabilities {
    /// Capabilities of a user without an active organization.
    pub const NONE: Capabilities = Capabilities {
        role: None,
        can_manage_schedule: false,
        can_approve_time_off: false,
        can_manage_employees: false,
        can_submit_time_off: false,
    };

    pub fn for_role(role: Option<Role>) -> Self {
        let can_manage_schedule = match role {
            Some(Role::Admin) | Some(Role::Manager) => true,
            Some(Role::Employee) | None => false,
        };

        Self {
            role,
            can_manage_schedule,
            // Approval and employee management follow schedule management.
            can_approve_time_off: can_manage_schedule,
            can_manage_employees: can_manage_schedule,
            can_submit_time_off: role.is_some(),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn can_manage_schedule(&self) -> bool {
        self.can_manage_schedule
    }

    pub fn can_approve_time_off(&self) -> bool {
        self.can_approve_time_off
    }

    pub fn can_manage_employees(&self) -> bool {
        self.can_manage_employees
    }

    pub fn can_submit_time_off(&self) -> bool {
        self.can_submit_time_off
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageSchedule => self.can_manage_schedule,
            Capability::ApproveTimeOff => self.can_approve_time_off,
            Capability::ManageEmployees => self.can_manage_employees,
            Capability::SubmitTimeOff => self.can_submit_time_off,
        }
    }

    /// Whether the user may edit the availability of `target`.
    ///
    /// Managers and admins may edit anyone's availability. Employees may edit
    /// only their own, identified by their employee-record id (not their
    /// authentication id). Without a role nothing is editable.
    pub fn can_edit_availability_for(
        &self,
        target: &EmployeeId,
        my_employee_id: Option<&EmployeeId>,
    ) -> bool {
        if self.role.is_none() {
            return false;
        }
        self.can_manage_schedule || my_employee_id.is_some_and(|mine| mine == target)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<Option<Role>> for Capabilities {
    fn from(role: Option<Role>) -> Self {
        Self::for_role(role)
    }
}

impl ValueObject for Capabilities {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_role() -> impl Strategy<Value = Option<Role>> {
        prop_oneof![
            Just(None),
            Just(Some(Role::Admin)),
            Just(Some(Role::Manager)),
            Just(Some(Role::Employee)),
        ]
    }

    fn any_employee_id() -> impl Strategy<Value = EmployeeId> {
        any::<u128>().prop_map(|n| EmployeeId::from_uuid(uuid::Uuid::from_u128(n)))
    }

    #[test]
    fn managers_and_admins_hold_every_management_flag() {
        for role in [Role::Admin, Role::Manager] {
            let caps = Capabilities::for_role(Some(role));
            assert!(caps.can_manage_schedule());
            assert!(caps.can_approve_time_off());
            assert!(caps.can_manage_employees());
            assert!(caps.can_submit_time_off());
        }
    }

    #[test]
    fn employees_may_only_submit_time_off() {
        let caps = Capabilities::for_role(Some(Role::Employee));
        assert!(!caps.can_manage_schedule());
        assert!(!caps.can_approve_time_off());
        assert!(!caps.can_manage_employees());
        assert!(caps.can_submit_time_off());
    }

    #[test]
    fn no_role_grants_nothing() {
        let caps = Capabilities::for_role(None);
        assert_eq!(caps, Capabilities::NONE);
        let id = EmployeeId::new();
        assert!(!caps.can_edit_availability_for(&id, Some(&id)));
        assert!(!caps.can_edit_availability_for(&id, None));
    }

    #[test]
    fn employees_edit_only_their_own_availability() {
        let caps = Capabilities::for_role(Some(Role::Employee));
        let e1 = EmployeeId::new();
        let e2 = EmployeeId::new();
        assert!(caps.can_edit_availability_for(&e1, Some(&e1)));
        assert!(!caps.can_edit_availability_for(&e2, Some(&e1)));
        assert!(!caps.can_edit_availability_for(&e1, None));
    }

    #[test]
    fn managers_edit_any_availability_without_an_employee_record() {
        let caps = Capabilities::for_role(Some(Role::Manager));
        assert!(caps.can_edit_availability_for(&EmployeeId::new(), None));
    }

    #[test]
    fn serializes_flags_only() {
        let json = serde_json::to_value(Capabilities::for_role(Some(Role::Employee))).unwrap();
        assert_eq!(json["can_manage_schedule"], false);
        assert_eq!(json["can_approve_time_off"], false);
        assert_eq!(json["can_manage_employees"], false);
        assert_eq!(json["can_submit_time_off"], true);
        assert!(json.get("role").is_none());
    }

    #[test]
    fn every_constructor_keeps_management_flags_aliased() {
        let built = [
            Capabilities::NONE,
            Capabilities::default(),
            Capabilities::from(Some(Role::Employee)),
            Capabilities::from(Some(Role::Manager)),
            Capabilities::for_role(Some(Role::Admin)),
        ];
        for caps in built {
            assert_eq!(caps.can_approve_time_off(), caps.can_manage_schedule());
            assert_eq!(caps.can_manage_employees(), caps.can_manage_schedule());
            assert_eq!(
                crate::authorize(&caps, Capability::ApproveTimeOff).is_ok(),
                crate::authorize(&caps, Capability::ManageSchedule).is_ok()
            );
        }
    }

    proptest! {
        #[test]
        fn aliased_flags_always_agree(role in any_role()) {
            let caps = Capabilities::for_role(role);
            prop_assert_eq!(caps.can_approve_time_off(), caps.can_manage_schedule());
            prop_assert_eq!(caps.can_manage_employees(), caps.can_manage_schedule());
            prop_assert_eq!(caps.can_submit_time_off(), role.is_some());
        }

        #[test]
        fn higher_privilege_never_loses_a_capability(a in any_role(), b in any_role()) {
            if let (Some(ra), Some(rb)) = (a, b) {
                if ra.includes(rb) {
                    let (ca, cb) = (Capabilities::for_role(a), Capabilities::for_role(b));
                    for cap in [
                        Capability::ManageSchedule,
                        Capability::ApproveTimeOff,
                        Capability::ManageEmployees,
                        Capability::SubmitTimeOff,
                    ] {
                        prop_assert!(!cb.allows(cap) || ca.allows(cap));
                    }
                }
            }
        }

        #[test]
        fn availability_predicate_matches_definition(
            role in any_role(),
            target in any_employee_id(),
            mine in proptest::option::of(any_employee_id()),
        ) {
            let caps = Capabilities::for_role(role);
            let expected = role.is_some()
                && (caps.can_manage_schedule() || mine.as_ref() == Some(&target));
            prop_assert_eq!(caps.can_edit_availability_for(&target, mine.as_ref()), expected);
        }
    }
}
