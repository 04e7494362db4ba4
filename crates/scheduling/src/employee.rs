use serde::{Deserialize, Serialize};

use firstshift_core::{DomainError, DomainResult, EmployeeId, Entity, OrganizationId, UserId};

/// Employee record of one organization.
///
/// `user_id` links the record to a login. Not every employee has one, and the
/// employee id (not the user id) is what availability ownership is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub organization_id: OrganizationId,
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub email: Option<String>,
    pub position: Option<String>,
}

impl Employee {
    pub fn new(
        organization_id: OrganizationId,
        full_name: impl Into<String>,
        email: Option<String>,
    ) -> DomainResult<Self> {
        let employee = Self {
            id: EmployeeId::new(),
            organization_id,
            user_id: None,
            full_name: full_name.into().trim().to_string(),
            email: email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            position: None,
        };
        employee.validate()?;
        Ok(employee)
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.full_name.trim().is_empty() {
            return Err(DomainError::validation("employee name cannot be empty"));
        }
        if let Some(email) = &self.email {
            if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
                return Err(DomainError::validation(format!("invalid email '{email}'")));
            }
        }
        Ok(())
    }
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// The signed-in user's own employee record ("my employee id").
pub fn find_employee_for_user(employees: &[Employee], user_id: UserId) -> Option<&Employee> {
    employees.iter().find(|e| e.user_id == Some(user_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_accepts_valid_employee() {
        let e = Employee::new(OrganizationId::new(), "  Dana Ruiz ", Some(" dana@example.com ".into())).unwrap();
        assert_eq!(e.full_name, "Dana Ruiz");
        assert_eq!(e.email.as_deref(), Some("dana@example.com"));
    }

    #[test]
    fn blank_email_is_treated_as_absent() {
        let e = Employee::new(OrganizationId::new(), "Sam", Some("   ".into())).unwrap();
        assert_eq!(e.email, None);
    }

    #[test]
    fn rejects_empty_name_and_bad_email() {
        assert!(Employee::new(OrganizationId::new(), "   ", None).is_err());
        assert!(Employee::new(OrganizationId::new(), "Lee", Some("lee.example.com".into())).is_err());
        assert!(Employee::new(OrganizationId::new(), "Lee", Some("lee@".into())).is_err());
    }

    #[test]
    fn finds_employee_by_linked_user() {
        let org = OrganizationId::new();
        let user = UserId::new();
        let staff = vec![
            Employee::new(org, "No Login", None).unwrap(),
            Employee::new(org, "Linked", None).unwrap().with_user(user),
        ];
        let mine = find_employee_for_user(&staff, user).unwrap();
        assert_eq!(mine.full_name, "Linked");
        assert!(find_employee_for_user(&staff, UserId::new()).is_none());
    }
}
