use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};
use validator::Validate;

use super::contains_ignore_case;
use crate::{
    errors::ServiceError,
    models::{
        user::DEFAULT_DEPARTMENT, CreateUserInput, UpdateUserInput, User, UserRole, UserStatus,
    },
    store::Repository,
};

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Matched against name and email.
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn Repository<User>>,
}

impl UserService {
    pub fn new(repository: Arc<dyn Repository<User>>) -> Self {
        Self { repository }
    }

    /// New users start active and join today.
    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub fn create_user(
        &self,
        input: CreateUserInput,
        today: NaiveDate,
    ) -> Result<User, ServiceError> {
        input.validate()?;
        let email = normalize_email(&input.email);

        let user = self
            .repository
            .insert(User {
                id: 0,
                name: input.name.trim().to_string(),
                email: email.clone(),
                phone: non_blank(input.phone),
                address: non_blank(input.address),
                role: input.role,
                department: non_blank(input.department)
                    .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()),
                status: UserStatus::Active,
                join_date: today,
            })
            .map_err(|_| email_taken(&email))?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    pub fn get_user(&self, id: u64) -> Result<User, ServiceError> {
        self.repository
            .get(id)
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub fn update_user(&self, id: u64, input: UpdateUserInput) -> Result<User, ServiceError> {
        input.validate()?;
        let email = normalize_email(&input.email);

        let updated = self
            .repository
            .update(id, &mut |user: &mut User| {
                user.name = input.name.trim().to_string();
                user.email = email.clone();
                user.role = input.role;
                user.department = input.department.trim().to_string();
                user.status = input.status;
                Ok(())
            })
            .map_err(|e| match e {
                ServiceError::Conflict(_) => email_taken(&email),
                other => other,
            })?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        info!(user_id = id, status = %updated.status, "user updated");
        Ok(updated)
    }

    /// Users are never deleted, only marked inactive.
    #[instrument(skip(self))]
    pub fn deactivate_user(&self, id: u64) -> Result<User, ServiceError> {
        let updated = self
            .repository
            .update(id, &mut |user: &mut User| {
                user.status = UserStatus::Inactive;
                Ok(())
            })?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        info!(user_id = id, "user deactivated");
        Ok(updated)
    }

    pub fn list_users(&self, filter: &UserFilter) -> Vec<User> {
        self.repository
            .all()
            .into_iter()
            .filter(|user| {
                filter.search.as_deref().map_or(true, |needle| {
                    contains_ignore_case(&user.name, needle)
                        || contains_ignore_case(&user.email, needle)
                }) && filter.role.map_or(true, |role| user.role == role)
                    && filter.status.map_or(true, |status| user.status == status)
            })
            .collect()
    }
}

fn email_taken(email: &str) -> ServiceError {
    warn!("email already registered");
    ServiceError::Conflict(format!("a user with email {} already exists", email))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::in_memory;
    use assert_matches::assert_matches;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 15).unwrap()
    }

    fn service() -> UserService {
        UserService::new(in_memory())
    }

    fn input(name: &str, email: &str) -> CreateUserInput {
        CreateUserInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            address: None,
            role: UserRole::Manager,
            department: None,
        }
    }

    #[test]
    fn create_applies_defaults() {
        let user = service()
            .create_user(input("Jane Smith", "Jane@Example.com"), today())
            .unwrap();
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.department, DEFAULT_DEPARTMENT);
        assert_eq!(user.join_date, today());
        assert_eq!(user.email, "jane@example.com");
    }

    #[test]
    fn invalid_email_is_rejected() {
        assert_matches!(
            service().create_user(input("Jane", "not-an-email"), today()),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn duplicate_email_conflicts_on_create_and_update() {
        let svc = service();
        svc.create_user(input("John Doe", "john@example.com"), today())
            .unwrap();
        let jane = svc
            .create_user(input("Jane Smith", "jane@example.com"), today())
            .unwrap();

        assert_matches!(
            svc.create_user(input("Johnny", "JOHN@example.com"), today()),
            Err(ServiceError::Conflict(_))
        );

        let update = UpdateUserInput {
            name: "Jane Smith".into(),
            email: "john@example.com".into(),
            role: UserRole::Manager,
            department: "Production".into(),
            status: UserStatus::Active,
        };
        assert_matches!(
            svc.update_user(jane.id, update.clone()),
            Err(ServiceError::Conflict(_))
        );

        let keep_own = UpdateUserInput {
            email: "jane@example.com".into(),
            ..update
        };
        let updated = svc.update_user(jane.id, keep_own).unwrap();
        assert_eq!(updated.department, "Production");
    }

    #[test]
    fn deactivate_and_filter_by_status() {
        let svc = service();
        let john = svc
            .create_user(input("John Doe", "john@example.com"), today())
            .unwrap();
        svc.create_user(input("Jane Smith", "jane@example.com"), today())
            .unwrap();

        svc.deactivate_user(john.id).unwrap();
        let inactive = UserFilter {
            status: Some(UserStatus::Inactive),
            ..Default::default()
        };
        let listed = svc.list_users(&inactive);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "John Doe");

        let search = UserFilter {
            search: Some("jane@".into()),
            ..Default::default()
        };
        assert_eq!(svc.list_users(&search)[0].name, "Jane Smith");
    }

    #[test]
    fn blank_name_or_department_is_rejected() {
        let svc = service();
        assert_matches!(
            svc.create_user(input("   ", "blank@example.com"), today()),
            Err(ServiceError::ValidationError(_))
        );

        let jane = svc
            .create_user(input("Jane Smith", "jane@example.com"), today())
            .unwrap();
        let update = UpdateUserInput {
            name: "Jane Smith".into(),
            email: "jane@example.com".into(),
            role: UserRole::Manager,
            department: "  ".into(),
            status: UserStatus::Active,
        };
        assert_matches!(
            svc.update_user(jane.id, update),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn changing_email_frees_the_old_one() {
        let svc = service();
        let jane = svc
            .create_user(input("Jane Smith", "jane@example.com"), today())
            .unwrap();
        let update = UpdateUserInput {
            name: "Jane Smith".into(),
            email: "jane.smith@example.com".into(),
            role: UserRole::Manager,
            department: "Production".into(),
            status: UserStatus::Active,
        };
        svc.update_user(jane.id, update).unwrap();
        svc.create_user(input("Another Jane", "JANE@example.com"), today())
            .unwrap();
    }
}
