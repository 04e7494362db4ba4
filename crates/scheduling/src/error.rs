use thiserror::Error;

use firstshift_auth::AuthzError;
use firstshift_core::DomainError;

pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Authz(#[from] AuthzError),
}
