use std::sync::Arc;

use async_trait::async_trait;

use firstshift_auth::Membership;
use firstshift_core::OrganizationId;

use crate::{ActiveOrgRecord, BackendError, JoinCode, JoinCodeRequest};

/// Client contract for the organization procedures of the hosted backend.
///
/// One instance is bound to one authenticated session; the calling user is
/// implicit in every call. Authorization is enforced by the backend.
#[async_trait]
pub trait OrgBackend: Send + Sync {
    /// Resolve the caller's active organization, persisting a default
    /// selection (the earliest membership) if none exists yet.
    ///
    /// Idempotent: repeated calls without an intervening change return the
    /// same record. `None` means the caller belongs to no organization.
    async fn get_or_init_active_org(&self) -> Result<Option<ActiveOrgRecord>, BackendError>;

    /// Persist `organization_id` as the caller's active organization.
    async fn set_active_org(&self, organization_id: OrganizationId) -> Result<(), BackendError>;

    /// The caller's memberships, in join order.
    async fn list_memberships(&self) -> Result<Vec<Membership>, BackendError>;

    /// Enroll the caller using a join code.
    async fn join_org_with_code(&self, code: &str) -> Result<Membership, BackendError>;

    /// Create a join code for `organization_id`.
    async fn generate_org_join_code(
        &self,
        organization_id: OrganizationId,
        request: JoinCodeRequest,
    ) -> Result<JoinCode, BackendError>;
}

#[async_trait]
impl<B> OrgBackend for Arc<B>
where
    B: OrgBackend + ?Sized,
{
    async fn get_or_init_active_org(&self) -> Result<Option<ActiveOrgRecord>, BackendError> {
        (**self).get_or_init_active_org().await
    }

    async fn set_active_org(&self, organization_id: OrganizationId) -> Result<(), BackendError> {
        (**self).set_active_org(organization_id).await
    }

    async fn list_memberships(&self) -> Result<Vec<Membership>, BackendError> {
        (**self).list_memberships().await
    }

    async fn join_org_with_code(&self, code: &str) -> Result<Membership, BackendError> {
        (**self).join_org_with_code(code).await
    }

    async fn generate_org_join_code(
        &self,
        organization_id: OrganizationId,
        request: JoinCodeRequest,
    ) -> Result<JoinCode, BackendError> {
        (**self).generate_org_join_code(organization_id, request).await
    }
}
