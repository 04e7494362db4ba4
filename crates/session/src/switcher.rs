//! Organization switching and join-code flows.
//!
//! Every flow ends with a reload of the resolver, so the published snapshot
//! always reflects the backend's persisted selection rather than a local
//! guess.

use thiserror::Error;

use firstshift_auth::{authorize, AuthzError, Capability, Membership};
use firstshift_backend::{BackendError, JoinCode, JoinCodeRequest};
use firstshift_core::OrganizationId;

use crate::{ActiveOrgResolver, ActiveOrganization, ReloadOutcome};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SwitchError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error("session closed before the active organization was resolved")]
    Disposed,
}

/// Drives the user-initiated changes of the active organization.
#[derive(Debug)]
pub struct OrgSwitcher<'a> {
    resolver: &'a ActiveOrgResolver,
}

impl<'a> OrgSwitcher<'a> {
    pub fn new(resolver: &'a ActiveOrgResolver) -> Self {
        Self { resolver }
    }

    /// Memberships for an organization picker, in join order.
    pub async fn memberships(&self) -> Result<Vec<Membership>, SwitchError> {
        Ok(self.resolver.backend().list_memberships().await?)
    }

    /// Make `organization_id` active and reload.
    ///
    /// On failure the previous snapshot stays published. The returned
    /// snapshot is the one published once no reload is in flight, which may
    /// come from a reload issued after this one.
    pub async fn switch_to(
        &self,
        organization_id: OrganizationId,
    ) -> Result<ActiveOrganization, SwitchError> {
        if let Err(err) = self.resolver.backend().set_active_org(organization_id).await {
            tracing::warn!(error = %err, %organization_id, "switching active organization failed");
            return Err(err.into());
        }

        self.reload_published().await
    }

    /// Join with a code, make the joined organization active and reload.
    ///
    /// Failing to persist the new selection is not fatal: the join succeeded
    /// and the reload falls back to whatever selection the backend holds.
    /// If the resolver is disposed meanwhile the membership still exists but
    /// [`SwitchError::Disposed`] is returned.
    pub async fn join_with_code(
        &self,
        code: &str,
    ) -> Result<(Membership, ActiveOrganization), SwitchError> {
        let backend = self.resolver.backend();
        let membership = backend.join_org_with_code(code).await.map_err(|err| {
            tracing::warn!(error = %err, "joining organization with code failed");
            err
        })?;

        tracing::info!(
            organization_id = %membership.organization_id,
            role = %membership.role,
            "joined organization"
        );

        if let Err(err) = backend.set_active_org(membership.organization_id).await {
            tracing::warn!(
                error = %err,
                organization_id = %membership.organization_id,
                "could not activate joined organization"
            );
        }

        let snapshot = self.reload_published().await?;
        Ok((membership, snapshot))
    }

    /// Create a join code for the active organization.
    pub async fn create_join_code(&self, request: JoinCodeRequest) -> Result<JoinCode, SwitchError> {
        let snapshot = self.resolver.snapshot();
        authorize(&snapshot.capabilities(), Capability::ManageEmployees)?;
        let organization_id = snapshot
            .organization_id()
            .ok_or(AuthzError::NoActiveOrganization)?;

        Ok(self
            .resolver
            .backend()
            .generate_org_join_code(organization_id, request)
            .await?)
    }

    async fn reload_published(&self) -> Result<ActiveOrganization, SwitchError> {
        match self.resolver.reload().await {
            ReloadOutcome::Applied | ReloadOutcome::Superseded => {
                self.resolver.settled().await.ok_or(SwitchError::Disposed)
            }
            ReloadOutcome::Disposed => Err(SwitchError::Disposed),
        }
    }
}
