use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use firstshift_auth::{Capabilities, Role};
use firstshift_backend::OrgBackend;
use firstshift_core::OrganizationId;

use crate::resolver::{resolve, Shared};
use crate::{ActiveOrganization, OrgGate, ReloadOutcome};

/// Read-only handle on the active-organization snapshot.
///
/// Cheap to clone and hand to every view that needs the organization or role.
/// Only [`crate::ActiveOrgResolver`] can change what it reports; a
/// [`reload`](Self::reload) through the context runs the resolver's own
/// resolution.
#[derive(Clone)]
pub struct OrgContext {
    rx: watch::Receiver<ActiveOrganization>,
    backend: Arc<dyn OrgBackend>,
    shared: Weak<Shared>,
}

impl core::fmt::Debug for OrgContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OrgContext")
            .field("snapshot", &*self.rx.borrow())
            .finish()
    }
}

impl OrgContext {
    pub(crate) fn new(
        rx: watch::Receiver<ActiveOrganization>,
        backend: Arc<dyn OrgBackend>,
        shared: Weak<Shared>,
    ) -> Self {
        Self { rx, backend, shared }
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> ActiveOrganization {
        self.rx.borrow().clone()
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.rx.borrow().organization_id()
    }

    pub fn role(&self) -> Option<Role> {
        self.rx.borrow().role()
    }

    pub fn is_loading(&self) -> bool {
        self.rx.borrow().is_loading()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.rx.borrow().capabilities()
    }

    pub fn gate(&self) -> OrgGate {
        self.rx.borrow().gate()
    }

    /// Ask the owning resolver to resolve again (e.g. after onboarding).
    pub async fn reload(&self) -> ReloadOutcome {
        match self.shared.upgrade() {
            Some(shared) => resolve(Arc::clone(&self.backend), shared).await,
            None => ReloadOutcome::Disposed,
        }
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ActiveOrganization> {
        self.rx.clone()
    }

    /// Stream of snapshots, starting with the current one.
    pub fn changes(&self) -> WatchStream<ActiveOrganization> {
        WatchStream::new(self.rx.clone())
    }
}
