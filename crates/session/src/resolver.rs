//! Active-organization resolver.
//!
//! Each resolution takes a token from a monotonically increasing counter.
//! A completed resolution is published only if its token is still the latest
//! issued, so an older in-flight call can never overwrite a newer result.
//! The token check and the write happen under the channel's lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

use firstshift_backend::OrgBackend;

use crate::{ActiveOrganization, OrgContext};

/// Result of one [`ActiveOrgResolver::reload`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The resolution was published.
    Applied,
    /// A newer reload was issued while this one was in flight; discarded.
    Superseded,
    /// The resolver was disposed; discarded.
    Disposed,
}

#[derive(Debug)]
pub(crate) struct Shared {
    tx: watch::Sender<ActiveOrganization>,
    latest_token: AtomicU64,
    disposed: AtomicBool,
    closed: Notify,
}

/// Owner of the session's [`ActiveOrganization`] snapshot.
///
/// One per authenticated session. There is no retry and no caching beyond
/// the in-memory snapshot: a failed resolution stays failed until the next
/// [`reload`](Self::reload).
pub struct ActiveOrgResolver {
    backend: Arc<dyn OrgBackend>,
    shared: Arc<Shared>,
}

impl core::fmt::Debug for ActiveOrgResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActiveOrgResolver")
            .field("snapshot", &*self.shared.tx.borrow())
            .field("latest_token", &self.shared.latest_token.load(Ordering::SeqCst))
            .finish()
    }
}

impl ActiveOrgResolver {
    /// Create a resolver in the loading state without contacting the backend.
    pub fn new(backend: Arc<dyn OrgBackend>) -> Self {
        let (tx, _rx) = watch::channel(ActiveOrganization::initial());
        Self {
            backend,
            shared: Arc::new(Shared {
                tx,
                latest_token: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
                closed: Notify::new(),
            }),
        }
    }

    /// Create a resolver and run the first resolution.
    pub async fn mount(backend: Arc<dyn OrgBackend>) -> Self {
        let resolver = Self::new(backend);
        resolver.reload().await;
        resolver
    }

    pub fn context(&self) -> OrgContext {
        OrgContext::new(
            self.shared.tx.subscribe(),
            Arc::clone(&self.backend),
            Arc::downgrade(&self.shared),
        )
    }

    pub fn snapshot(&self) -> ActiveOrganization {
        self.shared.tx.borrow().clone()
    }

    pub fn backend(&self) -> Arc<dyn OrgBackend> {
        Arc::clone(&self.backend)
    }

    /// Re-run the resolution and publish the result.
    ///
    /// Never fails: backend errors and "no organization" both publish the
    /// empty snapshot with `loading = false`.
    pub async fn reload(&self) -> ReloadOutcome {
        resolve(Arc::clone(&self.backend), Arc::clone(&self.shared)).await
    }

    /// Run a reload on the runtime without awaiting it.
    ///
    /// The task outlives the caller; if the resolver is disposed first the
    /// result is discarded.
    pub fn spawn_reload(&self) -> JoinHandle<ReloadOutcome> {
        tokio::spawn(resolve(Arc::clone(&self.backend), Arc::clone(&self.shared)))
    }

    /// Stop publishing. In-flight resolutions complete but are discarded.
    pub fn dispose(&self) {
        if !self.shared.disposed.swap(true, Ordering::SeqCst) {
            self.shared.closed.notify_waiters();
            tracing::debug!("active organization resolver disposed");
        }
    }

    /// Wait until no resolution is in flight and return that snapshot.
    ///
    /// `None` once the resolver is disposed.
    pub(crate) async fn settled(&self) -> Option<ActiveOrganization> {
        let closed = self.shared.closed.notified();
        if self.is_disposed() {
            return None;
        }
        let mut rx = self.shared.tx.subscribe();
        tokio::select! {
            published = rx.wait_for(|s| !s.is_loading()) => published.ok().map(|s| s.clone()),
            _ = closed => None,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::SeqCst)
    }
}

impl Drop for ActiveOrgResolver {
    fn drop(&mut self) {
        self.dispose();
    }
}

pub(crate) async fn resolve(backend: Arc<dyn OrgBackend>, shared: Arc<Shared>) -> ReloadOutcome {
    if shared.disposed.load(Ordering::SeqCst) {
        return ReloadOutcome::Disposed;
    }

    let token = shared.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
    shared.tx.send_if_modified(ActiveOrganization::mark_loading);

    let next = match backend.get_or_init_active_org().await {
        Ok(Some(record)) => {
            tracing::info!(
                organization_id = %record.organization_id,
                role = %record.role,
                token,
                "resolved active organization"
            );
            ActiveOrganization::resolved(record)
        }
        Ok(None) => {
            tracing::info!(token, "user has no organization");
            ActiveOrganization::none()
        }
        Err(err) => {
            tracing::warn!(error = %err, token, "active organization resolution failed");
            ActiveOrganization::none()
        }
    };

    let mut outcome = ReloadOutcome::Superseded;
    shared.tx.send_if_modified(|current| {
        if shared.disposed.load(Ordering::SeqCst) {
            outcome = ReloadOutcome::Disposed;
            return false;
        }
        if shared.latest_token.load(Ordering::SeqCst) != token {
            return false;
        }
        *current = next;
        outcome = ReloadOutcome::Applied;
        true
    });

    if outcome == ReloadOutcome::Superseded {
        tracing::debug!(token, "discarded superseded resolution");
    }
    outcome
}
