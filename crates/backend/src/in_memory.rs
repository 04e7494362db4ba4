//! In-memory stand-in for the hosted backend.
//!
//! [`InMemoryDirectory`] holds what the server would: organizations,
//! memberships, each user's persisted active selection and join codes. Each
//! [`InMemoryBackend`] is a session bound to one user, so the procedures see
//! the caller implicitly as they do server-side.
//!
//! Intended for tests/dev. Not optimized for performance.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Notify;
use uuid::Uuid;

use firstshift_auth::{Membership, Role};
use firstshift_core::{OrganizationId, UserId};

use crate::{ActiveOrgRecord, BackendError, JoinCode, JoinCodeRequest, OrgBackend};

const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const JOIN_CODE_LEN: usize = 8;

#[derive(Debug, Clone)]
struct MembershipRow {
    user_id: UserId,
    organization_id: OrganizationId,
    role: Role,
    joined_seq: u64,
}

#[derive(Debug, Default)]
struct DirectoryState {
    organizations: HashMap<OrganizationId, String>,
    memberships: Vec<MembershipRow>,
    active: HashMap<UserId, OrganizationId>,
    join_codes: HashMap<String, JoinCode>,
    next_seq: u64,
}

impl DirectoryState {
    fn membership(&self, user_id: UserId, organization_id: OrganizationId) -> Option<&MembershipRow> {
        self.memberships
            .iter()
            .find(|m| m.user_id == user_id && m.organization_id == organization_id)
    }

    fn memberships_of(&self, user_id: UserId) -> Vec<&MembershipRow> {
        let mut rows: Vec<&MembershipRow> =
            self.memberships.iter().filter(|m| m.user_id == user_id).collect();
        rows.sort_by_key(|m| (m.joined_seq, m.organization_id));
        rows
    }

    fn to_membership(&self, row: &MembershipRow) -> Membership {
        Membership {
            organization_id: row.organization_id,
            organization_name: self
                .organizations
                .get(&row.organization_id)
                .cloned()
                .unwrap_or_default(),
            role: row.role,
        }
    }

    fn insert_membership(&mut self, user_id: UserId, organization_id: OrganizationId, role: Role) {
        let joined_seq = self.next_seq;
        self.next_seq += 1;
        self.memberships.push(MembershipRow {
            user_id,
            organization_id,
            role,
            joined_seq,
        });
    }
}

#[derive(Debug, Default)]
struct Faults {
    offline: bool,
    failing_resolves: u32,
    held_resolves: VecDeque<Arc<Notify>>,
}

/// Simulated server-side directory shared by every session.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: RwLock<DirectoryState>,
    faults: Mutex<Faults>,
    resolve_calls: AtomicUsize,
}

impl InMemoryDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Open a session authenticated as `user_id`.
    pub fn session(self: &Arc<Self>, user_id: UserId) -> InMemoryBackend {
        InMemoryBackend {
            directory: Arc::clone(self),
            user_id,
        }
    }

    pub fn create_organization(&self, name: impl Into<String>) -> OrganizationId {
        let id = OrganizationId::new();
        if let Ok(mut state) = self.state.write() {
            state.organizations.insert(id, name.into());
        }
        id
    }

    /// Add (or re-role) a membership. Join order follows call order.
    pub fn add_member(&self, user_id: UserId, organization_id: OrganizationId, role: Role) {
        let Ok(mut state) = self.state.write() else {
            return;
        };
        if let Some(row) = state
            .memberships
            .iter_mut()
            .find(|m| m.user_id == user_id && m.organization_id == organization_id)
        {
            row.role = role;
            return;
        }
        state.insert_membership(user_id, organization_id, role);
    }

    pub fn remove_member(&self, user_id: UserId, organization_id: OrganizationId) {
        if let Ok(mut state) = self.state.write() {
            state
                .memberships
                .retain(|m| !(m.user_id == user_id && m.organization_id == organization_id));
        }
    }

    /// The user's persisted active selection, if any.
    pub fn active_selection(&self, user_id: UserId) -> Option<OrganizationId> {
        self.state.read().ok()?.active.get(&user_id).copied()
    }

    /// Seed a join code directly (e.g. an already-expired one).
    pub fn insert_join_code(&self, code: JoinCode) {
        if let Ok(mut state) = self.state.write() {
            state.join_codes.insert(code.code.clone(), code);
        }
    }

    pub fn join_code(&self, code: &str) -> Option<JoinCode> {
        self.state.read().ok()?.join_codes.get(code).cloned()
    }

    /// While offline every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.offline = offline;
        }
    }

    /// Make the next resolve call fail with a network error.
    pub fn fail_next_resolve(&self) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.failing_resolves += 1;
        }
    }

    /// Hold the response of the next resolve call until the returned handle is
    /// notified. The result is computed before holding, so it reflects the
    /// server state at call time.
    pub fn hold_next_resolve(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        if let Ok(mut faults) = self.faults.lock() {
            faults.held_resolves.push_back(Arc::clone(&gate));
        }
        gate
    }

    /// Number of resolve calls that reached the directory.
    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), BackendError> {
        let faults = self.faults.lock().map_err(|_| poisoned())?;
        if faults.offline {
            return Err(BackendError::Network("backend unreachable".to_string()));
        }
        Ok(())
    }

    fn resolve_for(&self, user_id: UserId) -> Result<Option<ActiveOrgRecord>, BackendError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;

        if let Some(org) = state.active.get(&user_id).copied() {
            if let Some(row) = state.membership(user_id, org) {
                return Ok(Some(state.to_membership(row).into()));
            }
            // Selection points at a membership that no longer exists.
            state.active.remove(&user_id);
        }

        let picked = state
            .memberships_of(user_id)
            .first()
            .map(|row| state.to_membership(row));

        match picked {
            Some(membership) => {
                state.active.insert(user_id, membership.organization_id);
                tracing::debug!(
                    %user_id,
                    organization_id = %membership.organization_id,
                    "initialized active organization selection"
                );
                Ok(Some(membership.into()))
            }
            None => Ok(None),
        }
    }
}

fn poisoned() -> BackendError {
    BackendError::rejected(500, "directory lock poisoned")
}

fn generate_code(taken: &HashMap<String, JoinCode>) -> String {
    loop {
        // The trailing bytes of a v7 UUID are random.
        let uuid = Uuid::now_v7();
        let bytes = uuid.as_bytes();
        let code: String = bytes[16 - JOIN_CODE_LEN..]
            .iter()
            .map(|b| JOIN_CODE_ALPHABET[(*b as usize) % JOIN_CODE_ALPHABET.len()] as char)
            .collect();
        if !taken.contains_key(&code) {
            return code;
        }
    }
}

/// A session against [`InMemoryDirectory`], authenticated as one user.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    directory: Arc<InMemoryDirectory>,
    user_id: UserId,
}

#[async_trait]
impl OrgBackend for InMemoryBackend {
    async fn get_or_init_active_org(&self) -> Result<Option<ActiveOrgRecord>, BackendError> {
        let dir = &self.directory;
        dir.check_online()?;

        let held = {
            let mut faults = dir.faults.lock().map_err(|_| poisoned())?;
            if faults.failing_resolves > 0 {
                faults.failing_resolves -= 1;
                return Err(BackendError::Network("simulated resolve failure".to_string()));
            }
            faults.held_resolves.pop_front()
        };

        dir.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let result = dir.resolve_for(self.user_id);

        if let Some(gate) = held {
            gate.notified().await;
        }

        result
    }

    async fn set_active_org(&self, organization_id: OrganizationId) -> Result<(), BackendError> {
        self.directory.check_online()?;
        let mut state = self.directory.state.write().map_err(|_| poisoned())?;

        if state.membership(self.user_id, organization_id).is_none() {
            return Err(BackendError::rejected(403, "not a member of this organization"));
        }
        state.active.insert(self.user_id, organization_id);
        Ok(())
    }

    async fn list_memberships(&self) -> Result<Vec<Membership>, BackendError> {
        self.directory.check_online()?;
        let state = self.directory.state.read().map_err(|_| poisoned())?;
        Ok(state
            .memberships_of(self.user_id)
            .into_iter()
            .map(|row| state.to_membership(row))
            .collect())
    }

    async fn join_org_with_code(&self, code: &str) -> Result<Membership, BackendError> {
        self.directory.check_online()?;
        let key = code.trim().to_ascii_uppercase();
        let mut state = self.directory.state.write().map_err(|_| poisoned())?;

        let join_code = state
            .join_codes
            .get(&key)
            .cloned()
            .ok_or_else(|| BackendError::rejected(404, "invalid join code"))?;

        if let Some(row) = state.membership(self.user_id, join_code.organization_id) {
            return Ok(state.to_membership(row));
        }
        if join_code.is_expired(Utc::now()) {
            return Err(BackendError::rejected(410, "join code expired"));
        }
        if join_code.is_exhausted() {
            return Err(BackendError::rejected(410, "join code has no uses left"));
        }

        if let Some(stored) = state.join_codes.get_mut(&key) {
            stored.uses += 1;
        }
        state.insert_membership(self.user_id, join_code.organization_id, join_code.role);

        let row = state
            .membership(self.user_id, join_code.organization_id)
            .ok_or_else(|| BackendError::rejected(500, "membership missing after join"))?;
        Ok(state.to_membership(row))
    }

    async fn generate_org_join_code(
        &self,
        organization_id: OrganizationId,
        request: JoinCodeRequest,
    ) -> Result<JoinCode, BackendError> {
        self.directory.check_online()?;
        let mut state = self.directory.state.write().map_err(|_| poisoned())?;

        let caller_role = state
            .membership(self.user_id, organization_id)
            .map(|row| row.role)
            .ok_or_else(|| BackendError::rejected(403, "not a member of this organization"))?;
        if !caller_role.includes(Role::Manager) {
            return Err(BackendError::rejected(403, "only managers and admins may create join codes"));
        }
        if request.max_uses == 0 {
            return Err(BackendError::rejected(400, "max_uses must be at least 1"));
        }
        if request.valid_for <= Duration::zero() {
            return Err(BackendError::rejected(400, "join code validity must be positive"));
        }

        let join_code = JoinCode {
            code: generate_code(&state.join_codes),
            organization_id,
            role: request.role,
            max_uses: request.max_uses,
            uses: 0,
            expires_at: Utc::now() + request.valid_for,
        };
        state.join_codes.insert(join_code.code.clone(), join_code.clone());
        Ok(join_code)
    }
}
