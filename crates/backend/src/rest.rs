//! REST/RPC client for the hosted backend.
//!
//! Procedures are called as `POST {base}/rest/v1/rpc/<name>` with a JSON body
//! of named arguments; tables are read with `GET {base}/rest/v1/<table>`.
//! Every request carries the project key (`apikey`) and the session's access
//! token as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use firstshift_auth::{Membership, Role};
use firstshift_core::{OrganizationId, UserId};

use crate::{ActiveOrgRecord, BackendError, JoinCode, JoinCodeRequest, OrgBackend};

/// Connection settings for [`RestBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    pub base_url: String,
    pub anon_key: String,
    pub access_token: String,
    pub user_id: UserId,
    pub timeout: Duration,
}

/// [`OrgBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct RestBackend {
    config: RestConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct MembershipRow {
    organization_id: OrganizationId,
    role: Role,
    organizations: Option<OrganizationRef>,
}

#[derive(Debug, Deserialize)]
struct OrganizationRef {
    name: String,
}

impl RestBackend {
    pub fn new(config: RestConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.config.base_url.trim_end_matches('/'), procedure)
    }

    fn memberships_url(&self) -> String {
        format!(
            "{}/rest/v1/organization_members?select=organization_id,role,organizations(name)&user_id=eq.{}&order=created_at.asc,organization_id.asc",
            self.config.base_url.trim_end_matches('/'),
            self.config.user_id
        )
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.access_token)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Value, BackendError> {
        let resp = self
            .authed(req)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthenticated);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BackendError::rejected(status.as_u16(), message));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn rpc(&self, procedure: &str, args: Value) -> Result<Value, BackendError> {
        tracing::debug!(procedure, "calling backend procedure");
        let req = self.client.post(self.rpc_url(procedure)).json(&args);
        self.send(req).await
    }
}

/// Procedures returning `setof` yield an array; scalar ones an object or null.
fn first_row<T: DeserializeOwned>(value: Value) -> Result<Option<T>, BackendError> {
    let row = match value {
        Value::Null => return Ok(None),
        Value::Array(rows) => match rows.into_iter().next() {
            Some(row) => row,
            None => return Ok(None),
        },
        other => other,
    };
    serde_json::from_value(row)
        .map(Some)
        .map_err(|e| BackendError::Decode(e.to_string()))
}

fn decode_memberships(value: Value) -> Result<Vec<Membership>, BackendError> {
    let rows: Vec<MembershipRow> =
        serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(rows
        .into_iter()
        .map(|row| Membership {
            organization_id: row.organization_id,
            organization_name: row.organizations.map(|o| o.name).unwrap_or_default(),
            role: row.role,
        })
        .collect())
}

#[async_trait]
impl OrgBackend for RestBackend {
    async fn get_or_init_active_org(&self) -> Result<Option<ActiveOrgRecord>, BackendError> {
        let value = self.rpc("get_or_init_active_org", json!({})).await?;
        first_row(value)
    }

    async fn set_active_org(&self, organization_id: OrganizationId) -> Result<(), BackendError> {
        self.rpc("set_active_org", json!({ "p_organization_id": organization_id }))
            .await
            .map(|_| ())
    }

    async fn list_memberships(&self) -> Result<Vec<Membership>, BackendError> {
        let req = self.client.get(self.memberships_url());
        let value = self.send(req).await?;
        decode_memberships(value)
    }

    async fn join_org_with_code(&self, code: &str) -> Result<Membership, BackendError> {
        let value = self
            .rpc("join_org_with_code", json!({ "p_code": code.trim().to_ascii_uppercase() }))
            .await?;
        let record: Option<ActiveOrgRecord> = first_row(value)?;
        let record = record.ok_or_else(|| BackendError::Decode("join returned no membership".to_string()))?;
        Ok(Membership {
            organization_id: record.organization_id,
            organization_name: record.organization_name,
            role: record.role,
        })
    }

    async fn generate_org_join_code(
        &self,
        organization_id: OrganizationId,
        request: JoinCodeRequest,
    ) -> Result<JoinCode, BackendError> {
        let expires_at = Utc::now() + request.valid_for;
        let value = self
            .rpc(
                "generate_org_join_code",
                json!({
                    "p_organization_id": organization_id,
                    "p_role": request.role,
                    "p_max_uses": request.max_uses,
                    "p_expires_at": expires_at,
                }),
            )
            .await?;
        first_row(value)?.ok_or_else(|| BackendError::Decode("no join code returned".to_string()))
    }
}
