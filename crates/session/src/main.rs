//! `firstshift-whoami`: resolve the signed-in user's active organization and
//! print it with the derived capabilities and all memberships as JSON.

use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use firstshift_backend::RestBackend;
use firstshift_session::{ActiveOrgResolver, ClientConfig, OrgSwitcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    firstshift_observability::init();

    let config = ClientConfig::from_env().context("failed to read client configuration")?;
    tracing::info!(backend_url = %config.backend_url, user_id = %config.user_id, "resolving active organization");

    let backend = RestBackend::new(config.rest_config()).context("failed to build backend client")?;
    let resolver = ActiveOrgResolver::mount(Arc::new(backend)).await;
    let snapshot = resolver.snapshot();

    let memberships = match OrgSwitcher::new(&resolver).memberships().await {
        Ok(memberships) => memberships,
        Err(err) => {
            tracing::warn!(error = %err, "could not list memberships");
            Vec::new()
        }
    };

    let report = json!({
        "active": snapshot,
        "capabilities": snapshot.capabilities(),
        "memberships": memberships,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
