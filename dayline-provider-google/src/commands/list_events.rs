use anyhow::Result;
use dayline_core::remote::protocol::ListEvents;

use crate::commands::authed_api;

pub async fn handle(params: &serde_json::Value) -> Result<serde_json::Value> {
    let params: ListEvents = serde_json::from_value(params.clone())?;

    let api = authed_api(params.account.as_deref()).await?;
    let events = api.events(&params.source_id, params.from, params.to).await?;

    Ok(serde_json::to_value(events)?)
}
