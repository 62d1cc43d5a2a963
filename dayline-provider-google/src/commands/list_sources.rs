use anyhow::Result;
use dayline_core::remote::protocol::ListSources;

use crate::commands::authed_api;

pub async fn handle(params: &serde_json::Value) -> Result<serde_json::Value> {
    let params: ListSources = serde_json::from_value(params.clone())?;

    let api = authed_api(params.account.as_deref()).await?;
    let sources = api.calendar_list().await?;

    Ok(serde_json::to_value(sources)?)
}
