pub mod list_events;
pub mod list_sources;

use anyhow::Result;

use crate::api::GoogleApi;
use crate::session::Session;

pub async fn authed_api(account: Option<&str>) -> Result<GoogleApi> {
    let session = Session::load_valid(account).await?;
    GoogleApi::new(session.access_token())
}
