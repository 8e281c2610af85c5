//! Maintenance handlers.
//!
//! ```text
//! POST /api/v1/admin/sync-statuses
//! POST /api/v1/admin/sync-statuses {"userIds":["..."]}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, StatusSyncOutcome, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id_list};

const USER_IDS: FieldName = FieldName::new("userIds");

/// Optional body restricting the resync to some users.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusesRequest {
    pub user_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusSyncResponse {
    /// Users moved to `on_assignment`.
    pub promoted: u64,
    /// Users moved from `on_assignment` back to `available`.
    pub released: u64,
}

impl From<StatusSyncOutcome> for StatusSyncResponse {
    fn from(outcome: StatusSyncOutcome) -> Self {
        Self {
            promoted: outcome.promoted,
            released: outcome.released,
        }
    }
}

fn parse_body(body: &[u8]) -> Result<Option<Vec<UserId>>, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let request: SyncStatusesRequest = serde_json::from_slice(body).map_err(|err| {
        Error::invalid_request(format!("invalid JSON body: {err}"))
            .with_details(json!({ "code": "invalid_body" }))
    })?;
    request
        .user_ids
        .map(|ids| parse_id_list(&ids, USER_IDS))
        .transpose()
}

/// Recompute derived availability from active assignments.
///
/// An empty body, or one without `userIds`, resyncs every user.
#[utoipa::path(
    post,
    path = "/api/v1/admin/sync-statuses",
    request_body(content = Option<SyncStatusesRequest>, description = "Users to resync"),
    responses(
        (status = 200, description = "Transitions applied", body = StatusSyncResponse),
        (status = 400, description = "Invalid body", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "syncStatuses"
)]
#[post("/admin/sync-statuses")]
pub async fn sync_statuses(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<web::Json<StatusSyncResponse>> {
    let outcome = match parse_body(&body)? {
        Some(user_ids) => state.status_sync.sync_statuses_for(user_ids).await?,
        None => state.status_sync.sync_all_statuses().await?,
    };
    Ok(web::Json(outcome.into()))
}
