//! Team member handlers.
//!
//! ```text
//! GET    /api/v1/users?status=available
//! POST   /api/v1/users {"fullName":"Ion Popescu","role":"technician"}
//! GET    /api/v1/users/{id}
//! PATCH  /api/v1/users/{id} {"phone":null}
//! PUT    /api/v1/users/{id}/status {"status":"on_leave"}
//! DELETE /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::NewUser;
use crate::domain::{Error, FullName, PhoneNumber, User, UserId, UserPatch, UserRole, UserStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, nullable, parse_field, parse_id, parse_optional_field,
};

const FULL_NAME: FieldName = FieldName::new("fullName");
const PHONE: FieldName = FieldName::new("phone");
const ROLE: FieldName = FieldName::new("role");
const STATUS: FieldName = FieldName::new("status");
const USER_ID: FieldName = FieldName::new("id");

/// Team member as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "Ion Popescu")]
    pub full_name: String,
    #[schema(example = "technician")]
    pub role: String,
    #[schema(example = "+40 722 123 456")]
    pub phone: Option<String>,
    #[schema(example = "available")]
    pub status: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            full_name: user.full_name().as_ref().to_owned(),
            role: user.role().as_str().to_owned(),
            phone: user.phone().map(|phone| phone.as_ref().to_owned()),
            status: user.status().as_str().to_owned(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// One of `available`, `on_assignment`, `on_leave`, `unavailable`.
    pub status: Option<String>,
}

/// Body for `POST /api/v1/users`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub full_name: String,
    #[schema(example = "technician")]
    pub role: String,
    pub phone: Option<String>,
}

/// Body for `PATCH /api/v1/users/{id}`; `phone: null` clears the number.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub role: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
}

/// Body for `PUT /api/v1/users/{id}/status`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetUserStatusRequest {
    #[schema(example = "on_leave")]
    pub status: String,
}

fn parse_full_name(raw: &str) -> Result<FullName, Error> {
    FullName::new(raw).map_err(|err| invalid_value_error(FULL_NAME, raw, err))
}

fn parse_phone(raw: &str) -> Result<PhoneNumber, Error> {
    PhoneNumber::new(raw).map_err(|err| invalid_value_error(PHONE, raw, err))
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            full_name: parse_full_name(&value.full_name)?,
            role: parse_field::<UserRole>(&value.role, ROLE)?,
            phone: value.phone.as_deref().map(parse_phone).transpose()?,
        })
    }
}

impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = Error;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        let phone = match value.phone {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(Some(parse_phone(&raw)?)),
        };
        Ok(Self {
            full_name: value.full_name.as_deref().map(parse_full_name).transpose()?,
            role: parse_optional_field::<UserRole>(value.role.as_deref(), ROLE)?,
            phone,
        })
    }
}

/// List team members ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Team members", body = [UserResponse]),
        (status = 400, description = "Invalid status filter", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let status = parse_optional_field::<UserStatus>(query.status.as_deref(), STATUS)?;
    let users = state.users.list_users(status).await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a team member; new members start as `available`.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let request = NewUser::try_from(payload.into_inner())?;
    let user = state.users.create_user(request).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Team member", body = UserResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id: UserId = parse_id(&path, USER_ID)?;
    let user = state.users.get_user(id).await?;
    Ok(web::Json(user.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let id: UserId = parse_id(&path, USER_ID)?;
    let patch = UserPatch::try_from(payload.into_inner())?;
    let user = state.users.update_user(id, patch).await?;
    Ok(web::Json(user.into()))
}

/// Manual availability override, e.g. marking a member on leave.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/status",
    params(("id" = Uuid, Path, description = "User identifier")),
    request_body = SetUserStatusRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Invalid status", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "setUserStatus"
)]
#[put("/users/{id}/status")]
pub async fn set_user_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<SetUserStatusRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let id: UserId = parse_id(&path, USER_ID)?;
    let status = parse_field::<UserStatus>(&payload.status, STATUS)?;
    let user = state.users.set_user_status(id, status).await?;
    Ok(web::Json(user.into()))
}

/// Delete a member together with their work logs and memberships.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "User is on a planned or active assignment", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: UserId = parse_id(&path, USER_ID)?;
    state.users.delete_user(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
