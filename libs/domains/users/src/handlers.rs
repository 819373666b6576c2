use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_helpers::{UuidPath, ValidatedJson};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ErrorBody, ErrorDetail, UserError, UserResult};
use crate::models::{
    BanUnit, BanUser, Category, CreateUser, LoginRequest, UpdateUser, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;
use crate::session::AuthorizationService;
use crate::signer::TokenSigner;

pub const TAG: &str = "users";

/// OpenAPI documentation for the users API
#[derive(OpenApi)]
#[openapi(
    paths(
        login_by_id,
        save_user,
        retrieve_users,
        retrieve_user,
        check_user_name,
        update_user,
        delete_user,
        ban_user,
        give_admin_authority,
    ),
    components(schemas(
        UserResponse,
        Category,
        CreateUser,
        UpdateUser,
        BanUser,
        BanUnit,
        LoginRequest,
        ErrorBody,
        ErrorDetail
    )),
    tags((name = TAG, description = "User lifecycle and login endpoints"))
)]
pub struct ApiDoc;

/// Shared handler state
pub struct UsersState<R: UserRepository, S: TokenSigner> {
    pub users: UserService<R>,
    pub authorization: AuthorizationService<R, S>,
}

/// Create the users router with all HTTP endpoints
pub fn router<R, S>(users: UserService<R>, authorization: AuthorizationService<R, S>) -> Router
where
    R: UserRepository + 'static,
    S: TokenSigner + 'static,
{
    let shared_state = Arc::new(UsersState {
        users,
        authorization,
    });

    Router::new()
        .route("/loginById", post(login_by_id))
        .route("/saveUser", post(save_user))
        .route("/retrieveUsers", get(retrieve_users))
        .route("/retrieveUser/{id}", get(retrieve_user))
        .route("/checkUserName/{name}", get(check_user_name))
        .route("/updateUser", put(update_user))
        .route("/deleteUser/{id}", delete(delete_user))
        .route("/banUser/{id}", put(ban_user))
        .route("/giveAdminAuthority/{id}", put(give_admin_authority))
        .with_state(shared_state)
}

type SharedState<R, S> = State<Arc<UsersState<R, S>>>;

/// Log in by user id; the token is returned in a response header
#[utoipa::path(
    post,
    path = "/loginById",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; token in the configured header", body = UserResponse),
        (status = 403, description = "User is banned", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
async fn login_by_id<R: UserRepository, S: TokenSigner>(
    State(state): SharedState<R, S>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<impl IntoResponse> {
    let login = state.authorization.login_by_id(input.id).await?;

    let name = HeaderName::from_bytes(state.authorization.token_header().as_bytes())
        .map_err(|e| UserError::Internal(format!("Invalid token header name: {}", e)))?;
    let value = HeaderValue::from_str(&login.token)
        .map_err(|e| UserError::Internal(format!("Token is not a valid header value: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(name, value);

    Ok((headers, Json(login.user)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/saveUser",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Name already taken", body = ErrorBody)
    )
)]
async fn save_user<R: UserRepository, S: TokenSigner>(
    State(state): SharedState<R, S>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = state.users.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users ordered by name
#[utoipa::path(
    get,
    path = "/retrieveUsers",
    tag = TAG,
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>)
    )
)]
async fn retrieve_users<R: UserRepository, S: TokenSigner>(
    State(state): SharedState<R, S>,
) -> UserResult<Json<Vec<UserResponse>>> {
    let users = state.users.find_all().await?;
    Ok(Json(users))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/retrieveUser/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
async fn retrieve_user<R: UserRepository, S: TokenSigner>(
    State(state): SharedState<R, S>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    let user = state.users.find_by_id(id).await?;
    Ok(Json(user))
}

/// Check whether a name is still available
#[utoipa::path(
    get,
    path = "/checkUserName/{name}",
    tag = TAG,
    params(
        ("name" = String, Path, description = "Candidate user name")
    ),
    responses(
        (status = 200, description = "Name is available"),
        (status = 409, description = "Name already taken", body = ErrorBody)
    )
)]
async fn check_user_name<R: UserRepository, S: TokenSigner>(
    State(state): SharedState<R, S>,
    Path(name): Path<String>,
) -> UserResult<StatusCode> {
    state.users.check_if_user_exists(&name).await?;
    Ok(StatusCode::OK)
}

/// Update name and preferred categories
#[utoipa::path(
    put,
    path = "/updateUser",
    tag = TAG,
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "Name already taken", body = ErrorBody)
    )
)]
async fn update_user<R: UserRepository, S: TokenSigner>(
    State(state): SharedState<R, S>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    let user = state.users.update_user(input).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/deleteUser/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
async fn delete_user<R: UserRepository, S: TokenSigner>(
    State(state): SharedState<R, S>,
    UuidPath(id): UuidPath,
) -> UserResult<StatusCode> {
    state.users.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ban a user for the given duration
#[utoipa::path(
    put,
    path = "/banUser/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = BanUser,
    responses(
        (status = 200, description = "User banned", body = UserResponse),
        (status = 400, description = "Invalid duration", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
async fn ban_user<R: UserRepository, S: TokenSigner>(
    State(state): SharedState<R, S>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<BanUser>,
) -> UserResult<Json<UserResponse>> {
    let user = state.users.ban_user(id, input).await?;
    Ok(Json(user))
}

/// Grant the admin authority
#[utoipa::path(
    put,
    path = "/giveAdminAuthority/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Admin authority granted", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
async fn give_admin_authority<R: UserRepository, S: TokenSigner>(
    State(state): SharedState<R, S>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    let user = state.users.give_admin_authority_to_user(id).await?;
    Ok(Json(user))
}
