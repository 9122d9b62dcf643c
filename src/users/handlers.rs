use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::CurrentUser,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiQuery},
    state::AppState,
    users::{
        dto::{CreateUserRequest, Pagination, UpdateUserRequest, UserRead},
        model::User,
        policy::{authorize, Operation},
    },
};

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn load(state: &AppState, id: i64) -> AppResult<User> {
    state.users.find_by_id(id).await?.ok_or(AppError::NotFound)
}

fn check(caller: &User, operation: Operation, target: Option<&User>) -> AppResult<()> {
    authorize(caller, operation, target).inspect_err(|_| {
        warn!(
            caller_id = ?caller.id,
            target_id = ?target.and_then(|t| t.id),
            %operation,
            "access denied"
        );
    })
}

/// The save hook only returns `None` for deletes.
fn written(saved: Option<User>) -> AppResult<User> {
    saved.ok_or_else(|| AppError::Internal(anyhow::anyhow!("write returned no record")))
}

#[instrument(skip(state, caller))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserRead>> {
    let target = load(&state, id).await?;
    check(&caller, Operation::GetOne, Some(&target))?;
    Ok(Json(UserRead::from(&target)))
}

#[instrument(skip(state, caller))]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiQuery(p): ApiQuery<Pagination>,
) -> AppResult<Json<Vec<UserRead>>> {
    check(&caller, Operation::GetCollection, None)?;
    let (limit, offset) = p.limit_offset();
    let users = state.users.list(limit, offset).await?;
    Ok(Json(users.iter().map(UserRead::from).collect()))
}

#[instrument(skip(state, caller, body))]
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> AppResult<(StatusCode, HeaderMap, Json<UserRead>)> {
    check(&caller, Operation::Create, None)?;
    let user = body.into_user()?;

    let saved = written(state.processor().process(user, Operation::Create).await?)?;
    let id = saved.id.ok_or(AppError::NotFound)?;
    info!(user_id = id, email = %saved.email, created_by = ?caller.id, "user created");

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/api/users/{}", id))
        .map_err(|e| AppError::Internal(e.into()))?;
    headers.insert(header::LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(UserRead::from(&saved))))
}

#[instrument(skip(state, caller, body))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> AppResult<Json<UserRead>> {
    let target = load(&state, id).await?;
    check(&caller, Operation::Update, Some(&target))?;
    let user = body.apply_to(target)?;

    let saved = written(state.processor().process(user, Operation::Update).await?)?;
    info!(user_id = id, updated_by = ?caller.id, "user updated");
    Ok(Json(UserRead::from(&saved)))
}

#[instrument(skip(state, caller))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let target = load(&state, id).await?;
    check(&caller, Operation::Delete, Some(&target))?;

    state.processor().process(target, Operation::Delete).await?;
    info!(user_id = id, deleted_by = ?caller.id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
