use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use super::common::{paginate, parse_filter, today, PaginationParams};
use crate::{
    errors::ServiceError,
    models::{CreateUserInput, UpdateUserInput, User},
    services::users::UserFilter,
    ApiResponse, AppState, PaginatedResponse,
};

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    /// Name or email substring
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user))
        .route("/:id/deactivate", post(deactivate_user))
}

async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<User>>>, ServiceError> {
    let filter = UserFilter {
        search: query.search,
        role: parse_filter(query.role.as_deref(), "role")?,
        status: parse_filter(query.status.as_deref(), "status")?,
    };
    let (page, limit) = pagination.resolve(
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    );

    let users = state.services.users.list_users(&filter);
    Ok(Json(ApiResponse::success(paginate(users, page, limit))))
}

async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ServiceError> {
    let user = state.services.users.create_user(request, today())?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<User>>, ServiceError> {
    let user = state.services.users.get_user(id)?;
    Ok(Json(ApiResponse::success(user)))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateUserInput>,
) -> Result<Json<ApiResponse<User>>, ServiceError> {
    let user = state.services.users.update_user(id, request)?;
    Ok(Json(ApiResponse::success(user)))
}

async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<User>>, ServiceError> {
    let user = state.services.users.deactivate_user(id)?;
    Ok(Json(ApiResponse::success(user)))
}
