use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        transactions::TransactionList,
        users::{
            AddFundsRequest, CollectionList, UpdateEmailRequest, UpdatePasswordRequest,
            UpdateProfileRequest, UserProductList,
        },
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{PrivateUserInfo, UserProfile},
    response::ApiResponse,
    services::{transaction_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/email", put(update_email))
        .route("/password", put(update_password))
        .route("/funds", post(add_funds))
        .route("/{id}", get(get_profile).put(update_profile).delete(delete_account))
        .route("/{id}/private", get(get_private_info))
        .route("/{id}/products", get(list_user_products))
        .route("/{id}/transactions", get(list_user_transactions))
        .route("/{id}/collections", get(list_all_collections))
        .route("/{id}/collections/public", get(list_public_collections))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public profile", body = ApiResponse<UserProfile>),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = user_service::get_profile(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/private",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Email and funds, owner only", body = ApiResponse<PrivateUserInfo>),
        (status = 401, description = "Not the account owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_private_info(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PrivateUserInfo>>> {
    let resp = user_service::get_private_info(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<UserProfile>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = user_service::update_profile(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/email",
    request_body = UpdateEmailRequest,
    responses(
        (status = 200, description = "Email updated"),
        (status = 409, description = "Email already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_email(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateEmailRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = user_service::update_email(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 401, description = "Current password does not match")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = user_service::update_password(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/users/funds",
    request_body = AddFundsRequest,
    responses(
        (status = 200, description = "Funds added", body = ApiResponse<PrivateUserInfo>),
        (status = 400, description = "Non-positive amount")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn add_funds(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddFundsRequest>,
) -> AppResult<Json<ApiResponse<PrivateUserInfo>>> {
    let resp = user_service::add_funds(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/products",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Products owned by the user", body = ApiResponse<UserProductList>)
    ),
    tag = "Users"
)]
pub async fn list_user_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserProductList>>> {
    let resp = user_service::list_user_products(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/transactions",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Purchase history, owner only", body = ApiResponse<TransactionList>),
        (status = 401, description = "Not the account owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_user_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransactionList>>> {
    let resp = transaction_service::list_user_transactions(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/collections",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Every collection, owner only", body = ApiResponse<CollectionList>),
        (status = 401, description = "Not the account owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_all_collections(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CollectionList>>> {
    let resp = user_service::list_all_collections(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/collections/public",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public collections", body = ApiResponse<CollectionList>)
    ),
    tag = "Users"
)]
pub async fn list_public_collections(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CollectionList>>> {
    let resp = user_service::list_public_collections(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account and owned entities deleted"),
        (status = 401, description = "Not the account owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = user_service::delete_account(&state, &user, id).await?;
    Ok(Json(resp))
}
