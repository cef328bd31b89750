use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::wishlists::{
        AddWishlistItemRequest, CreateCollectionRequest, UpdateCollectionRequest, WishlistItemList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{WishlistCollection, WishlistItem},
    response::ApiResponse,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/collections", post(create_collection))
        .route(
            "/collections/{id}",
            put(update_collection).delete(delete_collection),
        )
        .route("/collections/{id}/items", get(list_collection_items))
        .route("/items", get(list_user_items).post(add_item))
        .route("/items/{id}", axum::routing::delete(remove_item))
}

#[utoipa::path(
    post,
    path = "/api/wishlists/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = ApiResponse<WishlistCollection>),
        (status = 409, description = "Name already used by this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn create_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCollectionRequest>,
) -> AppResult<Json<ApiResponse<WishlistCollection>>> {
    let resp = wishlist_service::create_collection(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/wishlists/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    request_body = UpdateCollectionRequest,
    responses(
        (status = 200, description = "Collection updated", body = ApiResponse<WishlistCollection>),
        (status = 401, description = "Not the collection owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn update_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCollectionRequest>,
) -> AppResult<Json<ApiResponse<WishlistCollection>>> {
    let resp = wishlist_service::update_collection(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlists/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Collection and its items deleted"),
        (status = 401, description = "Not the collection owner"),
        (status = 404, description = "Collection not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::delete_collection(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/wishlists/collections/{id}/items",
    params(("id" = Uuid, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Items of the collection", body = ApiResponse<WishlistItemList>),
        (status = 401, description = "Privated collection of another user")
    ),
    tag = "Wishlists"
)]
pub async fn list_collection_items(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistItemList>>> {
    let resp = wishlist_service::list_collection_items(&state, user.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/wishlists/items",
    responses(
        (status = 200, description = "Caller's wishlist items", body = ApiResponse<WishlistItemList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn list_user_items(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<WishlistItemList>>> {
    let resp = wishlist_service::list_user_items(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlists/items",
    request_body = AddWishlistItemRequest,
    responses(
        (status = 200, description = "Added to wishlist", body = ApiResponse<WishlistItem>),
        (status = 409, description = "Own product or duplicate in the collection")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddWishlistItemRequest>,
) -> AppResult<Json<ApiResponse<WishlistItem>>> {
    let resp = wishlist_service::add_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlists/items/{id}",
    params(("id" = Uuid, Path, description = "Wishlist item ID")),
    responses(
        (status = 200, description = "Removed from wishlist"),
        (status = 401, description = "Not the item owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::remove_item(&state, &user, id).await?;
    Ok(Json(resp))
}
