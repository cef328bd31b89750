use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::wishlists::{
        AddWishlistItemRequest, CreateCollectionRequest, UpdateCollectionRequest, WishlistItemList,
    },
    entity::{
        products::Entity as Products,
        users::Entity as Users,
        wishlist_collections::{
            ActiveModel as CollectionActive, Column as CollectionCol, Entity as WishlistCollections,
            Model as CollectionModel,
        },
        wishlist_items::{
            ActiveModel as WishlistItemActive, Column as WishlistItemCol, Entity as WishlistItems,
            Model as WishlistItemModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{WishlistCollection, WishlistItem},
    response::{ApiResponse, Meta},
    state::AppState,
    store,
};

pub async fn create_collection(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCollectionRequest,
) -> AppResult<ApiResponse<WishlistCollection>> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Collection name must not be empty".into()));
    }

    if Users::find_by_id(user.user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let duplicate = WishlistCollections::find()
        .filter(CollectionCol::UserId.eq(user.user_id))
        .filter(CollectionCol::Name.eq(name.clone()))
        .one(&state.orm)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(
            "A collection with this name already exists".into(),
        ));
    }

    let collection = CollectionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        name: Set(name),
        privated: Set(payload.privated.unwrap_or(false)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Collection created",
        collection_from_entity(collection),
        Some(Meta::empty()),
    ))
}

pub async fn update_collection(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCollectionRequest,
) -> AppResult<ApiResponse<WishlistCollection>> {
    let existing = WishlistCollections::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Collection not found".into()))?;

    if existing.user_id != user.user_id {
        return Err(AppError::NotAuthorized);
    }

    if let Some(name) = payload.name.as_ref() {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Collection name must not be empty".into()));
        }
        let duplicate = WishlistCollections::find()
            .filter(CollectionCol::UserId.eq(user.user_id))
            .filter(CollectionCol::Name.eq(name))
            .filter(CollectionCol::Id.ne(id))
            .one(&state.orm)
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(
                "A collection with this name already exists".into(),
            ));
        }
    }

    let mut active: CollectionActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(privated) = payload.privated {
        active.privated = Set(privated);
    }
    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        collection_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Remove a collection and its items as one atomic unit.
pub async fn delete_collection(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let collection = WishlistCollections::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Collection not found".into()))?;

    if collection.user_id != user.user_id {
        return Err(AppError::NotAuthorized);
    }

    store::atomic(&state.orm, move |txn| {
        Box::pin(async move {
            WishlistItems::delete_many()
                .filter(WishlistItemCol::GroupId.eq(id))
                .exec(txn)
                .await?;
            WishlistCollections::delete_by_id(id).exec(txn).await?;
            Ok(())
        })
    })
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "collection_delete",
        Some("wishlist_collections"),
        Some(serde_json::json!({ "collection_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Collection deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Items of a collection; privated collections are owner-only.
pub async fn list_collection_items(
    state: &AppState,
    user: Option<&AuthUser>,
    id: Uuid,
) -> AppResult<ApiResponse<WishlistItemList>> {
    let collection = WishlistCollections::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Collection not found".into()))?;

    if collection.privated && user.map(|u| u.user_id) != Some(collection.user_id) {
        return Err(AppError::NotAuthorized);
    }

    let items = WishlistItems::find()
        .filter(WishlistItemCol::GroupId.eq(id))
        .order_by_desc(WishlistItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Wishlist items",
        WishlistItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_user_items(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<WishlistItemList>> {
    if Users::find_by_id(user.user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let items = WishlistItems::find()
        .filter(WishlistItemCol::UserId.eq(user.user_id))
        .order_by_desc(WishlistItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Wishlist items",
        WishlistItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddWishlistItemRequest,
) -> AppResult<ApiResponse<WishlistItem>> {
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    if product.owner_id == user.user_id {
        return Err(AppError::Conflict(
            "Cannot add your own product to a wishlist".into(),
        ));
    }

    let collection = WishlistCollections::find_by_id(payload.group_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Collection not found".into()))?;

    if collection.user_id != user.user_id {
        return Err(AppError::NotAuthorized);
    }

    let duplicate = WishlistItems::find()
        .filter(WishlistItemCol::UserId.eq(user.user_id))
        .filter(WishlistItemCol::ProductId.eq(product.id))
        .filter(WishlistItemCol::GroupId.eq(collection.id))
        .one(&state.orm)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(
            "Product is already in this collection".into(),
        ));
    }

    let item = WishlistItemActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product.id),
        group_id: Set(collection.id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Added to wishlist",
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let item = WishlistItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Wishlist item not found".into()))?;

    if item.user_id != user.user_id {
        return Err(AppError::NotAuthorized);
    }

    WishlistItems::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn collection_from_entity(model: CollectionModel) -> WishlistCollection {
    WishlistCollection {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        privated: model.privated,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn item_from_entity(model: WishlistItemModel) -> WishlistItem {
    WishlistItem {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        group_id: model.group_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
