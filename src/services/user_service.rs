use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::users::{
        AddFundsRequest, CollectionList, UpdateEmailRequest, UpdatePasswordRequest,
        UpdateProfileRequest, UserProductList,
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        products::{Column as ProdCol, Entity as Products},
        reviews::{Column as ReviewCol, Entity as Reviews},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
        wishlist_collections::{Column as CollectionCol, Entity as WishlistCollections},
        wishlist_items::{Column as WishlistItemCol, Entity as WishlistItems},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{PrivateUserInfo, UserProfile},
    response::{ApiResponse, Meta},
    services::{product_service, wishlist_service},
    state::AppState,
    store,
};

pub async fn get_profile(state: &AppState, id: Uuid) -> AppResult<ApiResponse<UserProfile>> {
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(ApiResponse::success(
        "User",
        UserProfile {
            id: user.id,
            name_first: user.name_first,
            name_last: user.name_last,
            description: user.description,
            created_at: user.created_at.with_timezone(&Utc),
        },
        None,
    ))
}

/// Email and funds are only visible to the account owner.
pub async fn get_private_info(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<PrivateUserInfo>> {
    if user.user_id != id {
        return Err(AppError::NotAuthorized);
    }

    let target = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(ApiResponse::success(
        "Private info",
        PrivateUserInfo {
            id: target.id,
            email: target.email,
            funds: target.funds,
        },
        None,
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    if user.user_id != id {
        return Err(AppError::NotAuthorized);
    }

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut active: UserActive = existing.into();
    if let Some(name_first) = payload.name_first {
        if name_first.trim().is_empty() {
            return Err(AppError::Validation("First name must not be empty".into()));
        }
        active.name_first = Set(name_first);
    }
    if let Some(name_last) = payload.name_last {
        active.name_last = Set(Some(name_last));
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }

    let updated = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        UserProfile {
            id: updated.id,
            name_first: updated.name_first,
            name_last: updated.name_last,
            description: updated.description,
            created_at: updated.created_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_email(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateEmailRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let email = payload.email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("Invalid email".into()));
    }

    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let taken = Users::find()
        .filter(UserCol::Email.eq(email.clone()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("Email is already taken".into()));
    }

    let mut active: UserActive = existing.into();
    active.email = Set(email);
    active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Email updated",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn update_password(
    state: &AppState,
    user: &AuthUser,
    payload: UpdatePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if payload.new_password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let parsed_hash = PasswordHash::new(&existing.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::NotAuthorized);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.new_password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let mut active: UserActive = existing.into();
    active.password_hash = Set(password_hash);
    active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Password updated",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn add_funds(
    state: &AppState,
    user: &AuthUser,
    payload: AddFundsRequest,
) -> AppResult<ApiResponse<PrivateUserInfo>> {
    if payload.amount <= 0 {
        return Err(AppError::Validation("Amount must be positive".into()));
    }

    if Users::find_by_id(user.user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    Users::update_many()
        .col_expr(UserCol::Funds, Expr::col(UserCol::Funds).add(payload.amount))
        .filter(UserCol::Id.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    let updated = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "funds_add",
        Some("users"),
        Some(serde_json::json!({ "amount": payload.amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Funds added",
        PrivateUserInfo {
            id: updated.id,
            email: updated.email,
            funds: updated.funds,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_user_products(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<UserProductList>> {
    if Users::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let items = Products::find()
        .filter(ProdCol::OwnerId.eq(id))
        .order_by_desc(ProdCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_service::product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        UserProductList { items },
        Some(Meta::empty()),
    ))
}

/// Every collection, including privated ones; owner only.
pub async fn list_all_collections(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CollectionList>> {
    if user.user_id != id {
        return Err(AppError::NotAuthorized);
    }
    if Users::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let items = WishlistCollections::find()
        .filter(CollectionCol::UserId.eq(id))
        .order_by_desc(CollectionCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(wishlist_service::collection_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Collections",
        CollectionList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_public_collections(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<CollectionList>> {
    if Users::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let items = WishlistCollections::find()
        .filter(CollectionCol::UserId.eq(id))
        .filter(CollectionCol::Privated.eq(false))
        .order_by_desc(CollectionCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(wishlist_service::collection_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Collections",
        CollectionList { items },
        Some(Meta::empty()),
    ))
}

/// Remove the user and everything that depends on it as one atomic unit.
/// Transactions stay behind as audit history.
pub async fn delete_account(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if user.user_id != id {
        return Err(AppError::NotAuthorized);
    }

    if Users::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    store::atomic(&state.orm, move |txn| {
        Box::pin(async move {
            let collection_ids: Vec<Uuid> = WishlistCollections::find()
                .filter(CollectionCol::UserId.eq(id))
                .all(txn)
                .await?
                .iter()
                .map(|collection| collection.id)
                .collect();

            Products::delete_many()
                .filter(ProdCol::OwnerId.eq(id))
                .exec(txn)
                .await?;
            Reviews::delete_many()
                .filter(ReviewCol::AuthorId.eq(id))
                .exec(txn)
                .await?;
            Reviews::delete_many()
                .filter(ReviewCol::ProductOwnerId.eq(id))
                .exec(txn)
                .await?;
            WishlistItems::delete_many()
                .filter(WishlistItemCol::UserId.eq(id))
                .exec(txn)
                .await?;
            // Items other users placed under this user's collections.
            if !collection_ids.is_empty() {
                WishlistItems::delete_many()
                    .filter(WishlistItemCol::GroupId.is_in(collection_ids))
                    .exec(txn)
                    .await?;
            }
            WishlistCollections::delete_many()
                .filter(CollectionCol::UserId.eq(id))
                .exec(txn)
                .await?;
            CartItems::delete_many()
                .filter(CartCol::UserId.eq(id))
                .exec(txn)
                .await?;
            CartItems::delete_many()
                .filter(CartCol::SellerId.eq(id))
                .exec(txn)
                .await?;
            Users::delete_by_id(id).exec(txn).await?;

            Ok(())
        })
    })
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(id),
        "account_delete",
        Some("users"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Account deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
