use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::reviews::{ReviewList, SubmitReviewRequest},
    entity::{
        products::Entity as Products,
        reviews::{ActiveModel as ReviewActive, Column, Entity as Reviews, Model as ReviewModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// The product owner on a review is derived from the product row, never
/// taken from the request.
pub async fn submit_review(
    state: &AppState,
    user: &AuthUser,
    payload: SubmitReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(0..=5).contains(&payload.score) {
        return Err(AppError::Validation("Score must be between 0 and 5".into()));
    }
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation("Review text must not be empty".into()));
    }

    if Users::find_by_id(user.user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        author_id: Set(user.user_id),
        product_id: Set(product.id),
        product_owner_id: Set(product.owner_id),
        score: Set(payload.score),
        text: Set(payload.text),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Review submitted",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

pub async fn get_review(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Review>> {
    let review = Reviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(review_from_entity)
        .ok_or_else(|| AppError::NotFound("Review not found".into()))?;
    Ok(ApiResponse::success("Review", review, None))
}

pub async fn list_product_reviews(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    if Products::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("Product not found".into()));
    }

    let items = Reviews::find()
        .filter(Column::ProductId.eq(id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_reviews_by_author(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    if Users::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let items = Reviews::find()
        .filter(Column::AuthorId.eq(id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(Meta::empty()),
    ))
}

/// Reviews received across every product the user sells.
pub async fn list_reviews_for_user_products(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    if Users::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let items = Reviews::find()
        .filter(Column::ProductOwnerId.eq(id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let review = Reviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".into()))?;

    if review.author_id != user.user_id {
        return Err(AppError::NotAuthorized);
    }

    Reviews::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Review deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        author_id: model.author_id,
        product_id: model.product_id,
        product_owner_id: model.product_owner_id,
        score: model.score,
        text: model.text,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
