use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartList},
    entity::{
        cart_items::{
            ActiveModel as CartItemActive, Column as CartCol, Entity as CartItems,
            Model as CartItemModel,
        },
        products::Entity as Products,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    if Users::find_by_id(user.user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let items = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_desc(CartCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(cart_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Cart",
        CartList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CartItem>> {
    let item = CartItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".into()))?;

    if item.user_id != user.user_id {
        return Err(AppError::NotAuthorized);
    }

    Ok(ApiResponse::success(
        "Cart item",
        cart_item_from_entity(item),
        None,
    ))
}

/// Add a product to the cart, snapshotting the seller and the (possibly
/// discounted) unit price at add time.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::Validation(
            "Quantity must be greater than 0".into(),
        ));
    }

    if Users::find_by_id(user.user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    if product.quantity == 0 {
        return Err(AppError::Conflict("Product is out of stock".into()));
    }
    if product.owner_id == user.user_id {
        return Err(AppError::Conflict("Cannot buy your own product".into()));
    }

    let existing = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::ProductId.eq(product.id))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Product is already in the cart".into()));
    }

    let price = if product.on_sale {
        discounted_price(product.price, product.discount)
    } else {
        product.price
    };

    let item = CartItemActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        seller_id: Set(product.owner_id),
        product_id: Set(product.id),
        price: Set(price),
        quantity: Set(payload.quantity),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({
            "product_id": product.id,
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to cart",
        cart_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let item = CartItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".into()))?;

    if item.user_id != user.user_id {
        return Err(AppError::NotAuthorized);
    }

    CartItems::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "cart_item_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Discounted unit price in integer cents, truncating toward zero.
pub fn discounted_price(price: i64, percent: i32) -> i64 {
    let percent = i64::from(percent.clamp(0, 100));
    price - price * percent / 100
}

fn cart_item_from_entity(model: CartItemModel) -> CartItem {
    CartItem {
        id: model.id,
        user_id: model.user_id,
        seller_id: model.seller_id,
        product_id: model.product_id,
        price: model.price,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_is_exact_integer_arithmetic() {
        assert_eq!(discounted_price(10_000, 25), 7_500);
        assert_eq!(discounted_price(10_000, 0), 10_000);
        assert_eq!(discounted_price(10_000, 100), 0);
    }

    #[test]
    fn discount_truncates_fractional_cents() {
        // 10% of 999 cents is 99.9; the buyer pays 900, not 899.1 rounded.
        assert_eq!(discounted_price(999, 10), 900);
        assert_eq!(discounted_price(1, 50), 1);
    }

    #[test]
    fn discount_clamps_out_of_range_percentages() {
        assert_eq!(discounted_price(10_000, -5), 10_000);
        assert_eq!(discounted_price(10_000, 150), 0);
    }
}
