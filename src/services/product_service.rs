use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, ProductList, ProductRating, UpdateProductRequest},
    entity::{
        categories::Entity as Categories,
        products::{ActiveModel as ProductActive, Column, Entity as Products, Model as ProductModel},
        reviews::{Column as ReviewCol, Entity as Reviews},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    if let Some(true) = query.on_sale {
        condition = condition.add(Column::OnSale.eq(true));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::Sales => Column::Sales,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity)
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(ApiResponse::success("Product", product, None))
}

/// Average review score plus the count of reviews per score value.
pub async fn get_product_rating(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<ProductRating>> {
    if Products::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("Product not found".into()));
    }

    let reviews = Reviews::find()
        .filter(ReviewCol::ProductId.eq(id))
        .all(&state.orm)
        .await?;

    let total = reviews.len() as i64;
    let mut counts = [0i64; 6];
    let mut sum = 0i64;
    for review in &reviews {
        let score = review.score.clamp(0, 5) as usize;
        counts[score] += 1;
        sum += i64::from(review.score);
    }
    let average = (total > 0).then(|| sum as f64 / total as f64);

    Ok(ApiResponse::success(
        "Rating",
        ProductRating {
            average,
            total,
            counts,
        },
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Product name must not be empty".into()));
    }
    if payload.price < 0 {
        return Err(AppError::Validation("Price must not be negative".into()));
    }
    if payload.quantity < 0 {
        return Err(AppError::Validation("Quantity must not be negative".into()));
    }
    let discount = payload.discount.unwrap_or(0);
    if !(0..=100).contains(&discount) {
        return Err(AppError::Validation(
            "Discount must be between 0 and 100".into(),
        ));
    }

    if Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Category not found".into()));
    }

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(user.user_id),
        category_id: Set(payload.category_id),
        name: Set(payload.name),
        description: Set(payload.description),
        brand: Set(payload.brand),
        price: Set(payload.price),
        quantity: Set(payload.quantity),
        sales: Set(0),
        on_sale: Set(payload.on_sale.unwrap_or(false)),
        discount: Set(discount),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    if existing.owner_id != user.user_id {
        return Err(AppError::NotAuthorized);
    }

    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::Validation("Price must not be negative".into()));
        }
    }
    if let Some(quantity) = payload.quantity {
        if quantity < 0 {
            return Err(AppError::Validation("Quantity must not be negative".into()));
        }
    }
    if let Some(discount) = payload.discount {
        if !(0..=100).contains(&discount) {
            return Err(AppError::Validation(
                "Discount must be between 0 and 100".into(),
            ));
        }
    }

    let mut active: ProductActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(brand) = payload.brand {
        active.brand = Set(Some(brand));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(on_sale) = payload.on_sale {
        active.on_sale = Set(on_sale);
    }
    if let Some(discount) = payload.discount {
        active.discount = Set(discount);
    }

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    if existing.owner_id != user.user_id {
        return Err(AppError::NotAuthorized);
    }

    Products::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        owner_id: model.owner_id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        brand: model.brand,
        price: model.price,
        quantity: model.quantity,
        sales: model.sales,
        on_sale: model.on_sale,
        discount: model.discount,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
