use axum_marketplace_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{cart::AddToCartRequest, transactions::CheckoutRequest},
    entity::{
        CartItems, TransactionItems, Transactions, Users,
        categories::ActiveModel as CategoryActive, products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{cart_service, transaction_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, Statement,
};
use uuid::Uuid;

// Two checkouts of the same cart race each other; exactly one may win. The
// loser's delete of the already-consumed cart lines comes up short inside
// its transaction, so it aborts instead of charging the buyer twice.
#[tokio::test]
async fn concurrent_checkouts_charge_the_cart_once() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let seller_id = create_user(&state, "Seller", "seller@example.com", 500).await?;
    let buyer_id = create_user(&state, "Buyer", "buyer@example.com", 10_000).await?;
    let category_id = create_category(&state, "Gadgets").await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(seller_id),
        category_id: Set(category_id),
        name: Set("Contested Widget".into()),
        description: Set(None),
        brand: Set(None),
        price: Set(1_000),
        quantity: Set(10),
        sales: Set(0),
        on_sale: Set(false),
        discount: Set(0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let buyer = AuthUser { user_id: buyer_id };

    cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await?;

    // Funds and stock cover both attempts on their own, so the cart-line
    // consumption check is the only thing standing between the loser and a
    // double charge.
    let (first, second) = tokio::join!(
        transaction_service::checkout(
            &state,
            &buyer,
            CheckoutRequest {
                payment_method: "pix".into(),
            },
        ),
        transaction_service::checkout(
            &state,
            &buyer,
            CheckoutRequest {
                payment_method: "pix".into(),
            },
        ),
    );

    let outcomes = [first, second];
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one checkout may consume the cart");
    let loss = outcomes
        .into_iter()
        .find_map(|r| r.err())
        .ok_or_else(|| anyhow::anyhow!("one checkout should have lost"))?;
    assert!(matches!(loss, AppError::Conflict(_)));

    // The cart was charged once: one debit, one credit, one transaction.
    assert_eq!(funds_of(&state, buyer_id).await?, 8_000);
    assert_eq!(funds_of(&state, seller_id).await?, 2_500);
    assert_eq!(Transactions::find().all(&state.orm).await?.len(), 1);
    assert_eq!(TransactionItems::find().all(&state.orm).await?.len(), 1);

    let product_after = axum_marketplace_api::entity::Products::find_by_id(product.id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product missing"))?;
    assert_eq!(product_after.quantity, 8);
    assert_eq!(product_after.sales, 2);

    let remaining = CartItems::find()
        .filter(axum_marketplace_api::entity::cart_items::Column::UserId.eq(buyer_id))
        .all(&state.orm)
        .await?;
    assert!(remaining.is_empty());

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE wishlist_items, wishlist_collections, reviews, transaction_items, transactions, cart_items, audit_logs, products, categories, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_user(
    state: &AppState,
    name: &str,
    email: &str,
    funds: i64,
) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name_first: Set(name.to_string()),
        name_last: Set(None),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        description: Set(None),
        funds: Set(funds),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_category(state: &AppState, name: &str) -> anyhow::Result<Uuid> {
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(category.id)
}

async fn funds_of(state: &AppState, id: Uuid) -> anyhow::Result<i64> {
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user missing"))?;
    Ok(user.funds)
}
