use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::transactions::{CheckoutRequest, TransactionList, TransactionWithItems},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems, Model as CartItemModel},
        products::{Column as ProdCol, Entity as Products},
        transaction_items::{
            ActiveModel as TransactionItemActive, Column as TransactionItemCol,
            Entity as TransactionItems, Model as TransactionItemModel,
        },
        transactions::{
            ActiveModel as TransactionActive, Column as TransactionCol, Entity as Transactions,
            Model as TransactionModel,
        },
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{PaymentMethod, Transaction, TransactionItem},
    response::{ApiResponse, Meta},
    state::AppState,
    store,
};

/// Convert the buyer's cart into a committed transaction.
///
/// The cart is read inside the atomic unit, funds and stock only move inside
/// it, and every money- or stock-moving statement re-checks its own
/// precondition, so a concurrent checkout or cart edit that loses the race
/// fails cleanly with the cart intact.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<TransactionWithItems>> {
    if Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("User not found".into()));
    }

    let method = PaymentMethod::parse(&payload.payment_method)
        .ok_or_else(|| AppError::Validation("Invalid payment method".into()))?;

    let buyer_id = user.user_id;
    let (transaction, recorded) = store::atomic(&state.orm, move |txn| {
        Box::pin(async move {
            let items = CartItems::find()
                .filter(CartCol::UserId.eq(buyer_id))
                .all(txn)
                .await?;
            if items.is_empty() {
                return Err(AppError::Conflict("No items in the shopping cart".into()));
            }

            // Snapshot prices from the cart lines, not the live products.
            let total = cart_total(&items);

            let transaction = TransactionActive {
                id: Set(Uuid::new_v4()),
                buyer_id: Set(buyer_id),
                payment_method: Set(method.as_str().to_string()),
                total_price: Set(total),
                created_at: NotSet,
            }
            .insert(txn)
            .await?;

            // The conditional update is the source of truth for the
            // buyer's balance.
            let debited = Users::update_many()
                .col_expr(UserCol::Funds, Expr::col(UserCol::Funds).sub(total))
                .filter(UserCol::Id.eq(buyer_id))
                .filter(UserCol::Funds.gte(total))
                .exec(txn)
                .await?;
            if debited.rows_affected == 0 {
                return Err(AppError::Conflict("Insufficient funds".into()));
            }

            let mut recorded: Vec<TransactionItemModel> = Vec::with_capacity(items.len());
            for item in &items {
                let line_total = item.price * i64::from(item.quantity);

                let record = TransactionItemActive {
                    id: Set(item.id),
                    transaction_id: Set(transaction.id),
                    product_id: Set(item.product_id),
                    seller_id: Set(item.seller_id),
                    price: Set(item.price),
                    quantity: Set(item.quantity),
                    created_at: NotSet,
                }
                .insert(txn)
                .await?;
                recorded.push(record);

                // The credit must land on a live seller row; funds are
                // conserved or the whole checkout aborts.
                let credited = Users::update_many()
                    .col_expr(UserCol::Funds, Expr::col(UserCol::Funds).add(line_total))
                    .filter(UserCol::Id.eq(item.seller_id))
                    .exec(txn)
                    .await?;
                if credited.rows_affected == 0 {
                    return Err(AppError::Conflict(format!(
                        "Seller {} no longer exists",
                        item.seller_id
                    )));
                }

                // Stock must not go negative.
                let stocked = Products::update_many()
                    .col_expr(
                        ProdCol::Quantity,
                        Expr::col(ProdCol::Quantity).sub(item.quantity),
                    )
                    .col_expr(ProdCol::Sales, Expr::col(ProdCol::Sales).add(item.quantity))
                    .filter(ProdCol::Id.eq(item.product_id))
                    .filter(ProdCol::Quantity.gte(item.quantity))
                    .exec(txn)
                    .await?;
                if stocked.rows_affected == 0 {
                    return Err(AppError::Conflict(format!(
                        "Insufficient stock for product {}",
                        item.product_id
                    )));
                }
            }

            // The cart lines are consumed by the purchase. A concurrent
            // checkout or removal that already took one of them makes the
            // delete come up short; first committer wins, the loser aborts.
            let consumed: Vec<Uuid> = items.iter().map(|item| item.id).collect();
            let deleted = CartItems::delete_many()
                .filter(CartCol::Id.is_in(consumed))
                .exec(txn)
                .await?;
            if deleted.rows_affected != items.len() as u64 {
                return Err(AppError::Conflict(
                    "Cart changed during checkout".into(),
                ));
            }

            Ok((transaction, recorded))
        })
    })
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("transactions"),
        Some(serde_json::json!({
            "transaction_id": transaction.id,
            "total_price": transaction.total_price,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout complete",
        TransactionWithItems {
            transaction: transaction_from_entity(transaction),
            items: recorded.into_iter().map(item_from_entity).collect(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_user_transactions(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<TransactionList>> {
    if user.user_id != id {
        return Err(AppError::NotAuthorized);
    }

    let transactions = Transactions::find()
        .filter(TransactionCol::BuyerId.eq(id))
        .order_by_desc(TransactionCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = transactions.iter().map(|t| t.id).collect();
    let mut items = if ids.is_empty() {
        Vec::new()
    } else {
        TransactionItems::find()
            .filter(TransactionItemCol::TransactionId.is_in(ids))
            .all(&state.orm)
            .await?
    };

    let mut listed = Vec::with_capacity(transactions.len());
    for transaction in transactions {
        let (own, rest): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|item| item.transaction_id == transaction.id);
        items = rest;
        listed.push(TransactionWithItems {
            transaction: transaction_from_entity(transaction),
            items: own.into_iter().map(item_from_entity).collect(),
        });
    }

    Ok(ApiResponse::success(
        "Transactions",
        TransactionList { items: listed },
        Some(Meta::empty()),
    ))
}

/// Total in integer cents over the snapshot prices.
pub fn cart_total(items: &[CartItemModel]) -> i64 {
    items
        .iter()
        .map(|item| item.price * i64::from(item.quantity))
        .sum()
}

fn transaction_from_entity(model: TransactionModel) -> Transaction {
    Transaction {
        id: model.id,
        buyer_id: model.buyer_id,
        payment_method: model.payment_method,
        total_price: model.total_price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn item_from_entity(model: TransactionItemModel) -> TransactionItem {
    TransactionItem {
        id: model.id,
        transaction_id: model.transaction_id,
        product_id: model.product_id,
        seller_id: model.seller_id,
        price: model.price,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, quantity: i32) -> CartItemModel {
        CartItemModel {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            price,
            quantity,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn cart_total_sums_snapshot_lines() {
        let items = vec![item(4000, 2), item(199, 3)];
        assert_eq!(cart_total(&items), 8000 + 597);
    }

    #[test]
    fn cart_total_of_empty_cart_is_zero() {
        assert_eq!(cart_total(&[]), 0);
    }

    #[test]
    fn cart_total_is_exact_for_large_values() {
        // 21_474_836 dollars in cents times 3 stays within i64.
        let items = vec![item(2_147_483_600, 3)];
        assert_eq!(cart_total(&items), 6_442_450_800);
    }
}
