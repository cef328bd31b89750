use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::transactions::{CheckoutRequest, TransactionWithItems},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::transaction_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/checkout", post(checkout))
}

#[utoipa::path(
    post,
    path = "/api/transactions/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Cart converted into a transaction", body = ApiResponse<TransactionWithItems>),
        (status = 400, description = "Invalid payment method"),
        (status = 409, description = "Empty cart, insufficient funds, or insufficient stock")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<TransactionWithItems>>> {
    let resp = transaction_service::checkout(&state, &user, payload).await?;
    Ok(Json(resp))
}
