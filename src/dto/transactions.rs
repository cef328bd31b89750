use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Transaction, TransactionItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionWithItems {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TransactionList {
    #[schema(value_type = Vec<TransactionWithItems>)]
    pub items: Vec<TransactionWithItems>,
}
