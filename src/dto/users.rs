use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, WishlistCollection};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name_first: Option<String>,
    pub name_last: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePasswordRequest {
    pub password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddFundsRequest {
    /// Amount in integer cents.
    pub amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CollectionList {
    #[schema(value_type = Vec<WishlistCollection>)]
    pub items: Vec<WishlistCollection>,
}
