use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Payment methods accepted at checkout. Anything else is rejected before a
/// single write happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    BankSlip,
    CreditCard,
    Bitcoin,
    Pix,
}

impl PaymentMethod {
    /// Case-insensitive parse of the wire value ("Pix", "credit-card", ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bank-slip" => Some(Self::BankSlip),
            "credit-card" => Some(Self::CreditCard),
            "bitcoin" => Some(Self::Bitcoin),
            "pix" => Some(Self::Pix),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankSlip => "bank-slip",
            Self::CreditCard => "credit-card",
            Self::Bitcoin => "bitcoin",
            Self::Pix => "pix",
        }
    }
}

/// Full user row; only ever used internally and by the auth service.
#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name_first: String,
    pub name_last: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub description: Option<String>,
    /// Balance in integer cents.
    pub funds: i64,
    pub created_at: DateTime<Utc>,
}

/// Public profile: never exposes email, funds, or the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub name_first: String,
    pub name_last: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Owner-only view of the sensitive fields.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PrivateUserInfo {
    pub id: Uuid,
    pub email: String,
    pub funds: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    /// Unit price in integer cents.
    pub price: i64,
    /// Available stock.
    pub quantity: i32,
    /// Cumulative units sold.
    pub sales: i32,
    pub on_sale: bool,
    /// Discount percentage, 0-100, applied only while `on_sale` is set.
    pub discount: i32,
    pub created_at: DateTime<Utc>,
}

/// A pending purchase line. Seller and price are snapshots taken when the
/// item was added, so later product edits do not change what the buyer pays.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub seller_id: Uuid,
    pub product_id: Uuid,
    pub price: i64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub payment_method: String,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time record of a consumed cart item; keeps the cart item's id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionItem {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub price: i64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub author_id: Uuid,
    pub product_id: Uuid,
    pub product_owner_id: Uuid,
    pub score: i16,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WishlistCollection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub privated: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WishlistItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_parses_known_values() {
        assert_eq!(PaymentMethod::parse("pix"), Some(PaymentMethod::Pix));
        assert_eq!(PaymentMethod::parse("Pix"), Some(PaymentMethod::Pix));
        assert_eq!(
            PaymentMethod::parse("credit-card"),
            Some(PaymentMethod::CreditCard)
        );
        assert_eq!(
            PaymentMethod::parse("BANK-SLIP"),
            Some(PaymentMethod::BankSlip)
        );
        assert_eq!(PaymentMethod::parse("bitcoin"), Some(PaymentMethod::Bitcoin));
    }

    #[test]
    fn payment_method_rejects_unknown_values() {
        assert_eq!(PaymentMethod::parse("crypto-unknown"), None);
        assert_eq!(PaymentMethod::parse(""), None);
        assert_eq!(PaymentMethod::parse("  "), None);
        assert_eq!(PaymentMethod::parse("cash"), None);
    }

    #[test]
    fn payment_method_round_trips_as_str() {
        for method in [
            PaymentMethod::BankSlip,
            PaymentMethod::CreditCard,
            PaymentMethod::Bitcoin,
            PaymentMethod::Pix,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
    }
}
