pub mod cart_items;
pub mod categories;
pub mod products;
pub mod reviews;
pub mod transaction_items;
pub mod transactions;
pub mod users;
pub mod wishlist_collections;
pub mod wishlist_items;

pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use transaction_items::Entity as TransactionItems;
pub use transactions::Entity as Transactions;
pub use users::Entity as Users;
pub use wishlist_collections::Entity as WishlistCollections;
pub use wishlist_items::Entity as WishlistItems;
