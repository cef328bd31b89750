pub mod auth;
pub mod cart;
pub mod categories;
pub mod products;
pub mod reviews;
pub mod transactions;
pub mod users;
pub mod wishlists;
