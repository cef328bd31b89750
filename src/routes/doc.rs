use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartList},
        categories::{CategoryList, CreateCategoryRequest},
        products::{
            CreateProductRequest, ProductList, ProductRating, UpdateProductRequest,
        },
        reviews::{ReviewList, SubmitReviewRequest},
        transactions::{CheckoutRequest, TransactionList, TransactionWithItems},
        users::{
            AddFundsRequest, CollectionList, UpdateEmailRequest, UpdatePasswordRequest,
            UpdateProfileRequest, UserProductList,
        },
        wishlists::{
            AddWishlistItemRequest, CreateCollectionRequest, UpdateCollectionRequest,
            WishlistItemList,
        },
    },
    models::{
        CartItem, Category, PrivateUserInfo, Product, Review, Transaction, TransactionItem,
        User, UserProfile, WishlistCollection, WishlistItem,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, cart, categories, health, params, products as product_routes, reviews,
        transactions, users, wishlists,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        users::get_profile,
        users::get_private_info,
        users::update_profile,
        users::update_email,
        users::update_password,
        users::add_funds,
        users::delete_account,
        users::list_user_products,
        users::list_user_transactions,
        users::list_all_collections,
        users::list_public_collections,
        product_routes::list_products,
        product_routes::create_product,
        product_routes::get_product,
        product_routes::get_product_rating,
        product_routes::list_product_reviews,
        product_routes::update_product,
        product_routes::delete_product,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        cart::cart_list,
        cart::get_cart_item,
        cart::add_to_cart,
        cart::remove_from_cart,
        transactions::checkout,
        reviews::submit_review,
        reviews::get_review,
        reviews::list_reviews_by_author,
        reviews::list_reviews_for_user_products,
        reviews::delete_review,
        wishlists::create_collection,
        wishlists::update_collection,
        wishlists::delete_collection,
        wishlists::list_collection_items,
        wishlists::list_user_items,
        wishlists::add_item,
        wishlists::remove_item
    ),
    components(
        schemas(
            User,
            UserProfile,
            PrivateUserInfo,
            Category,
            Product,
            CartItem,
            Transaction,
            TransactionItem,
            Review,
            WishlistCollection,
            WishlistItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            UpdateEmailRequest,
            UpdatePasswordRequest,
            AddFundsRequest,
            UserProductList,
            CollectionList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ProductRating,
            CreateCategoryRequest,
            CategoryList,
            AddToCartRequest,
            CartList,
            CheckoutRequest,
            TransactionWithItems,
            TransactionList,
            SubmitReviewRequest,
            ReviewList,
            CreateCollectionRequest,
            UpdateCollectionRequest,
            AddWishlistItemRequest,
            WishlistItemList,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<TransactionWithItems>,
            ApiResponse<TransactionList>,
            ApiResponse<CartList>,
            ApiResponse<WishlistItemList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "Account and profile endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Transactions", description = "Checkout endpoints"),
        (name = "Reviews", description = "Review endpoints"),
        (name = "Wishlists", description = "Wishlist endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
