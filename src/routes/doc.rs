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
        cart::{CartCount, CartDetail, CartLine},
        catalog::{
            CategoryList, CreateCategoryRequest, CreateProductRequest, ProductList,
            UpdateProductRequest,
        },
        orders::{CheckoutRequest, CheckoutView, OrderList, OrderWithItems, ShippingDetails},
        payments::{PaymentForm, PaymentMethodOption, PaymentReceipt, PaymentRequest},
        profile::{ProfileView, UpdateProfileRequest},
    },
    entity::{
        orders::OrderStatus,
        payments::{PaymentMethod, PaymentStatus},
    },
    models::{CartItem, Category, Order, OrderItem, Payment, Product, User, UserProfile},
    response::{ApiResponse, Meta},
    routes::{accounts, admin, cart, catalog, checkout, health, orders, params, payments},
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
        accounts::register,
        accounts::login,
        accounts::get_profile,
        accounts::update_profile,
        catalog::list_products,
        catalog::list_products_in_category,
        catalog::get_product,
        catalog::list_categories,
        cart::cart_detail,
        cart::cart_count,
        cart::cart_add,
        cart::cart_remove,
        cart::cart_clear,
        checkout::checkout_page,
        checkout::checkout_submit,
        payments::payment_page,
        payments::payment_submit,
        payments::payment_success,
        orders::order_list,
        orders::order_detail,
        admin::create_category,
        admin::create_product,
        admin::update_product
    ),
    components(
        schemas(
            User,
            UserProfile,
            Category,
            Product,
            CartItem,
            Order,
            OrderItem,
            Payment,
            OrderStatus,
            PaymentMethod,
            PaymentStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ProfileView,
            UpdateProfileRequest,
            CategoryList,
            ProductList,
            CreateCategoryRequest,
            CreateProductRequest,
            UpdateProductRequest,
            CartLine,
            CartDetail,
            CartCount,
            CheckoutRequest,
            CheckoutView,
            ShippingDetails,
            OrderList,
            OrderWithItems,
            PaymentRequest,
            PaymentForm,
            PaymentMethodOption,
            PaymentReceipt,
            params::Pagination,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartDetail>,
            ApiResponse<CheckoutView>,
            ApiResponse<PaymentForm>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Accounts", description = "Registration, login and shipping profile"),
        (name = "Catalog", description = "Categories and products"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Checkout", description = "Cart to order conversion"),
        (name = "Payments", description = "Simulated payment and confirmation"),
        (name = "Orders", description = "Order history"),
        (name = "Admin", description = "Catalog administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
