//! Fixtures shared by the unit tests: cart 1 with products 1 and 2, plus a
//! local axum server that plays the upstream catalog.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};

use crate::domain::{Cart, CartProduct, Product, Rating};

pub const CART_JSON: &str = r#"{
    "id": 1,
    "userId": 1,
    "date": "2020-03-02T00:00:00.000Z",
    "products": [
        { "productId": 1, "quantity": 4 },
        { "productId": 2, "quantity": 1 }
    ],
    "__v": 0
}"#;

pub const PRODUCT_1_JSON: &str = r#"{
    "id": 1,
    "title": "Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops",
    "price": 109.95,
    "description": "Your perfect pack for everyday use and walks in the forest. Stash your laptop (up to 15 inches) in the padded sleeve, your everyday",
    "category": "men's clothing",
    "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
    "rating": { "rate": 3.9, "count": 120 }
}"#;

pub const PRODUCT_2_JSON: &str = r#"{
    "id": 2,
    "title": "Mens Casual Premium Slim Fit T-Shirts ",
    "price": 22.3,
    "description": "Slim-fitting style, contrast raglan long sleeve, three-button henley placket, light weight & soft fabric for breathable and comfortable wearing.",
    "category": "men's clothing",
    "image": "https://fakestoreapi.com/img/71-3HjGNDUL._AC_SY879._SX._UX._SY._UY_.jpg",
    "rating": { "rate": 4.1, "count": 259 }
}"#;

pub fn cart_fixture() -> Cart {
    Cart {
        id: 1,
        user_id: 1,
        date: String::from("2020-03-02T00:00:00.000Z"),
        products: vec![
            CartProduct {
                product_id: 1,
                quantity: 4,
            },
            CartProduct {
                product_id: 2,
                quantity: 1,
            },
        ],
    }
}

pub fn product_1_fixture() -> Product {
    Product {
        id: 1,
        price: 109.95,
        title: String::from("Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops"),
        description: String::from("Your perfect pack for everyday use and walks in the forest. Stash your laptop (up to 15 inches) in the padded sleeve, your everyday"),
        category: String::from("men's clothing"),
        image: String::from("https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg"),
        rating: Rating {
            rate: 3.9,
            count: 120,
        },
    }
}

pub fn product_2_fixture() -> Product {
    Product {
        id: 2,
        price: 22.3,
        title: String::from("Mens Casual Premium Slim Fit T-Shirts "),
        description: String::from("Slim-fitting style, contrast raglan long sleeve, three-button henley placket, light weight & soft fabric for breathable and comfortable wearing."),
        category: String::from("men's clothing"),
        image: String::from("https://fakestoreapi.com/img/71-3HjGNDUL._AC_SY879._SX._UX._SY._UY_.jpg"),
        rating: Rating {
            rate: 4.1,
            count: 259,
        },
    }
}

/// Cart 1 and products 1, 2 as served by the real catalog.
pub fn fixture_catalog() -> crate::repositories::InMemoryCatalogRepository {
    crate::repositories::InMemoryCatalogRepository::new()
        .with_cart(cart_fixture())
        .with_product(product_1_fixture())
        .with_product(product_2_fixture())
}

#[derive(Clone)]
struct CatalogServerState {
    failing_products: Arc<Vec<u32>>,
}

async fn get_cart(Path(id): Path<u32>) -> (StatusCode, String) {
    match id {
        1 => (StatusCode::OK, String::from(CART_JSON)),
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn get_product(
    Path(id): Path<u32>,
    State(state): State<CatalogServerState>,
) -> (StatusCode, String) {
    if state.failing_products.contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, String::from("upstream exploded"));
    }

    match id {
        1 => (StatusCode::OK, String::from(PRODUCT_1_JSON)),
        2 => (StatusCode::OK, String::from(PRODUCT_2_JSON)),
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn get_malformed() -> (StatusCode, &'static str) {
    (StatusCode::OK, r#"{ "id": "not a number" }"#)
}

/// Starts the fixture catalog on an ephemeral port and returns its base url.
/// Products listed in `failing_products` answer 500.
pub async fn spawn_catalog_server(failing_products: &[u32]) -> String {
    let state = CatalogServerState {
        failing_products: Arc::new(failing_products.to_vec()),
    };

    let app = Router::new()
        .route("/carts/{id}", get(get_cart))
        .route("/products/{id}", get(get_product))
        .route("/malformed", get(get_malformed))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture catalog");
    let addr = listener.local_addr().expect("fixture catalog address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fixture catalog server");
    });

    format!("http://{}", addr)
}
