//! Static product catalog served by every replica.

use serde::Serialize;

use crate::error::{Result, TechStoreError};

/// Currency of every catalog price.
pub const CURRENCY: &str = "USD";

/// A catalog entry. Prices are whole US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub price: u32,
}

const PRODUCTS: [Product; 8] = [
    Product {
        id: 1,
        name: "iPhone 15 Pro",
        description: "Latest smartphone with titanium design and A17 Pro chip",
        price: 999,
    },
    Product {
        id: 2,
        name: "MacBook Air M3",
        description: "13-inch laptop with M3 chip, 16GB RAM, 512GB SSD",
        price: 1499,
    },
    Product {
        id: 3,
        name: "AirPods Pro",
        description: "Wireless earbuds with active noise cancellation",
        price: 249,
    },
    Product {
        id: 4,
        name: "Nike Air Max 270",
        description: "Comfortable running shoes with Air Max technology",
        price: 150,
    },
    Product {
        id: 5,
        name: "Samsung 55\" QLED TV",
        description: "4K Smart TV with Quantum Dot technology",
        price: 899,
    },
    Product {
        id: 6,
        name: "PlayStation 5",
        description: "Latest gaming console with 825GB SSD",
        price: 499,
    },
    Product {
        id: 7,
        name: "Coffee Machine Deluxe",
        description: "Professional espresso machine with milk frother",
        price: 299,
    },
    Product {
        id: 8,
        name: "Wireless Gaming Mouse",
        description: "High-precision mouse with RGB lighting",
        price: 79,
    },
];

/// All products, ordered by id.
pub fn products() -> &'static [Product] {
    &PRODUCTS
}

/// Look up a product by id.
pub fn product(id: u32) -> Result<&'static Product> {
    PRODUCTS
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| TechStoreError::NotFound(format!("product {id}")))
}
