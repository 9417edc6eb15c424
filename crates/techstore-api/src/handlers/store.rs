use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use techstore_core::catalog::{self, Product, CURRENCY};
use techstore_core::{InstanceIdentity, TechStoreError};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::obs::PRODUCTS_SERVED;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub message: &'static str,
    pub team: String,
    #[serde(flatten)]
    pub identity: InstanceIdentity,
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: &'static [Product],
    pub metadata: ProductListMeta,
}

#[derive(Debug, Serialize)]
pub struct ProductListMeta {
    pub total: usize,
    pub currency: &'static str,
    #[serde(flatten)]
    pub identity: InstanceIdentity,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProductItem {
    pub product: &'static Product,
    #[serde(flatten)]
    pub identity: InstanceIdentity,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: String,
    pub team: String,
    #[serde(flatten)]
    pub identity: InstanceIdentity,
}

pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    let server = &state.cfg().server;
    Json(ServiceInfo {
        service: server.display_name.clone(),
        message: "E-commerce Backend Service",
        team: server.team.clone(),
        identity: state.identity().resolve(),
    })
}

pub async fn products(State(state): State<AppState>) -> Json<ProductList> {
    state
        .metrics()
        .increment_with(PRODUCTS_SERVED, &[("endpoint", "list")]);

    let identity = state.identity().resolve();
    let products = catalog::products();
    Json(ProductList {
        products,
        metadata: ProductListMeta {
            total: products.len(),
            currency: CURRENCY,
            message: format!("Products served by pod: {}", identity.host_label),
            identity,
        },
    })
}

pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductItem>, ApiError> {
    let identity = state.identity().resolve();
    let found = id
        .parse::<u32>()
        .map_err(|_| TechStoreError::BadRequest(format!("product id must be a number: {id}")))
        .and_then(catalog::product);

    match found {
        Ok(product) => {
            state
                .metrics()
                .increment_with(PRODUCTS_SERVED, &[("endpoint", "item")]);
            Ok(Json(ProductItem { product, identity }))
        }
        Err(e) => Err(ApiError::new(e, identity)),
    }
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let server = &state.cfg().server;
    Json(Health {
        status: "healthy",
        service: server.service.clone(),
        team: server.team.clone(),
        identity: state.identity().resolve(),
    })
}
