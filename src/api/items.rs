//! Item shop endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Serialize;

use super::{require_profile, success, ApiJson, ApiResult};
use crate::auth::AuthUser;
use crate::economy::{find_item_product, granted_items, ItemProduct, AVAILABLE_ITEMS, ITEM_PRODUCTS};
use crate::errors::AppError;
use crate::models::{ItemType, PurchaseRequest};
use crate::AppState;

/// Response of `GET /items`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCatalogResponse {
    pub item_products: &'static [ItemProduct],
    pub available_items: BTreeMap<ItemType, u32>,
}

/// Response of `POST /items/purchase`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPurchaseResponse {
    pub coins: i64,
    pub added_items: BTreeMap<ItemType, u32>,
}

/// Response of `DELETE /items/remove/{type}`.
#[derive(Debug, Serialize)]
pub struct RemoveItemResponse {
    pub success: bool,
}

/// GET /items - The shop catalog.
pub async fn list_items() -> ApiResult<ItemCatalogResponse> {
    success(ItemCatalogResponse {
        item_products: ITEM_PRODUCTS,
        available_items: AVAILABLE_ITEMS.iter().copied().collect(),
    })
}

/// POST /items/purchase - Buy an item bundle.
pub async fn purchase_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> ApiResult<ItemPurchaseResponse> {
    let product = find_item_product(&request.product_id)
        .ok_or_else(|| AppError::NotFound(format!("No item found: {}", request.product_id)))?;
    let profile = require_profile(&state, &auth.user).await?;

    let coins = state.repo.purchase_item(&profile.id, product).await?;

    tracing::info!(
        user_id = %auth.user.id,
        product_id = product.id,
        item_type = product.item_type.as_str(),
        amount = product.amount,
        cost = product.cost,
        coins,
        "Items purchased"
    );

    success(ItemPurchaseResponse {
        coins,
        added_items: granted_items(product),
    })
}

/// DELETE /items/remove/{type} - Use up one item of a type.
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(item_type): Path<String>,
) -> ApiResult<RemoveItemResponse> {
    let profile = require_profile(&state, &auth.user).await?;
    state.repo.remove_item(&profile.id, &item_type).await?;

    tracing::info!(user_id = %auth.user.id, item_type = %item_type, "Item removed");
    success(RemoveItemResponse { success: true })
}
