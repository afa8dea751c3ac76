//! Inventory catalog (`/admin/inventory/api/items`).

use reqwest::Method;
use torque_core::forms::InventoryItemForm;
use torque_core::normalizer::{normalize_inventory_item, normalize_inventory_list};
use torque_core::types::{InventoryItem, StockStatus};
use tracing::{info, warn};

use crate::decode::{report_rejected, unwrap_data};
use crate::endpoints::{self, INVENTORY_ITEMS};
use crate::error::ClientResult;
use crate::http::ApiTransport;

pub struct InventoryCatalog<'a> {
    transport: &'a dyn ApiTransport,
}

impl<'a> InventoryCatalog<'a> {
    pub fn new(transport: &'a dyn ApiTransport) -> Self {
        InventoryCatalog { transport }
    }

    pub async fn list(&self) -> ClientResult<Vec<InventoryItem>> {
        let raw = self.transport.get_json(INVENTORY_ITEMS).await?;
        let items = report_rejected(normalize_inventory_list(&raw)?, "inventory items");

        let low = items.iter().filter(|i| i.stock_status() == StockStatus::Low).count();
        if low > 0 {
            warn!(low_stock = low, "Inventory items at or below reorder level");
        }
        info!(count = items.len(), "Inventory loaded");
        Ok(items)
    }

    pub async fn get(&self, item_id: &str) -> ClientResult<InventoryItem> {
        let raw = self
            .transport
            .get_json(&endpoints::entity(INVENTORY_ITEMS, item_id))
            .await?;
        Ok(normalize_inventory_item(unwrap_data(&raw))?)
    }

    /// Items that need reordering, lowest stock first.
    pub async fn low_stock(&self) -> ClientResult<Vec<InventoryItem>> {
        let mut items: Vec<InventoryItem> = self
            .list()
            .await?
            .into_iter()
            .filter(|item| item.stock_status() == StockStatus::Low)
            .collect();
        items.sort_by_key(|item| item.current_stock);
        Ok(items)
    }

    pub async fn create(&self, form: &InventoryItemForm) -> ClientResult<InventoryItem> {
        let form = form.validate()?;
        let body = serde_json::to_value(&form)?;
        let raw = self.transport.send_json(Method::POST, INVENTORY_ITEMS, &body).await?;

        let item = normalize_inventory_item(unwrap_data(&raw))?;
        info!(item_id = %item.item_id, name = %item.name, "Inventory item created");
        Ok(item)
    }

    /// Updates an item; an answer without the item is rebuilt from the form.
    pub async fn update(&self, item_id: &str, form: &InventoryItemForm) -> ClientResult<InventoryItem> {
        let form = form.validate()?;
        let body = serde_json::to_value(&form)?;
        let raw = self
            .transport
            .send_json(Method::PUT, &endpoints::entity(INVENTORY_ITEMS, item_id), &body)
            .await?;

        info!(%item_id, "Inventory item updated");
        Ok(normalize_inventory_item(unwrap_data(&raw)).unwrap_or_else(|_| InventoryItem {
            item_id: item_id.to_string(),
            name: form.name.clone(),
            category: form.category.clone(),
            current_stock: form.current_stock,
            unit_price: form.unit_price,
            reorder_level: form.reorder_level,
        }))
    }
}
