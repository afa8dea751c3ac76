use torque_api::InventoryCatalog;
use torque_core::forms::InventoryItemForm;
use torque_core::table::InventoryRow;
use torque_core::types::InventoryItem;

use super::{print_json, show_table, Context};
use crate::error::PortalResult;
use crate::render::render_pairs;
use crate::{InventoryAction, ItemArgs, ListArgs};

pub async fn run(ctx: &Context, action: InventoryAction) -> PortalResult<()> {
    let catalog = InventoryCatalog::new(ctx.transport());
    match action {
        InventoryAction::List(args) => {
            show_table(ctx, &args, catalog.list(), |item| InventoryRow::from(item)).await
        }
        InventoryAction::LowStock => {
            show_table(ctx, &ListArgs::default(), catalog.low_stock(), |item| InventoryRow::from(item)).await
        }
        InventoryAction::Show { item_id } => show(ctx, &catalog.get(&item_id).await?),
        InventoryAction::Add(fields) => {
            let item = catalog.create(&item_form(fields)).await?;
            println!("Item {} created", item.item_id);
            show(ctx, &item)
        }
        InventoryAction::Edit { item_id, fields } => {
            let item = catalog.update(&item_id, &item_form(fields)).await?;
            println!("Item {} updated", item.item_id);
            show(ctx, &item)
        }
    }
}

fn item_form(fields: ItemArgs) -> InventoryItemForm {
    InventoryItemForm {
        name: fields.name,
        category: fields.category,
        current_stock: fields.stock,
        unit_price: fields.unit_price,
        reorder_level: fields.reorder_level,
    }
}

fn show(ctx: &Context, item: &InventoryItem) -> PortalResult<()> {
    if ctx.json {
        return print_json(item);
    }
    let row = InventoryRow::from(item);
    let pairs = [
        ("Id", row.item_id),
        ("Name", row.name),
        ("Category", row.category),
        ("Stock", row.stock),
        ("Reorder level", item.reorder_level.to_string()),
        ("Unit price", row.unit_price),
        ("Status", row.stock_status),
    ];
    println!("{}", render_pairs("Inventory item", &pairs));
    Ok(())
}
