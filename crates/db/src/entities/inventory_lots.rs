//! `SeaORM` Entity for inventory_lots table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::inventory::LotBalance;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_lots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub purchase_reference: String,
    pub quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub purchased_on: Date,
    pub is_sold: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Unsold quantity as seen by FIFO costing.
    #[must_use]
    pub fn balance(&self) -> LotBalance {
        LotBalance {
            lot_id: self.id.into(),
            remaining: self.remaining_quantity,
            unit_cost: self.unit_cost,
        }
    }
}
