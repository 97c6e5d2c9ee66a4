//! `SeaORM` Entity for fixed_assets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fixed_assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub acquisition_value: Decimal,
    pub monthly_rate: Decimal,
    pub acquired_on: Date,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::depreciation_records::Entity")]
    DepreciationRecords,
}

impl Related<super::depreciation_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DepreciationRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
