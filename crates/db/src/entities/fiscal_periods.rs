//! `SeaORM` Entity for fiscal_periods table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::fiscal::PeriodState;
use tally_core::ledger::PostingPeriod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub is_locked: bool,
    pub is_closed: bool,
    pub locked_by: Option<Uuid>,
    pub locked_at: Option<DateTimeWithTimeZone>,
    pub closed_by: Option<Uuid>,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub net_income: Option<Decimal>,
    pub closing_voucher_number: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vouchers::Entity")]
    Vouchers,
    #[sea_orm(has_many = "super::depreciation_records::Entity")]
    DepreciationRecords,
}

impl Related<super::vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vouchers.def()
    }
}

impl Related<super::depreciation_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DepreciationRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Lifecycle state derived from the lock and close flags.
    #[must_use]
    pub const fn state(&self) -> PeriodState {
        PeriodState::from_flags(self.is_locked, self.is_closed)
    }

    /// The period as seen by the posting check.
    #[must_use]
    pub fn posting_period(&self) -> PostingPeriod {
        PostingPeriod {
            id: self.id.into(),
            start_date: self.start_date,
            end_date: self.end_date,
            state: self.state(),
        }
    }
}
