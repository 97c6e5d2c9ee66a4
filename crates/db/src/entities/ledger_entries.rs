//! `SeaORM` Entity for ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EntryType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub voucher_number: String,
    pub account_code: String,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub memo: Option<String>,
    pub reference_table: String,
    pub reference_id: Option<String>,
    pub voucher_date: Date,
    pub fiscal_period_id: Option<Uuid>,
    pub is_closed: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vouchers::Entity",
        from = "Column::VoucherNumber",
        to = "super::vouchers::Column::VoucherNumber"
    )]
    Vouchers,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountCode",
        to = "super::accounts::Column::Code"
    )]
    Accounts,
}

impl Related<super::vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vouchers.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The entry as a posting line.
    #[must_use]
    pub fn to_line(&self) -> tally_core::ledger::PostingLine {
        tally_core::ledger::PostingLine {
            account_code: self.account_code.clone(),
            entry_type: self.entry_type.into(),
            amount: self.amount,
            memo: self.memo.clone(),
        }
    }
}
