//! `SeaORM` Entity for gl_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "gl_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account: String,
    pub posting_date: Date,
    #[sea_orm(column_type = "Decimal(Some((21, 9)))")]
    pub debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((21, 9)))")]
    pub credit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((21, 9)))")]
    pub debit_in_account_currency: Decimal,
    #[sea_orm(column_type = "Decimal(Some((21, 9)))")]
    pub credit_in_account_currency: Decimal,
    pub party_type: Option<String>,
    pub party: Option<String>,
    pub cost_center: Option<String>,
    pub voucher_type: String,
    pub voucher_no: String,
    pub against_voucher_type: Option<String>,
    pub against_voucher: Option<String>,
    pub organization: String,
    pub is_cancelled: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::Account",
        to = "super::accounts::Column::Name"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::cost_centers::Entity",
        from = "Column::CostCenter",
        to = "super::cost_centers::Column::Name"
    )]
    CostCenters,
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::Organization",
        to = "super::organizations::Column::Name",
        on_delete = "Cascade"
    )]
    Organizations,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::cost_centers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CostCenters.def()
    }
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
