//! `SeaORM` Entity for fiscal_years table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_years")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub year_start_date: Date,
    pub year_end_date: Date,
    pub disabled: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fiscal_year_organizations::Entity")]
    FiscalYearOrganizations,
}

impl Related<super::fiscal_year_organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalYearOrganizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
