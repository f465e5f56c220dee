//! `SeaORM` Entity for fiscal_year_organizations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_year_organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub fiscal_year: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub organization: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fiscal_years::Entity",
        from = "Column::FiscalYear",
        to = "super::fiscal_years::Column::Name",
        on_delete = "Cascade"
    )]
    FiscalYears,
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::Organization",
        to = "super::organizations::Column::Name",
        on_delete = "Cascade"
    )]
    Organizations,
}

impl Related<super::fiscal_years::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalYears.def()
    }
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
