//! Initial schema: organizations, fiscal years and the two nested-set trees.
//!
//! Documents are keyed by name. Accounts and cost centers carry `lft`/`rgt`
//! bounds that the repositories rebuild after every insert.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(FISCAL_YEARS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(COST_CENTERS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS cost_centers CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS fiscal_year_organizations CASCADE;
DROP TABLE IF EXISTS fiscal_years CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;
",
        )
        .await?;
        Ok(())
    }
}

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    name VARCHAR(140) PRIMARY KEY,
    abbr VARCHAR(20) NOT NULL,
    default_currency CHAR(3) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_organizations_abbr UNIQUE (abbr)
);
";

const FISCAL_YEARS_SQL: &str = r"
CREATE TABLE fiscal_years (
    name VARCHAR(140) PRIMARY KEY,
    year_start_date DATE NOT NULL,
    year_end_date DATE NOT NULL,
    disabled BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_fiscal_year_dates CHECK (year_start_date < year_end_date)
);

-- Resolution scans by start date, latest first
CREATE INDEX idx_fiscal_years_start ON fiscal_years(year_start_date DESC) WHERE NOT disabled;

-- Empty restriction list means the year applies to every organization
CREATE TABLE fiscal_year_organizations (
    fiscal_year VARCHAR(140) NOT NULL REFERENCES fiscal_years(name) ON DELETE CASCADE,
    organization VARCHAR(140) NOT NULL REFERENCES organizations(name) ON DELETE CASCADE,
    PRIMARY KEY (fiscal_year, organization)
);

CREATE INDEX idx_fiscal_year_organizations_org ON fiscal_year_organizations(organization);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    name VARCHAR(255) PRIMARY KEY,
    account_name VARCHAR(255) NOT NULL,
    account_number VARCHAR(40),
    parent_account VARCHAR(255) REFERENCES accounts(name),
    is_group BOOLEAN NOT NULL DEFAULT FALSE,
    root_type VARCHAR(20),
    report_type VARCHAR(20),
    account_currency CHAR(3),
    organization VARCHAR(140) NOT NULL REFERENCES organizations(name) ON DELETE CASCADE,
    lft INTEGER NOT NULL DEFAULT 0,
    rgt INTEGER NOT NULL DEFAULT 0,
    freeze_account BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_accounts_root_type CHECK (
        root_type IS NULL OR root_type IN ('Asset', 'Liability', 'Equity', 'Income', 'Expense')
    ),
    CONSTRAINT chk_accounts_report_type CHECK (
        report_type IS NULL OR report_type IN ('Balance Sheet', 'Profit and Loss')
    )
);

-- Account numbers are unique per organization
CREATE UNIQUE INDEX uq_accounts_number ON accounts(organization, account_number)
    WHERE account_number IS NOT NULL;

-- Tree widget lists children by parent
CREATE INDEX idx_accounts_parent ON accounts(organization, parent_account);

-- Subtree lookups
CREATE INDEX idx_accounts_bounds ON accounts(lft, rgt);
";

const COST_CENTERS_SQL: &str = r"
CREATE TABLE cost_centers (
    name VARCHAR(255) PRIMARY KEY,
    cost_center_name VARCHAR(255) NOT NULL,
    parent_cost_center VARCHAR(255) REFERENCES cost_centers(name),
    is_group BOOLEAN NOT NULL DEFAULT FALSE,
    organization VARCHAR(140) NOT NULL REFERENCES organizations(name) ON DELETE CASCADE,
    lft INTEGER NOT NULL DEFAULT 0,
    rgt INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_cost_centers_parent ON cost_centers(organization, parent_cost_center);
CREATE INDEX idx_cost_centers_bounds ON cost_centers(lft, rgt);
";
