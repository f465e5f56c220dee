//! General-ledger entries.
//!
//! Rows are never updated in place; cancellation flips `is_cancelled`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(GL_ENTRIES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS gl_entries CASCADE;")
            .await?;
        Ok(())
    }
}

const GL_ENTRIES_SQL: &str = r"
CREATE TABLE gl_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account VARCHAR(255) NOT NULL REFERENCES accounts(name),
    posting_date DATE NOT NULL,
    debit NUMERIC(21, 9) NOT NULL DEFAULT 0,
    credit NUMERIC(21, 9) NOT NULL DEFAULT 0,
    debit_in_account_currency NUMERIC(21, 9) NOT NULL DEFAULT 0,
    credit_in_account_currency NUMERIC(21, 9) NOT NULL DEFAULT 0,
    party_type VARCHAR(140),
    party VARCHAR(140),
    cost_center VARCHAR(255) REFERENCES cost_centers(name),
    voucher_type VARCHAR(140) NOT NULL,
    voucher_no VARCHAR(140) NOT NULL,
    against_voucher_type VARCHAR(140),
    against_voucher VARCHAR(140),
    organization VARCHAR(140) NOT NULL REFERENCES organizations(name) ON DELETE CASCADE,
    is_cancelled BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Balance queries filter by account and posting date
CREATE INDEX idx_gl_entries_account_date ON gl_entries(account, posting_date)
    WHERE NOT is_cancelled;

-- Party balances
CREATE INDEX idx_gl_entries_party ON gl_entries(party_type, party)
    WHERE NOT is_cancelled;

-- Settlement lookups by referenced voucher
CREATE INDEX idx_gl_entries_against ON gl_entries(against_voucher, party)
    WHERE NOT is_cancelled;

CREATE INDEX idx_gl_entries_org_date ON gl_entries(organization, posting_date);
";
