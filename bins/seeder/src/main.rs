//! Database seeder for Bursar development and testing.
//!
//! Seeds a demo school with two academic years, the standard school chart,
//! cost centers and a handful of ledger entries. Every step is skipped when
//! its data already exists.
//!
//! Usage: cargo run --bin seeder

use bursar_core::Organization;
use bursar_core::accounts::ChartTemplate;
use bursar_core::fiscal::{FiscalYear, FiscalYearCache};
use bursar_core::ledger::GlEntry;
use bursar_db::entities::gl_entries;
use bursar_db::repositories::{AccountRepoError, NewCostCenter};
use bursar_db::{
    AccountRepository, CostCenterRepository, FiscalYearRepository, GlEntryRepository,
    OrganizationRepository,
};
use bursar_shared::types::{
    AccountName, CostCenterName, FiscalYearName, GlEntryId, OrganizationName,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

const SCHOOL_NAME: &str = "Hillside Academy";
const SCHOOL_ABBR: &str = "HA";
const SCHOOL_CHART: &str = include_str!("../../../charts/school_standard.json");

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = bursar_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding organization...");
    let school = seed_organization(&db).await;

    println!("Seeding academic years...");
    seed_fiscal_years(&db, &school).await;

    println!("Seeding chart of accounts...");
    seed_chart(&db, &school).await;

    println!("Seeding cost centers...");
    seed_cost_centers(&db, &school).await;

    println!("Seeding ledger entries...");
    seed_gl_entries(&db, &school).await;

    println!("Seeding complete!");
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid seed date")
}

fn account(school: &Organization, title: &str) -> AccountName {
    AccountName::from(format!("{title} - {}", school.abbr))
}

fn cost_center(school: &Organization, title: &str) -> CostCenterName {
    CostCenterName::from(format!("{title} - {}", school.abbr))
}

/// Seeds the demo school.
async fn seed_organization(db: &DatabaseConnection) -> Organization {
    let repo = OrganizationRepository::new(db.clone());
    let name = OrganizationName::from(SCHOOL_NAME);

    if let Some(existing) = repo.find(&name).await.expect("Failed to load organization") {
        println!("  {SCHOOL_NAME} already exists, skipping...");
        return existing;
    }

    let school = Organization {
        name,
        abbr: SCHOOL_ABBR.to_string(),
        default_currency: "USD".parse().expect("valid currency"),
    };
    let created = repo
        .create(&school)
        .await
        .expect("Failed to create organization");
    println!("  Created {}", created.name);
    created
}

/// Seeds two August-to-July academic years restricted to the school.
async fn seed_fiscal_years(db: &DatabaseConnection, school: &Organization) {
    let repo = FiscalYearRepository::new(db.clone(), FiscalYearCache::new());

    for start in [2024, 2025] {
        let name = FiscalYearName::from(format!("{start}-{}", start + 1));
        if repo
            .find(&name)
            .await
            .expect("Failed to load fiscal year")
            .is_some()
        {
            println!("  Fiscal year {name} already exists, skipping...");
            continue;
        }

        repo.create(FiscalYear {
            name: name.clone(),
            start_date: date(start, 8, 1),
            end_date: date(start + 1, 7, 31),
            disabled: false,
            organizations: vec![school.name.clone()],
        })
        .await
        .expect("Failed to create fiscal year");
        println!("  Created fiscal year {name}");
    }
}

/// Imports the standard school chart.
async fn seed_chart(db: &DatabaseConnection, school: &Organization) {
    let chart = ChartTemplate::from_json(SCHOOL_CHART).expect("Bundled chart must parse");

    match AccountRepository::new(db.clone())
        .import_chart(&chart, school)
        .await
    {
        Ok(accounts) => println!("  Created {} accounts", accounts.len()),
        Err(AccountRepoError::ChartExists(_)) => {
            println!("  Chart already imported, skipping...");
        }
        Err(e) => panic!("Failed to import chart: {e}"),
    }
}

/// Seeds a main cost center with one child per school section.
async fn seed_cost_centers(db: &DatabaseConnection, school: &Organization) {
    let repo = CostCenterRepository::new(db.clone());

    let main = cost_center(school, "Main");
    if repo
        .find(&main)
        .await
        .expect("Failed to load cost center")
        .is_some()
    {
        println!("  Cost centers already exist, skipping...");
        return;
    }

    repo.create(
        NewCostCenter {
            cost_center_name: "Main".to_string(),
            parent_cost_center: None,
            is_group: true,
        },
        school,
    )
    .await
    .expect("Failed to create main cost center");

    for section in ["Primary School", "Secondary School"] {
        repo.create(
            NewCostCenter {
                cost_center_name: section.to_string(),
                parent_cost_center: Some(main.clone()),
                is_group: false,
            },
            school,
        )
        .await
        .expect("Failed to create cost center");
    }
    println!("  Created 3 cost centers");
}

struct Posting<'a> {
    account: &'a str,
    debit: i64,
    credit: i64,
    student: Option<&'a str>,
    cost_center: Option<&'a str>,
    against: Option<&'a str>,
}

impl<'a> Posting<'a> {
    const fn debit(account: &'a str, amount: i64) -> Self {
        Self {
            account,
            debit: amount,
            credit: 0,
            student: None,
            cost_center: None,
            against: None,
        }
    }

    const fn credit(account: &'a str, amount: i64) -> Self {
        Self {
            account,
            debit: 0,
            credit: amount,
            student: None,
            cost_center: None,
            against: None,
        }
    }

    const fn student(mut self, student: &'a str) -> Self {
        self.student = Some(student);
        self
    }

    const fn cost_center(mut self, cost_center: &'a str) -> Self {
        self.cost_center = Some(cost_center);
        self
    }

    const fn against(mut self, voucher: &'a str) -> Self {
        self.against = Some(voucher);
        self
    }
}

fn voucher(
    school: &Organization,
    voucher_type: &str,
    voucher_no: &str,
    posting_date: NaiveDate,
    postings: &[Posting<'_>],
) -> Vec<GlEntry> {
    postings
        .iter()
        .map(|p| GlEntry {
            id: GlEntryId::new(),
            account: account(school, p.account),
            posting_date,
            debit: Decimal::from(p.debit),
            credit: Decimal::from(p.credit),
            debit_in_account_currency: Decimal::from(p.debit),
            credit_in_account_currency: Decimal::from(p.credit),
            party_type: p.student.map(|_| "Student".to_string()),
            party: p.student.map(str::to_string),
            cost_center: p.cost_center.map(|c| cost_center(school, c)),
            voucher_type: voucher_type.to_string(),
            voucher_no: voucher_no.to_string(),
            against_voucher_type: p.against.map(|_| "Sales Invoice".to_string()),
            against_voucher: p.against.map(str::to_string),
            organization: school.name.clone(),
            is_cancelled: false,
        })
        .collect()
}

/// Seeds tuition invoices, one settled by a payment, and a salary run.
async fn seed_gl_entries(db: &DatabaseConnection, school: &Organization) {
    let existing = gl_entries::Entity::find()
        .filter(gl_entries::Column::Organization.eq(school.name.as_str()))
        .count(db)
        .await
        .expect("Failed to count ledger entries");
    if existing > 0 {
        println!("  Ledger entries already exist, skipping...");
        return;
    }

    let mut entries = Vec::new();
    entries.extend(voucher(
        school,
        "Sales Invoice",
        "SINV-2025-0001",
        date(2025, 8, 15),
        &[
            Posting::debit("Tuition Receivable", 1_200)
                .student("STU-0001")
                .against("SINV-2025-0001"),
            Posting::credit("Tuition Fees", 1_200).cost_center("Primary School"),
        ],
    ));
    entries.extend(voucher(
        school,
        "Sales Invoice",
        "SINV-2025-0002",
        date(2025, 8, 15),
        &[
            Posting::debit("Tuition Receivable", 1_500)
                .student("STU-0002")
                .against("SINV-2025-0002"),
            Posting::credit("Tuition Fees", 1_500).cost_center("Secondary School"),
        ],
    ));
    entries.extend(voucher(
        school,
        "Payment Entry",
        "PE-2025-0001",
        date(2025, 9, 1),
        &[
            Posting::debit("Cash", 1_200),
            Posting::credit("Tuition Receivable", 1_200)
                .student("STU-0001")
                .against("SINV-2025-0001"),
        ],
    ));
    entries.extend(voucher(
        school,
        "Journal Entry",
        "JV-2025-0001",
        date(2025, 9, 30),
        &[
            Posting::debit("Teaching Staff Salaries", 900).cost_center("Primary School"),
            Posting::credit("Cash", 900),
        ],
    ));

    GlEntryRepository::new(db.clone())
        .insert_many(&entries)
        .await
        .expect("Failed to insert ledger entries");
    println!("  Created {} ledger entries", entries.len());
}
