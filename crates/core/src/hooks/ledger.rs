//! Hooks registered by the accounting module.

use tracing::info;

use super::principal::{PermissionType, Principal, roles};
use super::registry::{DocEvent, Document, HookRegistry};
use super::scheduler::{Frequency, ScheduledJob};
use crate::fiscal::FiscalYearCache;

/// Tree doctypes guarded by the accounting roles.
pub const ACCOUNT_DOCTYPES: [&str; 2] = ["Account", "Cost Center"];

/// Doctype whose changes invalidate the fiscal year cache; changes need a manager role.
pub const FISCAL_YEAR_DOCTYPE: &str = "Fiscal Year";

const READ_ROLES: [&str; 3] = [
    roles::ACCOUNTS_USER,
    roles::ACCOUNTS_MANAGER,
    roles::SYSTEM_MANAGER,
];

const MANAGE_ROLES: [&str; 2] = [roles::ACCOUNTS_MANAGER, roles::SYSTEM_MANAGER];

fn account_permission(
    principal: &Principal,
    ptype: PermissionType,
    _docname: Option<&str>,
) -> bool {
    match ptype {
        PermissionType::Read => principal.has_any_role(&READ_ROLES),
        PermissionType::Write | PermissionType::Create | PermissionType::Delete => {
            principal.has_any_role(&MANAGE_ROLES)
        }
    }
}

/// Any caller may read fiscal years; only managers change them.
fn fiscal_year_permission(
    principal: &Principal,
    ptype: PermissionType,
    _docname: Option<&str>,
) -> bool {
    ptype == PermissionType::Read || principal.has_any_role(&MANAGE_ROLES)
}

/// Builds the accounting hooks around a shared fiscal year cache.
#[must_use]
pub fn ledger_hooks(cache: FiscalYearCache) -> HookRegistry {
    let mut registry = HookRegistry::new();
    for doctype in ACCOUNT_DOCTYPES {
        registry = registry.permission(doctype, account_permission);
    }
    registry = registry.permission(FISCAL_YEAR_DOCTYPE, fiscal_year_permission);

    for event in [DocEvent::AfterInsert, DocEvent::OnUpdate, DocEvent::OnTrash] {
        let cache = cache.clone();
        registry = registry.on(FISCAL_YEAR_DOCTYPE, event, move |doc: &Document| {
            cache.invalidate_all();
            info!(fiscal_year = %doc.name, %event, "Fiscal year cache cleared");
            Ok(())
        });
    }

    registry.schedule(ScheduledJob::new(
        "fiscal_year_cache_maintenance",
        Frequency::Hourly,
        move || {
            cache.run_pending_tasks();
            Ok(())
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::FiscalYear;
    use bursar_shared::types::{FiscalYearName, OrganizationName};
    use chrono::NaiveDate;
    use serde_json::json;

    fn cached_years() -> Vec<FiscalYear> {
        vec![FiscalYear {
            name: FiscalYearName::from("2025-2026"),
            start_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
            disabled: false,
            organizations: vec![],
        }]
    }

    #[test]
    fn test_account_read_roles() {
        let hooks = ledger_hooks(FiscalYearCache::new());
        let user = Principal::new("clerk", [roles::ACCOUNTS_USER]);
        let instructor = Principal::new("instructor", ["Instructor"]);

        for doctype in ACCOUNT_DOCTYPES {
            assert!(hooks.has_permission(doctype, &user, PermissionType::Read, None));
            assert!(!hooks.has_permission(doctype, &user, PermissionType::Create, None));
            assert!(!hooks.has_permission(doctype, &instructor, PermissionType::Read, None));
        }
    }

    #[test]
    fn test_account_manage_roles() {
        let hooks = ledger_hooks(FiscalYearCache::new());
        let manager = Principal::new("head", [roles::ACCOUNTS_MANAGER]);
        let admin = Principal::new("it", [roles::SYSTEM_MANAGER]);

        assert!(hooks.has_permission("Account", &manager, PermissionType::Create, None));
        assert!(hooks.has_permission(
            "Account",
            &admin,
            PermissionType::Write,
            Some("Cash - AC")
        ));
        assert!(hooks.has_permission("Account", &manager, PermissionType::Read, None));
    }

    #[test]
    fn test_other_doctypes_unrestricted() {
        let hooks = ledger_hooks(FiscalYearCache::new());
        let nobody = Principal::new("guest", Vec::<String>::new());
        assert!(hooks.has_permission("Student", &nobody, PermissionType::Create, None));
    }

    #[test]
    fn test_fiscal_year_changes_need_manager() {
        let hooks = ledger_hooks(FiscalYearCache::new());
        let clerk = Principal::new("clerk", [roles::ACCOUNTS_USER]);
        let manager = Principal::new("head", [roles::ACCOUNTS_MANAGER]);

        assert!(hooks.has_permission(FISCAL_YEAR_DOCTYPE, &clerk, PermissionType::Read, None));
        for ptype in [PermissionType::Create, PermissionType::Write, PermissionType::Delete] {
            assert!(!hooks.has_permission(FISCAL_YEAR_DOCTYPE, &clerk, ptype, None));
            assert!(hooks.has_permission(FISCAL_YEAR_DOCTYPE, &manager, ptype, None));
        }
    }

    #[test]
    fn test_fiscal_year_events_clear_cache() {
        let cache = FiscalYearCache::new();
        let hooks = ledger_hooks(cache.clone());
        let org = OrganizationName::from("ACME");
        let doc = Document::new(FISCAL_YEAR_DOCTYPE, "2025-2026", json!({}));

        for event in [DocEvent::AfterInsert, DocEvent::OnUpdate, DocEvent::OnTrash] {
            cache.insert(Some(&org), cached_years());
            hooks.dispatch(event, &doc).unwrap();
            cache.run_pending_tasks();
            assert!(cache.get(Some(&org)).is_none(), "{event} should clear the cache");
        }
    }

    #[test]
    fn test_validate_event_keeps_cache() {
        let cache = FiscalYearCache::new();
        let hooks = ledger_hooks(cache.clone());
        cache.insert(None, cached_years());

        let doc = Document::new(FISCAL_YEAR_DOCTYPE, "2025-2026", json!({}));
        hooks.dispatch(DocEvent::Validate, &doc).unwrap();
        assert!(cache.get(None).is_some());
    }

    #[test]
    fn test_hourly_maintenance_job() {
        let hooks = ledger_hooks(FiscalYearCache::new());
        assert_eq!(hooks.jobs(Frequency::Hourly).count(), 1);
        assert_eq!(hooks.run_scheduled(Frequency::Hourly), 0);
        assert_eq!(hooks.jobs(Frequency::Daily).count(), 0);
    }
}
