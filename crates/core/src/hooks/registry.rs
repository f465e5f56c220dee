//! Hook registry: document events, permission predicates and scheduled jobs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use super::error::HookError;
use super::principal::{PermissionType, Principal};
use super::scheduler::{Frequency, ScheduledJob};

/// Doctype key whose handlers run for every document.
pub const WILDCARD: &str = "*";

/// Document lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocEvent {
    /// After the document is first stored.
    AfterInsert,
    /// Before every save.
    Validate,
    /// After every save.
    OnUpdate,
    /// Before deletion.
    OnTrash,
    /// After cancellation.
    OnCancel,
}

impl DocEvent {
    /// Returns the event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AfterInsert => "after_insert",
            Self::Validate => "validate",
            Self::OnUpdate => "on_update",
            Self::OnTrash => "on_trash",
            Self::OnCancel => "on_cancel",
        }
    }
}

impl fmt::Display for DocEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document passed to hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document type, e.g. "Fiscal Year".
    pub doctype: String,
    /// Document name.
    pub name: String,
    /// Field values.
    #[serde(default)]
    pub data: Value,
}

impl Document {
    /// Creates a document.
    #[must_use]
    pub fn new(doctype: impl Into<String>, name: impl Into<String>, data: Value) -> Self {
        Self {
            doctype: doctype.into(),
            name: name.into(),
            data,
        }
    }
}

/// Document event handler.
pub type EventHandler = Arc<dyn Fn(&Document) -> Result<(), HookError> + Send + Sync>;

/// Permission predicate. `docname` is `None` for doctype-level checks.
pub type PermissionPredicate =
    Arc<dyn Fn(&Principal, PermissionType, Option<&str>) -> bool + Send + Sync>;

/// Registered hooks.
#[derive(Default, Clone)]
pub struct HookRegistry {
    events: HashMap<(String, DocEvent), Vec<EventHandler>>,
    permissions: HashMap<String, Vec<PermissionPredicate>>,
    jobs: Vec<ScheduledJob>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an event handler. Use `"*"` to handle every doctype.
    #[must_use]
    pub fn on(
        mut self,
        doctype: &str,
        event: DocEvent,
        handler: impl Fn(&Document) -> Result<(), HookError> + Send + Sync + 'static,
    ) -> Self {
        self.events
            .entry((doctype.to_string(), event))
            .or_default()
            .push(Arc::new(handler));
        self
    }

    /// Registers a permission predicate for a doctype.
    #[must_use]
    pub fn permission(
        mut self,
        doctype: &str,
        predicate: impl Fn(&Principal, PermissionType, Option<&str>) -> bool
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.permissions
            .entry(doctype.to_string())
            .or_default()
            .push(Arc::new(predicate));
        self
    }

    /// Registers a scheduled job.
    #[must_use]
    pub fn schedule(mut self, job: ScheduledJob) -> Self {
        self.jobs.push(job);
        self
    }

    /// Merges another registry into this one.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (key, handlers) in other.events {
            self.events.entry(key).or_default().extend(handlers);
        }
        for (doctype, predicates) in other.permissions {
            self.permissions.entry(doctype).or_default().extend(predicates);
        }
        self.jobs.extend(other.jobs);
        self
    }

    /// Runs wildcard handlers, then the document's doctype handlers.
    ///
    /// Stops at the first failing handler.
    pub fn dispatch(&self, event: DocEvent, doc: &Document) -> Result<(), HookError> {
        let wildcard = self.handlers(WILDCARD, event);
        let specific = self.handlers(&doc.doctype, event);

        for handler in wildcard.iter().chain(specific) {
            handler(doc)?;
        }
        debug!(
            doctype = %doc.doctype,
            name = %doc.name,
            event = %event,
            handlers = wildcard.len() + specific.len(),
            "Dispatched document event"
        );
        Ok(())
    }

    /// Checks every predicate registered for `doctype`.
    ///
    /// Doctypes without predicates are permitted; the administrator always is.
    #[must_use]
    pub fn has_permission(
        &self,
        doctype: &str,
        principal: &Principal,
        ptype: PermissionType,
        docname: Option<&str>,
    ) -> bool {
        if principal.is_administrator() {
            return true;
        }
        self.permissions
            .get(doctype)
            .is_none_or(|predicates| predicates.iter().all(|p| p(principal, ptype, docname)))
    }

    /// Jobs registered for `frequency`.
    pub fn jobs(&self, frequency: Frequency) -> impl Iterator<Item = &ScheduledJob> {
        self.jobs.iter().filter(move |j| j.frequency == frequency)
    }

    /// Runs every job of `frequency`, returning the number of failures.
    ///
    /// A failing job does not stop the others.
    pub fn run_scheduled(&self, frequency: Frequency) -> usize {
        let mut failures = 0;
        for job in self.jobs(frequency) {
            match job.run() {
                Ok(()) => debug!(job = %job.name, %frequency, "Scheduled job finished"),
                Err(e) => {
                    failures += 1;
                    error!(error = %e, job = %job.name, %frequency, "Scheduled job failed");
                }
            }
        }
        failures
    }

    fn handlers(&self, doctype: &str, event: DocEvent) -> &[EventHandler] {
        self.events
            .get(&(doctype.to_string(), event))
            .map_or(&[][..], Vec::as_slice)
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .field("permissions", &self.permissions.keys().collect::<Vec<_>>())
            .field("jobs", &self.jobs)
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
