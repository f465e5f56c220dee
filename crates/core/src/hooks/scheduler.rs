//! Scheduled jobs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::HookError;

/// How often a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every scheduler tick (4 minutes).
    All,
    /// Every hour.
    Hourly,
    /// Every day.
    Daily,
    /// Every 7 days.
    Weekly,
    /// Every 30 days.
    Monthly,
}

impl Frequency {
    /// All frequencies, shortest first.
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Hourly,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
    ];

    /// Interval between runs.
    #[must_use]
    pub const fn interval(self) -> Duration {
        const HOUR: u64 = 3600;
        match self {
            Self::All => Duration::from_secs(240),
            Self::Hourly => Duration::from_secs(HOUR),
            Self::Daily => Duration::from_secs(24 * HOUR),
            Self::Weekly => Duration::from_secs(7 * 24 * HOUR),
            Self::Monthly => Duration::from_secs(30 * 24 * HOUR),
        }
    }

    /// Returns the lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job body.
pub type JobFn = Arc<dyn Fn() -> Result<(), HookError> + Send + Sync>;

/// A named job run at a fixed frequency.
#[derive(Clone)]
pub struct ScheduledJob {
    /// Job name, used in logs.
    pub name: String,
    /// Run frequency.
    pub frequency: Frequency,
    run: JobFn,
}

impl ScheduledJob {
    /// Creates a job.
    pub fn new(
        name: impl Into<String>,
        frequency: Frequency,
        run: impl Fn() -> Result<(), HookError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            frequency,
            run: Arc::new(run),
        }
    }

    /// Runs the job once.
    pub fn run(&self) -> Result<(), HookError> {
        (self.run)()
    }
}

impl fmt::Debug for ScheduledJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledJob")
            .field("name", &self.name)
            .field("frequency", &self.frequency)
            .finish_non_exhaustive()
    }
}
