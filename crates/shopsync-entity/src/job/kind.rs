//! Job type and kind enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger row type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    /// One-shot job, executed once in the sweep after it was marked
    /// finished, then deleted.
    #[serde(rename = "STD")]
    OneShot,
    /// Recurring job, re-armed after every successful run.
    #[serde(rename = "RPT")]
    Recurring,
}

impl JobType {
    /// Column value stored in `job_ledger.job_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneShot => "STD",
            Self::Recurring => "RPT",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for JobType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "STD" => Ok(Self::OneShot),
            "RPT" => Ok(Self::Recurring),
            other => Err(format!("unknown job type '{other}'")),
        }
    }
}

/// Built-in recurring actions, keyed by the integer stored in
/// `job_ledger.job_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    ReviewReminder,
    SitemapExport,
    RssExport,
    GarbageCollector,
    /// Kind registered by an extension.
    Custom(i32),
}

impl JobKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::ReviewReminder,
            2 => Self::SitemapExport,
            3 => Self::RssExport,
            4 => Self::GarbageCollector,
            other => Self::Custom(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::ReviewReminder => 1,
            Self::SitemapExport => 2,
            Self::RssExport => 3,
            Self::GarbageCollector => 4,
            Self::Custom(code) => *code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReviewReminder => "review_reminder",
            Self::SitemapExport => "sitemap_export",
            Self::RssExport => "rss_export",
            Self::GarbageCollector => "garbage_collector",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(code) => write!(f, "custom({code})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
