//! Schedule DTOs

use serde::{Deserialize, Serialize};

/// Request to attach a schedule to a pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSchedule {
    pub cron: String,
    /// Empty or absent means UTC
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Request to update a schedule
///
/// Empty or absent text fields leave the stored value unchanged; `enabled`
/// always applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSchedule {
    #[serde(default)]
    pub cron: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    pub enabled: bool,
}

/// Query parameters for listing a pipeline's schedules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSchedules {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}
