//! Schedule domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timezone of a schedule created without one
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Cron schedule attached to a pipeline
///
/// The orchestrator only stores schedules; a scheduler reads them and
/// triggers builds on their behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSchedule {
    pub id: Uuid,
    pub pipeline_id: Uuid,
    pub cron: String,
    /// IANA name the cron expression is evaluated in
    pub timezone: String,
    pub enabled: bool,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PipelineSchedule {
    /// New schedule of `pipeline_id`; an empty timezone becomes [`DEFAULT_TIMEZONE`]
    pub fn new(pipeline_id: Uuid, cron: String, timezone: Option<String>, enabled: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            pipeline_id,
            cron,
            timezone: timezone
                .filter(|tz| !tz.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            enabled,
            last_triggered_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
