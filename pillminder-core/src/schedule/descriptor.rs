//! Schedule descriptor

use serde::{Deserialize, Serialize};

/// One medicine's dosing schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDescriptor {
    /// Medicine name, also the stored file name
    pub name: String,
    /// Amount to take, free text ("2 tablets")
    pub dosage: String,
    /// Pill box slot, 0-3
    pub slot: u8,
    /// Recurrence field, cron syntax
    pub hour: String,
    /// Day-of-week cron field; every day when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    /// Extra instruction shown under the reminder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
}

impl ScheduleDescriptor {
    /// Reminder line shown when the schedule fires
    pub fn reminder_text(&self) -> String {
        format!("Take {} of {}", self.dosage, self.name)
    }

    /// Day-of-week field, `*` when absent
    pub fn day_of_week(&self) -> &str {
        self.day_of_week.as_deref().unwrap_or("*")
    }
}

/// Names become file names, so separators and dot entries are refused
pub(crate) fn check_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        Err("must not be empty".into())
    } else if name.contains(['/', '\\']) || name == "." || name == ".." {
        Err("must not contain path separators".into())
    } else {
        Ok(())
    }
}
