//! Hours worked by team members on assignments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AssignmentId, UserId, WorkLogId};

/// Upper bound for hours logged on one day.
pub const MAX_HOURS_PER_ENTRY: f64 = 24.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkLogValidationError {
    #[error("hours must be greater than 0 and at most {max}, got {value}")]
    Hours { value: f64, max: f64 },
}

/// Validated number of hours, in `(0, 24]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Hours(f64);

impl Hours {
    pub fn new(value: f64) -> Result<Self, WorkLogValidationError> {
        if !value.is_finite() || value <= 0.0 || value > MAX_HOURS_PER_ENTRY {
            return Err(WorkLogValidationError::Hours {
                value,
                max: MAX_HOURS_PER_ENTRY,
            });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<Hours> for f64 {
    fn from(value: Hours) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Hours {
    type Error = WorkLogValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One day of work by one user on one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLog {
    pub id: WorkLogId,
    pub user_id: UserId,
    pub assignment_id: AssignmentId,
    pub work_date: NaiveDate,
    pub hours: Hours,
    pub description: Option<String>,
}

/// Total hours per user over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHours {
    pub user_id: UserId,
    pub full_name: String,
    pub total_hours: f64,
    pub entries: i64,
}

/// Sort by total hours descending, then name.
pub fn rank_user_hours(rows: &mut [UserHours]) {
    rows.sort_by(|a, b| {
        b.total_hours
            .total_cmp(&a.total_hours)
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
}
