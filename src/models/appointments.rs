use std::{fmt, str::FromStr};

use crate::schema::appointments;
use anyhow::bail;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Clone, Queryable, Insertable)]
#[diesel(table_name = appointments)]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    pub counselor_id: String,
    pub day: String,
    pub time: String,
    pub date: NaiveDate,
    pub status: String,
    pub student_id: String,
    pub telephone: String,
    pub notes: Option<String>,
    pub google_event_id: Option<String>,
    pub created_at: NaiveDateTime,
}

pub const APPOINT_STATUS_UPCOMING: &str = "upcoming";
pub const APPOINT_STATUS_COMPLETED: &str = "completed";
pub const APPOINT_STATUS_CANCELLED: &str = "cancelled";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => APPOINT_STATUS_UPCOMING,
            AppointmentStatus::Completed => APPOINT_STATUS_COMPLETED,
            AppointmentStatus::Cancelled => APPOINT_STATUS_CANCELLED,
        }
    }

    /// Only upcoming appointments move, and only to a final state.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Upcoming, AppointmentStatus::Completed)
                | (AppointmentStatus::Upcoming, AppointmentStatus::Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            APPOINT_STATUS_UPCOMING => Ok(AppointmentStatus::Upcoming),
            APPOINT_STATUS_COMPLETED => Ok(AppointmentStatus::Completed),
            APPOINT_STATUS_CANCELLED => Ok(AppointmentStatus::Cancelled),
            _ => bail!("Unknown appointment status: {}", s),
        }
    }
}
