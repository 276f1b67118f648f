//! External calendar sync for booked sessions.
//!
//! Sync is best effort: the booking is committed before any call is made here,
//! and a failed call is logged and dropped.

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[async_trait]
pub trait CalendarSync: Send + Sync {
    /// Creates the event with the user's own access token and returns the
    /// provider's event id.
    async fn create_event(&self, access_token: &str, event: &CalendarEvent)
        -> anyhow::Result<String>;
}

/// Google Calendar v3 events API.
pub struct GoogleCalendar {
    client: reqwest::Client,
    api_base: String,
    timezone: String,
}

impl GoogleCalendar {
    pub fn new<S1: Into<String>, S2: Into<String>>(api_base: S1, timezone: S2) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            timezone: timezone.into(),
        }
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/primary/events",
            self.api_base.trim_end_matches('/')
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime<'a> {
    date_time: String,
    time_zone: &'a str,
}

#[derive(Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    description: &'a str,
    start: EventTime<'a>,
    end: EventTime<'a>,
}

#[derive(Deserialize)]
struct CreatedEvent {
    id: String,
}

const EVENT_TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

#[async_trait]
impl CalendarSync for GoogleCalendar {
    async fn create_event(
        &self,
        access_token: &str,
        event: &CalendarEvent,
    ) -> anyhow::Result<String> {
        let body = EventBody {
            summary: &event.summary,
            description: &event.description,
            start: EventTime {
                date_time: event.start.format(EVENT_TIME_FMT).to_string(),
                time_zone: &self.timezone,
            },
            end: EventTime {
                date_time: event.end.format(EVENT_TIME_FMT).to_string(),
                time_zone: &self.timezone,
            },
        };

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .context("Calendar request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Calendar provider returned {}", status);
        }

        let created = response
            .json::<CreatedEvent>()
            .await
            .context("Malformed calendar response")?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_url_ignores_trailing_slash() {
        let calendar = GoogleCalendar::new("https://cal.example/v3/", "Asia/Bangkok");
        assert_eq!(
            calendar.events_url(),
            "https://cal.example/v3/calendars/primary/events"
        );
    }

    #[test]
    fn event_body_uses_provider_field_names() {
        let body = EventBody {
            summary: "Counseling session",
            description: "",
            start: EventTime {
                date_time: "2024-05-13T09:00:00".to_string(),
                time_zone: "Asia/Bangkok",
            },
            end: EventTime {
                date_time: "2024-05-13T10:00:00".to_string(),
                time_zone: "Asia/Bangkok",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["start"]["dateTime"], "2024-05-13T09:00:00");
        assert_eq!(json["end"]["timeZone"], "Asia/Bangkok");
    }
}
