//! Google Calendar store adapter
//!
//! Implements [`CalendarStore`] over the Calendar v3 REST API. One
//! calendar per spot; the calendar id doubles as the spot's namespace.
//! Attendee notifications (`sendUpdates=all`) keep the reservation
//! owner's inbox in sync with every mutation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::application::ports::{CalendarStore, StoredEvent};
use crate::domain::{event_text, DomainError, DomainResult, ReservationDraft, Spot, TimeWindow};
use crate::infrastructure::google::auth::TokenProvider;

const BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Debug, Clone)]
pub struct GoogleCalendarConfig {
    pub calendar_id_northern: String,
    pub calendar_id_southern: String,
    /// Advisory payment target embedded in event descriptions.
    pub owner_email: String,
    /// Offset used when rendering event times for the calendar UI.
    pub app_offset: FixedOffset,
}

pub struct GoogleCalendarStore {
    http: reqwest::Client,
    auth: Arc<TokenProvider>,
    config: GoogleCalendarConfig,
}

#[derive(Debug, Deserialize)]
struct EventResource {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    #[serde(rename = "extendedProperties")]
    extended_properties: Option<ExtendedProperties>,
}

#[derive(Debug, Deserialize)]
struct ExtendedProperties {
    private: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<EventResource>,
}

impl GoogleCalendarStore {
    pub fn new(
        http: reqwest::Client,
        auth: Arc<TokenProvider>,
        config: GoogleCalendarConfig,
    ) -> Self {
        Self { http, auth, config }
    }

    fn calendar_id(&self, spot: Spot) -> &str {
        match spot {
            Spot::Northern => &self.config.calendar_id_northern,
            Spot::Southern => &self.config.calendar_id_southern,
        }
    }

    fn events_url(&self, spot: Spot) -> String {
        format!("{BASE_URL}/calendars/{}/events", self.calendar_id(spot))
    }

    fn event_url(&self, spot: Spot, event_id: &str) -> String {
        format!(
            "{BASE_URL}/calendars/{}/events/{}",
            self.calendar_id(spot),
            event_id
        )
    }

    /// Event times are written with the application offset so the
    /// calendar UI shows local wall-clock times.
    fn render_time(&self, t: DateTime<Utc>) -> String {
        t.with_timezone(&self.config.app_offset)
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    async fn fail<T>(
        op: &'static str,
        spot: Spot,
        response: reqwest::Response,
    ) -> DomainResult<T> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!(operation = op, spot = %spot, status = %status, body = %body, "calendar store call failed");
        Err(DomainError::Write(format!("{op} returned {status}")))
    }
}

#[async_trait]
impl CalendarStore for GoogleCalendarStore {
    async fn create_event(&self, draft: &ReservationDraft) -> DomainResult<String> {
        let token = self.auth.fetch_token().await?;

        let body = json!({
            "summary": event_text::summary(draft.spot, &draft.plate, &draft.reference),
            "description": event_text::description(
                &draft.contact,
                &draft.plate,
                &draft.reference,
                &self.config.owner_email,
            ),
            "start": { "dateTime": self.render_time(draft.window.start) },
            "end": { "dateTime": self.render_time(draft.window.end) },
            "extendedProperties": {
                "private": {
                    "ref": draft.reference,
                    "plate": draft.plate,
                    "spot": draft.spot.as_str(),
                    "name": draft.contact.name,
                    "phone": draft.contact.phone,
                    "email": draft.contact.email,
                }
            },
            "guestsCanInviteOthers": false,
        });

        let response = self
            .http
            .post(self.events_url(draft.spot))
            .query(&[("sendUpdates", "all")])
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Write(format!("create_event: {e}")))?;

        if !response.status().is_success() {
            return Self::fail("create_event", draft.spot, response).await;
        }

        let created: EventResource = response
            .json()
            .await
            .map_err(|e| DomainError::Write(format!("create_event: malformed response: {e}")))?;

        info!(spot = %draft.spot, event_id = %created.id, "calendar event created");
        Ok(created.id)
    }

    async fn search_events(
        &self,
        spot: Spot,
        query: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> DomainResult<Vec<StoredEvent>> {
        let token = self.auth.fetch_token().await?;

        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = time_max.to_rfc3339_opts(SecondsFormat::Secs, true);
        let response = self
            .http
            .get(self.events_url(spot))
            .query(&[
                ("q", query),
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
            ])
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| DomainError::Read(format!("search_events: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(operation = "search_events", spot = %spot, status = %status, body = %body, "calendar store call failed");
            return Err(DomainError::Read(format!("search_events returned {status}")));
        }

        let list: EventListResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Read(format!("search_events: malformed response: {e}")))?;

        Ok(list
            .items
            .into_iter()
            .map(|item| {
                let private_ref = item
                    .extended_properties
                    .as_ref()
                    .and_then(|p| p.private.as_ref())
                    .and_then(|p| p.get("ref"))
                    .cloned();
                StoredEvent {
                    id: item.id,
                    summary: item.summary,
                    description: item.description,
                    private_ref,
                }
            })
            .collect())
    }

    async fn update_event_window(
        &self,
        spot: Spot,
        event_id: &str,
        window: &TimeWindow,
    ) -> DomainResult<()> {
        let token = self.auth.fetch_token().await?;

        let body = json!({
            "start": { "dateTime": self.render_time(window.start) },
            "end": { "dateTime": self.render_time(window.end) },
        });

        let response = self
            .http
            .patch(self.event_url(spot, event_id))
            .query(&[("sendUpdates", "all")])
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Write(format!("update_event: {e}")))?;

        if !response.status().is_success() {
            return Self::fail("update_event", spot, response).await;
        }

        info!(spot = %spot, event_id = %event_id, window = %window, "calendar event moved");
        Ok(())
    }

    async fn delete_event(&self, spot: Spot, event_id: &str) -> DomainResult<()> {
        let token = self.auth.fetch_token().await?;

        let response = self
            .http
            .delete(self.event_url(spot, event_id))
            .query(&[("sendUpdates", "all")])
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| DomainError::Write(format!("delete_event: {e}")))?;

        if !response.status().is_success() {
            return Self::fail("delete_event", spot, response).await;
        }

        info!(spot = %spot, event_id = %event_id, "calendar event deleted");
        Ok(())
    }
}
