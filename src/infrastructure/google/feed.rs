//! ICS feed adapter
//!
//! Implements [`CalendarFeed`] over the calendars' published ICS URLs.
//! The feed is served from Google's cache and may lag the store by
//! minutes; it is only ever used for availability pre-checks, never for
//! resolving reference codes.

use async_trait::async_trait;
use chrono::FixedOffset;
use tracing::debug;

use crate::application::ports::{CalendarFeed, EventWindow};
use crate::domain::{DomainError, DomainResult, Spot};
use crate::infrastructure::ics;

pub struct IcsFeed {
    http: reqwest::Client,
    url_northern: String,
    url_southern: String,
    fallback_offset: FixedOffset,
}

impl IcsFeed {
    pub fn new(
        http: reqwest::Client,
        url_northern: String,
        url_southern: String,
        fallback_offset: FixedOffset,
    ) -> Self {
        Self {
            http,
            url_northern,
            url_southern,
            fallback_offset,
        }
    }

    fn url(&self, spot: Spot) -> &str {
        match spot {
            Spot::Northern => &self.url_northern,
            Spot::Southern => &self.url_southern,
        }
    }
}

#[async_trait]
impl CalendarFeed for IcsFeed {
    async fn list_events(&self, spot: Spot) -> DomainResult<Vec<EventWindow>> {
        let url = self.url(spot);
        if url.is_empty() {
            return Err(DomainError::Read(format!(
                "ICS URL not configured for spot {spot}"
            )));
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::Read(format!("feed fetch for {spot}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Read(format!(
                "feed fetch for {spot} returned {status}"
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DomainError::Read(format!("feed body for {spot}: {e}")))?;

        let events = ics::parse_events(&text, self.fallback_offset)
            .map_err(|e| DomainError::Read(format!("feed parse for {spot}: {e}")))?;

        debug!(spot = %spot, events = events.len(), "feed fetched");

        Ok(events
            .into_iter()
            .map(|e| EventWindow {
                window: e.window,
                summary: e.summary,
                description: e.description,
                private_ref: None,
            })
            .collect())
    }
}
