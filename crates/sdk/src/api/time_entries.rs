//! Time entry endpoints.

use crate::client::HarvestClient;
use crate::error::HarvestResult;
use crate::pagination::{collect_all, Page, Paginated};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Time entries API.
pub struct TimeEntriesApi<'a> {
    client: &'a HarvestClient,
}

impl<'a> TimeEntriesApi<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    /// List the entries whose `spent_date` falls within `from..=to`.
    pub async fn list(&self, from: NaiveDate, to: NaiveDate) -> HarvestResult<Vec<TimeEntry>> {
        let query = [
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
        ];
        collect_all::<TimeEntriesPage>(&self.client.http, "time_entries", &query).await
    }

    /// Create a time entry. Without `hours` the entry starts as a running timer.
    pub async fn create(&self, request: &CreateTimeEntryRequest) -> HarvestResult<TimeEntry> {
        self.client.http.post("time_entries", request).await
    }

    /// Patch the supplied fields of a time entry.
    pub async fn update(
        &self,
        time_entry_id: u64,
        request: &UpdateTimeEntryRequest,
    ) -> HarvestResult<TimeEntry> {
        self.client
            .http
            .patch(&format!("time_entries/{}", time_entry_id), request)
            .await
    }

    /// Stop a running time entry.
    pub async fn stop(&self, time_entry_id: u64) -> HarvestResult<TimeEntry> {
        self.client
            .http
            .patch_empty(&format!("time_entries/{}/stop", time_entry_id))
            .await
    }
}

/// Reference to a named resource embedded in another resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    pub name: String,
}

/// A tracked unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    pub spent_date: NaiveDate,
    pub hours: f64,
    #[serde(default)]
    pub notes: Option<String>,
    pub is_running: bool,
    pub project: NamedRef,
    pub task: NamedRef,
}

/// Request to create a time entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeEntryRequest {
    pub project_id: u64,
    pub task_id: u64,
    pub spent_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update of a time entry. Absent fields are left untouched upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTimeEntryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UpdateTimeEntryRequest {
    /// Number of fields that will be sent.
    pub fn field_count(&self) -> usize {
        [
            self.project_id.is_some(),
            self.task_id.is_some(),
            self.spent_date.is_some(),
            self.hours.is_some(),
            self.notes.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }
}

#[derive(Debug, Deserialize)]
struct TimeEntriesPage {
    time_entries: Vec<TimeEntry>,
    next_page: Option<u32>,
}

impl Paginated for TimeEntriesPage {
    type Item = TimeEntry;

    fn into_page(self) -> Page<TimeEntry> {
        Page {
            items: self.time_entries,
            next_page: self.next_page,
        }
    }
}
