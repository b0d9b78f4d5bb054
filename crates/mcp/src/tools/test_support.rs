// Shared fixtures for tool tests

use super::HarvestContext;
use crate::clock::FixedClock;
use crate::throttle::WriteThrottle;
use chrono::NaiveDate;
use harvest_sdk::{Credentials, HarvestClient, RetryConfig, StaticCredentials};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

pub const ACCOUNT_ID: &str = "3141592";
pub const ACCESS_TOKEN: &str = "2718281.pt.TestTokenValue";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

pub fn context_for(server: &MockServer, max_writes: usize) -> HarvestContext {
    context_with_account(server, max_writes, ACCOUNT_ID)
}

pub fn context_with_account(
    server: &MockServer,
    max_writes: usize,
    account_id: &str,
) -> HarvestContext {
    let client = HarvestClient::builder()
        .base_url(server.uri())
        .retry_config(RetryConfig::no_retry())
        .credentials(Arc::new(StaticCredentials::new(Credentials::new(
            account_id,
            ACCESS_TOKEN,
        ))))
        .build()
        .unwrap();

    HarvestContext::new(
        client,
        Arc::new(WriteThrottle::new(max_writes, Duration::from_secs(60))),
        Arc::new(FixedClock(today())),
    )
}

pub fn time_entry(id: u64, hours: f64, notes: Option<&str>, running: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "spent_date": "2025-01-15",
        "hours": hours,
        "notes": notes,
        "is_running": running,
        "project": {"id": 12345, "name": "Website Redesign"},
        "task": {"id": 67890, "name": "Development"}
    })
}

pub fn assignment(project_id: u64, project_name: &str, active: bool) -> serde_json::Value {
    serde_json::json!({
        "id": project_id + 1_000_000,
        "is_active": active,
        "budget": 120.0,
        "project": {"id": project_id, "name": project_name, "code": "WEB"},
        "client": {"id": 55, "name": "Acme Corp"},
        "task_assignments": [
            {"id": 1, "billable": true, "is_active": true, "hourly_rate": 150.0,
             "task": {"id": 67890, "name": "Development"}},
            {"id": 2, "billable": false, "is_active": false, "hourly_rate": null,
             "task": {"id": 67891, "name": "Archived Task"}}
        ]
    })
}

/// Number of requests the mock server has seen.
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or(0)
}
