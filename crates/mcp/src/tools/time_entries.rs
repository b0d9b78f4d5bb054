// Time entry tools: logging, today's summary and partial updates

use crate::protocol::{CallToolResult, ToolSchema};
use crate::sanitize::{log_safe_message, raw_message};
use crate::tools::{
    format_hours, json_schema_date, json_schema_id, json_schema_notes, json_schema_number_range,
    json_schema_object, secrets_of, HarvestContext, Tool, ToolTier,
};
use crate::validate::{self, parse_args, positive_id, MAX_HOURS};
use anyhow::Result;
use harvest_sdk::{CreateTimeEntryRequest, TimeEntry, UpdateTimeEntryRequest};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Tool to log a completed block of time
pub struct LogTimeTool {
    ctx: HarvestContext,
}

impl LogTimeTool {
    pub fn new(ctx: HarvestContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct LogTimeArgs {
    project_id: i64,
    task_id: i64,
    #[serde(default)]
    spent_date: Option<String>,
    hours: f64,
    #[serde(default)]
    notes: Option<String>,
}

fn notes_or_none(notes: Option<&str>) -> &str {
    match notes {
        Some(n) if !n.is_empty() => n,
        _ => "(none)",
    }
}

#[async_trait::async_trait]
impl Tool for LogTimeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "log_time".to_string(),
            description: "Log hours worked on a project task. Defaults to today when spent_date is omitted."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "project_id": json_schema_id("Harvest project ID"),
                    "task_id": json_schema_id("Harvest task ID (see list_project_tasks)"),
                    "spent_date": json_schema_date("Date worked, YYYY-MM-DD (default: today)"),
                    "hours": json_schema_number_range("Hours worked", 0.0, MAX_HOURS),
                    "notes": json_schema_notes("Description of the work")
                }),
                vec!["project_id", "task_id", "hours"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        const TOOL: &str = "log_time";
        let args: LogTimeArgs = parse_args(TOOL, arguments)?;

        let request = CreateTimeEntryRequest {
            project_id: positive_id(TOOL, "project_id", args.project_id)?,
            task_id: positive_id(TOOL, "task_id", args.task_id)?,
            spent_date: match args.spent_date.as_deref() {
                Some(date) => validate::spent_date(TOOL, date)?,
                None => self.ctx.clock.today(),
            },
            hours: Some(validate::hours(TOOL, args.hours)?),
            notes: args.notes.map(|n| validate::notes(TOOL, n)).transpose()?,
        };

        if let Err(rejected) = self.ctx.admit_write(TOOL) {
            return Ok(rejected);
        }

        match self.ctx.client.time_entries().create(&request).await {
            Ok(entry) => {
                info!(entry_id = entry.id, "Logged time entry");
                Ok(CallToolResult::success(format!(
                    "Successfully logged {} hours to {} - {}\nDate: {}\nNotes: {}\nEntry ID: {}",
                    format_hours(entry.hours),
                    entry.project.name,
                    entry.task.name,
                    entry.spent_date,
                    notes_or_none(entry.notes.as_deref()),
                    entry.id
                )))
            }
            Err(e) => Ok(self.ctx.failure(TOOL, &e)),
        }
    }

    fn tier(&self) -> ToolTier {
        ToolTier::Write
    }
}

/// Tool to summarise today's time entries
pub struct GetTodaysTimeTool {
    ctx: HarvestContext,
}

impl GetTodaysTimeTool {
    pub fn new(ctx: HarvestContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct GetTodaysTimeArgs {}

#[derive(Debug, Serialize)]
struct EntrySummary<'a> {
    id: u64,
    project: &'a str,
    task: &'a str,
    hours: f64,
    notes: Option<&'a str>,
    is_running: bool,
}

fn entry_summaries(entries: &[TimeEntry]) -> Vec<EntrySummary<'_>> {
    entries
        .iter()
        .map(|e| EntrySummary {
            id: e.id,
            project: &e.project.name,
            task: &e.task.name,
            hours: e.hours,
            notes: e.notes.as_deref(),
            is_running: e.is_running,
        })
        .collect()
}

#[async_trait::async_trait]
impl Tool for GetTodaysTimeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_todays_time".to_string(),
            description: "Show today's time entries with the total hours logged".to_string(),
            input_schema: json_schema_object(serde_json::json!({}), vec![]),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        const TOOL: &str = "get_todays_time";
        let _: GetTodaysTimeArgs = parse_args(TOOL, arguments)?;
        let today = self.ctx.clock.today();

        match self.ctx.client.time_entries().list(today, today).await {
            Ok(entries) => {
                let total: f64 = entries.iter().map(|e| e.hours).sum();
                let summaries = entry_summaries(&entries);
                Ok(CallToolResult::success(format!(
                    "Today's time entries ({}): {} total, {:.2} hours\n\n{}",
                    today,
                    entries.len(),
                    total,
                    serde_json::to_string_pretty(&summaries)?
                )))
            }
            Err(e) => {
                let credentials = self.ctx.current_credentials();
                let secrets = secrets_of(&credentials);
                warn!(
                    tool = TOOL,
                    error = %log_safe_message(&e, &secrets),
                    "Harvest request failed"
                );
                Ok(CallToolResult::error(format!(
                    "Error fetching today's time entries: {}",
                    raw_message(&e, &secrets)
                )))
            }
        }
    }
}

/// Tool to change selected fields of an existing entry
pub struct UpdateTimeEntryTool {
    ctx: HarvestContext,
}

impl UpdateTimeEntryTool {
    pub fn new(ctx: HarvestContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateTimeEntryArgs {
    time_entry_id: i64,
    #[serde(default)]
    project_id: Option<i64>,
    #[serde(default)]
    task_id: Option<i64>,
    #[serde(default)]
    spent_date: Option<String>,
    #[serde(default)]
    hours: Option<f64>,
    #[serde(default)]
    notes: Option<String>,
}

const TOOL_UPDATE: &str = "update_time_entry";

impl UpdateTimeEntryArgs {
    /// Build a patch holding only the fields the caller supplied.
    fn into_request(self) -> Result<(u64, UpdateTimeEntryRequest), validate::InvalidArguments> {
        let id = positive_id(TOOL_UPDATE, "time_entry_id", self.time_entry_id)?;
        let request = UpdateTimeEntryRequest {
            project_id: self
                .project_id
                .map(|v| positive_id(TOOL_UPDATE, "project_id", v))
                .transpose()?,
            task_id: self
                .task_id
                .map(|v| positive_id(TOOL_UPDATE, "task_id", v))
                .transpose()?,
            spent_date: self
                .spent_date
                .as_deref()
                .map(|d| validate::spent_date(TOOL_UPDATE, d))
                .transpose()?,
            hours: self
                .hours
                .map(|h| validate::hours(TOOL_UPDATE, h))
                .transpose()?,
            notes: self
                .notes
                .map(|n| validate::notes(TOOL_UPDATE, n))
                .transpose()?,
        };
        Ok((id, request))
    }
}

#[async_trait::async_trait]
impl Tool for UpdateTimeEntryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_UPDATE.to_string(),
            description: "Update an existing time entry. Only the fields you pass are changed."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "time_entry_id": json_schema_id("ID of the time entry to update"),
                    "project_id": json_schema_id("New Harvest project ID"),
                    "task_id": json_schema_id("New Harvest task ID"),
                    "spent_date": json_schema_date("New date, YYYY-MM-DD"),
                    "hours": json_schema_number_range("New number of hours", 0.0, MAX_HOURS),
                    "notes": json_schema_notes("New notes")
                }),
                vec!["time_entry_id"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: UpdateTimeEntryArgs = parse_args(TOOL_UPDATE, arguments)?;
        let (id, request) = args.into_request()?;

        if request.is_empty() {
            return Ok(CallToolResult::error(
                "Nothing to update: pass at least one of project_id, task_id, spent_date, hours or notes.",
            ));
        }

        if let Err(rejected) = self.ctx.admit_write(TOOL_UPDATE) {
            return Ok(rejected);
        }

        match self.ctx.client.time_entries().update(id, &request).await {
            Ok(entry) => {
                info!(entry_id = entry.id, fields = request.field_count(), "Updated time entry");
                Ok(CallToolResult::success(format!(
                    "Updated time entry {}\nProject: {}\nTask: {}\nHours: {}\nDate: {}\nNotes: {}",
                    entry.id,
                    entry.project.name,
                    entry.task.name,
                    format_hours(entry.hours),
                    entry.spent_date,
                    notes_or_none(entry.notes.as_deref())
                )))
            }
            Err(e) => Ok(self.ctx.failure(TOOL_UPDATE, &e)),
        }
    }

    fn tier(&self) -> ToolTier {
        ToolTier::Write
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{context_for, request_count, time_entry, ACCESS_TOKEN};
    use crate::validate::InvalidArguments;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_log_time_success_defaults_to_today() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/time_entries"))
            .and(body_json(serde_json::json!({
                "project_id": 12345,
                "task_id": 67890,
                "spent_date": "2025-01-15",
                "hours": 2.5,
                "notes": "Feature work"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(time_entry(555, 2.5, Some("Feature work"), false)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tool = LogTimeTool::new(context_for(&server, 30));
        let result = tool
            .execute(serde_json::json!({
                "project_id": 12345, "task_id": 67890, "hours": 2.5, "notes": "Feature work"
            }))
            .await
            .unwrap();

        assert!(!result.is_error());
        let text = result.text();
        assert!(text.starts_with("Successfully logged 2.5 hours to Website Redesign - Development"));
        assert!(text.contains("Date: 2025-01-15"));
        assert!(text.contains("Entry ID: 555"));
    }

    #[tokio::test]
    async fn test_log_time_rejects_out_of_range_hours() {
        let server = MockServer::start().await;

        let tool = LogTimeTool::new(context_for(&server, 30));
        for hours in [-1.0, 24.5] {
            let err = tool
                .execute(serde_json::json!({"project_id": 1, "task_id": 2, "hours": hours}))
                .await
                .unwrap_err();
            assert!(err.downcast_ref::<InvalidArguments>().is_some());
        }

        let err = tool
            .execute(serde_json::json!({
                "project_id": 1, "task_id": 2, "hours": 1, "spent_date": "2025/01/15"
            }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("spent_date"));
        assert_eq!(request_count(&server).await, 0);
    }

    #[tokio::test]
    async fn test_log_time_upstream_error_is_sanitized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/time_entries"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": format!("Bearer {} is not allowed to use this task", ACCESS_TOKEN)
            })))
            .mount(&server)
            .await;

        let tool = LogTimeTool::new(context_for(&server, 30));
        let result = tool
            .execute(serde_json::json!({"project_id": 1, "task_id": 2, "hours": 1}))
            .await
            .unwrap();

        assert!(result.is_error());
        assert!(result.text().starts_with("Harvest API error (422):"));
        assert!(!result.text().contains(ACCESS_TOKEN));
    }

    #[tokio::test]
    async fn test_get_todays_time_totals() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/time_entries"))
            .and(query_param("from", "2025-01-15"))
            .and(query_param("to", "2025-01-15"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "time_entries": [
                    time_entry(1, 1.0, Some("Standup"), false),
                    time_entry(2, 2.25, None, false),
                    time_entry(3, 0.5, Some("Review"), true)
                ],
                "next_page": null
            })))
            .mount(&server)
            .await;

        let tool = GetTodaysTimeTool::new(context_for(&server, 30));
        let result = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(!result.is_error());
        let text = result.text();
        assert!(text.starts_with("Today's time entries (2025-01-15): 3 total, 3.75 hours"));

        let json_start = text.find('[').unwrap();
        let entries: serde_json::Value = serde_json::from_str(&text[json_start..]).unwrap();
        assert_eq!(
            entries[2],
            serde_json::json!({
                "id": 3, "project": "Website Redesign", "task": "Development",
                "hours": 0.5, "notes": "Review", "is_running": true
            })
        );
    }

    #[tokio::test]
    async fn test_get_todays_time_never_throttled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/time_entries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "time_entries": [], "next_page": null
            })))
            .mount(&server)
            .await;

        // A ceiling of zero rejects every write but must not affect reads.
        let tool = GetTodaysTimeTool::new(context_for(&server, 0));
        let result = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(result.text().contains("0 total, 0.00 hours"));
    }

    #[tokio::test]
    async fn test_get_todays_time_error_reports_underlying_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/time_entries"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let tool = GetTodaysTimeTool::new(context_for(&server, 30));
        let result = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(result.is_error());
        assert_eq!(
            result.text(),
            "Error fetching today's time entries: API error (status 500): upstream exploded"
        );
    }

    #[test]
    fn test_update_patch_contains_only_supplied_fields() {
        let args: UpdateTimeEntryArgs =
            parse_args(TOOL_UPDATE, serde_json::json!({"time_entry_id": 9, "hours": 3.5})).unwrap();
        let (id, request) = args.into_request().unwrap();

        assert_eq!(id, 9);
        assert_eq!(request.field_count(), 1);
        assert_eq!(serde_json::to_value(&request).unwrap(), serde_json::json!({"hours": 3.5}));
    }

    #[tokio::test]
    async fn test_update_sends_partial_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/time_entries/555"))
            .and(body_json(serde_json::json!({"notes": "Refined estimate", "spent_date": "2025-01-14"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(time_entry(555, 2.0, Some("Refined estimate"), false)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tool = UpdateTimeEntryTool::new(context_for(&server, 30));
        let result = tool
            .execute(serde_json::json!({
                "time_entry_id": 555, "notes": "Refined estimate", "spent_date": "2025-01-14"
            }))
            .await
            .unwrap();

        assert!(!result.is_error());
        assert!(result.text().starts_with("Updated time entry 555\nProject: Website Redesign"));
        assert!(result.text().contains("Notes: Refined estimate"));
    }

    #[tokio::test]
    async fn test_empty_update_rejected_without_request_or_write_slot() {
        let server = MockServer::start().await;
        let ctx = context_for(&server, 30);

        let tool = UpdateTimeEntryTool::new(ctx.clone());
        let result = tool
            .execute(serde_json::json!({"time_entry_id": 555}))
            .await
            .unwrap();

        assert!(result.is_error());
        assert!(result.text().starts_with("Nothing to update"));
        assert_eq!(request_count(&server).await, 0);
        assert_eq!(ctx.throttle.in_window(), 0);
    }
}
