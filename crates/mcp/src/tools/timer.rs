// Running timer tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    format_hours, json_schema_id, json_schema_notes, json_schema_object, HarvestContext, Tool,
    ToolTier,
};
use crate::validate::{self, parse_args, positive_id};
use anyhow::Result;
use harvest_sdk::CreateTimeEntryRequest;
use serde::Deserialize;
use tracing::info;

/// Tool to start a timer on a project task for today
pub struct StartTimerTool {
    ctx: HarvestContext,
}

impl StartTimerTool {
    pub fn new(ctx: HarvestContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct StartTimerArgs {
    project_id: i64,
    task_id: i64,
    #[serde(default)]
    notes: Option<String>,
}

#[async_trait::async_trait]
impl Tool for StartTimerTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "start_timer".to_string(),
            description: "Start a running timer on a project task for today".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "project_id": json_schema_id("Harvest project ID"),
                    "task_id": json_schema_id("Harvest task ID (see list_project_tasks)"),
                    "notes": json_schema_notes("What you are working on")
                }),
                vec!["project_id", "task_id"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        const TOOL: &str = "start_timer";
        let args: StartTimerArgs = parse_args(TOOL, arguments)?;

        // No hours: Harvest starts the entry as a running timer.
        let request = CreateTimeEntryRequest {
            project_id: positive_id(TOOL, "project_id", args.project_id)?,
            task_id: positive_id(TOOL, "task_id", args.task_id)?,
            spent_date: self.ctx.clock.today(),
            hours: None,
            notes: args.notes.map(|n| validate::notes(TOOL, n)).transpose()?,
        };

        if let Err(rejected) = self.ctx.admit_write(TOOL) {
            return Ok(rejected);
        }

        match self.ctx.client.time_entries().create(&request).await {
            Ok(entry) => {
                info!(entry_id = entry.id, "Started timer");
                let mut text = format!(
                    "Started timer for {} - {}\nEntry ID: {}",
                    entry.project.name, entry.task.name, entry.id
                );
                if let Some(notes) = entry.notes.as_deref().filter(|n| !n.is_empty()) {
                    text.push_str(&format!("\nNotes: {}", notes));
                }
                Ok(CallToolResult::success(text))
            }
            Err(e) => Ok(self.ctx.failure(TOOL, &e)),
        }
    }

    fn tier(&self) -> ToolTier {
        ToolTier::Write
    }
}

/// Tool to stop a running timer
pub struct StopTimerTool {
    ctx: HarvestContext,
}

impl StopTimerTool {
    pub fn new(ctx: HarvestContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct StopTimerArgs {
    time_entry_id: i64,
}

#[async_trait::async_trait]
impl Tool for StopTimerTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "stop_timer".to_string(),
            description: "Stop a running timer and report the hours it logged".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "time_entry_id": json_schema_id("ID of the running time entry")
                }),
                vec!["time_entry_id"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        const TOOL: &str = "stop_timer";
        let args: StopTimerArgs = parse_args(TOOL, arguments)?;
        let id = positive_id(TOOL, "time_entry_id", args.time_entry_id)?;

        if let Err(rejected) = self.ctx.admit_write(TOOL) {
            return Ok(rejected);
        }

        match self.ctx.client.time_entries().stop(id).await {
            Ok(entry) => {
                info!(entry_id = entry.id, hours = entry.hours, "Stopped timer");
                Ok(CallToolResult::success(format!(
                    "Stopped timer: {} hours logged to {} - {}\nEntry ID: {}",
                    format_hours(entry.hours),
                    entry.project.name,
                    entry.task.name,
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
