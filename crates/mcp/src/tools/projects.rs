// Project and task discovery tools
//
// Both read from /users/me/project_assignments, which non-admin users can
// access, and always load every page before filtering.

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_id, json_schema_object, HarvestContext, Tool};
use crate::validate::{parse_args, positive_id};
use anyhow::Result;
use harvest_sdk::ProjectAssignment;
use serde::{Deserialize, Serialize};

/// Tool to list the projects the user can log time to
pub struct ListProjectsTool {
    ctx: HarvestContext,
}

impl ListProjectsTool {
    pub fn new(ctx: HarvestContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct ListProjectsArgs {}

#[derive(Debug, Serialize)]
struct ProjectSummary {
    id: u64,
    name: String,
    code: Option<String>,
    client: Option<String>,
    // Not exposed by the assignment endpoint.
    is_billable: Option<bool>,
    budget: Option<f64>,
}

fn project_summaries(assignments: Vec<ProjectAssignment>) -> Vec<ProjectSummary> {
    assignments
        .into_iter()
        .filter(|a| a.is_active)
        .filter_map(|a| {
            let project = a.project?;
            Some(ProjectSummary {
                id: project.id,
                name: project.name,
                code: project.code,
                client: a.client.map(|c| c.name),
                is_billable: None,
                budget: a.budget,
            })
        })
        .collect()
}

#[async_trait::async_trait]
impl Tool for ListProjectsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_projects".to_string(),
            description: "List the active Harvest projects you are assigned to, with client and budget"
                .to_string(),
            input_schema: json_schema_object(serde_json::json!({}), vec![]),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let _: ListProjectsArgs = parse_args("list_projects", arguments)?;

        match self.ctx.client.project_assignments().list_mine().await {
            Ok(assignments) => {
                let projects = project_summaries(assignments);
                Ok(CallToolResult::success(serde_json::to_string_pretty(&projects)?))
            }
            Err(e) => Ok(self.ctx.failure("list_projects", &e)),
        }
    }
}

/// Tool to list the tasks of one assigned project
pub struct ListProjectTasksTool {
    ctx: HarvestContext,
}

impl ListProjectTasksTool {
    pub fn new(ctx: HarvestContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct ListProjectTasksArgs {
    project_id: i64,
}

#[derive(Debug, Serialize)]
struct TaskSummary {
    id: u64,
    name: String,
    is_active: bool,
    billable: Option<bool>,
    hourly_rate: Option<f64>,
}

fn task_summaries(assignment: ProjectAssignment) -> Vec<TaskSummary> {
    assignment
        .task_assignments
        .into_iter()
        .filter(|t| t.is_active)
        .map(|t| TaskSummary {
            id: t.task.id,
            name: t.task.name,
            is_active: t.is_active,
            billable: t.billable,
            hourly_rate: t.hourly_rate,
        })
        .collect()
}

#[async_trait::async_trait]
impl Tool for ListProjectTasksTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_project_tasks".to_string(),
            description: "List the active tasks you can log time to on one of your projects"
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "project_id": json_schema_id("Harvest project ID (see list_projects)")
                }),
                vec!["project_id"],
            ),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        const TOOL: &str = "list_project_tasks";
        let args: ListProjectTasksArgs = parse_args(TOOL, arguments)?;
        let project_id = positive_id(TOOL, "project_id", args.project_id)?;

        match self
            .ctx
            .client
            .project_assignments()
            .find_by_project(project_id)
            .await
        {
            Ok(Some(assignment)) => {
                let tasks = task_summaries(assignment);
                Ok(CallToolResult::success(serde_json::to_string_pretty(&tasks)?))
            }
            Ok(None) => Ok(CallToolResult::error(format!(
                "No project assignment found for project_id {}. \
                 You may not be assigned to this project; use list_projects to see the projects you can log time to.",
                project_id
            ))),
            Err(e) => Ok(self.ctx.failure(TOOL, &e)),
        }
    }
}
