// Tool trait, registry and JSON schema helpers

use crate::protocol::{CallToolResult, ToolAnnotations, ToolSchema};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments.
    ///
    /// Upstream failures come back as error-flagged results; `Err` is kept
    /// for arguments that fail validation.
    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult>;

    /// Whether the tool only reads or also writes
    fn tier(&self) -> ToolTier {
        ToolTier::Read
    }
}

/// Tool access tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ToolTier {
    /// Read-only operations, never throttled
    Read,
    /// Creates or changes time entries, subject to the write throttle
    Write,
}

impl ToolTier {
    fn annotations(self) -> ToolAnnotations {
        ToolAnnotations {
            read_only_hint: self == ToolTier::Read,
            destructive_hint: false,
            idempotent_hint: self == ToolTier::Read,
            open_world_hint: true,
        }
    }
}

/// Tool registry for managing available tools
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        self.tools.insert(schema.name.clone(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas, sorted by name
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .values()
            .map(|t| {
                let mut schema = t.schema();
                schema.annotations.get_or_insert_with(|| t.tier().annotations());
                schema
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_id(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "integer",
        "exclusiveMinimum": 0,
        "description": description
    })
}

pub fn json_schema_number_range(description: &str, minimum: f64, maximum: f64) -> serde_json::Value {
    serde_json::json!({
        "type": "number",
        "minimum": minimum,
        "maximum": maximum,
        "description": description
    })
}

pub fn json_schema_date(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "pattern": crate::validate::DATE_PATTERN,
        "description": description
    })
}

pub fn json_schema_notes(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "maxLength": crate::validate::MAX_NOTES_LEN,
        "description": description
    })
}
