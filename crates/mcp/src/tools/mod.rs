pub mod projects;
mod registry;
#[cfg(test)]
mod test_support;
pub mod time_entries;
pub mod timer;

pub use projects::{ListProjectTasksTool, ListProjectsTool};
pub use registry::{
    json_schema_date, json_schema_id, json_schema_notes, json_schema_number_range,
    json_schema_object, Tool, ToolRegistry, ToolTier,
};
pub use time_entries::{GetTodaysTimeTool, LogTimeTool, UpdateTimeEntryTool};
pub use timer::{StartTimerTool, StopTimerTool};

use crate::clock::Clock;
use crate::protocol::CallToolResult;
use crate::sanitize::{log_safe_message, user_message};
use crate::throttle::WriteThrottle;
use harvest_sdk::{Credentials, HarvestClient, HarvestError};
use std::sync::Arc;
use tracing::warn;

/// Dependencies shared by every Harvest tool.
#[derive(Clone)]
pub struct HarvestContext {
    pub client: HarvestClient,
    pub throttle: Arc<WriteThrottle>,
    pub clock: Arc<dyn Clock>,
}

impl HarvestContext {
    pub fn new(client: HarvestClient, throttle: Arc<WriteThrottle>, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            throttle,
            clock,
        }
    }

    /// Credentials the next request would carry, if they resolve.
    pub(crate) fn current_credentials(&self) -> Option<Credentials> {
        self.client.current_credentials().ok()
    }

    /// Error envelope for an upstream failure, logged without credentials.
    pub(crate) fn failure(&self, tool: &str, err: &HarvestError) -> CallToolResult {
        let credentials = self.current_credentials();
        let secrets = secrets_of(&credentials);
        warn!(tool, error = %log_safe_message(err, &secrets), "Harvest request failed");
        CallToolResult::error(user_message(err, &secrets))
    }

    /// Take a write slot, or produce the rejection envelope.
    pub(crate) fn admit_write(&self, tool: &str) -> Result<(), CallToolResult> {
        self.throttle.check().map_err(|e| {
            warn!(
                tool,
                max_writes = e.max_writes,
                window_secs = e.window_secs,
                "Write throttled"
            );
            CallToolResult::error(e.to_string())
        })
    }
}

/// Register all seven Harvest tools.
pub fn register_harvest_tools(registry: &mut ToolRegistry, ctx: &HarvestContext) {
    registry.register(Arc::new(ListProjectsTool::new(ctx.clone())));
    registry.register(Arc::new(ListProjectTasksTool::new(ctx.clone())));
    registry.register(Arc::new(LogTimeTool::new(ctx.clone())));
    registry.register(Arc::new(GetTodaysTimeTool::new(ctx.clone())));
    registry.register(Arc::new(StartTimerTool::new(ctx.clone())));
    registry.register(Arc::new(StopTimerTool::new(ctx.clone())));
    registry.register(Arc::new(UpdateTimeEntryTool::new(ctx.clone())));
}

/// Secret values to mask in text derived from an upstream failure.
pub(crate) fn secrets_of(credentials: &Option<Credentials>) -> Vec<&str> {
    credentials
        .as_ref()
        .map(|c| c.secrets().to_vec())
        .unwrap_or_default()
}

/// Render a number of hours without trailing noise, e.g. `2.5` or `3`.
pub(crate) fn format_hours(hours: f64) -> String {
    let rounded = (hours * 100.0).round() / 100.0;
    format!("{}", rounded)
}
