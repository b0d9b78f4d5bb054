//! List the projects and tasks the authenticated user can log time to.
//!
//! Run with:
//! HARVEST_ACCOUNT_ID=... HARVEST_ACCESS_TOKEN=... cargo run --example list_assignments

use harvest_sdk::{EnvCredentials, HarvestClient, HarvestResult};

#[tokio::main]
async fn main() -> HarvestResult<()> {
    tracing_subscriber::fmt::init();

    EnvCredentials::new().validate()?;
    let client = HarvestClient::builder().build()?;

    let assignments = client.project_assignments().list_mine().await?;
    println!("Found {} project assignments", assignments.len());

    for assignment in assignments.iter().filter(|a| a.is_active) {
        let Some(project) = &assignment.project else {
            continue;
        };
        let client_name = assignment
            .client
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        println!("\n{} [{}] ({})", project.name, project.id, client_name);

        for task in assignment.task_assignments.iter().filter(|t| t.is_active) {
            println!("  - {} [{}]", task.task.name, task.task.id);
        }
    }

    Ok(())
}
