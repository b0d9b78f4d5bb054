//! Project assignment endpoints.
//!
//! `/users/me/project_assignments` is readable by any user, unlike the global
//! project listing which needs administrator or manager rights.

use crate::client::HarvestClient;
use crate::error::HarvestResult;
use crate::pagination::{collect_all, Page, Paginated};
use serde::{Deserialize, Serialize};

/// Project assignments API for the authenticated user.
pub struct ProjectAssignmentsApi<'a> {
    client: &'a HarvestClient,
}

impl<'a> ProjectAssignmentsApi<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    /// List every project assignment of the current user, across all pages.
    pub async fn list_mine(&self) -> HarvestResult<Vec<ProjectAssignment>> {
        collect_all::<ProjectAssignmentsPage>(
            &self.client.http,
            "users/me/project_assignments",
            &[],
        )
        .await
    }

    /// Find the assignment for one project.
    ///
    /// Scans the fully materialised list, so a match on a later page is found.
    pub async fn find_by_project(&self, project_id: u64) -> HarvestResult<Option<ProjectAssignment>> {
        let assignments = self.list_mine().await?;
        Ok(assignments
            .into_iter()
            .find(|a| a.project.as_ref().map(|p| p.id) == Some(project_id)))
    }
}

/// A user's assignment to a project, with its task assignments embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAssignment {
    pub id: u64,
    pub is_active: bool,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default)]
    pub client: Option<ClientRef>,
    #[serde(default)]
    pub task_assignments: Vec<TaskAssignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: u64,
    pub name: String,
}

/// A task available on an assigned project, with billing attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub id: u64,
    pub is_active: bool,
    #[serde(default)]
    pub billable: Option<bool>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    pub task: TaskRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectAssignmentsPage {
    project_assignments: Vec<ProjectAssignment>,
    next_page: Option<u32>,
}

impl Paginated for ProjectAssignmentsPage {
    type Item = ProjectAssignment;

    fn into_page(self) -> Page<ProjectAssignment> {
        Page {
            items: self.project_assignments,
            next_page: self.next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Credentials, StaticCredentials};
    use crate::RetryConfig;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn assignment(id: u64, project_id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "is_active": true,
            "budget": null,
            "project": {"id": project_id, "name": format!("Project {}", project_id), "code": "P"},
            "client": {"id": 5, "name": "Acme"},
            "task_assignments": [
                {"id": 900, "billable": true, "is_active": true, "hourly_rate": 100.0,
                 "task": {"id": 67890, "name": "Development"}}
            ]
        })
    }

    async fn client_for(server: &MockServer) -> HarvestClient {
        HarvestClient::builder()
            .base_url(server.uri())
            .retry_config(RetryConfig::no_retry())
            .credentials(Arc::new(StaticCredentials::new(Credentials::new("1", "t"))))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_find_by_project_on_second_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/project_assignments"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "project_assignments": [assignment(1, 100)],
                "next_page": 2
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/me/project_assignments"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "project_assignments": [assignment(2, 12345)],
                "next_page": null
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let found = client
            .project_assignments()
            .find_by_project(12345)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, 2);
        assert_eq!(found.task_assignments[0].task.name, "Development");
        assert_eq!(found.client.unwrap().name, "Acme");
    }

    #[tokio::test]
    async fn test_missing_required_field_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/project_assignments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "project_assignments": [{"id": 1}],
                "next_page": null
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client.project_assignments().list_mine().await;

        assert!(matches!(result, Err(crate::HarvestError::Decode(_))));
    }
}
