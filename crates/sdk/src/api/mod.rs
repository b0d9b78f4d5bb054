//! Harvest API endpoint groups.

pub mod project_assignments;
pub mod time_entries;

pub use project_assignments::{
    ClientRef, ProjectAssignment, ProjectAssignmentsApi, ProjectRef, TaskAssignment,
};
pub use time_entries::{
    CreateTimeEntryRequest, NamedRef, TimeEntriesApi, TimeEntry, UpdateTimeEntryRequest,
};
