//! New-project form: validation, creation, and post-create navigation.

use tracing::info;

use vellum_api::ApiClient;
use vellum_shared::Project;

use crate::events::EventSink;

/// The "Start a project" form.
#[derive(Debug)]
pub struct ProjectForm {
    api: ApiClient,
    events: EventSink,
    pub title: String,
    pub description: String,
    title_error: Option<&'static str>,
    creating: bool,
}

impl ProjectForm {
    pub fn new(api: ApiClient, events: EventSink) -> Self {
        Self {
            api,
            events,
            title: String::new(),
            description: String::new(),
            title_error: None,
            creating: false,
        }
    }

    /// Inline validation message for the title field, set by a failed
    /// submit and cleared by the next valid one.
    pub fn title_error(&self) -> Option<&'static str> {
        self.title_error
    }

    /// Whether a create request is in flight; drives the
    /// "Creating project..." headline state.
    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Submit the form. An empty title fails validation locally, with no
    /// network call. On success, navigates to the created project; on
    /// server failure, flashes and leaves the form editable.
    pub async fn submit(&mut self) -> Option<Project> {
        if !self.is_valid() {
            self.title_error = Some("Title is required.");
            return None;
        }
        self.title_error = None;
        self.creating = true;

        let description = self.description.trim();
        let description = (!description.is_empty()).then_some(description);
        let result = self.api.create_project(self.title.trim(), description).await;
        self.creating = false;

        match result {
            Ok(project) => {
                info!(project_id = project.id, "Project created");
                self.events.navigate_to_project(project.id);
                Some(project)
            }
            Err(e) => {
                self.events.flash_error("Error creating project", e);
                None
            }
        }
    }
}
