//! Projects: authored records with a draft / completed / archived workflow.

use std::fmt;
use std::sync::LazyLock;

use custodia_acl::{EntityOperations, HasOperations};
use custodia_core::Role;
use custodia_entity::{AUDIT_TARGET, Entity, Timestamps, ValidationErrors, format_label};
use custodia_workflow::{MachineCache, Transition, TransitionContext, Workflow};
use serde::{Deserialize, Serialize};

/// Hook argument carrying the status before a transition.
pub const ORIGINAL_STATUS_ARG: &str = "original_status";

/// Hook argument carrying the actor label.
pub const ACTOR_ARG: &str = "actor";

static OPERATIONS: LazyLock<EntityOperations> = LazyLock::new(|| {
    let mut ops = EntityOperations::new("projects");
    ops.created.grant([Role::Admin, Role::Scientist]);
    ops.viewed
        .grant([Role::Admin, Role::Scientist, Role::Authenticated]);
    ops.edited.grant([Role::Admin, Role::Scientist]);
    ops.deleted.grant([Role::Admin]);
    ops
});

/// The statuses a project moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    /// Being written.
    Draft,
    /// Finished.
    Completed,
    /// Retired.
    Archived,
}

impl ProjectStatus {
    /// Every status, in declaration order.
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Draft,
        ProjectStatus::Completed,
        ProjectStatus::Archived,
    ];

    /// The persisted label.
    pub const fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const STATES: &[&str] = &[
    ProjectStatus::Draft.as_str(),
    ProjectStatus::Completed.as_str(),
    ProjectStatus::Archived.as_str(),
];

/// A project record.
///
/// `status` is only changed through [`Workflow::fire`]; it is not accepted
/// from clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    /// Primary key.
    #[serde(default)]
    pub id: Option<u64>,

    /// Title, also the audit label.
    #[serde(default)]
    pub title: Option<String>,

    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,

    /// Id of the user who created the project.
    #[serde(default, skip_deserializing)]
    pub author_id: Option<u64>,

    #[serde(skip_deserializing, default = "Project::initial_status")]
    status: Option<String>,

    /// Creation and modification times.
    #[serde(flatten)]
    pub timestamps: Timestamps,

    #[serde(skip)]
    machine: MachineCache<Project>,
}

impl Project {
    /// A new draft project.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            status: Self::initial_status(),
            ..Self::default()
        }
    }

    /// Builder: set the author.
    pub fn authored_by(mut self, author_id: u64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Builder: set a persisted status, as when loading a stored row.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    fn initial_status() -> Option<String> {
        Some(ProjectStatus::Draft.as_str().to_string())
    }

    fn log_transition(&self, ctx: &TransitionContext) {
        let original = ctx.arg_str(ORIGINAL_STATUS_ARG).unwrap_or(ctx.source());
        let actor = ctx.arg_str(ACTOR_ARG).unwrap_or("Anonymous User");
        tracing::info!(
            target: AUDIT_TARGET,
            "Project {} status has changed from {original} to {} by {actor}",
            format_label(&self.label(), self.id),
            self.current_state(),
        );
    }
}

impl HasOperations for Project {
    const ENTITY: &'static str = "Project";
    type Operations = EntityOperations;

    fn can_be() -> &'static EntityOperations {
        &OPERATIONS
    }
}

impl Entity for Project {
    const TYPE_NAME: &'static str = "Project";

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    fn label(&self) -> String {
        self.title.clone().unwrap_or_default()
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.as_deref().is_some_and(str::is_empty) {
            errors.add("title", "Shorter than minimum length 1.");
        }
        if self.description.as_deref().is_some_and(str::is_empty) {
            errors.add("description", "Shorter than minimum length 1.");
        }
        errors.into_result()
    }
}

impl Workflow for Project {
    fn states() -> &'static [&'static str] {
        STATES
    }

    fn initial_state() -> &'static str {
        ProjectStatus::Draft.as_str()
    }

    fn transitions() -> Vec<Transition<Self>> {
        use ProjectStatus::*;

        vec![
            Transition::new("complete", [Draft.as_str()], Completed.as_str())
                .after(Project::log_transition),
            Transition::new("back_to_draft", [Completed.as_str()], Draft.as_str())
                .after(Project::log_transition),
            Transition::new("archive", [Draft.as_str(), Completed.as_str()], Archived.as_str())
                .after(Project::log_transition),
            Transition::new("restore", [Archived.as_str()], Draft.as_str())
                .after(Project::log_transition),
        ]
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn set_status(&mut self, status: String) {
        self.status = Some(status);
    }

    fn machine_cache(&self) -> &MachineCache<Self> {
        &self.machine
    }
}
