//! End-to-end resource handling over in-memory stores.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::response::IntoResponse;
use custodia_acl::PermissionResolver;
use custodia_api::{ApiError, EntityResource};
use custodia_auth::{AuthError, AuthorizationGate, Principal, RequestScope};
use custodia_core::{AuditConfig, PermissionsConfig, Role};
use chrono::DateTime;
use custodia_entity::{
    AuditSink, EntityError, EntityManager, EntityStore, FailPoint, MemoryAuditSink, MemoryStore,
    StorageError, Timestamps,
};
use custodia_models::{Project, User};
use custodia_workflow::{Workflow, WorkflowError};
use http::StatusCode;
use serde_json::{Value, json};

struct Harness {
    projects: EntityResource<Project, MemoryStore<Project>>,
    users: EntityResource<User, MemoryStore<User>>,
    project_store: Arc<MemoryStore<Project>>,
    user_store: Arc<MemoryStore<User>>,
    audit: Arc<MemoryAuditSink>,
}

impl Harness {
    fn new() -> Self {
        let resolver = PermissionResolver::new(
            custodia_models::registry(),
            &PermissionsConfig::default(),
        );
        let gate = AuthorizationGate::new(Arc::new(resolver));
        let audit = Arc::new(MemoryAuditSink::new());
        let project_store = Arc::new(MemoryStore::new());
        let user_store = Arc::new(MemoryStore::new());

        let projects = EntityResource::new(
            gate.clone(),
            EntityManager::new(
                Arc::clone(&project_store),
                audit.clone() as Arc<dyn AuditSink>,
                AuditConfig::default(),
            ),
        );
        let users = EntityResource::new(
            gate,
            EntityManager::new(
                Arc::clone(&user_store),
                audit.clone() as Arc<dyn AuditSink>,
                AuditConfig::default(),
            ),
        );

        Self {
            projects,
            users,
            project_store,
            user_store,
            audit,
        }
    }

    fn seed_project(&self) -> u64 {
        self.project_store
            .seed(Project::new("Survey", "Field survey").authored_by(1))
            .id
            .unwrap()
    }
}

fn scope(role: Role) -> RequestScope {
    RequestScope::authenticated(Principal::new(1, format!("{role}@example.com"), role))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_unauthenticated_never_reaches_storage() {
    let harness = Harness::new();
    let id = harness.seed_project();
    let anonymous = RequestScope::anonymous();

    let results = [
        harness.projects.get(&anonymous, id),
        harness
            .projects
            .create(&anonymous, Project::new("New", "Project")),
        harness
            .projects
            .update(&anonymous, id, |p| p.title = Some("Changed".into())),
        harness.projects.delete(&anonymous, id),
        harness.projects.transition(&anonymous, id, "complete"),
    ];

    for result in results {
        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::Unauthenticated)));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    assert_eq!(harness.project_store.calls().total(), 0);
    assert!(harness.audit.lines().is_empty());
    assert_eq!(
        harness.project_store.fetch_by_key(id).unwrap().unwrap().status(),
        Some("draft")
    );
}

#[test]
fn test_forbidden_before_storage() {
    let harness = Harness::new();
    let id = harness.seed_project();

    let err = harness.projects.delete(&scope(Role::Scientist), id).unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(err.body(), json!({"message": "Access denied"}));

    let err = harness.users.get(&scope(Role::Scientist), 1).unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    assert_eq!(harness.project_store.calls().total(), 0);
    assert_eq!(harness.user_store.calls().total(), 0);
}

#[test]
fn test_authenticated_can_view() {
    let harness = Harness::new();
    let id = harness.seed_project();

    let response = harness.projects.get(&scope(Role::Authenticated), id).unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Survey");
    assert_eq!(response.body["status"], "draft");
    assert_eq!(
        response.body["allowed_transitions"],
        json!(["complete", "archive"])
    );
}

#[test]
fn test_get_missing_is_not_found() {
    let harness = Harness::new();
    let err = harness.projects.get(&scope(Role::Admin), 404).unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_create_sets_author_and_audits() {
    let harness = Harness::new();
    let scope = RequestScope::authenticated(Principal::new(7, "sci@example.com", Role::Scientist));

    let response = harness
        .projects
        .create(&scope, Project::new("Survey", "Field survey"))
        .unwrap();

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["id"], 1);
    assert_eq!(response.body["author_id"], 7);
    assert!(response.body["created_at"].is_string());
    assert_eq!(response.body["created_at"], response.body["updated_at"]);
    assert_eq!(
        harness.audit.lines(),
        vec!["Project \"Survey\"[1] has been created by sci@example.com"]
    );
}

#[test]
fn test_create_invalid_is_unprocessable() {
    let harness = Harness::new();
    let err = harness
        .projects
        .create(&scope(Role::Admin), Project::new("", "Field survey"))
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        err.body(),
        json!({"errors": {"title": ["Shorter than minimum length 1."]}})
    );
    assert!(harness.project_store.is_empty());
}

#[test]
fn test_update_audits_as_updated() {
    let harness = Harness::new();
    let id = harness.seed_project();

    let response = harness
        .projects
        .update(&scope(Role::Scientist), id, |p| {
            p.description = Some("Revised".into())
        })
        .unwrap();

    assert_eq!(response.body["description"], "Revised");
    assert_eq!(
        harness.audit.lines(),
        vec!["Project \"Survey\"[1] has been updated by scientist@example.com"]
    );
}

#[test]
fn test_update_moves_updated_at_only() {
    let harness = Harness::new();
    let mut project = Project::new("Survey", "Field survey").authored_by(1);
    project.timestamps = Timestamps::at(DateTime::UNIX_EPOCH);
    let id = harness.project_store.seed(project).id.unwrap();

    let response = harness
        .projects
        .update(&scope(Role::Scientist), id, |p| {
            p.title = Some("Survey 2".into())
        })
        .unwrap();

    assert_eq!(response.body["created_at"], "1970-01-01T00:00:00Z");
    assert!(response.body["updated_at"].is_string());
    assert_ne!(response.body["updated_at"], "1970-01-01T00:00:00Z");
}

#[test]
fn test_delete_message() {
    let harness = Harness::new();
    let id = harness.seed_project();

    let response = harness.projects.delete(&scope(Role::Admin), id).unwrap();
    assert_eq!(
        response.body,
        json!({"message": "Entity has been deleted (PK: 1)."})
    );
    assert!(harness.project_store.is_empty());
    assert_eq!(
        harness.audit.lines(),
        vec!["Project \"Survey\"[1] has been deleted by admin@example.com"]
    );
}

#[test]
fn test_transition_fires_and_saves_quietly() {
    let harness = Harness::new();
    let id = harness.seed_project();

    let response = harness
        .projects
        .transition(&scope(Role::Scientist), id, "complete")
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "completed");
    assert_eq!(
        response.body["allowed_transitions"],
        json!(["back_to_draft", "archive"])
    );

    let stored = harness.project_store.fetch_by_key(id).unwrap().unwrap();
    assert_eq!(stored.current_state(), "completed");
    assert!(harness.audit.lines().is_empty());
}

#[test]
fn test_transition_twice_is_bad_request() {
    let harness = Harness::new();
    let id = harness.seed_project();
    let scope = scope(Role::Admin);

    harness.projects.transition(&scope, id, "complete").unwrap();
    let adds = harness.project_store.calls().add;

    let err = harness
        .projects
        .transition(&scope, id, "complete")
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Workflow(WorkflowError::IllegalTransition { .. })
    ));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.body(), json!({"message": "Transition is not allowed"}));
    assert_eq!(harness.project_store.calls().add, adds);
}

#[test]
fn test_unknown_trigger_is_bad_request() {
    let harness = Harness::new();
    let id = harness.seed_project();

    let err = harness
        .projects
        .transition(&scope(Role::Admin), id, "publish")
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Workflow(WorkflowError::UnknownTrigger { .. })
    ));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_transition_requires_edit() {
    let harness = Harness::new();
    let id = harness.seed_project();

    let err = harness
        .projects
        .transition(&scope(Role::Authenticated), id, "complete")
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(harness.project_store.calls().total(), 0);
}

#[test]
fn test_storage_failure_is_rolled_back() {
    let harness = Harness::new();
    let id = harness.seed_project();
    harness
        .project_store
        .fail_next(FailPoint::Commit, StorageError::backend("connection reset"));

    let err = harness
        .projects
        .transition(&scope(Role::Admin), id, "archive")
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Entity(EntityError::Storage(StorageError::Backend { .. }))
    ));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(harness.project_store.calls().rollback, 1);

    let stored = harness.project_store.fetch_by_key(id).unwrap().unwrap();
    assert_eq!(stored.current_state(), "draft");
}

#[test]
fn test_users_admin_only() {
    let harness = Harness::new();
    let admin = scope(Role::Admin);

    let response = harness
        .users
        .create(&admin, User::new("bob@example.com").with_role(Role::Scientist))
        .unwrap();
    assert_eq!(response.body["role"], 2);
    assert_eq!(response.body["status"], 1);

    let err = harness
        .users
        .create(&scope(Role::Scientist), User::new("eve@example.com"))
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(harness.user_store.len(), 1);
}

#[tokio::test]
async fn test_error_response_body() {
    let harness = Harness::new();
    let err = harness
        .projects
        .get(&RequestScope::anonymous(), 1)
        .unwrap_err();

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({"message": "Access denied"}));
}

#[tokio::test]
async fn test_success_response_body() {
    let harness = Harness::new();
    let id = harness.seed_project();

    let response = harness
        .projects
        .delete(&scope(Role::Admin), id)
        .unwrap()
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "Entity has been deleted (PK: 1)."})
    );
}
