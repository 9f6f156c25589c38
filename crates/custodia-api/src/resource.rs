//! Entity resources: the request handlers for one entity type.
//!
//! Every handler runs the authorization gate first. Nothing touches the
//! store or the state machine until the gate has passed.

use axum::Json;
use axum::response::{IntoResponse, Response};
use custodia_acl::{EntityOperations, HasOperations};
use custodia_auth::{AuthorizationGate, Principal, RequestScope};
use custodia_entity::{Entity, EntityManager, EntityStore};
use custodia_models::{ACTOR_ARG, ORIGINAL_STATUS_ARG, Project, User};
use custodia_workflow::{RejectReason, TransitionArgs, Workflow, WorkflowError};
use http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::Result;

/// An entity type that can be served by an [`EntityResource`].
pub trait Resource: Entity + HasOperations<Operations = EntityOperations> + Serialize {
    /// Renders the entity for a response body.
    fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Fills server-maintained fields on a new entity.
    fn on_create(&mut self, _principal: &Principal) {}
}

impl Resource for Project {
    fn to_json(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.insert(
                "allowed_transitions".to_string(),
                json!(self.allowed_transitions()),
            );
        }
        Ok(value)
    }

    fn on_create(&mut self, principal: &Principal) {
        self.author_id = Some(principal.id);
    }
}

impl Resource for User {}

/// A successful response: status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// JSON body.
    pub body: Value,
}

impl ApiResponse {
    /// A 200 response.
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// A 201 response.
    pub fn created(body: Value) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Get / create / update / delete (and transition) handlers for `E`.
pub struct EntityResource<E, S> {
    gate: AuthorizationGate,
    manager: EntityManager<E, S>,
}

impl<E, S> EntityResource<E, S>
where
    E: Resource,
    S: EntityStore<E>,
{
    /// Creates a resource from a gate and a lifecycle manager.
    pub fn new(gate: AuthorizationGate, manager: EntityManager<E, S>) -> Self {
        Self { gate, manager }
    }

    /// The lifecycle manager.
    pub fn manager(&self) -> &EntityManager<E, S> {
        &self.manager
    }

    /// `GET /<entities>/<id>`
    pub fn get(&self, scope: &RequestScope, id: u64) -> Result<ApiResponse> {
        self.gate.authorize(scope, Some(&E::can_be().viewed))?;
        let entity = self.manager.get_or_not_found(id)?;
        Ok(ApiResponse::ok(entity.to_json()?))
    }

    /// `POST /<entities>`
    pub fn create(&self, scope: &RequestScope, mut entity: E) -> Result<ApiResponse> {
        let principal = self.gate.authorize(scope, Some(&E::can_be().created))?;
        entity.on_create(principal);
        self.manager.save(&mut entity, Some(&principal.email))?;
        Ok(ApiResponse::created(entity.to_json()?))
    }

    /// `PUT /<entities>/<id>`
    pub fn update(
        &self,
        scope: &RequestScope,
        id: u64,
        apply: impl FnOnce(&mut E),
    ) -> Result<ApiResponse> {
        let principal = self.gate.authorize(scope, Some(&E::can_be().edited))?;
        let mut entity = self.manager.get_or_not_found(id)?;
        apply(&mut entity);
        self.manager.save(&mut entity, Some(&principal.email))?;
        Ok(ApiResponse::ok(entity.to_json()?))
    }

    /// `DELETE /<entities>/<id>`
    pub fn delete(&self, scope: &RequestScope, id: u64) -> Result<ApiResponse> {
        let principal = self.gate.authorize(scope, Some(&E::can_be().deleted))?;
        let entity = self.manager.get_or_not_found(id)?;
        self.manager.delete(&entity, Some(&principal.email))?;
        Ok(ApiResponse::ok(json!({
            "message": format!("Entity has been deleted (PK: {id}).")
        })))
    }
}

impl<E, S> EntityResource<E, S>
where
    E: Resource + Workflow,
    S: EntityStore<E>,
{
    /// `PUT /<entities>/<id>/transition/<trigger>`
    ///
    /// Requires the `edited` operation. The trigger must be among the
    /// entity's allowed transitions. The entity is saved without an audit
    /// line and the transition's `after` hooks, which log the change, run
    /// only once that save has committed.
    pub fn transition(&self, scope: &RequestScope, id: u64, trigger: &str) -> Result<ApiResponse> {
        let principal = self.gate.authorize(scope, Some(&E::can_be().edited))?;
        let mut entity = self.manager.get_or_not_found(id)?;

        if !entity.allowed_transitions().iter().any(|t| t == trigger) {
            return Err(rejection(&entity, trigger).into());
        }

        let original = entity.current_state().to_string();
        let pending = entity.begin(
            trigger,
            TransitionArgs::new()
                .with(ORIGINAL_STATUS_ARG, original)
                .with(ACTOR_ARG, principal.email.as_str()),
        )?;
        self.manager.save_quiet(&mut entity)?;
        pending.finish(&entity);
        Ok(ApiResponse::ok(entity.to_json()?))
    }
}

/// The precise reason a trigger is not in the allowed list.
fn rejection<E: Workflow>(entity: &E, trigger: &str) -> WorkflowError {
    let machine = match entity.machine() {
        Ok(machine) => machine,
        Err(err) => return err,
    };
    let state = entity.current_state();
    let outcome = machine
        .prepare(entity, trigger, state, TransitionArgs::new())
        .map(|_| ());
    match outcome {
        Err(err) => err,
        Ok(()) => WorkflowError::illegal(trigger, state, RejectReason::NotFromState),
    }
}

impl<E, S> std::fmt::Debug for EntityResource<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityResource")
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}
