//! Permission resolution over the registered model types.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use custodia_acl::{HasOperations, Need, PermissionResolver};
use custodia_auth::{AuthError, AuthorizationGate, Principal, RequestScope};
use custodia_core::{PermissionsConfig, Role};
use custodia_models::{Project, User, registry};
use proptest::prelude::*;

fn resolver() -> PermissionResolver {
    PermissionResolver::new(registry(), &PermissionsConfig::default())
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

#[test]
fn test_scientist_cannot_delete_projects() {
    let permissions = resolver().resolve(Role::Scientist);
    assert!(
        permissions
            .get("delete projects")
            .is_none_or(|needs| needs.is_empty())
    );
    assert!(!permissions["view projects"].is_empty());
}

#[test]
fn test_admin_permissions() {
    let permissions = resolver().resolve(Role::Admin);
    for permission in [
        "view projects",
        "edit projects",
        "create projects",
        "delete projects",
        "view users",
        "edit users",
        "create users",
        "delete users",
    ] {
        assert!(permissions.contains_key(permission), "{permission}");
    }
}

#[test]
fn test_authenticated_sees_projects_only() {
    let permissions = resolver().resolve(Role::Authenticated);
    assert_eq!(
        permissions.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["view projects"]
    );
}

#[test]
fn test_gate_over_models() {
    let gate = AuthorizationGate::new(Arc::new(resolver()));
    let scope = RequestScope::authenticated(Principal::new(2, "sci@example.com", Role::Scientist));

    assert!(gate.can(&scope, &Project::can_be().edited));
    assert!(!gate.can(&scope, &User::can_be().viewed));
    assert_eq!(
        gate.authorize(&scope, Some(&Project::can_be().deleted))
            .unwrap_err(),
        AuthError::Forbidden {
            permission: "delete projects".into()
        }
    );

    let needs = scope.needs().unwrap();
    assert!(needs.contains(&Need::Role(Role::Scientist)));
    assert!(needs.contains(&Need::action("view projects")));
}

proptest! {
    #[test]
    fn prop_every_role_extends_baseline(role in role_strategy()) {
        let resolver = resolver();
        let baseline = resolver.resolve(Role::BASELINE);
        let permissions = resolver.resolve(role);
        for (permission, needs) in &baseline {
            prop_assert!(permissions.get(permission).is_some_and(|held| held.is_superset(needs)));
        }
    }

    #[test]
    fn prop_gate_agrees_with_evaluate(role in role_strategy()) {
        let gate = AuthorizationGate::new(Arc::new(resolver()));
        let scope = RequestScope::authenticated(Principal::new(1, "p@example.com", role));
        let project_ops = Project::can_be();
        let user_ops = User::can_be();
        for op in [
            &project_ops.viewed,
            &project_ops.edited,
            &project_ops.created,
            &project_ops.deleted,
            &user_ops.viewed,
            &user_ops.deleted,
        ] {
            prop_assert_eq!(gate.can(&scope, op), op.evaluate(role));
        }
    }
}
