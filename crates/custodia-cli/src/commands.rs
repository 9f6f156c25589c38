//! Command handlers.
//!
//! Handlers write to the given sink so they can be driven from tests.

use std::io::Write;
use std::path::PathBuf;

use custodia_acl::PermissionResolver;
use custodia_core::{CustodiaConfig, Error, Role};
use custodia_models::Project;
use custodia_workflow::Workflow;

use crate::error::Result;

// ============================================================================
// Roles and permissions
// ============================================================================

/// `custodia roles`
pub fn cmd_roles(out: &mut impl Write) -> Result<()> {
    for role in Role::ALL {
        if role.is_baseline() {
            writeln!(out, "{}  {} (baseline)", role.value(), role.name())?;
        } else {
            writeln!(out, "{}  {}", role.value(), role.name())?;
        }
    }
    Ok(())
}

/// `custodia permissions --role <role>`
pub fn cmd_permissions(config: &CustodiaConfig, role: Role, out: &mut impl Write) -> Result<()> {
    let resolver = PermissionResolver::new(custodia_models::registry(), &config.permissions);
    let permissions = resolver.resolve(role);

    if permissions.is_empty() {
        writeln!(out, "(no permissions for {role})")?;
        return Ok(());
    }
    for (permission, needs) in &permissions {
        let needs: Vec<String> = needs.iter().map(ToString::to_string).collect();
        writeln!(out, "{permission}: {}", needs.join(", "))?;
    }
    Ok(())
}

// ============================================================================
// Workflow
// ============================================================================

/// `custodia workflow [--state <state>]`
///
/// Without a state, prints every transition of the project workflow.
/// With one, prints the triggers allowed from it.
pub fn cmd_workflow(state: Option<&str>, out: &mut impl Write) -> Result<()> {
    let Some(state) = state else {
        let project = Project::new("", "");
        let machine = project.machine()?;
        writeln!(out, "initial: {}", machine.initial())?;
        for transition in machine.transitions() {
            let sources: Vec<&str> = transition.sources().iter().map(String::as_str).collect();
            writeln!(
                out,
                "{}: {} -> {}",
                transition.trigger(),
                sources.join(", "),
                transition.dest()
            )?;
        }
        return Ok(());
    };

    let project = Project::new("", "").with_status(state);
    project.check_state()?;

    let allowed = project.allowed_transitions();
    if allowed.is_empty() {
        writeln!(out, "(no transitions from {state})")?;
    }
    for trigger in allowed {
        writeln!(out, "{trigger}")?;
    }
    Ok(())
}

// ============================================================================
// Config
// ============================================================================

/// `custodia config path`
pub fn cmd_config_path(explicit: Option<&str>, out: &mut impl Write) -> Result<()> {
    match CustodiaConfig::resolve_config_path(explicit) {
        Some((path, _)) => {
            writeln!(out, "{}", path.display())?;
            if !path.exists() {
                eprintln!("(file does not exist yet; run `custodia config init` to create it)");
            }
        }
        None => writeln!(out, "(no config directory on this platform)")?,
    }
    Ok(())
}

/// `custodia config show`
pub fn cmd_config_show(config: &CustodiaConfig, out: &mut impl Write) -> Result<()> {
    write!(out, "{}", config.to_toml_string()?)?;
    Ok(())
}

/// `custodia config init [--file <path>] [--force]`
pub fn cmd_config_init(
    explicit: Option<&str>,
    file: Option<&str>,
    force: bool,
    out: &mut impl Write,
) -> Result<()> {
    let path = match file {
        Some(file) => PathBuf::from(file),
        None => CustodiaConfig::resolve_config_path(explicit)
            .map(|(path, _)| path)
            .ok_or_else(|| Error::config("Could not determine a config file location"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        ))
        .into());
    }

    CustodiaConfig::default().write_to(&path)?;
    writeln!(out, "Config file created at {}", path.display())?;
    Ok(())
}
