//! Resource tool handlers.
//!
//! One handler per tool: validate and extract typed parameters from the
//! resolved argument map, issue the matching backend call, and return
//! the decoded value unchanged.

pub(crate) mod args;
mod issues;
mod labels;
mod milestones;
mod projects;

use crate::registry::Registry;

/// Register the full resource tool catalogue.
pub(crate) fn register_all(registry: &mut Registry) {
    issues::register(registry);
    labels::register(registry);
    milestones::register(registry);
    projects::register(registry);
}
