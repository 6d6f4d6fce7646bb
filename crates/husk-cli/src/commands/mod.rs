//! CLI subcommand implementations.

pub mod generate;
pub mod list;
pub mod print;

use std::path::Path;

use anyhow::Context;
use husk_gen::{NoSyntheticRoot, RootPolicy, SyntheticRoot};
use husk_object::ObjectGraph;

/// Load and validate a snapshot file.
pub fn load_snapshot(path: &Path) -> anyhow::Result<ObjectGraph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read snapshot '{}'", path.display()))?;
    ObjectGraph::from_json(&text)
        .with_context(|| format!("cannot load snapshot '{}'", path.display()))
}

/// Resolve the fallback-base policy from CLI flags.
pub fn resolve_policy(root_base: &str, no_root_base: bool) -> Box<dyn RootPolicy> {
    if no_root_base {
        Box::new(NoSyntheticRoot)
    } else {
        Box::new(SyntheticRoot::new(root_base))
    }
}
