//! `husk generate` — write stub artifacts for snapshot modules.

use std::path::PathBuf;

use anyhow::bail;
use rustc_hash::FxHashSet;

use husk_gen::{DirectorySink, Generator};
use husk_object::ObjectGraph;

use crate::output::CliOutput;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    snapshot: PathBuf,
    roots: Vec<String>,
    all: bool,
    builtin_only: bool,
    exclude: Vec<String>,
    out_dir: Option<PathBuf>,
    root_base: String,
    no_root_base: bool,
) -> anyhow::Result<()> {
    let graph = super::load_snapshot(&snapshot)?;
    let selected = select_roots(&graph, roots, all, builtin_only)?;
    let out_dir = resolve_out_dir(out_dir);
    let exclude: FxHashSet<String> = exclude.into_iter().collect();

    let mut sink = DirectorySink::new(&out_dir);
    let mut generator =
        Generator::new(&graph).with_policy(super::resolve_policy(&root_base, no_root_base));
    let report = generator.generate_batch(&selected, &exclude, &mut sink);

    let mut out = CliOutput::stdout();
    for root in &report.generated {
        out.generated(root);
    }
    for root in &report.skipped {
        out.skipped(root);
    }
    for (root, error) in &report.failed {
        out.failed(root, error);
    }
    out.summary(&report);

    if !report.all_ok() {
        bail!("{} of {} roots failed", report.failed.len(), selected.len());
    }
    Ok(())
}

/// Roots to process: explicit names, every module, or built-in modules only.
fn select_roots(
    graph: &ObjectGraph,
    roots: Vec<String>,
    all: bool,
    builtin_only: bool,
) -> anyhow::Result<Vec<String>> {
    if all || builtin_only {
        return Ok(graph
            .modules()
            .filter(|module| !builtin_only || module.builtin)
            .map(|module| module.name.clone())
            .collect());
    }
    if roots.is_empty() {
        bail!("no roots given; pass module names, --all, or --builtin-only");
    }
    Ok(roots)
}

/// Output directory: the flag wins, then `HUSK_STUBS_PATH`, then `_stubs`.
fn resolve_out_dir(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    match std::env::var_os("HUSK_STUBS_PATH") {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from("_stubs"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> ObjectGraph {
        let mut graph = ObjectGraph::new();
        graph.add_module("engine", true).unwrap();
        graph.add_module("helpers", false).unwrap();
        graph.add_module("physics", true).unwrap();
        graph
    }

    #[test]
    fn test_select_explicit_roots() {
        let graph = sample_graph();
        let roots = select_roots(&graph, vec!["engine".to_string()], false, false).unwrap();
        assert_eq!(roots, vec!["engine"]);
    }

    #[test]
    fn test_select_all_roots_sorted() {
        let graph = sample_graph();
        let roots = select_roots(&graph, Vec::new(), true, false).unwrap();
        assert_eq!(roots, vec!["engine", "helpers", "physics"]);
    }

    #[test]
    fn test_select_builtin_only() {
        let graph = sample_graph();
        let roots = select_roots(&graph, Vec::new(), false, true).unwrap();
        assert_eq!(roots, vec!["engine", "physics"]);
    }

    #[test]
    fn test_select_requires_roots_or_flag() {
        let graph = sample_graph();
        assert!(select_roots(&graph, Vec::new(), false, false).is_err());
    }

    #[test]
    fn test_out_dir_flag_wins() {
        let dir = resolve_out_dir(Some(PathBuf::from("custom")));
        assert_eq!(dir, PathBuf::from("custom"));
    }
}
