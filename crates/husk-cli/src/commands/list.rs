//! `husk list` — list module roots in a snapshot.

use std::path::PathBuf;

pub fn execute(snapshot: PathBuf) -> anyhow::Result<()> {
    let graph = super::load_snapshot(&snapshot)?;
    for module in graph.modules() {
        println!("{}\t{}", module.name, module.repr);
    }
    Ok(())
}
