//! `husk print` — print one module's stub to stdout.

use std::path::PathBuf;

use husk_gen::Generator;

pub fn execute(
    snapshot: PathBuf,
    root: String,
    root_base: String,
    no_root_base: bool,
) -> anyhow::Result<()> {
    let graph = super::load_snapshot(&snapshot)?;
    let mut generator =
        Generator::new(&graph).with_policy(super::resolve_policy(&root_base, no_root_base));
    let text = generator.generate(&root)?;
    print!("{}", text);
    Ok(())
}
