//! `tyguard types`: List registered type names.

use crate::commands::load_registry;
use std::path::PathBuf;

pub fn execute(config: Option<PathBuf>) -> anyhow::Result<()> {
    let registry = load_registry(config.as_deref())?;
    for name in registry.type_names() {
        let options = registry.options(name);
        if options.accept_undefined_properties {
            println!("{} (accepts undefined properties)", name);
        } else {
            println!("{}", name);
        }
    }
    Ok(())
}
