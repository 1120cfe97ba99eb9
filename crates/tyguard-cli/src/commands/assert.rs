//! `tyguard assert`: Stop at the first document that does not match.

use crate::commands::{load_registry, read_documents};
use crate::output::{self, StyledOutput};
use std::path::PathBuf;

/// Arguments for the assert command.
pub struct AssertArgs {
    pub type_expr: String,
    pub files: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub lines: bool,
    pub color: String,
}

pub fn execute(args: AssertArgs) -> anyhow::Result<()> {
    let mut registry = load_registry(args.config.as_deref())?;
    registry.ensure_defaults();
    registry.compile(&args.type_expr)?;
    let documents = read_documents(&args.files, args.lines)?;

    let mut out = StyledOutput::new(output::resolve_color_choice(Some(&args.color)));

    for document in &documents {
        match registry.assert(&document.value, &args.type_expr) {
            Ok(()) => {}
            Err(e) if e.is_assertion() => {
                out.fail_badge();
                out.plain(&format!("  {}", document.source));
                out.newline();
                out.flush();
                out.stderr_error(&e.to_string());
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        }
    }

    out.pass_badge();
    out.plain(&format!("  {} document(s) match \"{}\"", documents.len(), args.type_expr));
    out.newline();
    out.flush();
    Ok(())
}
