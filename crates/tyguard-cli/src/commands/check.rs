//! `tyguard check`: Check documents and report every failure.

use crate::commands::{load_registry, read_documents};
use crate::output::{self, StyledOutput};
use crate::Format;
use serde::Serialize;
use std::path::PathBuf;
use tyguard::TestResult;

/// Arguments for the check command.
pub struct CheckArgs {
    pub type_expr: String,
    pub files: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub lines: bool,
    pub format: Format,
    pub color: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    source: &'a str,
    #[serde(rename = "type")]
    type_expr: &'a str,
    result: &'a TestResult,
}

pub fn execute(args: CheckArgs) -> anyhow::Result<()> {
    let mut registry = load_registry(args.config.as_deref())?;
    // fail on a bad expression before reading any input
    registry.ensure_defaults();
    registry.compile(&args.type_expr)?;
    let documents = read_documents(&args.files, args.lines)?;

    let mut out = StyledOutput::new(output::resolve_color_choice(Some(&args.color)));
    let mut failures = 0usize;

    for document in &documents {
        let result = registry.check(&document.value, &args.type_expr)?;
        if !result.passed() {
            failures += 1;
        }

        match args.format {
            Format::Json => {
                let report = JsonReport {
                    source: &document.source,
                    type_expr: &args.type_expr,
                    result: &result,
                };
                println!("{}", serde_json::to_string(&report)?);
            }
            Format::Pretty => print_pretty(&mut out, &document.source, &result),
        }
    }

    if args.format == Format::Pretty {
        print_summary(&mut out, documents.len(), failures);
    }
    out.flush();

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_pretty(out: &mut StyledOutput, source: &str, result: &TestResult) {
    if result.passed() {
        out.pass_badge();
    } else {
        out.fail_badge();
    }
    out.plain(&format!("  {}", source));
    out.newline();

    if !result.passed() {
        out.failure_tree(result, 0);
    }
}

fn print_summary(out: &mut StyledOutput, total: usize, failures: usize) {
    out.newline();
    out.bold("Documents: ");
    if failures > 0 {
        out.error(&format!("{} failed", failures));
        out.plain(", ");
    }
    out.plain(&format!("{} passed, {} total", total - failures, total));
    out.newline();
}
