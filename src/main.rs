use std::path::PathBuf;

use anyhow::{Context, Result};

const USAGE: &str = "usage: boxmark <task.json> [script.json]";

fn main() -> Result<()> {
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let task = args.next().context(USAGE)?;
    let script = args.next();

    let summary = boxmark::run(&task, script.as_deref())
        .with_context(|| format!("failed to replay {}", task.display()))?;

    println!(
        "{} step(s) replayed, {} annotation(s), {}",
        summary.steps,
        summary.annotations,
        if summary.saved { "saved" } else { "nothing to save" }
    );
    Ok(())
}
