use super::{open_document, resolve};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{Document, Mutation, MutationResult};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Document file
    pub file: PathBuf,

    /// JSON array of mutations to replay in order
    pub script: PathBuf,

    /// Output file (defaults to rewriting the document in place)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let (mut doc, path) = open_document(cwd, &args.file)?;

    let script_path = resolve(cwd, &args.script);
    let script = fs::read_to_string(&script_path)
        .with_context(|| format!("Cannot read {}", script_path.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid script {}", script_path.display()))?;

    println!(
        "⚙️  {} {} mutation(s) to {}",
        "Applying".green().bold(),
        mutations.len(),
        args.file.display()
    );

    let results = replay(&mut doc, mutations)?;
    for result in results.iter().filter_map(|r| r.created.as_ref()) {
        println!("   {} Created #{}", "✓".green(), result);
    }

    let out = args.out.map(|o| resolve(cwd, &o)).unwrap_or(path);
    fs::write(&out, doc.to_json_pretty()?)?;
    info!(version = doc.version, path = %out.display(), "Wrote document");

    println!("✨ {} version {} → {}", "Done".green().bold(), doc.version, out.display());
    Ok(())
}

/// Apply mutations in order, stopping at the first rejected one
pub fn replay(doc: &mut Document, mutations: Vec<Mutation>) -> Result<Vec<MutationResult>> {
    let mut results = Vec::with_capacity(mutations.len());
    for (index, mutation) in mutations.into_iter().enumerate() {
        let name = mutation.name();
        let result = doc
            .apply(mutation)
            .with_context(|| format!("Mutation #{} ({}) failed", index + 1, name))?;
        results.push(result);
    }
    Ok(results)
}
