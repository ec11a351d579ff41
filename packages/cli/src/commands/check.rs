use super::open_document;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use folio_tree::Tree;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document file
    pub file: PathBuf,

    /// Treat unreachable nodes as an error
    #[arg(long)]
    pub strict: bool,
}

/// Result of checking one document
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub reachable: usize,
    pub unreachable: Vec<String>,
    pub node_count: u64,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    println!("🔍 {} {}", "Checking".green().bold(), args.file.display());

    // Loading already rejects dangling and shared children
    let (doc, _) = open_document(cwd, &args.file)?;
    let report = check_tree(doc.tree())?;

    println!("   Reachable nodes: {}", report.reachable);
    println!("   Next id after: {}", report.node_count);

    if !report.unreachable.is_empty() {
        println!(
            "   {} {} unreachable: {}",
            "Garbage:".yellow(),
            report.unreachable.len(),
            report.unreachable.join(", ")
        );
        if args.strict {
            bail!("{} unreachable node(s)", report.unreachable.len());
        }
    }

    println!("✨ {}", "Document is consistent".green().bold());
    Ok(())
}

pub fn check_tree(tree: &Tree) -> Result<CheckReport> {
    tree.check_invariants()?;
    Ok(CheckReport {
        reachable: tree.walk().len(),
        unreachable: tree.unreachable().into_iter().map(str::to_string).collect(),
        node_count: tree.node_count(),
    })
}
