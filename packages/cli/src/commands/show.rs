use super::open_document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_tree::{Node, Tree};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Document file
    pub file: PathBuf,

    /// Print the serialized payload instead of the outline
    #[arg(long)]
    pub json: bool,
}

pub fn show(args: ShowArgs, cwd: &str) -> Result<()> {
    let (doc, path) = open_document(cwd, &args.file)?;

    if args.json {
        println!("{}", doc.to_json_pretty()?);
        return Ok(());
    }

    let title = doc
        .tree()
        .extra()
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("(untitled)");
    println!("📄 {} {}", title.bold(), path.display().to_string().dimmed());

    for line in outline(doc.tree()) {
        println!("{}", line);
    }

    let garbage = doc.tree().unreachable().len();
    if garbage > 0 {
        println!();
        println!("   {} {} unreachable node(s) kept in file", "note:".yellow(), garbage);
    }

    Ok(())
}

/// One line per reachable node, indented by depth, in reading order
pub fn outline(tree: &Tree) -> Vec<String> {
    tree.walk()
        .into_iter()
        .map(|(depth, node)| format!("{}{}", "  ".repeat(depth + 1), describe(node)))
        .collect()
}

fn describe(node: &Node) -> String {
    let mut line = format!("{} #{}", node.node_type(), node.id());
    for (key, value) in node.attributes() {
        match value {
            Value::String(s) if s.is_empty() => {}
            Value::String(s) => line.push_str(&format!(" {}={:?}", key, s)),
            other => line.push_str(&format!(" {}={}", key, other)),
        }
    }
    line
}
