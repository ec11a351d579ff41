use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_editor::RemovalPolicy;
use folio_tree::TreePayload;
use std::fs;
use std::path::PathBuf;

pub const STUB_DOCUMENT_NAME: &str = "untitled.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Document directory
    #[arg(short, long, default_value = "documents")]
    pub document_dir: String,

    /// Purge removed subtrees instead of keeping them in the file
    #[arg(long)]
    pub purge: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Folio project...".bright_blue().bold());

    let config = Config {
        removal_policy: if args.purge {
            RemovalPolicy::Purge
        } else {
            RemovalPolicy::Retain
        },
        catalog: None,
        document_dir: args.document_dir.clone(),
    };

    let document_dir = config.get_document_dir(cwd);
    if !document_dir.exists() {
        fs::create_dir_all(&document_dir)?;
        println!("  {} Created {}/", "✓".green(), args.document_dir);
    }

    let stub = document_dir.join(STUB_DOCUMENT_NAME);
    if !stub.exists() || args.force {
        fs::write(&stub, TreePayload::empty_document().to_json_pretty()?)?;
        println!("  {} Created {}", "✓".green(), STUB_DOCUMENT_NAME);
    }

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: folio show {}/{}", args.document_dir, STUB_DOCUMENT_NAME);
    println!("  2. Write an edit script and run: folio apply <file> <script.json>");

    Ok(())
}
