use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for tableau")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full gate: fmt, clippy, tests, doc, determinism
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Run the CLI determinism check (two identical headless runs)
    Determinism,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            for step in [
                Commands::Fmt,
                Commands::Clippy,
                Commands::Test,
                Commands::Doc,
                Commands::Determinism,
            ] {
                run(&step)?;
            }
            Ok(())
        }
        step => run(&step),
    }
}

fn run(step: &Commands) -> Result<()> {
    let (label, args): (_, &[&str]) = match step {
        Commands::Fmt => ("cargo fmt --check", &["fmt", "--all", "--", "--check"]),
        Commands::Clippy => (
            "cargo clippy",
            &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        ),
        Commands::Test => ("cargo test", &["test", "--workspace"]),
        Commands::Doc => ("cargo doc", &["doc", "--workspace", "--no-deps"]),
        Commands::Determinism => (
            "tableau-cli determinism",
            &["run", "-p", "tableau-cli", "--", "determinism"],
        ),
        Commands::Check => unreachable!("check expands to its steps"),
    };

    println!("==> {label}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{label} failed");
    }
    Ok(())
}
