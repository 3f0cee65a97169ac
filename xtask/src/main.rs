use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the repoclip test suite with cargo nextest
    Test {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
        /// Accept pending insta snapshots after the run
        #[arg(long)]
        accept: bool,
    },
    /// Check formatting and run clippy with warnings denied
    Lint,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Test {
            profile,
            release,
            accept,
        } => run_tests(profile, release, accept)?,
        Commands::Lint => run_lint()?,
    }
    Ok(())
}

fn run_tests(profile: Option<String>, release: bool, accept: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["nextest", "run", "-p", "repoclip"]);
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    if accept {
        cmd.env("INSTA_UPDATE", "always");
    }
    run("cargo nextest run", &mut cmd)
}

fn run_lint() -> Result<()> {
    run(
        "cargo fmt --check",
        Command::new("cargo").args(["fmt", "--all", "--check"]),
    )?;
    run(
        "cargo clippy",
        Command::new("cargo").args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]),
    )
}

fn run(label: &str, cmd: &mut Command) -> Result<()> {
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{label} failed");
    }
    Ok(())
}
