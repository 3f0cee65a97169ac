//! Command-line interface.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::Shell;
use tracing::Level;

use crate::app::export::DocumentFormat;
use crate::app::pipeline::{Delivery, Pipeline, RunOptions, RunOutcome};
use crate::app::selection::{AcceptDefaults, Selector};
use crate::infra::clipboard::Clipboard;
use crate::infra::config::{Config, split_list};
use crate::infra::logging;
use crate::ui::TerminalSelector;

/// Compile selected repository files, plus an optional commit diff, into one
/// clipboard-ready document.
#[derive(Debug, Parser)]
#[command(name = "repoclip", author, version, about, long_about = None)]
pub struct Cli {
    /// Repository root to collect files from
    #[arg(value_name = "ROOT", required_unless_present = "completions")]
    pub root: Option<PathBuf>,

    /// Revision to diff the working tree against; touched files start selected
    #[arg(short, long, value_name = "REV")]
    pub commit: Option<String>,

    /// Leave the diff out even when --commit is given
    #[arg(long)]
    pub no_diff: bool,

    /// Fail instead of continuing when the commit cannot be inspected
    #[arg(long, requires = "commit")]
    pub require_commit: bool,

    /// Only include files with these extensions (comma or space separated, repeatable)
    #[arg(short = 'x', long, value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Extra directory names to exclude (comma or space separated, repeatable)
    #[arg(short = 'e', long = "exclude", value_name = "DIR")]
    pub exclude: Vec<String>,

    /// Instructions placed at the top of the document
    #[arg(short, long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Document layout, overriding the configured template
    #[arg(short, long, value_enum)]
    pub format: Option<DocumentFormat>,

    /// Also write the document to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the document instead of copying it
    #[arg(long)]
    pub stdout: bool,

    /// Accept the default selection without opening the picker
    #[arg(short, long)]
    pub yes: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", value_enum, exclusive = true)]
    pub completions: Option<Shell>,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        logging::level_for(self.verbose, self.quiet)
    }

    /// Layer the flags over `config`.
    pub fn run_options(&self, root: PathBuf, config: &Config) -> RunOptions {
        let mut options = RunOptions::from_config(root, config);
        options.commit = self.commit.clone();
        options.include_diff = options.include_diff && !self.no_diff;
        options.require_commit = self.require_commit;

        let extensions = flatten_lists(&self.extensions);
        if !extensions.is_empty() {
            options.extensions = extensions;
        }
        options.excluded_dirs = flatten_lists(&self.exclude);

        options.message = self.message.clone();
        if let Some(format) = self.format {
            options.template = format.template_name().to_owned();
        }
        options.output = self.output.clone();
        options.delivery = if self.stdout {
            Delivery::Stdout
        } else {
            Delivery::Clipboard
        };
        options
    }

    fn interactive(&self) -> bool {
        !self.yes && io::stdin().is_terminal() && io::stdout().is_terminal()
    }
}

fn flatten_lists(values: &[String]) -> Vec<String> {
    values.iter().flat_map(|raw| split_list(raw)).collect()
}

pub fn run(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "repoclip", &mut io::stdout());
        return Ok(());
    }

    let root = cli
        .root
        .clone()
        .context("a repository root is required")?;
    let config = Config::load(&root).context("failed to load configuration")?;
    let options = cli.run_options(root, &config);

    let mut selector: Box<dyn Selector> = if cli.interactive() {
        Box::new(TerminalSelector)
    } else {
        tracing::debug!("accepting default selection without the picker");
        Box::new(AcceptDefaults)
    };
    let mut clipboard = Clipboard::new();
    let mut stdout = io::stdout();

    let outcome = Pipeline::new(selector.as_mut(), &mut clipboard, &mut stdout).run(&options)?;
    if let RunOutcome::Delivered(report) = outcome
        && let Some(path) = &report.output
    {
        tracing::info!(path = %path.display(), "document written");
    }
    Ok(())
}
