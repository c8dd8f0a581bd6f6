//! # httui Main Entry Point
//!
//! Loads the requests, then hands the terminal to the application controller.

use anyhow::{bail, Context, Result};
use httui::cmd_args::CommandLineArgs;
use httui::config::{get_config_path, Config};
use httui::logging;
use httui::repl::io::{TerminalEventStream, TerminalRenderStream};
use httui::repl::services::HttpExecutor;
use httui::repl::utils::{load_entries, parse_dir, parse_file, ParserOptions};
use httui::repl::views::TerminalRenderer;
use httui::AppController;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CommandLineArgs::parse();

    let config_path = args.config().cloned().unwrap_or_else(get_config_path);
    let config = Config::load(&config_path)?;
    logging::init(&config.log, args.verbose())?;

    let options = ParserOptions {
        require_host: args.require_host(),
    };

    if args.check() {
        println!("{}", check_report(args.path(), options)?);
        return Ok(());
    }

    if !atty::is(atty::Stream::Stdout) {
        bail!("httui needs an interactive terminal; use --check to only parse the input");
    }

    // Parse errors surface here, before the terminal is taken over
    let entries = load_entries(args.path(), options)?;
    tracing::info!(path = %args.path().display(), requests = entries.len(), "requests loaded");

    let executor = HttpExecutor::new(&config.http).context("failed to build HTTP client")?;
    let renderer = TerminalRenderer::new(TerminalRenderStream::new(), config.theme.clone())
        .with_subtitle(args.path().display().to_string());

    let mut app = AppController::new(entries, renderer, executor)?;
    app.run(TerminalEventStream::new()).await
}

/// Parsed requests as pretty JSON: a list for a file, a map of lists for a directory
fn check_report(path: &Path, options: ParserOptions) -> Result<String> {
    let report = if path.is_dir() {
        serde_json::to_string_pretty(&parse_dir(path, options)?)?
    } else {
        serde_json::to_string_pretty(&parse_file(path, options)?)?
    };
    Ok(report)
}
