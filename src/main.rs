mod cli;
mod render;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use projsync_config::{OutputFormat, ProjsyncConfig};
use projsync_core::{ListOptions, Project};
use render::TextStyle;
use std::env;
use std::io;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cwd = env::current_dir().context("Failed to determine the current directory")?;

    match cli.command {
        Command::ListFiles {
            project,
            target,
            breadcrumbs,
            format,
        } => {
            let config = load_config(&cwd)?;
            let base_dir = match cli.directory {
                Some(dir) => cwd.join(dir),
                None => config.base_directory(&cwd).unwrap_or_else(|| cwd.clone()),
            };
            tracing::debug!(
                "Listing {} of {} relative to {}",
                target,
                project.display(),
                base_dir.display()
            );

            let project = Project::load(&project)?;
            let options = ListOptions::from(&config);
            let listing = project.list_files(&target, &base_dir, &options)?;

            let mut out = io::stdout().lock();
            match format.unwrap_or(config.format) {
                OutputFormat::Text => {
                    let style = TextStyle {
                        breadcrumbs: breadcrumbs || config.breadcrumbs,
                        separator: &config.breadcrumb_separator,
                    };
                    render::write_text(&mut out, &listing, style)?;
                }
                OutputFormat::Json => render::write_json(&mut out, &listing)?,
            }
        }
        Command::ListTargets { project } => {
            let project = Project::load(&project)?;
            for name in project.target_names()? {
                println!("{name}");
            }
        }
        Command::Init { force } => {
            let path = projsync_config::config_path(&cwd);
            if path.exists() && !force {
                bail!("{} already exists, use --force to overwrite it", path.display());
            }
            ProjsyncConfig::default()
                .save(&cwd)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn load_config(root: &Path) -> Result<ProjsyncConfig> {
    ProjsyncConfig::load_or_default(root).with_context(|| {
        format!(
            "Failed to load {}",
            projsync_config::config_path(root).display()
        )
    })
}
