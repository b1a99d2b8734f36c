//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::OutputWriter;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, project_config_path, Settings};
use crate::domain::TreeExport;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{InfraError, InfraResult};

/// Load, override and validate settings for the pipeline commands.
fn load_settings(cli: &Cli, validate: bool) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_overrides(&cli.overrides.to_overrides());
    if validate {
        settings.validate()?;
    }
    Ok(settings)
}

#[instrument(level = "debug", skip(cli))]
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Split => cmd_split(cli),
        Commands::Plan => cmd_plan(cli),
        Commands::Tree => cmd_tree(cli),
        Commands::Dot { hide_preamble, out } => cmd_dot(cli, *hide_preamble, out.as_deref()),
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn cmd_split(cli: &Cli) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli, true)?);
    let outcome = container.split_service().run()?;

    output::header(&format!(
        "Split into {}",
        container.settings.output.folder.display()
    ));
    for artifact in &outcome.artifacts {
        output::success_detail(&artifact.path.display());
    }
    if !outcome.assets.is_empty() {
        output::action("Assets", &format!("{} copied", outcome.assets.len()));
    }
    Ok(())
}

fn cmd_plan(cli: &Cli) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli, true)?);
    let outcome = container.split_service().prepare()?;

    output::header("Files");
    for artifact in &outcome.artifacts {
        output::detail(&format!(
            "{} ({} lines)",
            artifact.path.display(),
            artifact.content.lines().count()
        ));
    }

    output::header("Assets");
    for copy in &outcome.assets.copies {
        output::detail(&format!(
            "{} -> {}",
            copy.source.display(),
            copy.destination.display()
        ));
    }

    if let Err(e) = container.asset_service().verify(&outcome.assets) {
        output::warning(&e);
    }
    let duplicates = OutputWriter::duplicates(&outcome.artifacts);
    for path in duplicates {
        output::failure(&format!("duplicate output {}", path.display()));
    }
    Ok(())
}

fn cmd_tree(cli: &Cli) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli, false)?);
    let tree = container.split_service().build()?;
    output::info(&tree.to_tree_string());
    Ok(())
}

fn cmd_dot(cli: &Cli, hide_preamble: bool, out: Option<&Path>) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli, false)?);
    if let Some(path) = out {
        if container.fs.is_dir(path) {
            return Err(CliError::InvalidArgs(format!(
                "--out must name a file, {} is a directory",
                path.display()
            )));
        }
    }

    let tree = container.split_service().build()?;
    let dot = tree.to_dot(hide_preamble);

    match out {
        Some(path) => {
            write_file(container.fs.as_ref(), path, &dot)?;
            output::action("Wrote", &path.display());
        }
        None => output::info(&dot),
    }
    Ok(())
}

fn write_file(fs: &dyn FileSystem, path: &Path, content: &str) -> InfraResult<()> {
    fs.ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
    fs.write(path, content)
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli, false)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let fs = RealFileSystem;
            let state = |path: &Path| if fs.exists(path) { "" } else { " (missing)" };
            match global_config_path() {
                Some(path) => {
                    output::detail(&format!("global:  {}{}", path.display(), state(&path)))
                }
                None => output::warning("no config directory for this platform"),
            }
            let project = cli.config.clone().unwrap_or_else(project_config_path);
            output::detail(&format!("project: {}{}", project.display(), state(&project)));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    debug!("config command done");
    Ok(())
}

