//! Command dispatch

use std::io;

use clap::CommandFactory;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::RenderOutcome;
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{InfraError, InfraResult};
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(tree) = &cli.tree {
        settings.tree_file = Some(tree.clone());
    }
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Render { expand, format }) => cmd_render(&container, expand, *format),
        Some(Commands::Recommend { key }) => cmd_recommend(&container, key),
        Some(Commands::Info) => cmd_info(&container),
        Some(Commands::Config { command }) => cmd_config(&container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "cattree", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run with --help for usage".to_string(),
        )),
    }
}

#[instrument(skip(container))]
fn cmd_render(
    container: &ServiceContainer,
    expand: &[String],
    format: OutputFormat,
) -> CliResult<()> {
    let tree = container.load_tree()?;
    let mut engine = container.scene_engine(&tree)?;

    match engine.render_root()? {
        RenderOutcome::Empty => output::warning("tree is empty"),
        RenderOutcome::Rendered { root } => debug!("rendered root {}", root),
    }

    for id in expand {
        let event = match engine.surface().click_id(id) {
            Some(event) => event,
            None if engine.surface().find_by_id(id).is_some() => {
                output::warning(&format!("{id} has no children, click ignored"));
                continue;
            }
            None => {
                return Err(CliError::InvalidArgs(format!(
                    "no visible node with id '{id}'"
                )))
            }
        };
        let outcome = engine.handle_event(&event)?;
        debug!("click {}: {:?}", id, outcome);
    }
    engine.surface_mut().flush();

    match format {
        OutputFormat::Tree => output::info(&engine.to_tree_string()),
        OutputFormat::Html => output::info(engine.surface().to_html().trim_end()),
        OutputFormat::Json => output::info(&to_json(&engine.snapshot(), "view snapshot")?),
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_recommend(container: &ServiceContainer, key: &str) -> CliResult<()> {
    let tree = container.load_tree()?;
    let products = container.catalog.recommend(&tree, key);
    if products.is_empty() {
        output::warning(&format!("no products found for category '{key}'"));
        return Ok(());
    }
    output::header(&format!("{} products under {}", products.len(), key));
    for p in &products {
        output::detail(&format!(
            "{:>4}  {:<24} {:>10.2}  {:.1}",
            p.id, p.nome, p.preco, p.avaliacao
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_info(container: &ServiceContainer) -> CliResult<()> {
    let tree = container.load_tree()?;
    let summary = container.catalog.summarize(&tree);

    output::header("Category tree");
    let source = container
        .settings
        .tree_file
        .as_ref()
        .map_or_else(|| "built-in sample".to_string(), |p| p.display().to_string());
    output::action("source", &source);
    output::action("nodes", &summary.nodes);
    output::action("depth", &summary.depth);
    output::action("leaves", &summary.leaves.iter().join(", "));

    if summary.balance_mismatches.is_empty() {
        output::success("declared heights and balance factors match the tree shape");
    } else {
        output::warning(&format!(
            "{} nodes declare height/balance factor that differ from the tree shape",
            summary.balance_mismatches.len()
        ));
        for m in &summary.balance_mismatches {
            output::failure(&format!(
                "{}: height {} (actual {}), balance {} (actual {})",
                m.label, m.declared_height, m.actual_height, m.declared_balance, m.actual_balance
            ));
        }
    }
    Ok(())
}

fn to_json(value: &impl Serialize, context: &str) -> InfraResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| InfraError::Serialize {
        context: context.to_string(),
        source: e,
    })
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(container.settings.to_toml()?.trim_end()),
        ConfigCommands::Template => output::info(Settings::template().trim_end()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("cannot determine config directory"),
        },
    }
    Ok(())
}
