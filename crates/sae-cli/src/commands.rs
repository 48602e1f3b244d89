use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::Table;
use tracing::{info, info_span};

use sae_cli::config::{config_path, load_config};
use sae_cli::pipeline::{ProjectOptions, run_projects};
use sae_cli::plan::write_plan_csv;
use sae_cli::types::RunReport;
use sae_numbering::NumberingEngine;
use sae_redcap::RedcapClient;

use crate::cli::{ConfigArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run_list_projects(args: &ConfigArgs) -> Result<()> {
    let path = config_path(args.config.as_deref());
    let config = load_config(&path)?;
    let mut table = Table::new();
    table.set_header(vec!["Project", "Token"]);
    apply_table_style(&mut table);
    for (key, project) in &config.projects {
        table.add_row(vec![key.clone(), project.token_source()]);
    }
    println!("Config: {}", path.display());
    println!("API: {}", config.api_url);
    println!("{table}");
    Ok(())
}

pub fn run_numbering(args: &RunArgs) -> Result<RunReport> {
    let started_at = Local::now();
    let path = config_path(args.config.config.as_deref());
    let config = load_config(&path)?;
    let keys = config.select_projects(&args.projects)?;
    let run_span = info_span!("run", dry_run = args.dry_run);
    let _run_guard = run_span.enter();
    info!(config = %path.display(), projects = keys.len(), "starting SAE numbering");

    let engine = NumberingEngine::new(config.form.target());
    let options = ProjectOptions {
        dry_run: args.dry_run,
        strict: args.strict,
    };
    let projects = run_projects(&keys, &engine, &options, |key| {
        let project = config
            .projects
            .get(key)
            .with_context(|| format!("project {key} is not configured"))?;
        let token = project.resolve_token(key)?;
        RedcapClient::new(config.api_url.clone(), token, config.form.clone())
            .with_context(|| format!("connect to project {key}"))
    });

    let plan_csv = match &args.plan_csv {
        Some(path) => {
            let rows = write_plan_csv(path, &projects)?;
            info!(rows, path = %path.display(), "wrote SAE number plan");
            Some(path.clone())
        }
        None => None,
    };

    Ok(RunReport {
        started_at,
        finished_at: Local::now(),
        dry_run: args.dry_run,
        projects,
        plan_csv,
    })
}
