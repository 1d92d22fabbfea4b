use anyhow::{Context, Result};
use pipeline_conditions::cli::commands::{EvalCommand, ExpandCommand, RunCommand, ValidateCommand};
use pipeline_conditions::cli::output::*;
use pipeline_conditions::cli::{Cli, Command};
use pipeline_conditions::condition::{parse_condition, ConditionEvaluator};
use pipeline_conditions::core::config::JobConfig;
use pipeline_conditions::core::{CaseSensitivity, Job, JobStatus, MacroExpander, VariableStore};
use pipeline_conditions::execution::{DryRunHandler, JobRunner};
use std::sync::Arc;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    let success = match &cli.command {
        Command::Run(cmd) => run_job(cmd, &cli)?,
        Command::Validate(cmd) => validate_job(cmd)?,
        Command::Eval(cmd) => eval_condition(cmd, &cli),
        Command::Expand(cmd) => expand_text(cmd, &cli)?,
    };

    if !success {
        std::process::exit(1);
    }

    Ok(())
}

fn run_job(cmd: &RunCommand, cli: &Cli) -> Result<bool> {
    // Load job config
    let config = JobConfig::from_file(&cmd.file).context("Failed to load job config")?;

    println!("{} Loaded job: {}", INFO, style(&config.name).bold());

    let policy = cli.case.resolve(config.case_sensitivity());
    let mut job = Job::from_config(&config, policy)?;

    // Apply variable overrides
    for (key, value) in &cmd.variable {
        job.variables
            .set(key, value.as_str())
            .with_context(|| format!("Invalid variable override: {}", key))?;
        println!(
            "{} Variable override: {} = {}",
            INFO,
            style(key).cyan(),
            style(value).dim()
        );
    }

    let runner = JobRunner::new(DryRunHandler::from_steps(&job.steps))
        .with_diagnostics(Arc::new(ConsoleSink::new(cli.verbose)))
        .host_tracing_only(cmd.host_only);

    // Set up event handler for console output
    runner.add_event_handler(|event| println!("{}", format_job_event(&event)));

    println!();
    let report = runner.run(&job);

    // Print final status
    let status = report.status();
    if status.is_success() {
        println!(
            "\n{} {} {}",
            CHECK,
            style(&report.job_name).bold(),
            format_status(status)
        );
    } else {
        println!(
            "\n{} {} {}",
            CROSS,
            style(&report.job_name).bold(),
            format_status(status)
        );
        for record in report.steps.iter().filter(|r| r.error.is_some()) {
            error!(
                "{}: {}",
                record.step_id,
                record.error.as_deref().unwrap_or_default()
            );
        }
    }

    Ok(status.is_success())
}

fn validate_job(cmd: &ValidateCommand) -> Result<bool> {
    println!("{} Validating job...", INFO);

    match JobConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Job configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Steps: {}", style(config.steps.len()).cyan());
            println!("  Variables: {}", style(config.get_variables().len()).cyan());

            for step in &config.steps {
                let condition = step.condition.as_deref().unwrap_or_default();
                let tree = parse_condition(condition)?;
                println!("    {} {}", style(&step.id).bold(), style(tree).dim());
            }

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(true)
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            Ok(false)
        }
    }
}

fn eval_condition(cmd: &EvalCommand, cli: &Cli) -> bool {
    let mut variables = VariableStore::new(cli.case.resolve(CaseSensitivity::platform()));
    if let Err(e) = variables.merge_overrides(cmd.variable.iter().map(|(k, v)| (k, v.as_str()))) {
        println!("{} {}", CROSS, style(e).red());
        return false;
    }

    let status: JobStatus = cmd.status.into();
    let sink = ConsoleSink::new(cli.verbose);
    let evaluator = ConditionEvaluator::new()
        .with_sink(&sink)
        .host_tracing_only(cmd.host_only);

    match evaluator.should_run(&cmd.condition, status, &variables) {
        Ok(result) => {
            println!(
                "{} {} (status {})",
                if result { CHECK } else { CROSS },
                format_condition_result(result),
                format_status(status)
            );
            true
        }
        Err(e) => {
            println!("{} {}", CROSS, style(e).red());
            false
        }
    }
}

fn expand_text(cmd: &ExpandCommand, cli: &Cli) -> Result<bool> {
    let mut variables = VariableStore::new(cli.case.resolve(CaseSensitivity::platform()));
    variables
        .merge_overrides(cmd.variable.iter().map(|(k, v)| (k, v.as_str())))
        .context("Invalid variable")?;

    println!("{}", MacroExpander::new().expand_str(&variables, &cmd.text));
    Ok(true)
}
