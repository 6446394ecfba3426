use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod api;
mod branch;
mod config;
mod errors;
mod models;
mod workflow;

use crate::api::git::GitClient;
use crate::api::github::GitHubClient;
use crate::config::settings::{Settings, DEFAULT_API_URL};
use crate::errors::IssueBranchError;
use crate::workflow::{normalize_issue_id, EXIT_FAILURE, EXIT_OK, EXIT_USAGE};

#[derive(Parser, Debug)]
#[command(name = "issue-branch")]
#[command(version)]
#[command(about = "Check out or create the git branch for a GitHub issue", long_about = None)]
struct Cli {
    /// (e.g., 2415 or #2415)
    issue_id: Option<String>,

    /// for debugging purposes
    #[arg(short, long)]
    verbose: bool,

    /// Config file [default: ./.issue-branch.toml]
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write a config file interactively
    #[arg(long, conflicts_with = "issue_id")]
    init: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported through the same path
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_OK };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.verbose);

    let result = match std::env::current_dir() {
        Ok(work_dir) => execute(cli, &work_dir).await,
        Err(e) => Err(IssueBranchError::from(e).into()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("\n{}", e);
            ExitCode::from(failure_code(&e))
        }
    }
}

fn failure_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<IssueBranchError>() {
        Some(IssueBranchError::Usage(_)) => EXIT_USAGE,
        _ => EXIT_FAILURE,
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,issue_branch=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn execute(cli: Cli, work_dir: &Path) -> anyhow::Result<u8> {
    let config_path = cli.config.unwrap_or_else(Settings::default_path);

    if cli.init {
        handle_init(&config_path)?;
        return Ok(EXIT_OK);
    }

    let raw_id = cli.issue_id.as_deref().ok_or_else(|| {
        IssueBranchError::Usage("Missing required argument: ISSUE_ID".to_string())
    })?;
    let issue_id = normalize_issue_id(raw_id)?;

    let Some(settings) = Settings::load_from(&config_path)? else {
        println!(
            "{}",
            format!("No configuration found at {}", config_path.display()).yellow()
        );
        println!("  {}", "Nothing to do. Create one with:".dimmed());
        println!("  {}", "issue-branch --init".green());
        return Ok(EXIT_OK);
    };

    let git = GitClient::new(work_dir.to_path_buf());
    let github = GitHubClient::from_settings(&settings);

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let outcome = workflow::run(&issue_id, &github, &git, &mut stdout, &mut stderr).await?;

    Ok(outcome.exit_code())
}

fn handle_init(config_path: &Path) -> anyhow::Result<()> {
    use dialoguer::{Input, Password};

    if config_path.exists() {
        return Err(IssueBranchError::ConfigAlreadyExists(config_path.display().to_string()).into());
    }

    println!("{}", "issue-branch Configuration Setup".cyan().bold());
    println!();
    println!(
        "{}",
        format!("This will store your credentials in {}", config_path.display()).dimmed()
    );
    println!(
        "{}",
        "The file will be created with read-only permissions (600)".dimmed()
    );
    println!();
    println!("{}", "For GitHub, create a token at:".dimmed());
    println!(
        "{}",
        "  Settings > Developer settings > Personal access tokens > Generate new token".dimmed()
    );
    println!("{}", "  Required scopes: repo (read access to issues)".dimmed());
    println!();

    let owner: String = Input::new()
        .with_prompt("Repository owner (username or org)")
        .interact_text()?;
    let repo: String = Input::new()
        .with_prompt("Repository name")
        .interact_text()?;
    let token = Password::new().with_prompt("GitHub token").interact()?;
    let api_url: String = Input::new()
        .with_prompt("GitHub API URL")
        .default(DEFAULT_API_URL.to_string())
        .interact_text()?;

    let mut settings = Settings::new(owner.trim().to_string(), repo.trim().to_string(), token);
    settings.api_url = api_url.trim().to_string();
    settings.validate()?;
    settings.save(config_path)?;

    println!();
    println!("{}", "Configuration saved!".green().bold());
    println!(
        "  Location: {}",
        config_path.display().to_string().bright_white()
    );
    println!();
    println!("{}", "Keep your API tokens secure!".yellow());
    println!("{}", "  Never commit .issue-branch.toml to git".dimmed());

    Ok(())
}
