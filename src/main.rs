//! jira-task-sync - JIRA issue sync for project/task records
//!
//! Main entry point for the jira-task-sync CLI.

use clap::{Parser, Subcommand};
use jira_task_sync::config::{validate_config_result, SyncConfig};
use jira_task_sync::host::{is_production_environment, JsonLinesSink};
use jira_task_sync::integrations::{IssueType, JiraApi, JiraClient, PickerQuery};
use jira_task_sync::sync::{map_issue, SyncDriver, SyncMode, SyncOptions};
use jira_task_sync::SyncError;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

/// jira-task-sync - Pull JIRA projects and issues into sync records
#[derive(Parser, Debug)]
#[command(name = "jira-task-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/jira-task-sync/config.yaml)
    #[arg(short, long, env = "JIRA_TASK_SYNC_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one sync and write records to stdout as JSON lines
    Sync {
        /// Which queries to run (recent, by-type, all)
        #[arg(short, long, default_value = "recent")]
        mode: String,

        /// Issue types for the type queries, comma-separated (default: from config)
        #[arg(short, long)]
        types: Option<String>,
    },

    /// List JIRA projects visible to the configured account
    Projects,

    /// Fetch one issue and print its sync record
    Issue {
        /// Issue key (e.g., OTP-12)
        key: String,
    },

    /// Show issue picker suggestions
    Picker {
        /// Current project id
        #[arg(long, conflicts_with = "issue_key")]
        project_id: Option<String>,

        /// Current issue key (default: issue named by the task URL)
        #[arg(long)]
        issue_key: Option<String>,
    },

    /// Show the detected environment
    Env,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a configuration file
    Init {
        /// JIRA instance URL (e.g., https://acme.atlassian.net)
        domain_url: String,

        /// Account email used for Basic auth
        username: String,

        /// Environment variable holding the API token
        #[arg(long, default_value = "JIRA_API_TOKEN")]
        token_env: String,

        /// Board or issue URL naming the anchor issue
        #[arg(long)]
        task_url: Option<String>,

        /// Host company identifier
        #[arg(long)]
        company_id: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Print the configuration (token redacted)
    Show,
}

fn main() {
    // Initialize logging
    if let Err(e) = jira_task_sync::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> jira_task_sync::Result<()> {
    let config_file = config_path(&cli.config);

    // Config management doesn't need a loaded config
    if let Commands::Config(ref cmd) = cli.command {
        return handle_config_command(cmd, &config_file);
    }

    let config = match SyncConfig::load(&config_file) {
        Ok(config) => config,
        Err(SyncError::ConfigLoad(msg)) if msg.contains("Config file not found") => {
            return Err(SyncError::ConfigLoad(format!(
                "No configuration found at {}. Create one with:\n  \
                 jira-task-sync config init <domain-url> <username>",
                config_file.display()
            )));
        }
        Err(e) => return Err(e),
    };

    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Sync { mode, types } => {
            let mode: SyncMode = mode.parse()?;
            let mut options = SyncOptions::from_settings(&config.sync)?.with_mode(mode);
            if let Some(types) = types {
                options.issue_types = types
                    .split(',')
                    .filter(|t| !t.trim().is_empty())
                    .map(IssueType::from_str)
                    .collect::<jira_task_sync::Result<Vec<_>>>()?;
            }
            let driver = SyncDriver::new(&config, &config, options);

            let mut sink = JsonLinesSink::stdout();
            let batch = runtime.block_on(driver.run_into(&mut sink))?;

            eprintln!(
                "Synced {} records from {} projects ({})",
                batch.records.len(),
                batch.projects.len(),
                environment_name(batch.production)
            );
            if let Some(key) = batch.issue_key {
                eprintln!("Anchor issue: {}", key);
            }
        }

        Commands::Projects => {
            let client = client_for(&config)?;
            let projects = runtime.block_on(client.list_projects()).unwrap_or_default();

            if projects.is_empty() {
                println!("No projects found");
                return Ok(());
            }

            println!("Projects ({}):", projects.len());
            for project in &projects {
                match project.name {
                    Some(ref name) => println!("  {:<10} {:<8} {}", project.key, project.id, name),
                    None => println!("  {:<10} {}", project.key, project.id),
                }
            }
        }

        Commands::Issue { key } => {
            let client = client_for(&config)?;
            let issue = runtime
                .block_on(client.issue(&key))
                .ok_or_else(|| SyncError::Other(format!("Issue '{}' could not be fetched", key)))?;

            let record = map_issue(&issue, &config.sync.field_mapping());
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Picker {
            project_id,
            issue_key,
        } => {
            let query = match (project_id, issue_key) {
                (Some(id), _) => PickerQuery::ProjectId(id),
                (None, Some(key)) => PickerQuery::IssueKey(key),
                (None, None) => {
                    let key = config.integration_config()?.issue_key().ok_or_else(|| {
                        SyncError::Config(
                            "No --project-id or --issue-key given and the task URL names no issue"
                                .to_string(),
                        )
                    })?;
                    PickerQuery::IssueKey(key)
                }
            };

            let client = client_for(&config)?;
            let response = runtime
                .block_on(client.issue_picker(&query))
                .unwrap_or_default();

            for section in &response.sections {
                if let Some(ref label) = section.label {
                    println!("{}:", label);
                }
                for issue in &section.issues {
                    println!(
                        "  {}  {}",
                        issue.key,
                        issue.summary_text.as_deref().unwrap_or("")
                    );
                }
            }
        }

        Commands::Env => {
            let production = is_production_environment(&config);
            println!("Environment: {}", environment_name(production));
            if let Some(ref id) = config.company.company_id {
                println!("Company ID:  {}", id);
            }
        }

        Commands::Config(_) => {
            // Handled before the config load
        }
    }

    Ok(())
}

fn config_path(config: &Option<String>) -> PathBuf {
    match config {
        Some(path) => PathBuf::from(path),
        None => SyncConfig::default_path(),
    }
}

fn client_for(config: &SyncConfig) -> jira_task_sync::Result<JiraClient> {
    let integration = config.integration_config()?;
    JiraClient::with_timeout(&integration, config.sync.request_timeout())
}

fn environment_name(production: bool) -> &'static str {
    if production {
        "production"
    } else {
        "non-production"
    }
}

fn handle_config_command(cmd: &ConfigCommands, config_file: &Path) -> jira_task_sync::Result<()> {
    match cmd {
        ConfigCommands::Init {
            domain_url,
            username,
            token_env,
            task_url,
            company_id,
            force,
        } => {
            if config_file.exists() && !force {
                println!("Configuration already exists at {}", config_file.display());
                println!("Use --force to overwrite it.");
                return Ok(());
            }

            let mut config = SyncConfig::default();
            config.jira.domain_url = domain_url.clone();
            config.jira.username = username.clone();
            config.jira.api_token_env = Some(token_env.clone());
            if let Some(url) = task_url {
                config.jira.task_url = url.clone();
            }
            config.company.company_id = company_id.clone();

            validate_config_result(&config)?;
            config.save(config_file)?;

            println!("✓ Created configuration at {}", config_file.display());
            println!();
            println!("Next steps:");
            println!("  1. Export your JIRA API token:");
            println!("     export {}=<token>", token_env.trim_start_matches('$'));
            println!();
            println!("  2. Run a sync:");
            println!("     jira-task-sync sync");
        }

        ConfigCommands::Validate => {
            let config = SyncConfig::load(config_file)?;
            validate_config_result(&config)?;
            println!("✓ Configuration at {} is valid", config_file.display());
        }

        ConfigCommands::Show => {
            let mut config = SyncConfig::load(config_file)?;
            if config.jira.api_token.is_some() {
                config.jira.api_token = Some("<redacted>".to_string());
            }
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}
