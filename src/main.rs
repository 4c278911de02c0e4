use clap::{Parser, Subcommand};
use n8n_api::{ExecutionFilter, config};
use serde_json::json;

use anyhow::Context;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Command-line access to the n8n public REST API. \n\
Set the N8N_HOST and N8N_API_KEY environment variables to authenticate with your n8n instance.\n\n\
Examples:\n  \
n8n-api list\n  \
n8n-api get 123\n  \
n8n-api executions --limit 10\n  \
n8n-api doctor",
    after_help = "ENVIRONMENT VARIABLES:\n    N8N_HOST     Base URL of the n8n instance (e.g., https://your-n8n.example.com)\n    N8N_API_KEY  API key for authentication",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all workflows on the n8n server
    List,
    /// Print a workflow as JSON
    Get {
        /// ID of the workflow to fetch
        id: String,
    },
    /// Create a new, empty workflow with the given name
    New {
        /// Name for the newly created workflow (required)
        name: String,
    },
    /// Turn a workflow on
    Activate { id: String },
    /// Turn a workflow off
    Deactivate { id: String },
    /// Delete a workflow from the server
    Delete { id: String },
    /// List recent executions
    Executions {
        /// Maximum number of executions to return
        #[arg(long)]
        limit: Option<u32>,
        /// Cursor: only return executions older than this ID
        #[arg(long)]
        last_id: Option<String>,
    },
    /// List workflow tags
    Tags,
    /// List instance variables
    Variables,
    /// List available node types
    NodeTypes,
    /// Look up a single node type by its exact name
    Node {
        /// Full node-type name, e.g. "n8n-nodes-base.httpRequest"
        name: String,
    },
    /// Check that the API is reachable with the configured credentials
    Test,
    /// Run a self-test and print a structured status report
    Doctor,
    /// Download and replace the binary with the latest release from GitHub
    Upgrade,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Validate environment variables early with helpful error messages
    let cfg = config::N8nConfig::from_env().with_context(|| {
        "Failed to load configuration. Please ensure N8N_HOST and N8N_API_KEY environment variables are set.\n\
        Example:\n  \
        export N8N_HOST=https://your-n8n.example.com\n  \
        export N8N_API_KEY=your-api-key-here"
    })?;
    let client = cfg.client()?;

    match cli.command {
        Commands::List => {
            println!("Fetching workflows from {}...", cfg.host);
            let workflows = client.list_workflows().await.with_context(
                || "Failed to list workflows. Please check your N8N_HOST and N8N_API_KEY",
            )?;

            match workflows.as_array() {
                Some(list) if !list.is_empty() => {
                    println!("Found {} workflows:", list.len());
                    for wf in list {
                        println!(
                            "  {}: {}",
                            wf["id"].as_str().unwrap_or("?"),
                            wf["name"].as_str().unwrap_or("?")
                        );
                    }
                }
                _ => println!("No workflows found on the server."),
            }
        }
        Commands::Get { id } => {
            let wf = client
                .get_workflow(&id)
                .await
                .with_context(|| format!("Failed to fetch workflow {}", id))?;
            println!("{}", serde_json::to_string_pretty(&wf)?);
        }
        Commands::New { name } => {
            if name.trim().is_empty() {
                return Err(anyhow::anyhow!("Workflow name cannot be empty"));
            }

            println!("Creating new workflow: \"{}\"", name);
            let body = json!({
                "name": name,
                "nodes": [],
                "connections": {},
                "settings": {}
            });
            let wf = client
                .create_workflow(&body)
                .await
                .with_context(|| format!("Failed to create workflow \"{}\"", name))?;
            println!(
                "✓ Created workflow with ID: {}",
                wf["id"].as_str().unwrap_or("?")
            );
        }
        Commands::Activate { id } => {
            client
                .activate_workflow(&id)
                .await
                .with_context(|| format!("Failed to activate workflow {}", id))?;
            println!("✓ Activated workflow {}", id);
        }
        Commands::Deactivate { id } => {
            client
                .deactivate_workflow(&id)
                .await
                .with_context(|| format!("Failed to deactivate workflow {}", id))?;
            println!("✓ Deactivated workflow {}", id);
        }
        Commands::Delete { id } => {
            client
                .delete_workflow(&id)
                .await
                .with_context(|| format!("Failed to delete workflow {}", id))?;
            println!("✓ Deleted workflow {}", id);
        }
        Commands::Executions { limit, last_id } => {
            let filter = ExecutionFilter { limit, last_id };
            let executions = client
                .list_executions(&filter)
                .await
                .with_context(|| "Failed to list executions")?;
            println!("{}", serde_json::to_string_pretty(&executions)?);
        }
        Commands::Tags => {
            let tags = client
                .list_tags()
                .await
                .with_context(|| "Failed to list tags")?;
            println!("{}", serde_json::to_string_pretty(&tags)?);
        }
        Commands::Variables => {
            let variables = client
                .list_variables()
                .await
                .with_context(|| "Failed to list variables")?;
            println!("{}", serde_json::to_string_pretty(&variables)?);
        }
        Commands::NodeTypes => {
            let node_types = client
                .list_node_types()
                .await
                .with_context(|| "Failed to list node types")?;
            println!("{}", serde_json::to_string_pretty(&node_types)?);
        }
        Commands::Node { name } => {
            let node = client
                .get_node_type(&name)
                .await
                .with_context(|| format!("Failed to look up node type \"{}\"", name))?;
            match node {
                Some(node) => println!("{}", serde_json::to_string_pretty(&node)?),
                None => return Err(anyhow::anyhow!("No node type named \"{}\"", name)),
            }
        }
        Commands::Test => {
            println!("Testing connection to {}...", cfg.host);
            if client.test_connection().await {
                println!("✓ Connection OK");
            } else {
                anyhow::bail!("Could not reach the n8n API. Run `n8n-api doctor` for details");
            }
        }
        Commands::Doctor => {
            let report = client.self_test().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Upgrade => {
            println!("Checking for updates...");
            self_update::backends::github::Update::configure()
                .repo_owner("dunctk")
                .repo_name("n8n-api")
                .bin_name("n8n-api")
                .show_download_progress(true)
                .current_version(env!("CARGO_PKG_VERSION"))
                .build()?
                .update()
                .with_context(|| "Failed to upgrade to latest release")?;
            println!("✓ Updated to latest version");
        }
    }
    Ok(())
}
