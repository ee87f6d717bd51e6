use clap::Parser;
use colored::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod agent;
mod client;
mod config;
mod display;
mod executor;
mod extractor;
mod history;
mod queue;

use agent::{CmdAgent, ConsoleGate};
use client::OpenAiClient;
use config::AgentConfig;
use display::{display_error, display_info, display_success, display_welcome};

/// AI-powered terminal assistant: describe what you want, confirm the
/// commands it proposes, and let it iterate on their output.
#[derive(Parser)]
#[command(name = "cmdclever", version, about)]
struct Cli {
    /// API key (overrides the AGNO_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// API base URL (overrides the AGNO_API_BASE environment variable)
    #[arg(long)]
    api_base: Option<String>,

    /// Model ID to use (defaults to qwen-plus)
    #[arg(long)]
    model_id: Option<String>,

    /// Disable streaming responses
    #[arg(long)]
    no_stream: bool,

    /// Disable command execution (suggestions only)
    #[arg(long)]
    no_execute: bool,

    /// Enable verbose diagnostics
    #[arg(long)]
    verbose: bool,

    /// Save the conversation to a file on exit
    #[arg(long, value_name = "FILEPATH")]
    save: Option<PathBuf>,

    /// Load a previously saved conversation before starting
    #[arg(long, value_name = "FILEPATH")]
    load: Option<PathBuf>,

    /// Query to send; interactive mode starts when omitted
    query: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Missing credentials are the one fatal startup error
    let config = match AgentConfig::resolve(
        cli.api_key.clone(),
        cli.api_base.clone(),
        cli.model_id.clone(),
        cli.verbose,
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error initializing agent: {}", e);
            std::process::exit(1);
        }
    };

    let client = OpenAiClient::new(&config);
    let mut agent = CmdAgent::new(config, Box::new(client), Box::new(ConsoleGate));

    if let Some(path) = &cli.load {
        load_conversation(&mut agent, path);
    }

    let stream = !cli.no_stream;
    let execute = !cli.no_execute;

    if cli.query.is_empty() {
        run_interactive(&mut agent, &cli, stream, execute).await;
    } else {
        let query = cli.query.join(" ");
        run_query(&mut agent, &query, stream, execute).await;
    }

    if let Some(path) = &cli.save {
        save_conversation(&agent, path);
    }
}

/// Prompt loop until the user types an exit word or closes stdin
async fn run_interactive(agent: &mut CmdAgent, cli: &Cli, stream: bool, execute: bool) {
    display_welcome(
        cli.verbose,
        cli.save.as_ref().and_then(|p| p.to_str()),
    );

    loop {
        print!("\n{} ", ">".bold().cyan());
        if io::stdout().flush().is_err() {
            break;
        }

        let mut query = String::new();
        match io::stdin().read_line(&mut query) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let query = query.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit") {
            println!("Goodbye!");
            break;
        }

        run_query(agent, query, stream, execute).await;
    }
}

/// One query through the agent. Model failures are displayed and the
/// session keeps going.
async fn run_query(agent: &mut CmdAgent, query: &str, stream: bool, execute: bool) {
    if let Err(e) = agent.run(query, stream, execute).await {
        display_error(&format!("Error getting response: {}", e));
    }
}

fn load_conversation(agent: &mut CmdAgent, path: &Path) {
    if !path.exists() {
        display_error(&format!(
            "Conversation history file not found: {}",
            path.display()
        ));
        return;
    }
    match agent.load_conversation(path) {
        Ok(()) => display_success(&format!(
            "Loaded conversation history from {}",
            path.display()
        )),
        Err(e) => display_error(&format!("Failed to load conversation history: {}", e)),
    }
}

fn save_conversation(agent: &CmdAgent, path: &Path) {
    match agent.save_conversation(path) {
        Ok(()) => display_info(&format!("Saved conversation history to {}", path.display())),
        Err(e) => display_error(&format!("Failed to save conversation history: {}", e)),
    }
}
