//! `taskling` - a natural-language task automation assistant
//!
//! This binary wires the core pipeline (planner, extractor, executor,
//! tool registry) to a small CLI: one-shot commands, a REPL, and plan
//! introspection.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::Style;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use taskling_core::agent::{tools, Agent, IntentPlanner};
use taskling_core::Config;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskling=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration, with CLI overrides on top
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path).context("Failed to load configuration")?,
        None => Config::load().context("Failed to load configuration")?,
    };
    if let Some(locale) = &cli.locale {
        config.agent.locale = Some(locale.clone());
    }

    match &cli.command {
        Some(Commands::Tools) => {
            print_tools();
        }

        Some(Commands::Plan { command }) => {
            let query = command.join(" ");
            if query.trim().is_empty() {
                anyhow::bail!("nothing to plan");
            }
            print_plan(&config, &query).await?;
        }

        None if !cli.query.is_empty() => {
            let query = cli.query.join(" ");
            let mut agent = Agent::from_config(&config)?;
            let reply = agent.handle(&query).await?;
            print_reply(&reply.text, reply.succeeded);
        }

        None => {
            run_repl(&config).await?;
        }
    }

    Ok(())
}

/// Interactive loop: one agent, one session, bounded memory
async fn run_repl(config: &Config) -> Result<()> {
    let dim = Style::new().dim();
    let prompt = Style::new().cyan().bold();

    let mut agent = Agent::from_config(config)?;
    println!("{}", dim.apply_to("taskling - type a command, or 'exit' to quit"));

    let stdin = std::io::stdin();
    loop {
        print!("{} ", prompt.apply_to("taskling>"));
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        match agent.handle(line).await {
            Ok(reply) => print_reply(&reply.text, reply.succeeded),
            Err(e) => eprintln!("{}", Style::new().red().apply_to(e.user_message())),
        }
    }

    Ok(())
}

fn print_reply(text: &str, succeeded: bool) {
    if succeeded {
        println!("{}", text);
    } else {
        eprintln!("{}", Style::new().red().apply_to(text));
    }
}

fn print_tools() {
    let bold = Style::new().bold();
    let dim = Style::new().dim();

    let registry = tools::default_registry(None);
    let capabilities = registry.capabilities();
    let mut names: Vec<&String> = capabilities.keys().collect();
    names.sort();

    for name in names {
        let spec = &capabilities[name];
        println!(
            "{}  {}\n        {}",
            bold.apply_to(&spec.name),
            dim.apply_to(spec.actions.join(", ")),
            spec.description
        );
    }
}

async fn print_plan(config: &Config, query: &str) -> Result<()> {
    let registry = Arc::new(tools::default_registry(None));
    let mut planner = IntentPlanner::new(registry);
    if let Some(locale) = &config.agent.locale {
        planner = planner.with_locale(locale.clone());
    }

    let intent = planner.plan(query, None).await;
    println!(
        "{} {:?} (confidence {:.2})",
        Style::new().bold().apply_to("tier:"),
        intent.tier,
        intent.confidence
    );
    println!("{}", serde_json::to_string_pretty(&intent.plan)?);
    Ok(())
}
