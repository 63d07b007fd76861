// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use pathway_rs::adk::model::{connect, ModelConfig, Part, Provider, Role};
use pathway_rs::pathway::agents::{
    calculator_graph, calculator_state, chat_graph, conditional_calculator_graph,
    conditional_calculator_state, greeter_graph, greeter_state, profile_graph, profile_state,
    react_graph, ChatSession, REACT_MODEL, REACT_SYSTEM_PROMPT,
};
use pathway_rs::pathway::graph::GraphEvent;
use pathway_rs::pathway::state::{Operation, Value};
use pathway_rs::pathway::steps::fields::{MESSAGE, MESSAGES, RESULT};
use pathway_rs::pathway::tools::{all_arithmetic_tools, calculator_tools, ToolRegistry};
use pathway_rs::pathway::workflow::WorkflowBuilder;
use std::env;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

const CHAT_PROMPT: &str = "Enter a command (or 'exit' to quit): ";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with a hosted model
    Chat {
        /// Model provider: github or openai (defaults to MODEL_PROVIDER, then github)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model id, overriding MODEL_ID
        #[arg(short, long)]
        model: Option<String>,

        /// System prompt sent at the start of the conversation
        #[arg(short, long)]
        system: Option<String>,
    },
    /// Run the signed greeter
    Greet {
        #[arg(short, long, default_value = "")]
        name: String,
    },
    /// Greet a person and describe their age group and skills
    Profile {
        #[arg(short, long, default_value = "")]
        name: String,

        #[arg(short, long)]
        age: f64,

        /// Comma-separated skills
        #[arg(short, long, value_delimiter = ',')]
        skills: Vec<String>,
    },
    /// Reduce a list of numbers with one operation
    Calculate {
        /// Comma-separated numbers
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
        numbers: Vec<f64>,

        /// One of + - * /
        #[arg(short, long, allow_hyphen_values = true)]
        operation: String,

        #[arg(long, default_value = "")]
        name: String,

        /// Use the single-step calculator and print its result
        #[arg(long)]
        single: bool,
    },
    /// Calculator that answers through arithmetic tools
    React {
        #[arg(short, long)]
        provider: Option<String>,

        #[arg(short, long)]
        model: Option<String>,
    },
    /// Run a workflow from a YAML file
    Workflow {
        /// Path to the workflow file
        #[arg(short, long)]
        file: String,

        /// Override an input value, as key=value
        #[arg(long = "set")]
        overrides: Vec<String>,

        #[arg(short, long)]
        provider: Option<String>,

        #[arg(short, long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Chat {
            provider,
            model,
            system,
        } => {
            let config = model_config(provider, model)?;
            let graph = chat_graph(connect(&config)?, config.generation_config())?;
            let mut session = ChatSession::new(graph);
            if let Some(prompt) = system {
                session = session.with_system_prompt(prompt);
            }
            run_chat(session).await?;
        }
        Commands::Greet { name } => {
            let state = greeter_graph()?.invoke(greeter_state(&name)?).await?;
            print_field(state.get(MESSAGE));
        }
        Commands::Profile { name, age, skills } => {
            let state = profile_graph()?
                .invoke(profile_state(&name, age, skills)?)
                .await?;
            print_field(state.get(MESSAGE));
        }
        Commands::Calculate {
            numbers,
            operation,
            name,
            single,
        } => {
            let operation: Operation = operation.parse()?;
            if single {
                let state = calculator_graph()?
                    .invoke(calculator_state(numbers, operation)?)
                    .await?;
                print_field(state.get(RESULT));
            } else {
                let state = conditional_calculator_graph()?
                    .invoke(conditional_calculator_state(&name, numbers, operation)?)
                    .await?;
                print_field(state.get(MESSAGE));
            }
        }
        Commands::React { provider, model } => {
            let mut config = model_config(provider, model.clone())?;
            if model.is_none() && config.provider == Provider::GitHub {
                config = config.with_model(REACT_MODEL);
            }
            let registry = ToolRegistry::with_tools(calculator_tools()).await;
            let graph = react_graph(connect(&config)?, &registry, config.generation_config()).await?;
            let session = ChatSession::new(graph).with_system_prompt(REACT_SYSTEM_PROMPT);
            run_react(session).await?;
        }
        Commands::Workflow {
            file,
            overrides,
            provider,
            model,
        } => {
            let registry = ToolRegistry::with_tools(all_arithmetic_tools()).await;
            let mut builder = WorkflowBuilder::new().with_registry(registry);
            match model_config(provider, model)
                .and_then(|config| Ok((connect(&config)?, config.generation_config())))
            {
                Ok((model, config)) => builder = builder.with_model(model, config),
                Err(e) => {
                    log::debug!("No model available to workflow nodes: {}", e);
                    builder = builder.with_model_unavailable(e.to_string());
                }
            }

            let mut workflow = builder
                .build_file(&file)
                .await
                .with_context(|| format!("Failed to build workflow '{}'", file))?;
            for entry in &overrides {
                let Some((key, raw)) = entry.split_once('=') else {
                    bail!("Expected key=value, got '{}'", entry);
                };
                workflow.set(key.trim(), raw)?;
            }

            println!("Running workflow: {}", workflow.graph().name());
            let output = workflow.run().await?;
            println!("{}", output);
        }
    }

    Ok(())
}

/// Provider from the flag, then `MODEL_PROVIDER`, then GitHub Models
fn model_config(provider: Option<String>, model: Option<String>) -> anyhow::Result<ModelConfig> {
    let provider: Provider = match provider.or_else(|| env::var("MODEL_PROVIDER").ok()) {
        Some(name) => name.parse()?,
        None => Provider::GitHub,
    };
    let mut config = ModelConfig::from_env(provider)?;
    if let Some(model) = model {
        config = config.with_model(model);
    }
    Ok(config)
}

fn print_field(value: Option<&Value>) {
    match value {
        Some(value) => println!("{}", value),
        None => log::warn!("Graph finished without producing output"),
    }
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> anyhow::Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

async fn run_chat(mut session: ChatSession) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = read_line(&mut lines, CHAT_PROMPT).await? {
        if is_exit(&line) {
            break;
        }

        match session.send(&line).await {
            Ok(reply) => println!("Assistant: {}", reply.text()),
            Err(e) => {
                log::error!("Chat turn failed: {}", e);
                println!("An error occurred: {}", e);
            }
        }
    }
    Ok(())
}

async fn run_react(mut session: ChatSession) -> anyhow::Result<()> {
    println!("Welcome to the Calculator CLI! Type 'exit' to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = read_line(&mut lines, "You: ").await? {
        if is_exit(&line) {
            break;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let printer = async {
            let mut events = UnboundedReceiverStream::new(rx);
            while let Some(event) = events.next().await {
                print_event(&event);
            }
        };

        let (reply, ()) = tokio::join!(session.send_streaming(&line, tx), printer);
        if let Err(e) = reply {
            log::error!("Calculator turn failed: {}", e);
            println!("An error occurred: {}", e);
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn is_exit(line: &str) -> bool {
    line.to_lowercase() == "exit"
}

/// Model text as it arrives, and a note for every tool the tools step ran
fn print_event(event: &GraphEvent) {
    for line in event_lines(event) {
        println!("{}", line);
    }
}

fn event_lines(event: &GraphEvent) -> Vec<String> {
    let GraphEvent::StepCompleted { step, update } = event else {
        return Vec::new();
    };
    let Some(Value::Messages(messages)) = update.get(MESSAGES) else {
        return Vec::new();
    };
    log::debug!("Step '{}' added {} messages", step, messages.len());

    let mut lines = Vec::new();
    for message in messages {
        for part in &message.parts {
            match (&message.role, part) {
                (Role::Assistant, Part::Text(text)) if !text.trim().is_empty() => {
                    lines.push(format!("Assistant: {}", text))
                }
                (Role::Tool, Part::FunctionResponse { name, .. }) => {
                    lines.push(format!("using tool {}...", name))
                }
                _ => {}
            }
        }
    }
    lines
}
