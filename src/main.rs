//! Courier CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use courier::agent::Agent;
use courier::cli::{BatchArgs, ChatArgs, Cli, Commands};
use courier::config::CourierConfig;
use courier::email::{AgentEmailAssistant, EmailAssistant};
use courier::error::CourierError;
use courier::executor::{ConnectionDirectory, HttpTaskExecutor};
use courier::provider::{create_provider, ModelProvider};
use courier::shell::{Shell, ThreadedLines};
use courier::tools::DelegationTool;
use courier::types::Task;
use courier::workflow::{run_batch, WorkflowDriver};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = match CourierConfig::from_env() {
        Ok(config) => match cli.model {
            Some(ref model) => config.with_model(model.clone()),
            None => config,
        },
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = dispatch(cli.command, config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("courier=info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Collaborators shared by every command.
struct Services {
    config: CourierConfig,
    executor: Arc<HttpTaskExecutor>,
    delegation: DelegationTool,
}

impl Services {
    fn new(config: CourierConfig) -> Self {
        let executor = Arc::new(HttpTaskExecutor::from_config(&config));
        let delegation =
            DelegationTool::new(executor.clone()).with_timeout(config.task_timeout());
        Self {
            config,
            executor,
            delegation,
        }
    }

    fn provider(&self) -> Result<Arc<dyn ModelProvider>, CourierError> {
        Ok(Arc::from(create_provider(&self.config)?))
    }

    fn email_assistant(&self) -> Result<Arc<dyn EmailAssistant>, CourierError> {
        Ok(Arc::new(AgentEmailAssistant::new(
            self.provider()?,
            self.delegation.clone(),
        )))
    }

    fn driver(&self) -> Result<WorkflowDriver, CourierError> {
        Ok(WorkflowDriver::new(
            self.delegation.clone(),
            self.email_assistant()?,
        ))
    }
}

async fn dispatch(command: Commands, config: CourierConfig) -> Result<(), CourierError> {
    let services = Services::new(config);
    match command {
        Commands::Chat(args) => handle_chat(&services, args).await,
        Commands::Run(args) => {
            let outcome = services.driver()?.run_workflow(&args.instruction).await?;
            print_json(&outcome)
        }
        Commands::Batch(args) => handle_batch(&services, args).await,
        Commands::Star(args) => {
            let result = services
                .driver()?
                .star_emails(&args.address, args.count)
                .await?;
            print_json(&result)
        }
        Commands::Find(args) => {
            let email = services.email_assistant()?.find_email(&args.address).await?;
            print_json(&email)
        }
        Commands::Reply(args) => {
            let assistant = services.email_assistant()?;
            let email = assistant.find_email(&args.address).await?;
            let confirmation = assistant.reply_to_email(&email, &args.body).await?;
            println!("{confirmation}");
            Ok(())
        }
    }
}

async fn handle_chat(services: &Services, args: ChatArgs) -> Result<(), CourierError> {
    let directory: Arc<dyn ConnectionDirectory> = services.executor.clone();
    let agent = Agent::orchestrator(
        services.provider()?,
        services.delegation.clone(),
        Some(directory),
    )
    .with_history_limit(services.config.history_responses())
    .with_streaming(!args.no_stream);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    // A pending terminal read must not hold the runtime open after an interrupt.
    let input = ThreadedLines::stdin()?;
    let exit = Shell::new(agent)
        .run(input, &mut std::io::stdout(), cancel)
        .await?;
    info!(?exit, "chat session ended");
    Ok(())
}

async fn handle_batch(services: &Services, args: BatchArgs) -> Result<(), CourierError> {
    let raw = tokio::fs::read_to_string(&args.file).await?;
    let tasks: Vec<Task> = serde_json::from_str(&raw)?;
    info!(count = tasks.len(), file = %args.file.display(), "running batch");
    let entries = run_batch(&services.delegation, &tasks).await;
    print_json(&entries)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CourierError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
