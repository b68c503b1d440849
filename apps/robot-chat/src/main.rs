use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use intent_recognizer::{CluRecognizer, KeywordRecognizer, Recognizer};
use robot_gateway::{CallContext, HttpRobotGateway, MockGateway, MoveDirective, RobotGateway};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use task_dialog::{
    DialogEngine, DialogError, JsonFileTaskStore, MemoryTaskStore, MessageKind, Orchestrator,
    SessionId, TaskStore, TurnOutput,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod config;

use config::{AppConfig, RecognizerBackend};

#[derive(Parser, Debug)]
#[command(name = "robot-chat", version, about = "Chat with a robot")]
struct Cli {
    /// JSON config file, created with defaults if missing
    #[arg(long, global = true, default_value = "robot-chat.json")]
    config: PathBuf,

    /// Use an in-process robot and the offline keyword recognizer
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive conversation on stdin/stdout (default)
    Chat {
        /// Resume a stored conversation instead of starting a new one
        #[arg(long)]
        session: Option<String>,
    },
    /// List robots the API reports as available
    Robots,
    /// Check a robot's heartbeat
    Heartbeat { robot_id: String, key: String },
    /// Open a control session (power on)
    Start { robot_id: String },
    /// Close the control session (power off)
    Stop { robot_id: String },
    /// Legacy free-form move
    Move { object: String, destination: String },
    /// Run a zone-to-zone program (HotToCold or ColdToHot)
    MoveDirective {
        robot_id: String,
        directive: MoveDirective,
        #[arg(long, default_value_t = 1)]
        actuator: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config)?;
    config.apply_env();

    let gateway = build_gateway(cli.mock, &config)?;
    let command = cli.command.unwrap_or(Commands::Chat { session: None });

    if let Commands::Chat { session } = command {
        let recognizer = build_recognizer(cli.mock, &config)?;
        let orchestrator = Orchestrator::new(gateway, recognizer, config.dialog.clone())?;
        let session = SessionId::new(session.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string()));
        let idle = Duration::from_secs(config.session_idle_secs);
        return match &config.state_dir {
            Some(dir) => {
                let store = JsonFileTaskStore::open(dir).await?;
                chat(Arc::new(DialogEngine::new(orchestrator, Arc::new(store))), session, idle).await
            }
            None => {
                let store = MemoryTaskStore::new();
                chat(Arc::new(DialogEngine::new(orchestrator, Arc::new(store))), session, idle).await
            }
        };
    }

    let ctx = CallContext::with_timeout(config.dialog.call_timeout());
    run_gateway_command(gateway.as_ref(), command, &ctx).await
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_gateway(mock: bool, config: &AppConfig) -> Result<Arc<dyn RobotGateway>> {
    if mock {
        info!("using mock gateway");
        return Ok(Arc::new(MockGateway::with_local_robot(1)));
    }
    let gateway = HttpRobotGateway::new(&config.gateway_url)
        .with_context(|| format!("gateway url {}", config.gateway_url))?;
    Ok(Arc::new(gateway))
}

fn build_recognizer(mock: bool, config: &AppConfig) -> Result<Arc<dyn Recognizer>> {
    let backend = if mock {
        RecognizerBackend::Keyword
    } else {
        config.recognizer
    };
    let recognizer: Arc<dyn Recognizer> = match backend {
        RecognizerBackend::Keyword => Arc::new(KeywordRecognizer::new()?),
        RecognizerBackend::Clu => {
            if !config.clu.is_complete() {
                warn!("CLU settings are incomplete; set CLU_ENDPOINT, CLU_API_KEY, CLU_PROJECT_NAME and CLU_DEPLOYMENT_NAME");
            }
            Arc::new(CluRecognizer::new(config.clu.clone())?)
        }
    };
    Ok(recognizer)
}

async fn chat<S: TaskStore + 'static>(
    engine: Arc<DialogEngine<S>>,
    session: SessionId,
    idle: Duration,
) -> Result<()> {
    info!(%session, "conversation started");
    let shutdown = CancellationToken::new();

    {
        let engine = engine.clone();
        let session = session.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
                engine.end_session(&session);
            }
        });
    }
    {
        let engine = engine.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut sweep = tokio::time::interval(idle.max(Duration::from_secs(60)));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = sweep.tick() => {
                        if let Err(e) = engine.expire_idle(idle).await {
                            warn!(error = %e, "expiring idle conversations failed");
                        }
                    }
                }
            }
        });
    }

    print_output(&respond(engine.start(&session).await)?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        print_output(&respond(engine.turn(&session, line).await)?);
    }

    shutdown.cancel();
    engine.end_session(&session);
    info!(%session, "conversation ended");
    Ok(())
}

/// Fatal dialog errors end the program; anything else is logged and skipped.
fn respond(result: task_dialog::Result<TurnOutput>) -> Result<TurnOutput> {
    match result {
        Ok(output) => Ok(output),
        Err(e @ DialogError::RecognizerNotConfigured) | Err(e @ DialogError::Store(_)) => {
            Err(e.into())
        }
        Err(e) => {
            warn!(error = %e, "turn failed");
            Ok(TurnOutput {
                messages: Vec::new(),
                status: task_dialog::TurnStatus::FlowEnded,
            })
        }
    }
}

fn print_output(output: &TurnOutput) {
    for message in &output.messages {
        match message.kind {
            MessageKind::Prompt => println!("robot> {}", message.text),
            MessageKind::Notice => println!("robot: {}", message.text),
        }
    }
}

async fn run_gateway_command(
    gateway: &dyn RobotGateway,
    command: Commands,
    ctx: &CallContext,
) -> Result<()> {
    match command {
        Commands::Robots => {
            let robots = gateway.list_available_robots(ctx).await?;
            println!("{}", serde_json::to_string_pretty(&robots)?);
        }
        Commands::Heartbeat { robot_id, key } => {
            report("heartbeat", gateway.heartbeat(&robot_id, &key, ctx).await?);
        }
        Commands::Start { robot_id } => {
            report("start session", gateway.start_session(&robot_id, ctx).await?);
        }
        Commands::Stop { robot_id } => {
            report("stop session", gateway.stop_session(&robot_id, ctx).await?);
        }
        Commands::Move {
            object,
            destination,
        } => {
            report(
                "move",
                gateway.move_simple(&object, &destination, ctx).await?,
            );
        }
        Commands::MoveDirective {
            robot_id,
            directive,
            actuator,
        } => {
            report(
                "move directive",
                gateway
                    .move_directive(&robot_id, actuator, directive, ctx)
                    .await?,
            );
        }
        Commands::Chat { .. } => {}
    }
    Ok(())
}

fn report(op: &str, ok: bool) {
    if ok {
        println!("{op}: ok");
    } else {
        println!("{op}: failed");
    }
}
