use clap::{Parser, Subcommand};
use foodnsap::{
    spawn_auto_flush, FlushMode, FoodnsapError, MutationKind, OfflineQueue, QueueConfig,
    QueueState, QueuedMutation, ReplayExecutor, Result,
};
use foodnsap_remote::{HttpProbe, RemoteConfig, RestStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "foodnsap", about = "Inspect and replay the foodnsap offline queue")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, env = "FOODNSAP_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,
    #[arg(long, env = "FOODNSAP_QUEUE_KEY", default_value = foodnsap::DEFAULT_QUEUE_KEY)]
    queue_key: String,
    #[arg(long, env = "FOODNSAP_FLUSH_MODE", default_value = "batch")]
    flush_mode: FlushMode,
}

#[derive(Subcommand)]
enum Command {
    /// Show the queue state and every pending mutation, oldest first
    Status {
        /// Print the stored entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Append one mutation to the queue
    Enqueue {
        /// INSERT, UPDATE, DELETE or an action name such as upsertFood
        #[arg(long)]
        kind: String,
        #[arg(long)]
        table: String,
        #[arg(long)]
        id: Option<String>,
        /// JSON payload
        #[arg(long)]
        data: Option<String>,
    },
    /// Replay the queue against the backend
    Flush {
        /// Drop each entry as soon as it is applied
        #[arg(long)]
        per_item: bool,
    },
    /// Discard the stored queue without replaying it
    Reset,
    /// Flush whenever the backend becomes reachable, until interrupted
    Watch {
        #[arg(long, default_value = "5000")]
        interval_ms: u64,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_queue(cli: &Cli, mode: FlushMode) -> Result<OfflineQueue> {
    QueueConfig {
        data_dir: cli.data_dir.clone(),
        queue_key: cli.queue_key.clone(),
        flush_mode: mode,
    }
    .open_queue()
}

fn replay_executor() -> Result<ReplayExecutor> {
    let store = RestStore::new(RemoteConfig::from_env()?);
    Ok(ReplayExecutor::new(Arc::new(store)))
}

async fn status(queue: &OfflineQueue, json: bool) -> Result<()> {
    let pending = queue.pending().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
        return Ok(());
    }
    match queue.state().await? {
        QueueState::Empty => println!("queue '{}': empty", queue.key()),
        QueueState::NonEmpty(n) => {
            println!("queue '{}': {} pending", queue.key(), n);
            for (position, m) in pending.iter().enumerate() {
                println!("  {:>3}  {}", position, m);
            }
        }
    }
    Ok(())
}

async fn enqueue(
    queue: &OfflineQueue,
    kind: String,
    table: String,
    id: Option<String>,
    data: Option<String>,
) -> Result<()> {
    let payload = data
        .map(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| FoodnsapError::InvalidMutation(format!("--data is not JSON: {}", e)))
        })
        .transpose()?;
    let mutation = QueuedMutation::new(MutationKind::from(kind), table, id, payload);
    let len = queue.enqueue(mutation).await?;
    println!("queued, {} pending", len);
    Ok(())
}

async fn flush(queue: &OfflineQueue) -> Result<()> {
    if queue.is_empty().await? {
        println!("nothing to flush");
        return Ok(());
    }
    let executor = replay_executor()?;
    let report = queue.flush(&executor).await?;
    println!("applied {}, queue drained", report.applied);
    Ok(())
}

async fn watch(queue: OfflineQueue, interval: Duration) -> Result<()> {
    let remote = RemoteConfig::from_env()?;
    let probe = Arc::new(HttpProbe::from_config(&remote));
    let executor = Arc::new(ReplayExecutor::new(Arc::new(RestStore::new(remote))));

    eprintln!(
        "watching queue '{}', polling {} every {:?}",
        queue.key(),
        probe.url(),
        interval
    );
    let handle = spawn_auto_flush(Arc::new(queue), executor, probe, interval);
    tokio::signal::ctrl_c().await?;
    handle.abort();
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Status { json } => status(&open_queue(&cli, cli.flush_mode)?, *json).await,
        Command::Enqueue {
            kind,
            table,
            id,
            data,
        } => {
            let queue = open_queue(&cli, cli.flush_mode)?;
            enqueue(&queue, kind.clone(), table.clone(), id.clone(), data.clone()).await
        }
        Command::Flush { per_item } => {
            let mode = if *per_item {
                FlushMode::PerItem
            } else {
                cli.flush_mode
            };
            flush(&open_queue(&cli, mode)?).await
        }
        Command::Reset => {
            open_queue(&cli, cli.flush_mode)?.reset().await?;
            println!("queue '{}' cleared", cli.queue_key);
            Ok(())
        }
        Command::Watch { interval_ms } => {
            let queue = open_queue(&cli, cli.flush_mode)?;
            watch(queue, Duration::from_millis((*interval_ms).max(1))).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli).await {
        eprintln!("error [{}]: {}", e.code(), e);
        std::process::exit(1);
    }
}
