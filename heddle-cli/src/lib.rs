//! Heddle CLI library: argument parsing, team assembly and the streaming run loop.
//!
//! The binary (`main.rs`) only loads configuration, installs logging and calls [`run`].

pub mod logging;

use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use heddle::{
    build_team_graph, run_team_stream, supervisor_tools, ChatOpenAI, ElasticsearchTool,
    LlmClient, Message, RunOutcome, RunSettings, RunUpdate, RunnableConfig, StreamEvent,
    StreamMode, SupervisorNode, TeamUnits, ToolSource, ToolSpec, Worker, WorkerNode,
};
use thiserror::Error;
use tokio_stream::StreamExt;

/// Line printed after every update.
pub const SEPARATOR: &str = "----";

/// Log samples used when no request is given.
pub const DEFAULT_REQUEST: &str = "Generate an ingest pipeline for the following log samples:

2024-01-15 10:30:45 INFO [user-service] User login successful for user_id: 12345
2024-01-15 10:31:12 ERROR [payment-service] Payment failed for order_id: 67890, error: insufficient_funds
2024-01-15 10:32:05 DEBUG [auth-service] Token validation successful for user_id: 12345
2024-01-15 10:33:22 WARN [inventory-service] Low stock alert: product_id: 555, remaining: 3
2024-01-15 10:34:18 INFO [order-service] Order created successfully: order_id: 67891, user_id: 12345

Please analyze these log samples and generate an appropriate Elasticsearch ingest pipeline.";

#[derive(Parser, Debug)]
#[command(name = "heddle")]
#[command(about = "Heddle: run the supervisor team on one request and print every step")]
pub struct Args {
    /// User request (or pass as positional text)
    #[arg(short, long, value_name = "TEXT", conflicts_with = "file")]
    pub message: Option<String>,

    /// Read the request from a file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Positional args: the request when neither --message nor --file is used
    #[arg(trailing_var_arg = true)]
    pub rest: Vec<String>,

    /// Step budget for the run (default: HEDDLE_RECURSION_LIMIT or 100)
    #[arg(long, value_name = "N")]
    pub recursion_limit: Option<NonZeroUsize>,

    /// Verbose: debug logs for node enter/exit and routing
    #[arg(short, long)]
    pub verbose: bool,

    /// Pretty-print each update (multi-line JSON)
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("read request file {path}: {source}")]
    ReadRequest {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("request is empty")]
    EmptyRequest,
    #[error(transparent)]
    Settings(#[from] heddle::SettingsError),
    #[error(transparent)]
    Compile(#[from] heddle::CompilationError),
    #[error("list tools: {0}")]
    Tools(#[from] heddle::ToolSourceError),
    #[error("write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("encode update: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Request text from `--message`, `--file`, the positional words, or the built-in sample.
pub fn resolve_request(args: &Args) -> Result<String, CliError> {
    let text = if let Some(m) = &args.message {
        m.clone()
    } else if let Some(path) = &args.file {
        std::fs::read_to_string(path).map_err(|source| CliError::ReadRequest {
            path: path.clone(),
            source,
        })?
    } else if !args.rest.is_empty() {
        args.rest.join(" ")
    } else {
        DEFAULT_REQUEST.to_string()
    };
    if text.trim().is_empty() {
        return Err(CliError::EmptyRequest);
    }
    Ok(text)
}

/// Budget from the flag, else from settings.
pub fn resolve_config(args: &Args, settings: &RunSettings) -> RunnableConfig {
    RunnableConfig::default()
        .with_recursion_limit(
            args.recursion_limit
                .map_or(settings.recursion_limit, NonZeroUsize::get),
        )
        .with_run_id(uuid::Uuid::new_v4().to_string())
}

/// Elasticsearch tool from the settings, with basic auth when configured.
pub fn elasticsearch_tool(settings: &RunSettings) -> ElasticsearchTool {
    let tool = ElasticsearchTool::new(settings.elasticsearch_url.clone());
    match &settings.elasticsearch_auth {
        Some((user, pass)) => tool.with_basic_auth(user.clone(), pass.clone()),
        None => tool,
    }
}

/// One OpenAI client per unit; only the validator gets the Elasticsearch tool.
pub async fn build_units(
    settings: &RunSettings,
    es: Arc<ElasticsearchTool>,
) -> Result<TeamUnits, CliError> {
    let client = |tools: Option<Vec<ToolSpec>>| -> Arc<dyn LlmClient> {
        let llm = ChatOpenAI::new(settings.model.clone()).with_temperature(settings.temperature);
        Arc::new(match tools {
            Some(tools) => llm.with_tools(tools),
            None => llm,
        })
    };

    let supervisor = SupervisorNode::new(client(Some(supervisor_tools())));
    let es_tools = es.list_tools().await?;
    let mut units = TeamUnits::new(supervisor);
    for worker in Worker::ALL {
        let node = match worker {
            Worker::Validator => {
                WorkerNode::with_default_instruction(worker, client(Some(es_tools.clone())))
                    .with_tools(es.clone())
            }
            Worker::Researcher | Worker::Generator => {
                WorkerNode::with_default_instruction(worker, client(None))
            }
        };
        units = units.with_worker(node.with_max_tool_rounds(settings.max_tool_rounds));
    }
    Ok(units)
}

/// `{"<node_id>": <update>}` as compact or pretty JSON.
pub fn format_update(node_id: &str, update: &RunUpdate, pretty: bool) -> Result<String, CliError> {
    let mut map = serde_json::Map::new();
    map.insert(node_id.to_string(), serde_json::to_value(update)?);
    let value = serde_json::Value::Object(map);
    Ok(if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    })
}

/// Streams a run of `units`, writing each update and a separator to `out`.
pub async fn stream_to<W: Write>(
    units: TeamUnits,
    request: String,
    config: RunnableConfig,
    pretty: bool,
    out: &mut W,
) -> Result<RunOutcome, CliError> {
    let graph = build_team_graph(units)?;
    let mut events = run_team_stream(&graph, vec![Message::human(request)], config, [StreamMode::Updates]);
    let mut outcome = None;
    while let Some(event) = events.next().await {
        match event {
            StreamEvent::Updates { node_id, update } => {
                writeln!(out, "{}", format_update(&node_id, &update, pretty)?)?;
                writeln!(out, "{}", SEPARATOR)?;
                out.flush()?;
            }
            StreamEvent::End(end) => outcome = Some(end),
            _ => {}
        }
    }
    Ok(outcome.unwrap_or_else(|| RunOutcome::Failed {
        error: "stream closed without an end event".to_string(),
    }))
}

/// Full run: settings, tool check, team, stream to stdout.
pub async fn run(args: &Args, settings: &RunSettings) -> Result<RunOutcome, CliError> {
    let request = resolve_request(args)?;
    let config = resolve_config(args, settings);
    let es = Arc::new(elasticsearch_tool(settings));
    if !es.is_running().await {
        tracing::warn!(
            url = %settings.elasticsearch_url,
            "Elasticsearch is not reachable; validation calls will report failures"
        );
    }
    let units = build_units(settings, es).await?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    stream_to(units, request, config, args.pretty, &mut out).await
}
