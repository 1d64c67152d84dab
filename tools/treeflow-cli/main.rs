use clap::Parser;
use itertools::Itertools;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::result::Result;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;
use treeflow::prelude::*;

/// Replays an editing script against a headless session and prints the resulting graph
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the action script JSON file
    script_path: PathBuf,

    /// Starting graph JSON; defaults to a single root node
    #[arg(short, long)]
    graph: Option<PathBuf>,

    /// Engine config JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame length used when advancing the clock
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Seed for generated node labels
    #[arg(long)]
    seed: Option<u64>,

    /// Use random UUIDs instead of sequential ids
    #[arg(long)]
    uuid: bool,

    /// Log engine decisions (same as RUST_LOG=treeflow=debug)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Error, Debug)]
enum ScriptError {
    #[error("Could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] serde_json::Error),
}

/// Script steps that drive the session rather than reshape the graph.
#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "camelCase")]
enum Control {
    ClickNode { node: String },
    ClickEdge { edge: String },
    Advance { ms: u64 },
    Settle,
    Undo,
    Redo,
    Select { nodes: Vec<String> },
    Drag { node: String, x: f64, y: f64 },
    Key(KeyChord),
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Step {
    Mutation(Mutation),
    Control(Control),
}

fn read(path: &PathBuf) -> Result<String, ScriptError> {
    fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse<T: for<'de> Deserialize<'de>>(path: &PathBuf) -> Result<T, ScriptError> {
    serde_json::from_str(&read(path)?).map_err(|source| ScriptError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("treeflow=debug,treeflow_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn run(cli: &Cli) -> Result<String, ScriptError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let graph = match &cli.graph {
        Some(path) => parse::<Graph>(path)?,
        None => Graph::new(vec![Node::workflow("root", "Start", Position::default())], vec![]),
    };
    let steps: Vec<Step> = parse(&cli.script_path)?;

    let labels = match cli.seed {
        Some(seed) => RandomLabels::seeded(seed),
        None => RandomLabels::new(),
    };
    let builder = Session::builder()
        .with_config(config)
        .with_graph(graph)
        .with_labels(labels);
    let mut session = if cli.uuid {
        builder.with_ids(UuidIds).build()
    } else {
        builder.with_ids(SequentialIds::new("n", 1)).build()
    };

    let frame = Duration::from_millis(cli.frame_ms.max(1));
    let mut now = Duration::ZERO;

    for (index, step) in steps.into_iter().enumerate() {
        let applied = match step {
            Step::Mutation(mutation) => session.apply(&mutation, now),
            Step::Control(Control::ClickNode { node }) => session.click_node(&node, now),
            Step::Control(Control::ClickEdge { edge }) => session.click_edge(&edge, now),
            Step::Control(Control::Advance { ms }) => {
                let until = now + Duration::from_millis(ms);
                while now < until {
                    now = (now + frame).min(until);
                    session.advance(now);
                }
                true
            }
            Step::Control(Control::Settle) => {
                now = session.settle(now, frame);
                true
            }
            Step::Control(Control::Undo) => session.undo(now),
            Step::Control(Control::Redo) => session.redo(now),
            Step::Control(Control::Select { nodes }) => {
                session.select(&nodes, now);
                true
            }
            Step::Control(Control::Drag { node, x, y }) => {
                session.begin_drag(&node)
                    && session.drag_to(&node, Position::new(x, y), now)
                    && session.end_drag(now).is_some()
            }
            Step::Control(Control::Key(chord)) => session.handle_key(&chord, now).is_some(),
        };
        info!(step = index, applied, "Replayed step");
    }

    now = session.settle(now, frame);
    let graph = session.graph();
    info!(
        elapsed_ms = now.as_millis() as u64,
        nodes = %graph.nodes.iter().map(|n| n.id.as_str()).join(", "),
        undo = session.history().past_len(),
        redo = session.history().future_len(),
        "Script finished"
    );
    Ok(graph.to_json_pretty()?)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(json) => println!("{json}"),
        Err(e) => exit_with_error(&e.to_string()),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
