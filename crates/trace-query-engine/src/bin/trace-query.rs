//! trace-query: interactive queries over a simulated execution trace.

use std::error::Error;
use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trace_query_engine::{
    Direction, EngineConfig, FactStore, FailureScenario, FrameId, QueryEngine, Record,
    RecordGenerator,
};

const PREVIEW_FRAMES: usize = 5;

#[derive(Parser)]
#[command(name = "trace-query")]
#[command(version)]
#[command(about = "Query a simulated execution trace with Prolog-style goals")]
struct Cli {
    /// Failure scenario injected into the trace
    #[arg(short, long, default_value = "null_pointer")]
    scenario: FailureScenario,

    /// Seed for deterministic generation
    #[arg(long)]
    seed: Option<u64>,

    /// Number of frames to generate
    #[arg(short, long, default_value = "10")]
    frames: usize,

    /// Run a single query and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Disable ANSI colour in discovery banners
    #[arg(long)]
    no_color: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .init();
}

fn summary(records: &[Record], store: &FactStore, scenario: FailureScenario) -> String {
    let mut lines = vec![
        "STACK TRACE SUMMARY".to_string(),
        "=".repeat(50),
        format!("Total frames: {}", records.len()),
        format!("Scenario type: {}", scenario),
        String::new(),
        "Frame overview:".to_string(),
    ];
    for record in records.iter().take(PREVIEW_FRAMES) {
        lines.push(format!(
            "  Frame {}: {} [{}] - {} bytes",
            record.id, record.name, record.status, record.allocated
        ));
    }
    if records.len() > PREVIEW_FRAMES {
        lines.push(format!("  ... and {} more frames", records.len() - PREVIEW_FRAMES));
    }
    lines.push(String::new());
    let counts: Vec<String> = store
        .summary()
        .into_iter()
        .map(|(predicate, n)| format!("{}/{}: {}", predicate, predicate.arity(), n))
        .collect();
    lines.push(format!("Facts: {}", counts.join(", ")));
    lines.push("Use queries to investigate the details. Type :help for commands.".to_string());
    lines.join("\n")
}

const HELP: &str = "\
Queries:
  ?- status(X, error).                 simple query
  ?- \\+ status(3, error).              negation
  ?- calls(A, B), status(B, error).    conjunction
Commands:
  :chain <id> <callees|callers>        transitive call chain
  :path <from> <to>                    shortest call path
  :info <id>                           relationship information
  :facts                               print every fact
  :help                                this text
  :quit                                exit";

fn parse_frame(arg: Option<&str>) -> Result<FrameId, String> {
    let arg = arg.ok_or_else(|| "missing frame id".to_string())?;
    arg.parse()
        .map_err(|_| format!("'{}' is not a frame id", arg))
}

fn command(engine: &QueryEngine<'_>, records: &[Record], line: &str) -> Result<String, String> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some(":chain") => {
            let frame = parse_frame(words.next())?;
            let direction: Direction = words
                .next()
                .unwrap_or("callees")
                .parse()
                .map_err(|e| format!("{}", e))?;
            let chain = engine.call_chain(frame, direction);
            if chain.is_empty() {
                Ok(format!("Frame {} has no {}.", frame, direction))
            } else {
                let ids: Vec<String> = chain.iter().map(|id| id.to_string()).collect();
                Ok(format!("{} of frame {}: {}", direction, frame, ids.join(", ")))
            }
        }
        Some(":path") => {
            let from = parse_frame(words.next())?;
            let to = parse_frame(words.next())?;
            match engine.call_path(from, to) {
                Some(path) => {
                    let ids: Vec<String> = path.iter().map(|id| id.to_string()).collect();
                    Ok(format!("Call path: {}", ids.join(" -> ")))
                }
                None => Ok(format!("No call path from frame {} to frame {}.", from, to)),
            }
        }
        Some(":info") => {
            let frame = parse_frame(words.next())?;
            Ok(engine.relationship_info(frame).to_string())
        }
        Some(":facts") => Ok(records
            .iter()
            .flat_map(Record::to_fact_strings)
            .collect::<Vec<_>>()
            .join("\n")),
        Some(":help") => Ok(HELP.to_string()),
        Some(other) => Err(format!("unknown command '{}' (try :help)", other)),
        None => Ok(String::new()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    let records = RecordGenerator::new(cli.scenario, cli.seed).generate(cli.frames);
    let store = FactStore::from_records(&records)?;
    let config = EngineConfig::builder().with_color(!cli.no_color).build();
    let engine = QueryEngine::with_config(&store, config);

    if let Some(query) = cli.query {
        println!("{}", engine.run(&query).output());
        return Ok(());
    }

    println!("{}\n", summary(&records, &store, cli.scenario));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "| ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" || line == ":q" {
            break;
        }

        if line.starts_with(':') {
            match command(&engine, &records, line) {
                Ok(text) => println!("{}", text),
                Err(message) => println!("Error: {}", message),
            }
        } else {
            println!("{}", engine.run(line).output());
        }
        println!();
    }

    Ok(())
}
