use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tagstrip::batch::{self, Document, Operation, Output};
use tagstrip::{BlockMarkers, Sanitizer, StripConfig};

#[derive(Parser)]
#[command(name = "tagstrip", version, about = "Strip markup from text")]
struct Cli {
    /// YAML config file (default: $TAGSTRIP_CONFIG, then ./tagstrip.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    /// Files to process (default: stdin)
    files: Vec<PathBuf>,
    /// Emit one JSON object per document instead of plain text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full cleanup: decode, drop comment/script/style blocks, strip tags, collapse whitespace
    Html {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Remove tags only, keeping everything between them
    Tags {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Remove every START...END block, markers included (case-insensitive)
    Block {
        #[arg(short, long, allow_hyphen_values = true)]
        start: String,
        #[arg(short, long, allow_hyphen_values = true)]
        end: String,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Collapse whitespace runs into single spaces and trim
    Collapse {
        #[command(flatten)]
        inputs: Inputs,
    },
}

fn main() -> anyhow::Result<()> {
    let t0 = Instant::now();
    let cli = Cli::parse();

    let config = StripConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config);

    let sanitizer = Sanitizer::from_config(&config);
    let (op, inputs) = match cli.command {
        Commands::Html { inputs } => (Operation::StripHtml, inputs),
        Commands::Tags { inputs } => (Operation::RemoveTags, inputs),
        Commands::Block { start, end, inputs } => {
            if start.is_empty() || end.is_empty() {
                anyhow::bail!("--start and --end must not be empty");
            }
            (Operation::RemoveBlock(BlockMarkers::new(start, end)), inputs)
        }
        Commands::Collapse { inputs } => (Operation::CollapseWhitespace, inputs),
    };

    let docs = read_inputs(&inputs.files)?;
    let outputs = batch::process_documents(&docs, &op, &sanitizer, docs.len() > 1);
    write_outputs(&outputs, inputs.json)?;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("Done in {}", format_duration(elapsed));
    }
    Ok(())
}

fn init_tracing(config: &StripConfig) {
    let level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_inputs(files: &[PathBuf]) -> anyhow::Result<Vec<Document>> {
    if files.is_empty() {
        return Ok(vec![batch::read_stdin().context("failed to read stdin")?]);
    }
    Ok(batch::load_documents(files)?)
}

fn write_outputs(outputs: &[Output], json: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for o in outputs {
        if json {
            serde_json::to_writer(&mut out, o)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", o.text)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
