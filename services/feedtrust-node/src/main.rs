use anyhow::{bail, Context};
use feedtrust_core::{logging, Config, Event};
use feedtrust_trust_mesh::FeedTrustService;
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

const NODE_PROTOCOL_VERSION: u32 = 1;
const NODE_RUNTIME_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct NodeVersionHandshake {
    version: &'static str,
    runtime_version: u32,
    protocol_version: u32,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct IngestStats {
    lines: u64,
    skipped: u64,
    batches: u64,
    failed_batches: u64,
    emitted: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--version-json") {
        let handshake = NodeVersionHandshake {
            version: env!("CARGO_PKG_VERSION"),
            runtime_version: NODE_RUNTIME_VERSION,
            protocol_version: NODE_PROTOCOL_VERSION,
        };
        println!("{}", serde_json::to_string(&handshake)?);
        return Ok(());
    }

    let config_path = parse_config_path(&args)?;
    let config = Config::from_file(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    logging::init_with(&config.logging);

    let service = FeedTrustService::from_config(&config).context("failed to build trust oracle")?;
    info!(
        config = %config_path.display(),
        batch_size = config.ingest.batch_size,
        "feedtrust-node started"
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let result = run(&service, stdin, stdout, config.ingest.batch_size).await;
    service.shutdown();

    let stats = result?;
    info!(
        lines = stats.lines,
        skipped = stats.skipped,
        batches = stats.batches,
        failed_batches = stats.failed_batches,
        emitted = stats.emitted,
        "input closed, feedtrust-node stopped"
    );
    Ok(())
}

fn parse_config_path(args: &[String]) -> anyhow::Result<PathBuf> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            if let Some(path) = args_iter.next() {
                return Ok(PathBuf::from(path));
            }
            bail!("--config was provided without a path");
        }
    }

    bail!("missing required --config <path> argument")
}

/// Reads NDJSON events from `input` until EOF and writes one NDJSON annotated
/// event per surviving event to `output`.
async fn run<R, W>(
    service: &FeedTrustService,
    input: R,
    mut output: W,
    batch_size: usize,
) -> anyhow::Result<IngestStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let batch_size = batch_size.max(1);
    let mut stats = IngestStats::default();
    let mut batch = Vec::with_capacity(batch_size);
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        stats.lines += 1;
        match decode_line(&line) {
            Some(event) => batch.push(event),
            None => {
                if !line.trim().is_empty() {
                    stats.skipped += 1;
                }
                continue;
            }
        }

        if batch.len() >= batch_size {
            let events = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
            flush_batch(service, events, &mut output, &mut stats).await?;
        }
    }

    if !batch.is_empty() {
        flush_batch(service, batch, &mut output, &mut stats).await?;
    }
    Ok(stats)
}

async fn flush_batch<W>(
    service: &FeedTrustService,
    events: Vec<Event>,
    output: &mut W,
    stats: &mut IngestStats,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stats.batches += 1;
    let submitted = events.len();
    let annotated = match service.process_batch(events).await {
        Ok(annotated) => annotated,
        Err(e) => {
            stats.failed_batches += 1;
            warn!(error = %e, submitted, "dropping batch that failed verification");
            return Ok(());
        }
    };

    let mut buffer = Vec::new();
    for event in &annotated {
        serde_json::to_writer(&mut buffer, event)?;
        buffer.push(b'\n');
    }
    output.write_all(&buffer).await?;
    output.flush().await?;

    stats.emitted += annotated.len() as u64;
    Ok(())
}

/// Blank lines are ignored silently; anything else that is not an event is
/// logged and dropped.
fn decode_line(line: &str) -> Option<Event> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "skipping undecodable input line");
            None
        }
    }
}
