use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::{env, fs};

use serde::Serialize;
use spool_core::{
    ArchiveWriter, Metadata, QueueConfig, Status, TaskQueue, WriteError,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const USAGE: &str = "usage: spool-cli [--config <file.toml>] [--out <dir>] [--count <n>]";

#[derive(Debug, Serialize)]
struct Record {
    seq: u32,
    name: String,
}

/// Writes each batch to its own pretty-printed JSON file.
struct JsonFileWriter {
    path: PathBuf,
}

impl ArchiveWriter<Record> for JsonFileWriter {
    fn write(&self, items: &[Record], metadata: &Metadata) -> Result<(), WriteError> {
        let doc = serde_json::json!({
            "metadata": metadata,
            "items": items,
        });
        fs::write(&self.path, serde_json::to_vec_pretty(&doc)?)?;
        Ok(())
    }
}

struct Args {
    help: bool,
    config: Option<PathBuf>,
    out: PathBuf,
    count: u32,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Args {
            help: false,
            config: None,
            out: PathBuf::from("spool-out"),
            count: 10,
        };
        while let Some(arg) = args.next() {
            let mut value = || args.next().ok_or_else(|| format!("{arg} needs a value\n{USAGE}"));
            match arg.as_str() {
                "--config" => parsed.config = Some(PathBuf::from(value()?)),
                "--out" => parsed.out = PathBuf::from(value()?),
                "--count" => {
                    parsed.count = value()?
                        .parse()
                        .map_err(|e| format!("--count: {e}"))?;
                }
                "-h" | "--help" => {
                    parsed.help = true;
                    break;
                }
                other => return Err(format!("unknown argument: {other}\n{USAGE}")),
            }
        }
        Ok(parsed)
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse(env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    // (A) 設定を読む（なければデフォルト）
    let config = match &args.config {
        Some(path) => QueueConfig::load(path)?,
        None => QueueConfig::default(),
    };
    let queue = TaskQueue::from_config(&config)?;
    fs::create_dir_all(&args.out)?;

    // (B) 完了通知を数える
    let failed = Arc::new(AtomicUsize::new(0));
    {
        let failed = Arc::clone(&failed);
        queue.add_notifier(move |id, status| {
            if status == Status::Failed {
                failed.fetch_add(1, Ordering::Relaxed);
            }
            tracing::info!(task = %id, %status, "write finished");
        });
    }

    // (C) 投入（満杯なら空くまで待つ）
    for seq in 0..args.count {
        let writer = JsonFileWriter {
            path: args.out.join(format!("record-{seq:04}.json")),
        };
        let mut metadata = Metadata::new();
        metadata.insert("creator".into(), serde_json::json!("spool-cli"));
        metadata.insert("seq".into(), serde_json::json!(seq));

        let items = vec![Record {
            seq,
            name: format!("record {seq}"),
        }];
        let id = queue.submit_async(items, writer, metadata).await?;
        tracing::debug!(task = %id, "queued");
    }

    // (D) 全部終わるまで待つ（runtime をブロックしないように sleep で）
    while !queue.is_empty() {
        tokio::time::sleep(queue.poll_interval()).await;
    }

    println!("{}", serde_json::to_string_pretty(&queue.stats())?);

    let failed = failed.load(Ordering::Relaxed);
    if failed > 0 {
        return Err(format!("{failed} of {} writes failed", args.count).into());
    }
    Ok(())
}
