use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use nebuia_copilot::integrator::Integrator;
use nebuia_copilot::listener::{DEFAULT_INTERVAL, DEFAULT_LIMIT, Subscription};
use nebuia_copilot::models::{BatchType, FileRef, StatusDocument};
use nebuia_copilot::{config, logging};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "nebuia-copilot",
    version,
    about = "Watch and feed a NebuIA document processing account"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll one or more statuses and log every new document until Ctrl+C.
    Listen {
        #[arg(long = "status", required = true)]
        statuses: Vec<StatusDocument>,
        #[arg(long)]
        batch_type: Option<BatchType>,
        /// Seconds between polls.
        #[arg(long, default_value_t = DEFAULT_INTERVAL.as_secs())]
        interval: u64,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },
    /// Upload remote URLs and local files into a batch.
    Upload {
        #[arg(long)]
        batch: String,
        #[arg(long)]
        type_document: String,
        #[arg(long = "url")]
        urls: Vec<String>,
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Create a batch and print its id.
    CreateBatch {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "execution")]
        batch_type: BatchType,
    },
    /// Delete a batch and its documents.
    DeleteBatch {
        batch: String,
    },
    /// Delete a single document.
    DeleteDocument {
        uuid: String,
    },
    /// Clear the extracted data of a document so it is processed again.
    ClearDocument {
        uuid: String,
    },
    /// Move a document to another status.
    SetStatus {
        uuid: String,
        status: StatusDocument,
    },
    /// Print a single document.
    Document {
        uuid: String,
    },
    /// List documents by status or by batch.
    Documents {
        #[arg(long, conflicts_with = "batch", required_unless_present = "batch")]
        status: Option<StatusDocument>,
        #[arg(long)]
        batch: Option<String>,
        #[arg(long)]
        batch_type: Option<BatchType>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },
    /// List the document types configured for the account.
    DocumentTypes,
    /// Run quality assurance over a batch.
    ProcessBatch {
        batch: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_tracing();
    let config = config::init_config().context("failed to load configuration")?;
    let integrator = Integrator::from_config(config).context("failed to build client")?;

    match cli.command {
        Command::Listen {
            statuses,
            batch_type,
            interval,
            limit,
        } => listen(&integrator, statuses, batch_type, interval, limit).await,
        Command::Upload {
            batch,
            type_document,
            urls,
            files,
        } => upload(&integrator, &batch, &type_document, urls, files).await,
        Command::CreateBatch { name, batch_type } => {
            let batch_id = integrator.create_batch(&name, batch_type).await?;
            print_json(&serde_json::json!({ "batch_id": batch_id }))
        }
        Command::DeleteBatch { batch } => {
            print_status(integrator.delete_batch(&batch).await?)
        }
        Command::DeleteDocument { uuid } => {
            print_status(integrator.delete_document(&uuid).await?)
        }
        Command::ClearDocument { uuid } => {
            print_status(integrator.clear_document(&uuid).await?)
        }
        Command::SetStatus { uuid, status } => {
            print_status(integrator.set_document_status(&uuid, status).await?)
        }
        Command::Document { uuid } => print_json(&integrator.get_document_by_uuid(&uuid).await?),
        Command::Documents {
            status,
            batch,
            batch_type,
            page,
            limit,
        } => {
            let documents = match (status, batch) {
                (Some(status), _) => {
                    integrator
                        .get_documents_by_status(status, batch_type, page, limit)
                        .await?
                }
                (None, Some(batch)) => integrator.get_documents_by_batch(&batch, page, limit).await?,
                (None, None) => bail!("either --status or --batch is required"),
            };
            print_json(&documents)
        }
        Command::DocumentTypes => print_json(&integrator.get_document_types().await?),
        Command::ProcessBatch { batch } => print_status(integrator.process_batch(&batch).await?),
    }
}

async fn listen(
    integrator: &Integrator,
    statuses: Vec<StatusDocument>,
    batch_type: Option<BatchType>,
    interval: u64,
    limit: u32,
) -> Result<ExitCode> {
    let mut listener = integrator.listener();
    listener.set_on_listener_start_handler(|status| {
        tracing::info!(%status, "Watching status");
    });
    listener.set_on_document_handler(|status, document| {
        match serde_json::to_string(document) {
            Ok(json) => tracing::info!(%status, document = %json, "New document"),
            Err(err) => tracing::warn!(%status, uuid = %document.uuid, error = %err, "Failed to encode document"),
        }
    });

    for status in statuses {
        let mut subscription = Subscription::new(status)
            .with_interval(Duration::from_secs(interval))
            .with_limit(limit);
        if let Some(batch_type) = batch_type {
            subscription = subscription.with_batch_type(batch_type);
        }
        listener
            .add_listener(subscription)
            .with_context(|| format!("cannot watch status {status}"))?;
    }

    listener.run().await.context("listener aborted")?;
    Ok(ExitCode::SUCCESS)
}

async fn upload(
    integrator: &Integrator,
    batch: &str,
    type_document: &str,
    urls: Vec<String>,
    paths: Vec<PathBuf>,
) -> Result<ExitCode> {
    let mut files: Vec<FileRef> = urls
        .into_iter()
        .map(|url| FileRef::url(url, type_document))
        .collect();
    for path in paths {
        let file = FileRef::from_path(&path, type_document)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        files.push(file);
    }

    let result = integrator.append_to_batch(batch, &files).await?;
    print_json(&result)?;
    if result.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(failed = result.failed.len(), "Some files were not uploaded");
        Ok(ExitCode::FAILURE)
    }
}

fn print_status(status: bool) -> Result<ExitCode> {
    print_json(&serde_json::json!({ "status": status }))?;
    Ok(if status {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<ExitCode> {
    let rendered = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{rendered}");
    Ok(ExitCode::SUCCESS)
}
