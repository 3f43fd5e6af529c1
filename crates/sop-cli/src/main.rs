//! `sop` - command-line front end for the SOP collection.
//!
//! A thin stand-in for the web UI: every subcommand wires the store,
//! gateway, and edit session together the same way a page would.

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use sop_client::{
    BACKUP_FILENAME, Config, DocumentStore, FileUpload, HttpGateway, Uploader, parse_import,
    write_backup,
};
use sop_core::edit::BlockPath;
use sop_core::model::Document;
use sop_core::{ident, is_image};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "sop", about = "Manage the SOP document collection", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all documents
    List,
    /// Print one document as JSON
    Show { id: String },
    /// Create a new empty document
    Create { name: String },
    /// Delete a document and everything it owns
    Delete { id: String },
    /// Populate the backend with sample data
    Seed,
    /// Download the whole collection as a JSON backup
    Export {
        /// Output path
        #[arg(long, default_value = BACKUP_FILENAME)]
        out: PathBuf,
    },
    /// Replace the whole remote collection from a JSON backup
    Import {
        path: PathBuf,
        /// Confirm the replacement (imports overwrite everything)
        #[arg(long)]
        force: bool,
    },
    /// Upload a file to the CDN and print the attachment record
    Upload { path: PathBuf },
    /// Edit a document (each action is one staged-and-saved mutation)
    Edit {
        id: String,
        #[command(subcommand)]
        action: EditAction,
    },
}

#[derive(Subcommand)]
enum EditAction {
    /// Rename the document
    Rename { name: String },
    /// Append a new step
    AddStep,
    /// Remove a step (and its sub heads and questions)
    DeleteStep { step: usize },
    /// Append a sub head to a step
    AddSubHead { step: usize },
    /// Remove a sub head (and its questions)
    DeleteSubHead { step: usize, sub: usize },
    /// Append a question to a sub head
    AddQuestion { step: usize, sub: usize },
    /// Remove a question
    DeleteQuestion { step: usize, sub: usize, question: usize },
    /// Set the title text of a block
    SetText {
        #[command(flatten)]
        path: PathArgs,
        value: String,
    },
    /// Set the markdown subtext of a block
    SetSubtext {
        #[command(flatten)]
        path: PathArgs,
        value: String,
    },
    /// Set the link of a block
    SetLink {
        #[command(flatten)]
        path: PathArgs,
        value: String,
    },
    /// Upload a file and attach it to a block
    Attach {
        #[command(flatten)]
        path: PathArgs,
        file: PathBuf,
    },
    /// Remove an attachment from a block by position
    Detach {
        #[command(flatten)]
        path: PathArgs,
        index: usize,
    },
}

/// Position of a content block: a step, optionally a sub head within it,
/// optionally a question within that.
#[derive(Args)]
struct PathArgs {
    #[arg(long)]
    step: usize,
    #[arg(long)]
    sub: Option<usize>,
    #[arg(long)]
    question: Option<usize>,
}

impl PathArgs {
    fn block_path(&self) -> anyhow::Result<BlockPath> {
        match (self.sub, self.question) {
            (None, None) => Ok(BlockPath::Step(self.step)),
            (Some(sub), None) => Ok(BlockPath::SubHead(self.step, sub)),
            (Some(sub), Some(q)) => Ok(BlockPath::Question(self.step, sub, q)),
            (None, Some(_)) => bail!("--question requires --sub"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing::info!(base_url = %config.api_base_url, "using backend");
    let gateway = Arc::new(HttpGateway::new(config.api_base_url.clone())?);
    let store = DocumentStore::new(gateway);

    match cli.command {
        Command::List => {
            store.refresh().await;
            check_store(&store).await?;
            for doc in store.documents().await {
                println!("{}  {}  ({} steps)", doc.id, doc.name, doc.steps.len());
            }
        }
        Command::Show { id } => {
            store.refresh().await;
            check_store(&store).await?;
            let doc = store
                .get(&id)
                .await
                .with_context(|| format!("no document with id {id}"))?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Command::Create { name } => {
            let doc = Document::new(ident::document_id(), name);
            store.create(&doc).await?;
            println!("Created {}", doc.id);
        }
        Command::Delete { id } => {
            store.delete(&id).await;
            check_store(&store).await?;
            println!("Deleted {id}");
        }
        Command::Seed => {
            store.seed().await;
            check_store(&store).await?;
            println!("Seeded {} documents", store.documents().await.len());
        }
        Command::Export { out } => {
            store.refresh().await;
            check_store(&store).await?;
            let docs = store.documents().await;
            write_backup(&out, &docs).await?;
            println!("Exported {} documents to {}", docs.len(), out.display());
        }
        Command::Import { path, force } => {
            if !force {
                bail!("import replaces ALL remote data; re-run with --force to confirm");
            }
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("could not read {}", path.display()))?;
            let docs = parse_import(&text)?;
            store.import(&docs).await;
            check_store(&store).await?;
            println!("Imported {} documents", docs.len());
        }
        Command::Upload { path } => {
            let uploader = Uploader::new(config.cdn.clone())?;
            let attachment = uploader.upload(&read_file_upload(&path).await?).await?;
            println!("{}", serde_json::to_string_pretty(&attachment)?);
        }
        Command::Edit { id, action } => {
            store.refresh().await;
            check_store(&store).await?;
            let mut session = store.begin_edit(&id).await?;

            match action {
                EditAction::Rename { name } => session.rename(name),
                EditAction::AddStep => {
                    session.add_step();
                }
                EditAction::DeleteStep { step } => session.delete_step(step)?,
                EditAction::AddSubHead { step } => {
                    session.add_sub_head(step)?;
                }
                EditAction::DeleteSubHead { step, sub } => session.delete_sub_head(step, sub)?,
                EditAction::AddQuestion { step, sub } => {
                    session.add_question(step, sub)?;
                }
                EditAction::DeleteQuestion { step, sub, question } => {
                    session.delete_question(step, sub, question)?
                }
                EditAction::SetText { path, value } => {
                    session.set_text(path.block_path()?, value)?
                }
                EditAction::SetSubtext { path, value } => {
                    session.set_subtext(path.block_path()?, value)?
                }
                EditAction::SetLink { path, value } => {
                    session.set_link(path.block_path()?, value)?
                }
                EditAction::Attach { path, file } => {
                    let uploader = Uploader::new(config.cdn.clone())?;
                    let attachment = uploader.upload(&read_file_upload(&file).await?).await?;
                    let label = if is_image(&attachment) { "image" } else { "file" };
                    println!("Attached {} ({label})", attachment.filename);
                    session.push_attachment(path.block_path()?, attachment)?;
                }
                EditAction::Detach { path, index } => {
                    let removed = session.remove_attachment(path.block_path()?, index)?;
                    println!("Removed {}", removed.filename);
                }
            }

            if let Err(failed) = store.save(session).await {
                bail!("save failed: {}", failed.error);
            }
            println!("Saved {id}");
        }
    }

    Ok(())
}

/// Mutations other than create report failures through the store's error
/// field; surface that as the command's exit status.
async fn check_store(store: &DocumentStore) -> anyhow::Result<()> {
    if let Some(err) = store.last_error().await {
        bail!(err);
    }
    Ok(())
}

async fn read_file_upload(path: &Path) -> anyhow::Result<FileUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("could not read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok(FileUpload {
        mime_type: mime_for(&filename).to_string(),
        filename,
        bytes,
    })
}

/// Minimal extension-to-mime map covering the file types the app accepts.
fn mime_for(filename: &str) -> &'static str {
    let lower = filename.to_lowercase();
    match lower.rsplit('.').next().unwrap_or("") {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
