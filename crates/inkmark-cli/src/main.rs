//! Inkmark command line entry point.

mod sink;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use inkmark_core::annotations::PageNumber;
use inkmark_core::export::{compose, DrawInstruction, PageSource};
use inkmark_core::storage::{FileStorage, SnapshotStorage};
use inkmark_core::{AnnotationEditor, EditorConfig, ExportSnapshot, DEFAULT_SNAPSHOT_KEY};
use inkmark_pdf::{PdfSource, PdfWriter};
use serde_json::json;
use sink::FileSink;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "inkmark", version, about = "Bake page annotations into PDF documents")]
struct Cli {
    /// Editor configuration (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write an annotated copy of a PDF.
    Export {
        /// Source document.
        #[arg(long)]
        pdf: PathBuf,
        #[command(flatten)]
        annotations: AnnotationInput,
        /// Output directory, or a file path ending in `.pdf`.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print the draw instructions an export would write.
    Compose {
        #[arg(long)]
        pdf: PathBuf,
        #[command(flatten)]
        annotations: AnnotationInput,
    },
    /// Summarize a snapshot file.
    Inspect {
        snapshot: PathBuf,
    },
    /// Copy a snapshot file into the local snapshot store.
    Store {
        snapshot: PathBuf,
        /// Document the snapshot belongs to.
        #[arg(long)]
        pdf: PathBuf,
        #[arg(long, default_value = DEFAULT_SNAPSHOT_KEY)]
        key: String,
    },
    /// List keys in the local snapshot store.
    List,
    /// Delete a snapshot from the local snapshot store.
    Remove {
        key: String,
    },
}

#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
struct AnnotationInput {
    /// Snapshot JSON file.
    #[arg(long)]
    annotations: Option<PathBuf>,
    /// Key in the local snapshot store.
    #[arg(long)]
    key: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    pollster::block_on(run(cli.command, config))
}

async fn run(command: Command, config: EditorConfig) -> Result<()> {
    match command {
        Command::Export {
            pdf,
            annotations,
            out,
        } => {
            let (editor, source) = open_editor(&pdf, &annotations, config).await?;
            let sink = FileSink::for_output(&out);
            let artifact = editor
                .export_to(&source, &PdfWriter::new(), &sink)
                .await
                .context("Export failed")?;
            println!("{}", sink.target(&artifact.file_name).display());
        }
        Command::Compose { pdf, annotations } => {
            let (editor, source) = open_editor(&pdf, &annotations, config).await?;
            let document = editor.document().context("No document loaded")?;
            let heights = |page: PageNumber| source.page_size(page).map(|size| size.height);
            let pages = compose(document.iter(), &heights, editor.config());
            let listing: Vec<_> = pages
                .iter()
                .map(|page| {
                    json!({
                        "page": page.page,
                        "instructions": page.instructions.iter().map(instruction_json).collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Inspect { snapshot } => {
            let snapshot = read_snapshot(&snapshot)?;
            print_summary(&snapshot);
        }
        Command::Store { snapshot, pdf, key } => {
            let mut editor = editor_for(&pdf, config)?.0;
            let report = editor.load_snapshot(read_snapshot(&snapshot)?)?;
            if report.dropped > 0 {
                log::warn!("{} annotation(s) do not fit {}", report.dropped, pdf.display());
            }
            let storage = FileStorage::default_location()?;
            editor.save(&storage, &key).await?;
            println!("Stored {} annotation(s) as {}", report.kept, key);
        }
        Command::List => {
            let storage = FileStorage::default_location()?;
            for key in storage.list().await? {
                println!("{}", key);
            }
        }
        Command::Remove { key } => {
            let storage = FileStorage::default_location()?;
            if !storage.remove(&key).await? {
                bail!("No snapshot stored as {}", key);
            }
            println!("Removed {}", key);
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let json = std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    EditorConfig::from_json(&json).with_context(|| format!("Parsing {}", path.display()))
}

fn read_snapshot(path: &Path) -> Result<ExportSnapshot> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    ExportSnapshot::from_json(&json).with_context(|| format!("Parsing {}", path.display()))
}

fn editor_for(pdf: &Path, config: EditorConfig) -> Result<(AnnotationEditor, PdfSource)> {
    let source = PdfSource::open(pdf)?;
    let name = pdf
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf")
        .to_string();
    let mut editor = AnnotationEditor::new(config);
    editor.open_source(name, &source);
    Ok((editor, source))
}

async fn open_editor(
    pdf: &Path,
    input: &AnnotationInput,
    config: EditorConfig,
) -> Result<(AnnotationEditor, PdfSource)> {
    let (mut editor, source) = editor_for(pdf, config)?;
    let report = match (&input.annotations, &input.key) {
        (Some(path), _) => editor.load_snapshot(read_snapshot(path)?)?,
        (None, Some(key)) => {
            let storage = FileStorage::default_location()?;
            editor.restore(&storage, key).await?
        }
        (None, None) => bail!("Either --annotations or --key is required"),
    };
    if report.dropped > 0 {
        log::warn!("Skipped {} annotation(s) outside the document", report.dropped);
    }
    Ok((editor, source))
}

fn instruction_json(instruction: &DrawInstruction) -> serde_json::Value {
    match instruction {
        DrawInstruction::FillRect { rect, color, opacity } => json!({
            "op": "fillRect",
            "rect": [rect.x0, rect.y0, rect.width(), rect.height()],
            "color": [color.r, color.g, color.b],
            "opacity": opacity,
        }),
        DrawInstruction::StrokeRect {
            rect,
            color,
            width,
            opacity,
        } => json!({
            "op": "strokeRect",
            "rect": [rect.x0, rect.y0, rect.width(), rect.height()],
            "color": [color.r, color.g, color.b],
            "width": width,
            "opacity": opacity,
        }),
        DrawInstruction::Text {
            x,
            y,
            size,
            color,
            text,
        } => json!({
            "op": "text",
            "at": [x, y],
            "size": size,
            "color": [color.r, color.g, color.b],
            "text": text,
        }),
        DrawInstruction::Line {
            from,
            to,
            thickness,
            color,
        } => json!({
            "op": "line",
            "from": [from.x, from.y],
            "to": [to.x, to.y],
            "thickness": thickness,
            "color": [color.r, color.g, color.b],
        }),
    }
}

fn print_summary(snapshot: &ExportSnapshot) {
    println!("Document: {}", snapshot.document_name);
    println!("Saved:    {}", snapshot.timestamp.to_rfc3339());
    println!("Annotations: {}", snapshot.annotations.len());

    let mut pages: Vec<_> = snapshot.annotations.iter().map(|a| a.page()).collect();
    pages.sort_unstable();
    pages.dedup();
    for page in pages {
        let on_page: Vec<_> = snapshot.annotations.iter().filter(|a| a.page() == page).collect();
        let kinds: Vec<&str> = on_page.iter().map(|a| kind_name(a)).collect();
        println!("  page {:>3}: {}", page, kinds.join(", "));
    }
}

fn kind_name(annotation: &inkmark_core::Annotation) -> &'static str {
    use inkmark_core::{Annotation, RegionKind};

    match annotation {
        Annotation::Freehand(_) => "pencil",
        Annotation::Region(region) => match region.kind {
            RegionKind::Highlight => "highlight",
            RegionKind::Rectangle => "rectangle",
            RegionKind::EraserStroke => "eraser",
        },
        Annotation::Text(_) => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_annotation_input_is_exclusive() {
        let parsed = Cli::try_parse_from(["inkmark", "compose", "--pdf", "a.pdf", "--annotations", "a.json", "--key", "k"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from(["inkmark", "export", "--pdf", "a.pdf", "--key", "k"]).unwrap();
        assert!(matches!(parsed.command, Command::Export { .. }));
    }

    #[test]
    fn test_remove_takes_a_key() {
        let parsed = Cli::try_parse_from(["inkmark", "remove", "draft"]).unwrap();
        assert!(matches!(parsed.command, Command::Remove { key } if key == "draft"));
        assert!(Cli::try_parse_from(["inkmark", "remove"]).is_err());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), EditorConfig::default());
    }
}
