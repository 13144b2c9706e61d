//! CLI binary for inline-artifacts.
//!
//! A thin shim over the library crate: reads one data URI, maps CLI flags
//! to the presenter options and prints the resulting HTML.

use anyhow::{Context, Result};
use clap::Parser;
use inline_artifacts::{
    decode_to_image, decode_to_table, decode_with_meta, inspect, render_image, render_table,
    text_to_download_link, ImageRenderOptions, RenderedHtml, TableDownloadFormat,
    TableRenderOptions, TextDownloadOptions,
};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render an uploaded image as a 200x200 thumbnail
  artifact2html upload.txt

  # Full-size JPEG with a download link
  artifact2html --kind image --original-size --download --download-type jpg upload.txt

  # Render a CSV/XLSX upload as a table with an Excel download
  artifact2html --kind table --download --table-format excel sheet.txt

  # Read the data URI from stdin
  cat upload.txt | artifact2html -

  # Describe an upload without rendering
  artifact2html --inspect-only --json upload.txt

ENVIRONMENT VARIABLES:
  ARTIFACT2HTML_KIND       Default artifact kind (auto, image, table, text)
  ARTIFACT2HTML_DOWNLOAD   Always emit a download link
  RUST_LOG                 Overrides the -v / -q log level
"#;

/// Render base64 data-URI uploads as inline HTML.
#[derive(Parser, Debug)]
#[command(
    name = "artifact2html",
    version,
    about = "Render base64 data-URI uploads as inline HTML",
    long_about = "Decode a browser-submitted data URI (data:<mime>;base64,<payload>) and \
render it as a self-contained HTML fragment: an <img> for images, a <table> for CSV and \
spreadsheet uploads, or a download link for anything else.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// File containing the data URI, or `-` for stdin.
    input: PathBuf,

    /// How to interpret the upload.
    #[arg(long, env = "ARTIFACT2HTML_KIND", value_enum, default_value = "auto")]
    kind: KindArg,

    /// Maximum display width for images (px).
    #[arg(long, env = "ARTIFACT2HTML_WIDTH", default_value_t = 200)]
    width: u32,

    /// Maximum display height for images (px).
    #[arg(long, env = "ARTIFACT2HTML_HEIGHT", default_value_t = 200)]
    height: u32,

    /// Display images at full resolution.
    #[arg(long, env = "ARTIFACT2HTML_ORIGINAL_SIZE")]
    original_size: bool,

    /// Re-encode images as this type (png, jpg, gif, bmp, tif, ico).
    #[arg(long, env = "ARTIFACT2HTML_DOWNLOAD_TYPE")]
    download_type: Option<String>,

    /// Table download format: csv, or a spreadsheet alias (excel, xlsx, ods, …).
    #[arg(long, env = "ARTIFACT2HTML_TABLE_FORMAT", default_value = "csv")]
    table_format: TableDownloadFormat,

    /// Also emit a download link.
    #[arg(short, long, env = "ARTIFACT2HTML_DOWNLOAD")]
    download: bool,

    /// Download file name, without extension.
    #[arg(long, env = "ARTIFACT2HTML_DOWNLOAD_NAME")]
    download_name: Option<String>,

    /// Link text of the download anchor.
    #[arg(long, env = "ARTIFACT2HTML_DOWNLOAD_TEXT")]
    download_text: Option<String>,

    /// Print what the upload contains, no rendering.
    #[arg(long)]
    inspect_only: bool,

    /// Output structured JSON instead of raw HTML.
    #[arg(long, env = "ARTIFACT2HTML_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ARTIFACT2HTML_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ARTIFACT2HTML_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum KindArg {
    Auto,
    Image,
    Table,
    Text,
}

const TABLE_TAGS: &[&str] = &["csv", "xlsx", "xls", "xlsm", "ods"];

/// Pick a concrete kind from the upload's metadata.
fn detect_kind(meta: &str, file_type: &str) -> KindArg {
    if meta.starts_with("data:image/") {
        KindArg::Image
    } else if TABLE_TAGS.contains(&file_type.to_ascii_lowercase().as_str()) {
        KindArg::Table
    } else {
        KindArg::Text
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", red("error:"), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let input = read_input(&cli.input)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect(&input).context("Failed to inspect upload")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialise info")?
            );
        } else {
            println!("MIME type:    {}", info.mime_type.as_deref().unwrap_or("-"));
            println!("File type:    {}", info.file_type);
            println!(
                "Extension:    {}",
                info.file_extension.as_deref().unwrap_or("-")
            );
            println!("Size:         {} bytes", info.byte_len);
            if let Some((w, h)) = info.image_dimensions {
                println!("Dimensions:   {w} x {h}");
            }
            if let Some(ref f) = info.image_format {
                println!("Format:       {f}");
            }
        }
        return Ok(());
    }

    // ── Render ───────────────────────────────────────────────────────────
    let kind = match cli.kind {
        KindArg::Auto => {
            let decoded = decode_with_meta(&input).context("Failed to decode upload")?;
            let kind = detect_kind(decoded.meta(), &decoded.file_type());
            debug!("Detected {:?} from '{}'", kind, decoded.meta());
            kind
        }
        k => k,
    };

    let html = match kind {
        KindArg::Image => {
            let image = decode_to_image(&input).context("Failed to open image")?;
            render_image(&image, &image_options(&cli)?).context("Failed to render image")?
        }
        KindArg::Table => {
            let table = decode_to_table(&input).context("Failed to read table")?;
            render_table(&table, &table_options(&cli)).context("Failed to render table")?
        }
        KindArg::Text | KindArg::Auto => {
            let decoded = decode_with_meta(&input).context("Failed to decode upload")?;
            let extension = decoded.file_extension().unwrap_or_default();
            let text = String::from_utf8_lossy(decoded.buffer().get_ref()).into_owned();
            let options = text_options(&cli, extension);
            RenderedHtml::display_only(text_to_download_link(&text, &options))
        }
    };

    write_output(&cli, &html)
}

fn read_input(path: &Path) -> Result<String> {
    let mut raw = String::new();
    if path.as_os_str() == "-" {
        io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read data URI from stdin")?;
    } else {
        raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data URI from {}", path.display()))?;
    }
    Ok(raw.trim().to_string())
}

fn write_output(cli: &Cli, html: &RenderedHtml) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if cli.json {
        let json = serde_json::to_string_pretty(html).context("Failed to serialise output")?;
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else {
        writeln!(handle, "{html}").context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json && cli.download && !html.has_download() {
        eprintln!("{}", bold("note: this artifact kind has no separate download link"));
    }
    Ok(())
}

/// Map CLI args to `ImageRenderOptions`.
fn image_options(cli: &Cli) -> Result<ImageRenderOptions> {
    let mut builder = ImageRenderOptions::builder()
        .width(cli.width)
        .height(cli.height)
        .original_size(cli.original_size)
        .download(cli.download);
    if let Some(ref name) = cli.download_name {
        builder = builder.download_name(name.clone());
    }
    if let Some(ref text) = cli.download_text {
        builder = builder.download_text(text.clone());
    }
    if let Some(ref t) = cli.download_type {
        builder = builder.download_type(t.clone());
    }
    builder.build().context("Invalid image options")
}

fn table_options(cli: &Cli) -> TableRenderOptions {
    let mut options = TableRenderOptions {
        download: cli.download,
        download_format: cli.table_format,
        ..Default::default()
    };
    if let Some(ref name) = cli.download_name {
        options.download_name = name.clone();
    }
    if let Some(ref text) = cli.download_text {
        options.download_text = text.clone();
    }
    options
}

fn text_options(cli: &Cli, extension: String) -> TextDownloadOptions {
    let mut options = TextDownloadOptions::default();
    if !extension.is_empty() {
        options.extension = extension;
    }
    if let Some(ref name) = cli.download_name {
        options.filename = name.clone();
    }
    if let Some(ref text) = cli.download_text {
        options.download_text = text.clone();
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_detection() {
        assert_eq!(detect_kind("data:image/png", "png"), KindArg::Image);
        assert_eq!(detect_kind("data:text/csv", "csv"), KindArg::Table);
        assert_eq!(
            detect_kind("data:application/vnd.ms-excel", "XLSX"),
            KindArg::Table
        );
        assert_eq!(detect_kind("data:text/plain", "plain"), KindArg::Text);
    }

    #[test]
    fn cli_parses_table_format_alias() {
        let cli = Cli::parse_from(["artifact2html", "--table-format", ".XLSX", "in.txt"]);
        assert_eq!(cli.table_format, TableDownloadFormat::Spreadsheet);
        assert_eq!(cli.kind, KindArg::Auto);
    }
}
