use clap::{Parser, ValueEnum};
use doc_summarizer::protobuf_converter::SummaryDocument;
use doc_summarizer::protocol_formatter::{convert_to_protocol, render_markdown};
use doc_summarizer::utils::document_processor::save_report;
use doc_summarizer::{DocumentProcessor, SummarizerConfig};
use log::{error, info};
use prost::Message; // encode_to_vec
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
    Protobuf,
}

/// Summarize a PDF, DOCX or text document into per-section key points.
#[derive(Debug, Parser)]
#[command(name = "doc-summarizer", version, about)]
struct Cli {
    /// Document to summarize (.pdf, .docx, .txt, .md)
    input: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Key points kept per section body
    #[arg(long)]
    max_points: Option<usize>,

    #[arg(long, value_enum, default_value = "markdown")]
    format: OutputFormat,

    /// Where the report and protobuf output are written
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Do not render the PDF report
    #[arg(long)]
    no_report: bool,

    /// Score sections on the calling thread
    #[arg(long)]
    sequential: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = SummarizerConfig::load_or_default(cli.config.as_deref())?;
    if let Some(max_points) = cli.max_points {
        config.max_key_points = max_points;
    }
    if cli.sequential {
        config.parallel_scoring = false;
    }

    let mut processor = DocumentProcessor::new(&config);
    if cli.no_report {
        processor = processor.without_report();
    }

    let processed = processor.process_file(&cli.input)?;
    info!(
        "[{}] {} sections, reduction {}",
        processed.request_id,
        processed.summary.key_points.len(),
        processed.summary.metrics.reduction_display()
    );

    match cli.format {
        OutputFormat::Markdown => print!("{}", render_markdown(&processed.summary)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&convert_to_protocol(&processed))?;
            println!("{}", json);
        }
        OutputFormat::Protobuf => {
            fs::create_dir_all(&cli.output_dir)?;
            let path = cli.output_dir.join("summary.protobin");
            fs::write(&path, SummaryDocument::from(&processed).encode_to_vec())?;
            println!("Protobuf output saved to {}", path.display());
        }
    }

    if let Some(report) = &processed.report {
        let path = save_report(report, &cli.output_dir)?;
        eprintln!("Report saved to {}", path.display());
    }

    Ok(())
}
