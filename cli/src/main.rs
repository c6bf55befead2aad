//! pdfsemantic CLI - PDF structure inference tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use pdfsemantic::accuracy::{score_markdown, AccuracyReport};
use pdfsemantic::render::to_json;
use pdfsemantic::structure::{extract_structure_tree, is_tagged, structure_summary};
use pdfsemantic::{
    JsonFormat, LopdfBackend, PageSelection, Pipeline, PipelineOptions, RenderOptions, StrikeOptions,
};

#[derive(Parser)]
#[command(name = "pdfsemantic")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Infer PDF document structure and render it as Markdown", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert PDF to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "4")]
        max_heading: u8,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Vertical gap (points) that starts a new paragraph
        #[arg(long, default_value = "10")]
        paragraph_gap: f32,

        /// Do not emit ~~strike-through~~ markers
        #[arg(long)]
        no_strike: bool,

        /// Also accept strike marks covering most of their own width
        #[arg(long)]
        object_cover: bool,

        /// Fail on the first unreadable page instead of skipping it
        #[arg(long)]
        strict: bool,
    },

    /// Print the tagged structure tree as JSON
    Structure {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print per-type counts instead of the tree
        #[arg(long)]
        summary: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show font clusters and inferred roles
    Fonts {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Score a Markdown file against a reference
    Score {
        /// Reference Markdown file
        #[arg(value_name = "EXPECTED")]
        expected: PathBuf,

        /// Markdown file to grade, or a PDF to convert first
        #[arg(value_name = "ACTUAL")]
        actual: PathBuf,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Markdown {
            input,
            output,
            max_heading,
            pages,
            paragraph_gap,
            no_strike,
            object_cover,
            strict,
        } => cmd_markdown(
            &input,
            output.as_deref(),
            MarkdownArgs {
                max_heading,
                pages,
                paragraph_gap,
                no_strike,
                object_cover,
                strict,
            },
        ),
        Commands::Structure {
            input,
            summary,
            compact,
        } => cmd_structure(&input, summary, compact),
        Commands::Fonts { input, json } => cmd_fonts(&input, json),
        Commands::Score {
            expected,
            actual,
            json,
        } => cmd_score(&expected, &actual, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .parse_default_env()
        .init();
}

struct MarkdownArgs {
    max_heading: u8,
    pages: Option<String>,
    paragraph_gap: f32,
    no_strike: bool,
    object_cover: bool,
    strict: bool,
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    args: MarkdownArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = match args.pages.as_deref() {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };

    // Lenient by default so one broken page does not lose the document
    let mut options = PipelineOptions::new()
        .with_pages(page_selection.clone())
        .with_strike(StrikeOptions::new().with_object_relative_cover(args.object_cover));
    if !args.strict {
        options = options.lenient();
    }
    let doc = Pipeline::new(options).analyze_file(input)?;
    doc.cross_check();

    let render_options = RenderOptions::new()
        .with_max_heading(args.max_heading)
        .with_paragraph_gap(args.paragraph_gap)
        .with_strikethrough(!args.no_strike)
        .with_pages(page_selection);

    let markdown = doc.to_markdown(&render_options);

    if let Some(path) = output {
        fs::write(path, &markdown)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", markdown);
    }

    Ok(())
}

fn cmd_structure(input: &Path, summary: bool, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let backend = LopdfBackend::load_file(input)?;
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    if !is_tagged(&backend) {
        eprintln!("{}", "Document is not tagged".yellow());
    }

    let tree = extract_structure_tree(&backend);
    let json = if summary {
        to_json(&structure_summary(&tree), format)?
    } else {
        to_json(&tree, format)?
    };
    println!("{}", json);

    Ok(())
}

fn cmd_fonts(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let options = PipelineOptions::new().lenient().with_structure(false);
    let doc = Pipeline::new(options).analyze_file(input)?;
    let classification = &doc.classification;

    if json {
        println!("{}", to_json(classification, JsonFormat::Pretty)?);
        return Ok(());
    }

    println!("{}", "Font Clusters".cyan().bold());
    println!("{}", "─".repeat(72).dimmed());
    println!(
        "{:<28} {:<7} {:<7} {:>6} {:>7} {:>6}  {}",
        "Family".bold(),
        "Weight".bold(),
        "Style".bold(),
        "Size".bold(),
        "Count".bold(),
        "Conf".bold(),
        "Role".bold()
    );

    for (index, cluster) in classification.clusters.iter().enumerate() {
        let role = cluster.role.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
        let role = if classification.body_index == Some(index) {
            format!("{} (body)", role).green().to_string()
        } else {
            role
        };
        println!(
            "{:<28} {:<7} {:<7} {:>6.1} {:>7} {:>6.2}  {}",
            cluster.family, cluster.weight, cluster.style, cluster.size, cluster.count, cluster.confidence, role
        );
    }

    if classification.is_empty() {
        println!("{}", "No text found".yellow());
    }

    Ok(())
}

fn cmd_score(expected: &Path, actual: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let expected_md = fs::read_to_string(expected)?;
    let actual_md = if is_pdf_path(actual) {
        pdfsemantic::convert_file(actual)?
    } else {
        fs::read_to_string(actual)?
    };

    let report = score_markdown(&expected_md, &actual_md)?;

    if json {
        println!("{}", to_json(&report, JsonFormat::Pretty)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn print_report(report: &AccuracyReport) {
    println!("{}", "Accuracy Report".cyan().bold());
    println!("{}", "─".repeat(64).dimmed());
    println!(
        "{:<18} {:>9} {:>9} {:>9} {:>5} {:>5} {:>5}",
        "Type".bold(),
        "Precision".bold(),
        "Recall".bold(),
        "F1".bold(),
        "TP".bold(),
        "FP".bold(),
        "FN".bold()
    );

    for (kind, score) in &report.per_type {
        println!(
            "{:<18} {:>9.3} {:>9.3} {:>9.3} {:>5} {:>5} {:>5}",
            kind.as_str(),
            score.precision,
            score.recall,
            score.f1,
            score.true_positives,
            score.false_positives,
            score.false_negatives
        );
    }

    println!("{}", "─".repeat(64).dimmed());
    let accuracy = format!("{:.1}%", report.accuracy());
    let accuracy = if report.accuracy() >= 80.0 {
        accuracy.green()
    } else {
        accuracy.yellow()
    };
    println!("{}: {}", "Overall accuracy".bold(), accuracy);
}

fn cmd_version() {
    println!("{} {}", "pdfsemantic".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF structure inference tool");
    println!();
    println!("License: MIT");
}
