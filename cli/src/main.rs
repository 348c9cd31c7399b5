//! brandoc CLI - branded document builder

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use brandoc::model::{count_kind, joined_text};
use brandoc::{
    detect_format_from_path, detect_language, render, Brandoc, BlockKind, Error, HeadingThresholds,
    JsonFormat, Locale, SourceRegistry,
};

#[derive(Parser)]
#[command(name = "brandoc")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Build branded Word documents from markdown-like notes", long_about = None)]
#[command(subcommand_negates_reqs = true)]
struct Cli {
    /// Input file (markdown or .docx); stdin if not specified
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output .docx file
    #[arg(short, long, value_name = "FILE", required = true)]
    output: Option<PathBuf>,

    /// Title inserted as the top heading if the input has none
    #[arg(short, long)]
    title: Option<String>,

    /// Version label shown in the footer
    #[arg(long, value_name = "VERSION")]
    version_label: Option<String>,

    /// Footer date (e.g. 2025-02-15, 15.02.2025); today if not specified
    #[arg(short, long)]
    date: Option<String>,

    /// Document language; detected from the content if not specified
    #[arg(short, long, value_enum)]
    language: Option<Language>,

    /// Template file (.dotx or .docx)
    #[arg(long, value_name = "FILE", env = "BRANDOC_TEMPLATE")]
    template: Option<PathBuf>,

    /// Minimum font size in points for level-1 headings in .docx input
    #[arg(long, value_name = "PT")]
    heading1_pt: Option<f32>,

    /// Minimum font size in points for level-2 headings in .docx input
    #[arg(long, value_name = "PT")]
    heading2_pt: Option<f32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the content blocks of an input file
    Extract {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: ExtractFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show block counts and detected language
    Info {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Language {
    /// English
    En,
    /// German
    De,
}

impl From<Language> for Locale {
    fn from(language: Language) -> Self {
        match language {
            Language::En => Locale::En,
            Language::De => Locale::De,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ExtractFormat {
    /// Markdown-like text
    Markdown,
    /// JSON block list
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Extract {
            input,
            format,
            output,
        }) => cmd_extract(input, *format, output.as_deref()),
        Some(Commands::Info { input }) => cmd_info(input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_build(&cli),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_build(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let output = cli.output.as_deref().ok_or("--output is required")?;

    let mut builder = Brandoc::new();
    if let Some(ref template) = cli.template {
        builder = builder.with_template(template);
    }
    if let Some(ref title) = cli.title {
        builder = builder.with_title(title);
    }
    if let Some(ref version) = cli.version_label {
        builder = builder.with_version(version);
    }
    if let Some(ref date) = cli.date {
        builder = builder.with_date(date);
    }
    if let Some(language) = cli.language {
        builder = builder.with_locale(language.into());
    }
    if cli.heading1_pt.is_some() || cli.heading2_pt.is_some() {
        let mut thresholds = HeadingThresholds::default();
        if let Some(pt) = cli.heading1_pt {
            thresholds = thresholds.with_level1_pt(pt);
        }
        if let Some(pt) = cli.heading2_pt {
            thresholds = thresholds.with_level2_pt(pt);
        }
        builder = builder.with_heading_thresholds(thresholds);
    }

    let result = match cli.input {
        Some(ref input) => builder.load(input)?,
        None => {
            log::debug!("Reading input from stdin");
            builder.load_text(&read_stdin()?)?
        }
    };

    result.write(output)?;
    println!(
        "{} {} ({} blocks, {})",
        "Saved to".green(),
        output.display(),
        result.blocks().len(),
        result.locale()
    );

    Ok(())
}

fn read_stdin() -> Result<String, Error> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(Error::NoInput);
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    Ok(text)
}

fn cmd_extract(
    input: &Path,
    format: ExtractFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let blocks = SourceRegistry::with_defaults().load(input)?;

    let content = match format {
        ExtractFormat::Markdown => render::to_markdown(&blocks),
        ExtractFormat::Json => render::to_json(&blocks, JsonFormat::Pretty)?,
    };

    if let Some(path) = output {
        fs::write(path, &content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", content);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let blocks = SourceRegistry::with_defaults().load(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!(
        "{}: {}",
        "Language".bold(),
        detect_language(&joined_text(&blocks))
    );

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Blocks".bold(), blocks.len());
    for kind in [
        BlockKind::Heading,
        BlockKind::Paragraph,
        BlockKind::Bullet,
        BlockKind::Numbered,
        BlockKind::Table,
    ] {
        println!("{}: {}", kind.as_str().bold(), count_kind(&blocks, kind));
    }

    let words: usize = blocks
        .iter()
        .map(|b| b.plain_text().split_whitespace().count())
        .sum();
    println!("{}: {}", "Words".bold(), words);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "brandoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Branded document builder");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/brandoc".dimmed());
    println!("License: MIT");
}
