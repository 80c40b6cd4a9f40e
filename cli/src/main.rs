//! pdfdeck CLI - PDF to editable PowerPoint converter

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfdeck::{
    ClassifierConfig, ConversionStats, ConvertOptions, Converter, PdfParser, ShapePlacement,
    StyleDefaults, PPTX_MIME_TYPE,
};

#[derive(Parser)]
#[command(name = "pdfdeck")]
#[command(version)]
#[command(about = "Convert PDF documents into editable PowerPoint decks", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output .pptx file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF into a .pptx deck
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to the input name with .pptx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct Tuning {
    /// Where recovered shapes are placed
    #[arg(long, value_enum, default_value = "fixed")]
    placement: Placement,

    /// Binarization threshold (0-255)
    #[arg(long, value_name = "N")]
    threshold: Option<u8>,

    /// Polygon approximation tolerance, relative to contour length
    #[arg(long, value_name = "RATIO")]
    epsilon: Option<f64>,

    /// Fallback font for text without a font name
    #[arg(long, value_name = "NAME", env = "PDFDECK_FONT")]
    font: Option<String>,

    /// Fallback font size in points
    #[arg(long, value_name = "PT")]
    font_size: Option<f64>,

    /// Size slides to the first page instead of 10 x 7.5 in
    #[arg(long)]
    page_size: bool,

    /// Process pages on a single thread
    #[arg(long)]
    sequential: bool,
}

#[derive(Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
enum Placement {
    /// Fixed frame per shape kind
    #[default]
    Fixed,
    /// Contour bounding box mapped onto the page
    Contour,
}

impl From<Placement> for ShapePlacement {
    fn from(placement: Placement) -> Self {
        match placement {
            Placement::Fixed => ShapePlacement::Fixed,
            Placement::Contour => ShapePlacement::ContourBounds,
        }
    }
}

impl Tuning {
    fn to_options(&self) -> ConvertOptions {
        let mut classifier = ClassifierConfig::default();
        if let Some(threshold) = self.threshold {
            classifier = classifier.with_threshold(threshold);
        }
        if let Some(ratio) = self.epsilon {
            classifier = classifier.with_epsilon_ratio(ratio);
        }

        let mut style = StyleDefaults::default();
        if let Some(ref font) = self.font {
            style = style.with_font_name(font.clone());
        }
        if let Some(size) = self.font_size {
            style = style.with_font_size(size);
        }

        let mut options = ConvertOptions::new()
            .with_parallel(!self.sequential)
            .with_classifier(classifier)
            .with_style_defaults(style)
            .with_placement(self.placement.into());
        if self.page_size {
            options = options.with_page_sized_slides();
        }
        options
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            tuning,
        }) => cmd_convert(&input, output.as_deref(), &tuning),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &Tuning::default())
            } else {
                println!("{}", "Usage: pdfdeck <FILE> [OUTPUT]".yellow());
                println!("       pdfdeck --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("pptx")
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    tuning: &Tuning,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Reading PDF...");
    let data = fs::read(input)?;

    pb.set_message("Converting pages...");
    let converter = Converter::new(tuning.to_options());
    let (deck, stats) = converter.convert_with_stats(&data)?;

    pb.set_message("Writing presentation...");
    let bytes = deck.to_pptx_bytes()?;
    fs::write(&output, &bytes)?;

    pb.finish_and_clear();

    println!(
        "{} {} ({})",
        "Saved to".green(),
        output.display(),
        PPTX_MIME_TYPE.dimmed()
    );
    print_stats(&stats);
    Ok(())
}

fn print_stats(stats: &ConversionStats) {
    println!("  {} {} slides", "├─".dimmed(), stats.pages);
    println!("  {} {} text boxes", "├─".dimmed(), stats.text_boxes);
    println!(
        "  {} {} shapes ({} rectangles, {} triangles, {} circles) from {} images",
        "├─".dimmed(),
        stats.shape_count(),
        stats.rectangles,
        stats.triangles,
        stats.circles,
        stats.images
    );
    let failures = format!("{} undecodable images", stats.image_decode_failures);
    if stats.image_decode_failures > 0 {
        println!("  {} {}", "└─".dimmed(), failures.yellow());
    } else {
        println!("  {} {}", "└─".dimmed(), failures);
    }
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let parser = PdfParser::open(input)?;
    let metadata = parser.metadata();

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), metadata.page_count);

    if parser.page_count() > 0 {
        let (width, height) = parser.page_size(0)?;
        println!(
            "{}: {:.0} x {:.0} pt ({:.2} x {:.2} in)",
            "Page size".bold(),
            width,
            height,
            width / 72.0,
            height / 72.0
        );
    }

    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref creator) = metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfdeck".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF to editable PowerPoint converter");
    println!();
    println!("License: MIT");
}
