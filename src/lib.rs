//! Labelexport: labelme vehicle annotations to training sets.
//!
//! Labelexport walks a tree of labelme annotation files and turns them into
//! the inputs of two training pipelines: a Darknet YOLO detector and a
//! vehicle attribute classifier.
//!
//! # Modules
//!
//! - [`ir`]: Annotation records, typed boxes and the label vocabulary
//! - [`finder`]: Discovery of annotation and image files
//! - [`resolve`]: Box geometry and label lookup for single shapes
//! - [`convert`]: The YOLO and attributes converters
//! - [`split`]: Train/evaluation partitioning
//! - [`emit`]: Darknet config and class list rendering
//! - [`error`]: Error types for labelexport operations

pub mod confirm;
pub mod convert;
pub mod emit;
pub mod error;
pub mod finder;
pub mod ir;
pub mod paths;
pub mod resolve;
pub mod split;

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use confirm::ConfirmPolicy;
use convert::{
    AttributesConverter, AttributesOptions, Context, ConversionSummary, Converter,
    ConverterOptions, YoloConverter, YoloOptions,
};
use emit::{NetworkParams, NetworkTemplate, TemplateSource};
use ir::{Strictness, Vocabulary};
use split::Evaluation;

pub use error::{ExportError, FormatError};

/// The labelexport CLI application.
#[derive(Parser)]
#[command(name = "labelexport")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every scanned directory and converted file.
    #[arg(long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Export for a YOLOv4 detector.
    Yolo(YoloArgs),
    /// Export for a YOLOv4-tiny detector.
    YoloTiny(YoloArgs),
    /// Export for the vehicle attribute classifier.
    Attributes(AttributesArgs),
}

/// Arguments shared by every converter.
#[derive(clap::Args)]
struct CommonArgs {
    /// Directory with input files.
    #[arg(short, long, value_name = "PATH", default_value = "data", env = "LABELEXPORT_INPUT")]
    input: PathBuf,

    /// Directory to output config files.
    #[arg(short, long, value_name = "PATH", default_value = "config", env = "LABELEXPORT_OUTPUT")]
    output: PathBuf,

    /// Path to the training executable; output paths are relative to it.
    #[arg(short, long, value_name = "PATH", default_value = ".", env = "LABELEXPORT_EXEC")]
    exec: PathBuf,

    /// Prefix of directories that hold data.
    #[arg(short, long, default_value = "!", env = "LABELEXPORT_PREFIX")]
    prefix: String,

    /// Annotation file extension.
    #[arg(long, value_name = "EXTENSION", default_value = "json", env = "LABELEXPORT_DATA_EXTENSION")]
    data_extension: String,

    /// Image file extension.
    #[arg(long, value_name = "EXTENSION", default_value = "jpg", env = "LABELEXPORT_IMAGE_EXTENSION")]
    image_extension: String,

    /// Percentage of samples to put into the evaluation set.
    #[arg(
        short,
        long,
        visible_alias = "evaluation-percent",
        default_value_t = 10,
        value_parser = clap::value_parser!(u8).range(0..=100),
        conflicts_with = "dedicated",
        env = "LABELEXPORT_VAL"
    )]
    val: u8,

    /// Take evaluation samples from this directory instead.
    #[arg(
        short,
        long,
        value_name = "PATH",
        visible_alias = "dedicated-evaluation-path",
        env = "LABELEXPORT_DEDICATED"
    )]
    dedicated: Option<PathBuf>,

    /// Vocabulary file listing vehicle types and colors.
    #[arg(
        long,
        value_name = "PATH",
        default_value = "_labelme/labelflags.json",
        env = "LABELEXPORT_VOCABULARY"
    )]
    vocabulary: PathBuf,

    /// Write absolute paths into output files.
    #[arg(short, long)]
    absolute: bool,

    /// Delete existing config files without asking.
    #[arg(short, long)]
    force: bool,

    /// Accept shapes labeled directly with a vehicle type or color.
    #[arg(short, long)]
    legacy: bool,

    /// Do not require the version, flags and imageData keys.
    #[arg(long)]
    lenient: bool,

    /// How to answer confirmation prompts.
    #[arg(long, value_enum, default_value = "prompt", env = "LABELEXPORT_CONFIRM")]
    confirm: ConfirmPolicy,

    /// Seed for the train/evaluation shuffle.
    #[arg(long, env = "LABELEXPORT_SEED")]
    seed: Option<u64>,

    /// Format of the summary printed on success.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,
}

/// Arguments for the yolo and yolo-tiny subcommands.
#[derive(clap::Args)]
struct YoloArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory to store training weights.
    #[arg(short, long, value_name = "PATH", default_value = "backup", env = "LABELEXPORT_BACKUP")]
    backup: PathBuf,

    /// Name of the `.data` file, without extension.
    #[arg(long, default_value = "obj")]
    dataset_name: String,

    /// Network config template to use instead of the built-in one.
    #[arg(long, value_name = "PATH")]
    network_template: Option<PathBuf>,

    /// How many images are in a batch.
    #[arg(long, value_name = "SIZE", default_value_t = 64, help_heading = "Network")]
    batch_size: u32,

    /// How many pieces a batch is split into (saves GPU memory).
    #[arg(long, default_value_t = 16, help_heading = "Network")]
    subdivisions: u32,

    /// Network input height.
    #[arg(long, default_value_t = 416, help_heading = "Network")]
    height: u32,

    /// Network input width.
    #[arg(long, default_value_t = 416, help_heading = "Network")]
    width: u32,
}

/// Arguments for the attributes subcommand.
#[derive(clap::Args)]
struct AttributesArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Skip files that contain more than one vehicle.
    #[arg(long)]
    single: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the labelexport CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ExportError> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Yolo(args) => run_yolo(args, NetworkTemplate::Yolo),
        Commands::YoloTiny(args) => run_yolo(args, NetworkTemplate::YoloTiny),
        Commands::Attributes(args) => run_attributes(args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if quiet {
        builder.filter_level(LevelFilter::Warn);
    }
    // Already initialized when embedded in another binary.
    let _ = builder.try_init();
}

impl CommonArgs {
    fn options(&self) -> ConverterOptions {
        let evaluation = match &self.dedicated {
            Some(dir) => Evaluation::Dedicated(dir.clone()),
            None => Evaluation::Percent(self.val),
        };
        ConverterOptions {
            input: self.input.clone(),
            output: self.output.clone(),
            exec: self.exec.clone(),
            prefix: self.prefix.clone(),
            data_extension: self.data_extension.clone(),
            image_extension: self.image_extension.clone(),
            evaluation,
            absolute_paths: self.absolute,
            force: self.force,
            legacy: self.legacy,
            strictness: if self.lenient {
                Strictness::Minimal
            } else {
                Strictness::Strict
            },
            seed: self.seed,
        }
    }

    fn context(&self) -> Result<Context, ExportError> {
        let vocabulary = Vocabulary::load(&self.vocabulary)?;
        Ok(Context::new(vocabulary, self.confirm))
    }
}

fn run_yolo(args: YoloArgs, template: NetworkTemplate) -> Result<(), ExportError> {
    let template_source = match &args.network_template {
        Some(path) => TemplateSource::Custom(
            fs::read_to_string(path).map_err(|source| ExportError::io(path, source))?,
        ),
        None => TemplateSource::Builtin,
    };
    let yolo = YoloOptions {
        template,
        template_source,
        network: NetworkParams {
            batch_size: args.batch_size,
            subdivisions: args.subdivisions,
            height: args.height,
            width: args.width,
        },
        backup: args.backup,
        dataset_name: args.dataset_name,
    };

    let converter = YoloConverter::new(args.common.options(), yolo, args.common.context()?)?;
    let summary = converter.convert()?;
    print_summary(&summary, args.common.report)
}

fn run_attributes(args: AttributesArgs) -> Result<(), ExportError> {
    let attributes = AttributesOptions {
        allow_multiple: !args.single,
    };
    let converter =
        AttributesConverter::new(args.common.options(), attributes, args.common.context()?)?;
    let summary = converter.convert()?;
    print_summary(&summary, args.common.report)
}

fn print_summary(summary: &ConversionSummary, format: ReportFormat) -> Result<(), ExportError> {
    match format {
        ReportFormat::Text => print!("{summary}"),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(summary).map_err(|source| {
                ExportError::JsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{json}");
        }
    }
    Ok(())
}
