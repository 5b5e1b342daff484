//! loadfile CLI - litigation load file inspection and conversion tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;

use loadfile::{
    detect_format_from_path, parse_file_with_options, DelimitedOptions, Delimiters, DocumentSet,
    ExportFormat, ExportOptions, ImageOptions, ImportOptions, JsonFormat, RepresentativeKind,
    RepresentativeNames, RepresentativeSetting, TextLevel, TextLocation, TextSetting,
};

#[derive(Parser)]
#[command(name = "loadfile")]
#[command(version)]
#[command(about = "Inspect and convert litigation load files (DAT, OPT, LFP)", long_about = None)]
struct Cli {
    /// Input load file (shows information when no command is given)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document, family and representative counts
    Info {
        /// Input load file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Convert a load file to another format
    Convert {
        /// Input load file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output format
        #[arg(long, value_enum)]
        to: OutputFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        load: LoadArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Convert a load file to JSON
    Json {
        /// Input load file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Show version information
    Version,
}

/// Options controlling how the input is read.
#[derive(Args, Clone)]
struct LoadArgs {
    /// Delimiter preset: concordance, comma-quote, comma, tab, pipe-caret
    /// (guessed from the first line when omitted)
    #[arg(long, env = "LOADFILE_DELIMITERS")]
    delimiters: Option<String>,

    /// The first record is data, not a header
    #[arg(long)]
    no_header: bool,

    /// Column holding the document key (first column by default)
    #[arg(long, value_name = "COLUMN")]
    key_column: Option<String>,

    /// Column holding the parent key
    #[arg(long, value_name = "COLUMN")]
    parent_column: Option<String>,

    /// Column holding the child keys
    #[arg(long, value_name = "COLUMN")]
    child_column: Option<String>,

    /// Separator between child keys
    #[arg(long, default_value = loadfile::parser::DEFAULT_CHILD_SEPARATOR)]
    child_separator: String,

    /// Representative column, e.g. "native:NativePath" or "text:TextPath:ocr"
    #[arg(long = "representative", value_name = "KIND:COLUMN[:NAME]", value_parser = parse_representative)]
    representatives: Vec<RepresentativeSetting>,

    /// Derive text representatives from image paths
    #[arg(long, value_enum, default_value = "none")]
    text_level: TextLevelArg,

    /// Pattern replaced in image directories to locate text files
    #[arg(long, value_name = "REGEX", requires = "text_replace")]
    text_find: Option<String>,

    /// Replacement for --text-find
    #[arg(long, value_name = "TEXT", requires = "text_find")]
    text_replace: Option<String>,

    /// Extension of derived text files
    #[arg(long, default_value = loadfile::parser::DEFAULT_TEXT_EXTENSION)]
    text_extension: String,

    /// Name of the image representative
    #[arg(long, default_value = "default")]
    image_name: String,

    /// Name of the native representative
    #[arg(long, default_value = "default")]
    native_name: String,

    /// Name of the text representative
    #[arg(long, default_value = "default")]
    text_name: String,
}

impl Default for LoadArgs {
    fn default() -> Self {
        Self {
            delimiters: None,
            no_header: false,
            key_column: None,
            parent_column: None,
            child_column: None,
            child_separator: loadfile::parser::DEFAULT_CHILD_SEPARATOR.to_string(),
            representatives: Vec::new(),
            text_level: TextLevelArg::None,
            text_find: None,
            text_replace: None,
            text_extension: loadfile::parser::DEFAULT_TEXT_EXTENSION.to_string(),
            image_name: "default".to_string(),
            native_name: "default".to_string(),
            text_name: "default".to_string(),
        }
    }
}

/// Options controlling how the output is written.
#[derive(Args, Clone)]
struct ExportArgs {
    /// Delimiter preset for delimited output
    #[arg(long, value_name = "PRESET", default_value = "concordance")]
    out_delimiters: String,

    /// Volume name written to image rows
    #[arg(long)]
    volume: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Delimited load file
    Dat,
    /// Opticon image cross-reference
    Opt,
    /// IPRO image and native load
    Lfp,
    /// JSON array of documents
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Dat => ExportFormat::Delimited,
            OutputFormat::Opt => ExportFormat::Opticon,
            OutputFormat::Lfp => ExportFormat::Lfp,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
enum TextLevelArg {
    /// No derived text
    #[default]
    None,
    /// One text file per image page
    Page,
    /// One text file per document
    Doc,
}

impl From<TextLevelArg> for TextLevel {
    fn from(level: TextLevelArg) -> Self {
        match level {
            TextLevelArg::None => TextLevel::None,
            TextLevelArg::Page => TextLevel::Page,
            TextLevelArg::Doc => TextLevel::Doc,
        }
    }
}

fn parse_representative(value: &str) -> Result<RepresentativeSetting, String> {
    let mut parts = value.splitn(3, ':');
    let kind = parts.next().unwrap_or_default();
    let column = parts.next().filter(|c| !c.is_empty()).ok_or_else(|| {
        format!("expected KIND:COLUMN[:NAME], got '{}'", value)
    })?;
    let kind: RepresentativeKind = kind.parse().map_err(|e| format!("{}", e))?;

    let setting = RepresentativeSetting::new(column, kind);
    Ok(match parts.next() {
        Some(name) if !name.is_empty() => setting.with_name(name),
        _ => setting,
    })
}

impl LoadArgs {
    fn names(&self) -> RepresentativeNames {
        RepresentativeNames::new()
            .with_image(&self.image_name)
            .with_native(&self.native_name)
            .with_text(&self.text_name)
    }

    fn text(&self) -> Result<Option<TextSetting>, Box<dyn std::error::Error>> {
        if self.text_level == TextLevelArg::None {
            return Ok(None);
        }

        let mut setting =
            TextSetting::new(self.text_level.into()).with_extension(&self.text_extension);
        if let (Some(find), Some(replace)) = (&self.text_find, &self.text_replace) {
            let pattern = Regex::new(find).map_err(|e| format!("Invalid --text-find: {}", e))?;
            setting = setting.with_location(TextLocation::alternate(pattern, replace));
        }
        Ok(Some(setting))
    }

    fn import_options(&self) -> Result<ImportOptions, Box<dyn std::error::Error>> {
        let text = self.text()?;

        let mut delimited = DelimitedOptions::new()
            .with_header(!self.no_header)
            .with_child_separator(&self.child_separator)
            .with_names(self.names());
        if let Some(column) = &self.key_column {
            delimited = delimited.with_key_column(column);
        }
        if let Some(column) = &self.parent_column {
            delimited = delimited.with_parent_column(column);
        }
        if let Some(column) = &self.child_column {
            delimited = delimited.with_child_column(column);
        }
        for setting in &self.representatives {
            delimited = delimited.with_representative(setting.clone());
        }

        let mut image = ImageOptions::new().with_names(self.names());
        if let Some(text) = text {
            delimited = delimited.with_text(text.clone());
            image = image.with_text(text);
        }

        let options = match &self.delimiters {
            Some(preset) => ImportOptions::new()
                .with_delimited(delimited.with_delimiters(Delimiters::from_preset_name(preset)?)),
            None => ImportOptions::new().with_delimited_auto(delimited),
        };
        Ok(options.with_image(image))
    }

    fn export_options(&self, export: &ExportArgs) -> Result<ExportOptions, Box<dyn std::error::Error>> {
        let mut options = ExportOptions::new()
            .with_delimiters(Delimiters::from_preset_name(&export.out_delimiters)?)
            .with_names(self.names())
            .with_child_separator(&self.child_separator);
        if let Some(volume) = &export.volume {
            options = options.with_volume(volume);
        }
        if let Some(column) = &self.parent_column {
            options = options.with_parent_column(column);
        }
        if let Some(column) = &self.child_column {
            options = options.with_child_column(column);
        }
        for setting in &self.representatives {
            options = options.with_representative(setting.clone());
        }
        Ok(options)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Info { input, load }) => cmd_info(&input, &load),
        Some(Commands::Convert {
            input,
            to,
            output,
            load,
            export,
        }) => cmd_convert(&input, to, output.as_deref(), &load, &export),
        Some(Commands::Json {
            input,
            output,
            compact,
            load,
        }) => cmd_json(&input, output.as_deref(), compact, &load),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_info(&input, &LoadArgs::default())
            } else {
                println!("{}", "Usage: loadfile <FILE>".yellow());
                println!("       loadfile --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn load(input: &Path, args: &LoadArgs) -> Result<DocumentSet, Box<dyn std::error::Error>> {
    let options = args.import_options()?;
    let pb = spinner("Reading load file...");
    let result = parse_file_with_options(input, &options);
    pb.finish_and_clear();
    Ok(result?)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", content);
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn cmd_convert(
    input: &Path,
    to: OutputFormat,
    output: Option<&Path>,
    load_args: &LoadArgs,
    export_args: &ExportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let set = load(input, load_args)?;
    let options = load_args.export_options(export_args)?;
    let text = loadfile::export::export(&set, to.into(), &options)?;
    log::info!("converted {} documents to {}", set.len(), ExportFormat::from(to));
    write_output(output, &text)
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    load_args: &LoadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let set = load(input, load_args)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = loadfile::export::to_json(&set, format)?;
    write_output(output, &json)
}

/// Counts shown by `info`.
fn summarize(set: &DocumentSet) -> serde_json::Value {
    let count_files = |kind: RepresentativeKind| -> usize {
        set.iter()
            .flat_map(|doc| doc.representatives_of(kind))
            .map(|r| r.file_count())
            .sum()
    };
    let with_kind = |kind: RepresentativeKind| -> usize {
        set.iter()
            .filter(|doc| doc.representatives_of(kind).any(|r| !r.is_empty()))
            .count()
    };

    serde_json::json!({
        "documents": set.len(),
        "families": set.family_count(),
        "children": set.iter().filter(|doc| doc.is_child()).count(),
        "images": {
            "documents": with_kind(RepresentativeKind::Image),
            "files": count_files(RepresentativeKind::Image),
        },
        "natives": {
            "documents": with_kind(RepresentativeKind::Native),
            "files": count_files(RepresentativeKind::Native),
        },
        "text": {
            "documents": with_kind(RepresentativeKind::Text),
            "files": count_files(RepresentativeKind::Text),
        },
    })
}

fn cmd_info(input: &Path, load_args: &LoadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let set = load(input, load_args)?;
    let summary = summarize(&set);

    println!("{}", "Load File Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Documents".bold(), summary["documents"]);
    println!("{}: {}", "Families".bold(), summary["families"]);
    println!("{}: {}", "Children".bold(), summary["children"]);

    if let Some(first) = set.iter().next() {
        let fields: Vec<&str> = first.metadata.keys().map(String::as_str).collect();
        println!("{}: {}", "Fields".bold(), fields.join(", "));
    }

    println!();
    println!("{}", "Representatives".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for key in ["images", "natives", "text"] {
        println!(
            "{}: {} documents, {} files",
            key.bold(),
            summary[key]["documents"],
            summary[key]["files"]
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "loadfile".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Litigation load file inspection and conversion tool");
    println!();
    println!("License: MIT");
}
