//
// cli.rs
// DicomDir-Tools-rs
//
// Defines the mkdicomdir command line with Clap and dispatches each verb to the library.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::batch::{self, InputScan};
use crate::dicomdir::{DicomDir, DirState};
use crate::models::DirectorySummary;
use crate::options::{DirOptions, DEFAULT_FILESET_ID, DEFAULT_ICON_SIZE};
use crate::profile::ApplicationProfile;
use crate::{dump, json};

#[derive(Parser)]
#[command(name = "mkdicomdir")]
#[command(about = "Create, extend and inspect DICOMDIR files", long_about = None)]
pub struct Cli {
    /// More output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new DICOMDIR, replacing an existing one
    Create(BuildArgs),
    /// Add files to an existing DICOMDIR
    Append(BuildArgs),
    /// Add files to an existing DICOMDIR, checking and renumbering existing records
    Update(BuildArgs),
    /// Check files against an application profile without building anything
    Check {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        options: OptionArgs,
        /// Write the per-file results as JSON
        #[arg(long)]
        report_json: Option<PathBuf>,
    },
    /// Print the records of an existing DICOMDIR
    Dump {
        file: PathBuf,
        #[arg(long, default_value_t = 4)]
        max_depth: usize,
        #[arg(long, default_value_t = 64)]
        max_value_len: usize,
        /// Print the records as JSON instead
        #[arg(long)]
        json: bool,
        #[arg(short, long, requires = "json")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Files or directories, relative to the input directory
    pub inputs: Vec<String>,
    /// Descend into directories
    #[arg(short, long)]
    pub recurse: bool,
    /// Only take files matching this wildcard while recursing
    #[arg(short, long, requires = "recurse")]
    pub pattern: Option<String>,
    /// Root of the file-set; file IDs are relative to it
    #[arg(short = 'd', long, default_value = ".")]
    pub input_directory: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct OptionArgs {
    #[arg(long, value_enum, default_value_t)]
    pub profile: ApplicationProfile,
    #[arg(long, default_value = DEFAULT_FILESET_ID)]
    pub fileset_id: String,
    /// File-set descriptor file, relative to the input directory
    #[arg(long)]
    pub descriptor: Option<String>,
    #[arg(long, requires = "descriptor")]
    pub descriptor_charset: Option<String>,
    #[arg(long, default_value_t = DEFAULT_ICON_SIZE)]
    pub icon_size: u32,
    /// Take icons from `<prefix><file name>` PGM files
    #[arg(long)]
    pub icon_prefix: Option<String>,
    /// PGM icon used when no icon can be derived
    #[arg(long)]
    pub default_icon: Option<PathBuf>,
    /// Stop at the first bad file
    #[arg(long)]
    pub abort: bool,
    /// Accept lower case file names and map them to upper case
    #[arg(long)]
    pub map_filenames: bool,
    /// Invent missing identifiers and numbers
    #[arg(long)]
    pub invent: bool,
    /// Invent missing or conflicting patient IDs only
    #[arg(long)]
    pub invent_patient_id: bool,
    /// Accept retired SOP classes
    #[arg(long)]
    pub retired: bool,
    /// Add icon images to image records
    #[arg(long)]
    pub icons: bool,
    #[arg(long)]
    pub no_backup: bool,
    #[arg(long)]
    pub no_encoding_check: bool,
    #[arg(long)]
    pub no_resolution_check: bool,
    #[arg(long)]
    pub no_transfer_syntax_check: bool,
    /// Also read files without a meta-information header
    #[arg(long)]
    pub no_file_format_check: bool,
    #[arg(long)]
    pub no_consistency_check: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub options: OptionArgs,
    /// DICOMDIR to write; relative paths are taken from the input directory
    #[arg(short, long, default_value = "DICOMDIR")]
    pub output_file: PathBuf,
    /// Check and build everything but do not write the DICOMDIR
    #[arg(long)]
    pub discard: bool,
    /// Write the run summary as JSON
    #[arg(long)]
    pub report_json: Option<PathBuf>,
}

impl From<&OptionArgs> for DirOptions {
    fn from(args: &OptionArgs) -> Self {
        DirOptions {
            profile: args.profile,
            fileset_id: args.fileset_id.clone(),
            descriptor: args.descriptor.clone(),
            descriptor_charset: args.descriptor_charset.clone(),
            icon_size: args.icon_size,
            icon_prefix: args.icon_prefix.clone(),
            default_icon: args.default_icon.clone(),
            abort_on_error: args.abort,
            map_filenames: args.map_filenames,
            invent: args.invent,
            invent_patient_id: args.invent_patient_id,
            accept_retired: args.retired,
            create_icons: args.icons,
            backup: !args.no_backup,
            encoding_check: !args.no_encoding_check,
            resolution_check: !args.no_resolution_check,
            transfer_syntax_check: !args.no_transfer_syntax_check,
            file_format_check: !args.no_file_format_check,
            consistency_check: !args.no_consistency_check,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Verb {
    Create,
    Append,
    Update,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Create(args) => build(&args, Verb::Create)?,
        Commands::Append(args) => build(&args, Verb::Append)?,
        Commands::Update(args) => build(&args, Verb::Update)?,
        Commands::Check {
            input,
            options,
            report_json,
        } => check(&input, &options, report_json.as_deref())?,
        Commands::Dump {
            file,
            max_depth,
            max_value_len,
            json,
            output,
        } => {
            if json {
                json::to_json(&file, output.as_deref())?;
            } else {
                dump::dump_dicomdir(&file, max_depth, max_value_len)?;
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "mkdicomdir=error,dicomdir_tools=error",
        (false, 0) => "mkdicomdir=info,dicomdir_tools=info",
        (false, 1) => "mkdicomdir=debug,dicomdir_tools=debug",
        (false, _) => "mkdicomdir=trace,dicomdir_tools=trace",
    };
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn output_path(args: &BuildArgs) -> PathBuf {
    if args.output_file.is_absolute() {
        args.output_file.clone()
    } else {
        args.input.input_directory.join(&args.output_file)
    }
}

fn scan(input: &InputArgs, exclude: Vec<PathBuf>) -> anyhow::Result<Vec<String>> {
    let scan = InputScan {
        recurse: input.recurse,
        pattern: input.pattern.clone(),
        exclude,
    };
    let names = scan
        .collect(&input.input_directory, &input.inputs)
        .context("Failed to collect input files")?;
    if names.is_empty() {
        bail!("no input files: DICOMDIR not created");
    }
    Ok(names)
}

fn build(args: &BuildArgs, verb: Verb) -> anyhow::Result<()> {
    let options = DirOptions::from(&args.options);
    let output = output_path(args);
    let directory = args.input.input_directory.as_path();
    let names = scan(&args.input, vec![output.clone()])?;

    let mut dicomdir = DicomDir::new(options).context("Invalid options")?;
    match verb {
        Verb::Create => dicomdir.create(&output),
        Verb::Append => dicomdir.append(&output),
        Verb::Update => dicomdir.update(&output),
    }
    .with_context(|| format!("Failed to open {}", output.display()))?;

    for name in &names {
        if dicomdir.add_file(name, directory).is_err() && dicomdir.state() == DirState::Failed {
            break;
        }
    }

    let summary = dicomdir.summary();
    report_bad_files(&summary);
    let result = finish(&mut dicomdir, args, &summary);
    if let Some(path) = &args.report_json {
        write_report(path, &dicomdir.summary())?;
    }
    result
}

fn finish(dicomdir: &mut DicomDir, args: &BuildArgs, summary: &DirectorySummary) -> anyhow::Result<()> {
    if dicomdir.state() == DirState::Failed {
        dicomdir.discard().context("Failed to restore the previous DICOMDIR")?;
        bail!("aborted: DICOMDIR not written");
    }
    if summary.files_added == 0 && dicomdir.root().children.is_empty() {
        dicomdir.discard().context("Failed to restore the previous DICOMDIR")?;
        bail!("no good files: DICOMDIR not created");
    }
    if args.discard {
        info!("discarding DICOMDIR ({} records)", summary.total_records());
        dicomdir.discard().context("Failed to restore the previous DICOMDIR")?;
        return Ok(());
    }
    dicomdir.write().context("Failed to write DICOMDIR")?;
    println!(
        "{}: {} file(s) added, {} already present, {} rejected, {} record(s)",
        dicomdir.path().display(),
        summary.files_added,
        summary.files_skipped,
        summary.files_failed,
        summary.total_records()
    );
    Ok(())
}

fn report_bad_files(summary: &DirectorySummary) {
    if summary.bad_files.is_empty() {
        return;
    }
    warn!("{} bad file(s):", summary.bad_files.len());
    for name in &summary.bad_files {
        warn!("  {name}");
    }
}

fn write_report<T: serde::Serialize>(path: &Path, report: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn check(input: &InputArgs, options: &OptionArgs, report_json: Option<&Path>) -> anyhow::Result<()> {
    let options = DirOptions::from(options);
    options.validate().context("Invalid options")?;
    let names = scan(input, Vec::new())?;
    let checks = batch::check_files(&names, &input.input_directory, &options);
    let failed = checks.iter().filter(|c| !c.passed).count();
    for check in &checks {
        match (&check.record_type, &check.message) {
            (Some(kind), _) if check.passed => println!("ok     {} ({kind})", check.file),
            (_, Some(message)) => error!(file = %check.file, "{message}"),
            _ => {}
        }
    }
    if let Some(path) = report_json {
        write_report(path, &checks)?;
    }
    println!("{} of {} file(s) passed the {} profile", checks.len() - failed, checks.len(), options.profile);
    if failed > 0 {
        bail!("{failed} file(s) failed the check");
    }
    Ok(())
}
