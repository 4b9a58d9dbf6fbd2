//! IDL compatibility checker CLI.
//!
//! Exit codes: `0` compatible, `1` diagnostics recorded, `2` internal error.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use miette::IntoDiagnostic;

use idl_compat::{CheckReport, Checker, CheckerConfig, ErrorId};

mod ui;

const EXIT_COMPATIBLE: i32 = 0;
const EXIT_INCOMPATIBLE: i32 = 1;
const EXIT_INTERNAL: i32 = 2;

#[derive(Parser)]
#[command(name = "idl-compat")]
#[command(about = "Checks that a new IDL snapshot stays backward compatible with an old one")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two IDL snapshots
    Check {
        /// Root of the previously released snapshot
        old: PathBuf,

        /// Root of the candidate snapshot
        new: PathBuf,

        /// Extra import search root for the old snapshot (repeatable)
        #[arg(long = "old-include", value_name = "DIR")]
        old_include: Vec<PathBuf>,

        /// Extra import search root for the new snapshot (repeatable)
        #[arg(long = "new-include", value_name = "DIR")]
        new_include: Vec<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,

        /// IDL dialect of both snapshots
        #[arg(long, default_value = "idl")]
        language: String,

        /// Require reviewed-list entries for fields that become stable
        #[arg(long)]
        require_stability_review: bool,

        /// Print phase progress to stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// List every diagnostic id
    Ids,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{:?}", report);
            EXIT_INTERNAL
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> miette::Result<i32> {
    match cli.command {
        Commands::Check {
            old,
            new,
            old_include,
            new_include,
            format,
            language,
            require_stability_review,
            verbose,
        } => {
            let config = CheckerConfig {
                old_dir: old,
                new_dir: new,
                old_include,
                new_include,
                format: language,
                require_stability_review,
                verbose,
            };
            check(config, format)
        }

        Commands::Ids => {
            for id in ErrorId::ALL {
                println!("{}  {}", id.code(), id.name());
            }
            Ok(EXIT_COMPATIBLE)
        }
    }
}

/// Runs one comparison and prints the report.
fn check(config: CheckerConfig, format: OutputFormat) -> miette::Result<i32> {
    let verbose = config.verbose;
    let human = format == OutputFormat::Human;
    let started = Instant::now();

    // Progress lines from the library share stderr with the spinner.
    let spinner = (human && !verbose && ui::is_interactive())
        .then(|| ui::spinner("Comparing IDL snapshots..."));

    let result = Checker::new(config).and_then(|checker| checker.check());

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if human {
                ui::error_header();
            }
            return Err(e.into());
        }
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report.to_json()).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Human => print_human(&report, verbose, started.elapsed().as_millis()),
    }

    Ok(if report.is_compatible() {
        EXIT_COMPATIBLE
    } else {
        EXIT_INCOMPATIBLE
    })
}

fn print_human(report: &CheckReport, verbose: bool, elapsed_ms: u128) {
    if report.is_compatible() {
        ui::looking_good();
    } else {
        // Release gating greps this body, so it stays unstyled.
        print!("{}", report.errors.dump());
        ui::nope_header(report.summary.errors);
    }

    if verbose {
        let summary = &report.summary;
        ui::dim(&format!(
            "{} old files {} {} new files {} {} commands compared",
            summary.old_files,
            ui::symbols::DOT,
            summary.new_files,
            ui::symbols::DOT,
            summary.commands_checked
        ));
        ui::timing("Checked", elapsed_ms);
    }
}
