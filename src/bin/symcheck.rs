//! Symbol Test Generator CLI
//!
//! Generates a C++ program that constructs every listed class and template and
//! takes the address of every listed function and singleton.
//!
//! # Usage
//!
//! ```bash
//! # Debug functions filtered out (anything but "true")
//! symcheck symbols.txt false src/pwx/*.h > sym_test.cpp
//!
//! # Keep debug functions
//! symcheck symbols.txt true src/pwx/*.h
//!
//! # No filtering at all, extra rules, JSON report on stderr
//! symcheck --profile plain --rules rules.yaml --report json symbols.txt pwx.h
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use symcheck::{
    split_command_args, GenerationReport, Generator, GeneratorConfig, Profile, RuleFile, RuleSet,
    SymbolListing,
};

#[derive(Parser)]
#[command(name = "symcheck")]
#[command(version = "0.1.0")]
#[command(about = "Generate a C++ symbol presence/linkage smoke test from a symbol listing")]
#[command(long_about = None)]
struct Cli {
    /// Symbol listing, one qualified symbol per line
    listing: PathBuf,

    /// Filtered profile: debug flag, then header files. Plain profile: header files.
    /// Only the file name of each header is used.
    #[arg(value_name = "DEBUG|HEADER")]
    args: Vec<String>,

    /// Which optional filters to apply
    #[arg(long, value_enum, default_value = "filtered")]
    profile: ProfileArg,

    /// Debug flag override; when given, every positional after the listing is a header
    #[arg(long, env = "SYMCHECK_DEBUG_SYMBOLS")]
    debug_symbols: Option<String>,

    /// Library namespace of the listed symbols
    #[arg(long, default_value = "pwx", env = "SYMCHECK_NAMESPACE")]
    namespace: String,

    /// YAML file with additional synthesis rules
    #[arg(long, env = "SYMCHECK_RULES")]
    rules: Option<PathBuf>,

    /// Longest all-caps name treated as a global singleton
    #[arg(long, default_value_t = 3)]
    max_singleton_len: usize,

    /// Write the program here instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Print a generation report to stderr
    #[arg(long, value_enum)]
    report: Option<ReportFormat>,

    /// Log skipped lines and rule decisions
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    Filtered,
    Plain,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Filtered => Profile::Filtered,
            ProfileArg::Plain => Profile::Plain,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut rules = RuleSet::builtin(&cli.namespace);
    if let Some(path) = &cli.rules {
        let file = RuleFile::load(path)?;
        rules
            .merge(file)
            .with_context(|| format!("Invalid rules in '{}'", path.display()))?;
    }

    let profile: Profile = cli.profile.into();
    let (debug_symbols, headers) = split_command_args(profile, cli.debug_symbols, cli.args);

    let config = GeneratorConfig {
        namespace: cli.namespace,
        profile,
        debug_symbols,
        headers,
        max_singleton_len: cli.max_singleton_len,
        ..Default::default()
    };

    let listing = SymbolListing::load(&cli.listing)?;
    let program = Generator::with_rules(config, rules).generate(&listing);

    match &cli.output {
        Some(path) => std::fs::write(path, &program.source)
            .with_context(|| format!("Cannot write '{}'", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(program.source.as_bytes())
                .context("Cannot write to stdout")?;
            stdout.flush().context("Cannot write to stdout")?;
        }
    }

    match cli.report {
        Some(ReportFormat::Json) => {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&program.report)
                    .context("Cannot serialize report")?
            );
        }
        Some(ReportFormat::Text) => print_report(&program.report),
        None => {}
    }

    Ok(())
}

fn print_report(report: &GenerationReport) {
    eprintln!(
        "{} {} symbol(s) from {} line(s)",
        "OK".green().bold(),
        report.recognized(),
        report.lines
    );
    eprintln!("  classes:    {:>5}", report.classes);
    eprintln!("  templates:  {:>5}", report.templates);
    eprintln!("  functions:  {:>5}", report.functions);
    eprintln!("  singletons: {:>5}", report.singletons);
    eprintln!("  table rows: {:>5}", report.table_rows);
    eprintln!(
        "  headers:    {:>5}  excluded: {}",
        report.headers_included, report.headers_excluded
    );

    if report.debug_filtered > 0 {
        eprintln!(
            "  {} {} debug function(s) filtered",
            "note:".cyan(),
            report.debug_filtered
        );
    }
    if report.private_skipped > 0 {
        eprintln!(
            "  {} {} private namespace line(s) ignored",
            "note:".cyan(),
            report.private_skipped
        );
    }
    if report.skipped_lines > 0 {
        eprintln!(
            "  {} {} unrecognized line(s) skipped",
            "warning:".yellow().bold(),
            report.skipped_lines
        );
    }
    for name in &report.duplicate_objects {
        eprintln!(
            "  {} duplicate test function for {}",
            "warning:".yellow().bold(),
            name
        );
    }
}
