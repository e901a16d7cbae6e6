mod logic;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::checks::CheckDef;
use logic::{CheckContext, CheckResult, get_check, list_checks, resolve_seed_inputs, run_check};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary for terminals
    Console,
    /// Machine-readable check results
    Json,
    /// Markdown suitable for CI summaries
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "farsight-tester", version = "0.1.0")]
#[command(about = "Automated QA checks for the Farsight quiz engine")]
struct Args {
    /// Checks to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    checks: String,

    /// List all available checks and exit
    #[arg(long)]
    list_checks: bool,

    /// Catalog seeds to check (comma-separated integers, or `random`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Simulated play-throughs per category and strategy
    #[arg(long, default_value_t = 1)]
    plays: usize,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_checks(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let checks = expand_checks(&args.checks);
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    for seed in seeds.iter().filter(|s| s.random) {
        println!("🎲 Drew random seed {}", seed.seed.to_string().bright_white());
    }

    let ctx = CheckContext {
        seeds: &seeds,
        plays: args.plays,
        verbose: args.verbose,
    };

    println!("{}", "🧠 Running Checks".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());
    let results: Vec<CheckResult> = checks.iter().map(|check| run_check(check, &ctx)).collect();

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_checks(args: &Args) -> Result<bool> {
    if !args.list_checks {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available checks:")?;
    for (key, description) in list_checks() {
        writeln!(output_target.writer(), "  {key:22} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🔭 Farsight Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_checks(checks_arg: &str) -> Vec<&'static CheckDef> {
    let mut keys = split_csv(checks_arg);
    if keys.iter().any(|k| k == "all") {
        keys.retain(|k| k != "all");
        keys.extend(list_checks().map(|(key, _)| key.to_string()));
    }

    let mut checks: Vec<&'static CheckDef> = Vec::new();
    for key in keys {
        match get_check(&key) {
            Some(check) => {
                if !checks.iter().any(|c| c.key == check.key) {
                    checks.push(check);
                }
            }
            None => eprintln!("⚠️  Unknown check: {}", key.yellow()),
        }
    }
    checks
}

fn write_reports(args: &Args, results: &[CheckResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            logic::reports::generate_json_report(&mut output_target, results)?;
        }
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Farsight Check Results\n\n_No checks executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(&mut output_target, "No checks executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
