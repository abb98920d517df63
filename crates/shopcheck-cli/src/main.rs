//! shopcheck CLI - end-to-end checks for the automationexercise.com API

mod storage;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use shopcheck_core::envelope::preview;
use shopcheck_core::{
    Config, Failure, FailureType, OutcomeStatus, RunTag, Suite, SuitePlan, SuiteReport, UserAccount, Verdict,
    VerdictPolicy, VerdictStatus, to_http_file,
};
use shopcheck_runner::{SuiteRunner, TracingHook};

#[derive(Parser)]
#[command(name = "shopcheck")]
#[command(about = "End-to-end checks for the automationexercise.com storefront API")]
#[command(version)]
struct Cli {
    /// Defaults to `run`
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Failures in known-flaky scenarios fail the run too
    #[arg(long, global = true)]
    strict: bool,

    /// Debug logging (overridden by SHOPCHECK_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the suite
    Run(RunArgs),

    /// Show the scenario table
    List,

    /// Initialize config file
    Init,

    /// Export JSON Schema for the report format
    Schema,
}

#[derive(Args, Default)]
struct RunArgs {
    /// Config file (default: .shopcheck.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the configured base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Only these scenarios (comma separated keys); prerequisites are added
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Show what would be sent without sending anything
    #[arg(long)]
    dry_run: bool,

    /// Dump every exchange to JSONL files
    #[arg(long)]
    dump: bool,

    /// Directory for dump files (default: .shopcheck/dumps)
    #[arg(long)]
    dump_dir: Option<String>,

    /// Skip remaining scenarios after the first regression
    #[arg(long)]
    stop_on_failure: bool,

    /// Output directory (default: .shopcheck)
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Reuse a previous run's identity instead of generating one
    #[arg(long)]
    run_tag: Option<String>,

    /// Drop failures of these kinds before judging (repeatable, comma separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    ignore: Vec<IgnoreKind>,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum IgnoreKind {
    Status,
    Content,
    ResponseTime,
    Malformed,
    Transport,
}

impl From<IgnoreKind> for FailureType {
    fn from(kind: IgnoreKind) -> Self {
        match kind {
            IgnoreKind::Status => Self::StatusMismatch,
            IgnoreKind::Content => Self::ContentMismatch,
            IgnoreKind::ResponseTime => Self::ResponseTimeExceeded,
            IgnoreKind::Malformed => Self::MalformedResponse,
            IgnoreKind::Transport => Self::Transport,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SHOPCHECK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        None => run_suite(&RunArgs::default(), cli.output, cli.strict),
        Some(Commands::Run(ref args)) => run_suite(args, cli.output, cli.strict),

        Some(Commands::List) => {
            let cfg = Config::load_default()?;
            let plan = SuitePlan::build(
                &Suite::standard(),
                &cfg,
                &UserAccount::for_run(&RunTag::fixed("<tag>")),
            );
            match cli.output {
                OutputFormat::Terminal => {
                    for s in &plan.scenarios {
                        let stability = s
                            .known_flaky
                            .as_deref()
                            .map_or_else(|| "stable".to_string(), |r| format!("known flaky: {r}"));
                        println!(
                            "{} {:<28} {:>3}  {}",
                            s.key, s.operation, s.response_code, stability
                        );
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&plan.scenarios)?);
                }
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Some(Commands::Init) => {
            let config_path = ".shopcheck.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - base_url / base_path: service under test");
            println!("  - max_response_time_ms: per-call ceiling");
            println!("  - [login]: pre-existing account for the login scenarios");
            println!("  - [stale_account]: account the delete scenario removes");
            Ok(0)
        }

        Some(Commands::Schema) => {
            println!("{}", shopcheck_core::report::generate_schema());
            Ok(0)
        }
    }
}

fn verdict_policy(args: &RunArgs, strict: bool) -> VerdictPolicy {
    VerdictPolicy {
        strict,
        ignore_failure_types: args.ignore.iter().copied().map(FailureType::from).collect(),
        ..Default::default()
    }
}

fn run_suite(args: &RunArgs, output: OutputFormat, strict: bool) -> Result<i32> {
    let mut cfg = if let Some(path) = &args.config {
        Config::load(Path::new(path))?
    } else {
        Config::load_default()?
    };
    if let Some(url) = &args.base_url {
        cfg.base_url.clone_from(url);
    }

    let suite = if args.only.is_empty() {
        Suite::standard()
    } else {
        Suite::standard().select(args.only.as_slice())?
    };
    let run_tag = args.run_tag.clone().map(RunTag::fixed);

    if args.dry_run {
        let tag = run_tag.unwrap_or_else(|| RunTag::fixed("<tag>"));
        let plan = SuitePlan::build(&suite, &cfg, &UserAccount::for_run(&tag));
        match output {
            OutputFormat::Terminal => println!("{}", plan.to_terminal()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            OutputFormat::Silent => {}
        }
        return Ok(i32::from(plan.has_errors()));
    }

    if output != OutputFormat::Silent {
        eprintln!("Config:");
        eprintln!("  base_url: {}", cfg.endpoint_url(""));
        eprintln!("  max_response_time_ms: {}", cfg.max_response_time_ms);
        eprintln!("  scenarios: {}", suite.len());
        eprintln!();
    }

    let mut runner = SuiteRunner::from_config(&cfg)
        .with_stop_on_failure(args.stop_on_failure)
        .with_progress(output != OutputFormat::Silent)
        .with_hook(TracingHook);
    if let Some(tag) = run_tag {
        runner = runner.with_run_tag(tag);
    }
    let report = runner.run(&suite)?;

    if report.executed() == 0 {
        eprintln!("Error: No scenarios were executed. Check --only and the config.");
        return Ok(3);
    }

    let policy = verdict_policy(args, strict);
    let filtered = policy.filter(report.failures());
    let verdict = policy.verdict(&filtered, report.executed(), report.skipped());

    match output {
        OutputFormat::Terminal => {
            print!("{}", render_terminal(&report, &verdict));

            if !filtered.is_empty() {
                let output_dir = args.output_dir.as_deref().unwrap_or(".shopcheck");
                let http_path = Path::new(output_dir).join("reproductions.http");
                let written = std::fs::create_dir_all(output_dir)
                    .and_then(|()| std::fs::write(&http_path, to_http_file(&filtered, "base_url")));
                match written {
                    Ok(()) => println!("Reproductions: {}", http_path.display()),
                    Err(e) => eprintln!("Warning: failed to write .http file: {e}"),
                }
            }
        }
        OutputFormat::Json => {
            let json_output = serde_json::json!({
                "verdict": {
                    "status": verdict.status.to_string(),
                    "exit_code": verdict.exit_code,
                    "reason": verdict.reason,
                },
                "stats": {
                    "passed": report.passed(),
                    "failed": report.failed(),
                    "flaky_failed": report.flaky_failed(),
                    "skipped": report.skipped(),
                },
                "run_tag": report.run_tag,
                "failures": filtered,
            });
            println!("{}", serde_json::to_string_pretty(&json_output)?);
        }
        OutputFormat::Silent => {}
    }

    if args.dump || cfg.dump {
        let dump_path = args
            .dump_dir
            .as_deref()
            .map(PathBuf::from)
            .or_else(|| cfg.dump_dir.clone())
            .unwrap_or_else(|| PathBuf::from(".shopcheck/dumps"));

        match shopcheck_core::dump::write_dump(&report.exchanges(), &dump_path, true) {
            Ok(index) => {
                if output != OutputFormat::Silent {
                    eprintln!(
                        "Dump: {} exchanges → {} ({})",
                        index.total,
                        dump_path.display(),
                        index
                            .operations
                            .iter()
                            .map(|e| e.file.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    );
                }
            }
            Err(e) => eprintln!("Warning: failed to write dump: {e}"),
        }
    }

    let report_data = storage::ReportData {
        config: &cfg,
        report: &report,
        failures: &filtered,
        verdict: &verdict,
        strict,
    };
    match storage::save_report(&report_data) {
        Ok(path) => {
            if output != OutputFormat::Silent {
                eprintln!("Report saved: {}", path.display());
            }
        }
        Err(e) => eprintln!("Warning: failed to save report: {e}"),
    }

    Ok(verdict.exit_code)
}

/// One line per scenario, failure details indented under it, then the verdict.
fn render_terminal(report: &SuiteReport, verdict: &Verdict) -> String {
    let mut out = String::from("\n");
    for outcome in &report.outcomes {
        let timing = match outcome.status {
            OutcomeStatus::Skipped => String::new(),
            _ => format!(" ({} ms)", outcome.duration_ms),
        };
        out.push_str(&format!(
            "{:<5} {} {}{timing}\n",
            outcome.status.label(),
            outcome.key,
            outcome.operation
        ));
        for f in &outcome.failures {
            out.push_str(&failure_lines(f));
        }
    }

    let icon = if verdict.status == VerdictStatus::Pass {
        "PASS"
    } else {
        "FAIL"
    };
    out.push_str(&format!("\n{icon}: {}\n", verdict.reason));
    out.push_str(&format!(
        "  Scenarios: {} passed, {} failed, {} known flaky, {} skipped\n",
        report.passed(),
        report.failed(),
        report.flaky_failed(),
        report.skipped()
    ));
    out.push_str(&format!("  Run tag: {}\n", report.run_tag));
    out.push_str(&format!("  Exit code: {}\n", verdict.exit_code));
    out
}

fn failure_lines(f: &Failure) -> String {
    let mut lines = format!(
        "      [{}] {}\n        expected: {}\n        actual:   {}\n",
        f.severity, f.failure_type, f.expected, f.actual
    );
    if let Some(dep) = f.context.get("dependency") {
        lines.push_str(&format!("        note:     {dep}\n"));
    }
    if let Some(body) = f.response.as_ref().and_then(|r| r.body.as_deref()) {
        lines.push_str(&format!("        body:     {}\n", preview(body.trim())));
    }
    lines
}
