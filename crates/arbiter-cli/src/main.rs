//! Arbiter CLI - batch evaluation of agent responses and annotation
//! validation.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tokio::io::BufReader;

use arbiter_core::{
    validate_annotations, Aggregator, AnnotationPair, Checker, LeakageChecker, OverlapChecker,
    ValidationResult,
};
use arbiter_runtime::{
    read_records, writer_for, AnthropicProvider, CancelToken, CoherenceJudge, CompletenessJudge,
    Executor, FaithfulnessJudge, InputRecord, Judge, JudgeRunner, LlmProvider, OutputFormat,
    Processor, RuntimeConfig, StageRunner, SummaryStats,
};

#[derive(Parser)]
#[command(name = "arbiter")]
#[command(about = "Evaluate AI-agent responses with stage checks and LLM judges", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a batch of agent interactions from a JSONL stream
    Batch(BatchArgs),
    /// Gate machine verdicts against human annotations
    Validate(ValidateArgs),
}

#[derive(Args)]
struct BatchArgs {
    /// Input file path, or "-" for stdin
    #[arg(short, long)]
    input: String,

    /// Output file path; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: "jsonl" or "summary"
    #[arg(short, long, default_value = "jsonl")]
    format: String,

    /// Optional separate summary file, written in addition to the output
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Concurrent evaluation workers (overrides the config file)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Keep writing after a result fails to serialize or flush
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 1)]
    continue_on_error: bool,

    /// Validate input parse-ability without evaluating anything
    #[arg(long)]
    dry_run: bool,

    /// Optional YAML runtime configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Annotation pairs, one JSON object per line
    #[arg(short, long)]
    annotations: PathBuf,

    /// Minimum Kendall tau required to pass the gate
    #[arg(short, long, default_value_t = 0.3)]
    threshold: f64,

    /// Optional destination for the JSON validation report
    #[arg(short, long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Results may go to stdout; logs always go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Batch(args) => run_batch(args).await,
        Commands::Validate(args) => run_validate(args),
    }
}

async fn run_batch(args: BatchArgs) -> Result<()> {
    let started = Instant::now();

    // Fail on an unknown format before any file is opened.
    let format: OutputFormat = args.format.parse()?;
    let config = load_config(args.config.as_deref(), args.workers)?;

    let cancel = CancelToken::new();
    spawn_shutdown_handler(cancel.clone());

    let records = match args.input.as_str() {
        "-" => {
            tracing::info!("reading from stdin");
            read_records(BufReader::new(tokio::io::stdin()), &cancel).await?
        }
        path => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open input file {path}"))?;
            tracing::info!(file = path, "reading input file");
            read_records(BufReader::new(file), &cancel).await?
        }
    };
    tracing::info!(total = records.len(), "input parsed");

    if args.dry_run {
        return dry_run(&records);
    }

    let output: Box<dyn Write + Send> = match &args.output {
        None => {
            tracing::info!("writing to stdout");
            Box::new(std::io::stdout())
        }
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?;
            tracing::info!(file = %path.display(), "writing to output file");
            Box::new(file)
        }
    };
    let mut writer = writer_for(format, output);

    let executor = build_executor(&config)?;
    let processor = Processor::new(executor, config.workers);
    let mut results = processor.process(records, cancel);

    let mut success_count = 0u64;
    let mut error_count = 0u64;
    let mut collected = Vec::new();

    while let Some(result) = results.recv().await {
        if args.summary.is_some() {
            collected.push(result.clone());
        }
        match writer.write(&result) {
            Ok(()) => success_count += 1,
            Err(err) => {
                tracing::error!(id = %result.id, error = %err, "failed to write result");
                error_count += 1;
                if !args.continue_on_error {
                    bail!("stopping due to write error: {err}");
                }
            }
        }
    }
    writer.close()?;

    tracing::info!(
        success = success_count,
        errors = error_count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "processing complete"
    );

    if let Some(path) = &args.summary {
        write_summary(path, &collected)?;
    }

    Ok(())
}

/// Report every malformed line; nonzero exit when any line failed.
fn dry_run(records: &[InputRecord]) -> Result<()> {
    let mut error_count = 0usize;
    for record in records {
        if let InputRecord::Malformed { line_number, error } = record {
            tracing::error!(line = line_number, error = %error, "validation error");
            error_count += 1;
        }
    }

    if error_count > 0 {
        bail!("input validation failed: {error_count} malformed records");
    }

    tracing::info!(total = records.len(), "input validation successful");
    Ok(())
}

fn load_config(path: Option<&Path>, workers_override: Option<usize>) -> Result<RuntimeConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            serde_yaml::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => RuntimeConfig::default(),
    };

    if let Some(workers) = workers_override {
        config.workers = workers;
    }

    Ok(config)
}

fn build_executor(config: &RuntimeConfig) -> Result<Arc<Executor>> {
    let provider: Arc<dyn LlmProvider> =
        Arc::new(AnthropicProvider::from_env().context("LLM provider is not configured")?);

    let checkers: Vec<Arc<dyn Checker>> = vec![
        Arc::new(OverlapChecker::with_threshold(config.min_overlap)),
        Arc::new(LeakageChecker::new()),
    ];

    let judges: Vec<Arc<dyn Judge>> = vec![
        Arc::new(CompletenessJudge::new(Arc::clone(&provider), &config.judge)),
        Arc::new(FaithfulnessJudge::new(Arc::clone(&provider), &config.judge)),
        Arc::new(CoherenceJudge::new(Arc::clone(&provider), &config.judge)),
    ];

    Ok(Arc::new(Executor::new(
        StageRunner::new(checkers),
        JudgeRunner::new(judges),
        Aggregator::new(config.weights()),
        config.early_exit_threshold,
    )))
}

fn spawn_shutdown_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing in-flight work");
            cancel.cancel();
        }
    });
}

fn write_summary(path: &Path, results: &[arbiter_core::EvaluationResult]) -> Result<()> {
    let stats = SummaryStats::from_results(results);
    let mut file = File::create(path)
        .with_context(|| format!("failed to create summary file {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, &stats)?;
    file.write_all(b"\n")?;
    tracing::info!(file = %path.display(), "summary written");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.annotations).with_context(|| {
        format!("failed to read annotations file {}", args.annotations.display())
    })?;

    let mut pairs = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let pair: AnnotationPair = serde_json::from_str(trimmed)
            .with_context(|| format!("annotation line {} is malformed", index + 1))?;
        pairs.push(pair);
    }

    let result = validate_annotations(&pairs, args.threshold)?;

    print_report(&result);

    if let Some(path) = &args.report {
        let mut file = File::create(path)
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        serde_json::to_writer_pretty(&mut file, &result)?;
        file.write_all(b"\n")?;
        tracing::info!(file = %path.display(), "validation report written");
    }

    if !result.passed {
        println!();
        println!("Gate failed. Next steps:");
        println!("  - review the judge prompts against disagreeing examples");
        println!("  - collect more human annotations to tighten the estimate");
        bail!(
            "correlation gate failed: tau {:.3} below threshold {:.3}",
            result.kendall_tau,
            result.threshold
        );
    }

    Ok(())
}

fn print_report(result: &ValidationResult) {
    println!("Annotation validation");
    println!("  records:        {}", result.total_records);
    println!(
        "  agreement:      {} ({:.1}%)",
        result.agreement_count,
        result.agreement_rate * 100.0
    );
    println!("  kendall tau:    {:.3}", result.kendall_tau);
    println!("  interpretation: {}", result.interpretation);
    println!("  threshold:      {:.3}", result.threshold);
    println!(
        "  gate:           {}",
        if result.passed { "PASSED" } else { "FAILED" }
    );
    println!();
    println!("Confusion matrix (human x machine):");
    println!("  {:>8}  {:>6}  {:>6}  {:>6}", "", "pass", "review", "fail");
    for human in ["pass", "review", "fail"] {
        let cell = |machine: &str| {
            result
                .confusion_matrix
                .get(&format!("{human}_{machine}"))
                .copied()
                .unwrap_or(0)
        };
        println!(
            "  {:>8}  {:>6}  {:>6}  {:>6}",
            human,
            cell("pass"),
            cell("review"),
            cell("fail")
        );
    }
}
