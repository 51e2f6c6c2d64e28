use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Import from reformat-core
use reformat_core::{ConfigFormat, RuleEngine, RuleSetConfig, RuleStore, TransformReport};

// Import CLI utilities
use reformat_cli::DataDir;

#[derive(Parser)]
#[command(name = "reformat")]
#[command(about = "Rewrite text with an ordered list of regex rules, earlier rules winning overlaps")]
struct Args {
    /// Path to the input text (default: stdin)
    #[arg(short, long)]
    input: Option<String>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Rule-set file (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    rules: Option<String>,

    /// Rule store directory (default: ~/.local/share/reformat)
    #[arg(long)]
    store: Option<String>,

    /// Load a named rule set from the store instead of a file
    #[arg(long, conflicts_with = "rules")]
    rule_set: Option<String>,

    /// Save the effective rule set to the store under this name
    #[arg(long)]
    save_as: Option<String>,

    /// Print the effective rules as YAML and exit
    #[arg(long)]
    show_rules: bool,

    /// Write a JSON report of claims and skipped rules to stderr
    #[arg(long)]
    report: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_rules(&args)?;

    if let Some(name) = &args.save_as {
        config.name = name.clone();
        let store = DataDir::resolve(args.store.as_deref())?.open_store()?;
        store
            .save(name, &config)
            .with_context(|| format!("Failed to save rule set '{name}'"))?;
        info!(rule_set = %name, rules = config.rules.len(), "rule set saved to store");
    }

    if args.show_rules {
        print!("{}", config.to_string_with_format(ConfigFormat::Yaml)?);
        return Ok(());
    }

    let input = read_input(args.input.as_deref())?;
    let engine = RuleEngine::from_config(&config);
    let report = engine.apply_with_report(&input);

    if args.report {
        write_report(&config, &report)?;
    }

    write_output(args.output.as_deref(), &report.output)?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("reformat=debug")
    } else {
        EnvFilter::new("reformat=info")
    };

    // stdout carries the transformed text
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

/// Stored rule set when `--rule-set` is given, else `--rules` or the built-in rules
fn load_rules(args: &Args) -> Result<RuleSetConfig> {
    if let Some(name) = &args.rule_set {
        let data_dir = DataDir::resolve(args.store.as_deref())?;
        let store = data_dir.open_store()?;
        let Some(stored) = store
            .load(name)
            .with_context(|| format!("Failed to load rule set '{name}'"))?
        else {
            bail!(
                "Rule set '{name}' not found in {}",
                data_dir.rulesets_path().display()
            );
        };
        if !stored.is_intact() {
            warn!(rule_set = %name, "stored rules changed since they were saved");
        }
        debug!(rule_set = %name, saved_at = %stored.saved_at, "using stored rule set");
        return Ok(stored.config);
    }

    let config = RuleSetConfig::load_with_fallback(args.rules.as_deref());
    match &args.rules {
        Some(path) => debug!(path = %path, rules = config.rules.len(), "rules loaded"),
        None => debug!(rules = config.rules.len(), "using built-in rules"),
    }
    Ok(config)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {path}")),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn write_output(path: Option<&str>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {path}"))?;
            info!(path = %path, "output written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn write_report(config: &RuleSetConfig, report: &TransformReport) -> Result<()> {
    let summary = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "rule_set": config.name,
        "fingerprint": config.fingerprint()?,
        "changed": report.changed(),
        "elapsed_micros": report.elapsed_micros,
        "claims": report.claims,
        "skipped": report.skipped,
    });
    eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
