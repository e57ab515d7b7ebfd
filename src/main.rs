//! Promptsmith CLI
//!
//! Optimizes prompts for AI coding assistants.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal, Read};

use promptsmith::patterns::PatternScope;
use promptsmith::{Intent, IntentDetector, Mode, OptimizationReport, PromptOptimizer};

/// Promptsmith
#[derive(Parser, Debug)]
#[command(name = "promptsmith")]
#[command(author = "Z1529")]
#[command(version = "0.1.0")]
#[command(about = "Prompt optimizer - adds the context AI coding assistants need")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Optimize a prompt
    Optimize {
        /// Prompt text (read from stdin when omitted)
        prompt: Option<String>,

        /// Pattern set to run (fast, deep)
        #[arg(short, long, default_value = "fast")]
        mode: Mode,

        /// Emit a JSON report
        #[arg(long)]
        json: bool,
    },
    /// Show the detected intent without optimizing
    Analyze {
        /// Prompt text (read from stdin when omitted)
        prompt: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// List registered patterns
    Patterns {
        /// Only patterns that may run in this mode
        #[arg(short, long)]
        mode: Option<Mode>,

        /// Only patterns that apply to this intent
        #[arg(short, long)]
        intent: Option<Intent>,

        /// Emit statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print version information
    Version,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize { prompt, mode, json } => optimize(prompt, mode, json),
        Commands::Analyze { prompt, json } => analyze(prompt, json),
        Commands::Patterns { mode, intent, json } => list_patterns(mode, intent, json),
        Commands::Version => {
            println!("promptsmith 0.1.0");
            println!("Prompt optimizer for AI coding assistants");
            println!("License: Apache-2.0");
            Ok(())
        }
    }
}

/// Prompt from the argument, or all of stdin
fn read_prompt(prompt: Option<String>) -> Result<String> {
    if let Some(prompt) = prompt {
        return Ok(prompt);
    }
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        bail!("No prompt given. Usage: promptsmith optimize \"<prompt>\" or pipe text on stdin");
    }
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .context("Failed to read prompt from stdin")?;
    Ok(buffer.trim_end().to_string())
}

fn optimize(prompt: Option<String>, mode: Mode, json: bool) -> Result<()> {
    let prompt = read_prompt(prompt)?;
    let optimizer = PromptOptimizer::new();
    let result = optimizer.optimize(&prompt, mode);
    let report = OptimizationReport::from_result(&result, &optimizer);

    if json {
        println!("{}", report.to_json());
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn analyze(prompt: Option<String>, json: bool) -> Result<()> {
    let prompt = read_prompt(prompt)?;
    let analysis = IntentDetector::new().analyze(&prompt);

    if json {
        let out = serde_json::to_string_pretty(&analysis).context("Failed to serialize intent analysis")?;
        println!("{}", out);
        return Ok(());
    }

    let c = &analysis.characteristics;
    println!("Intent:     {}", analysis.primary_intent);
    println!("Confidence: {}% ({:?})", analysis.confidence, analysis.confidence_band());
    if let Some(secondary) = analysis.secondary_intent {
        println!("Runner-up:  {}", secondary);
    }
    println!("  [{}] code context", mark(c.has_code_context));
    println!("  [{}] technical terms", mark(c.has_technical_terms));
    println!("  [{}] open-ended", mark(c.is_open_ended));
    println!("  [{}] needs structure", mark(c.needs_structure));
    Ok(())
}

fn list_patterns(mode: Option<Mode>, intent: Option<Intent>, json: bool) -> Result<()> {
    let optimizer = PromptOptimizer::new();
    let library = optimizer.library();

    if json {
        let out = serde_json::to_string_pretty(&library.statistics())
            .context("Failed to serialize pattern statistics")?;
        println!("{}", out);
        return Ok(());
    }

    let mut shown = 0;
    for pattern in library.patterns() {
        if mode.is_some_and(|m| !pattern.scope().includes(m)) {
            continue;
        }
        if intent.is_some_and(|i| !pattern.applicable_intents().contains(&i)) {
            continue;
        }
        let scope = match pattern.scope() {
            PatternScope::Fast => "fast",
            PatternScope::Deep => "deep",
            PatternScope::Both => "both",
        };
        println!("{:>3}  {:<5} {:<30} {}", pattern.priority(), scope, pattern.id(), pattern.description());
        shown += 1;
    }
    println!("\n{} of {} patterns", shown, library.pattern_count());
    Ok(())
}

fn mark(flag: bool) -> char {
    if flag {
        '✓'
    } else {
        ' '
    }
}
