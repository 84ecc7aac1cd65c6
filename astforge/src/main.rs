//! astforge binary
//!
//! Run with: `astforge [OPTIONS] [PROGRAM]`

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use astforge::{
    CorruptionConfig, GeneratorConfig, Grammar, IdentifierRegister, Instruction, Parser,
    TokenReader, VariableIdAllocator,
};

/// Grammar used when `--grammar` is not given.
const DEFAULT_GRAMMAR: &str = include_str!("../grammars/default.yaml");

#[derive(ClapParser)]
#[command(name = "astforge")]
#[command(about = "Generate instruction trees from a grammar and a prefix-notation program")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Program to read (reads from stdin if not provided)
    #[arg(value_name = "PROGRAM")]
    program: Option<PathBuf>,

    /// Grammar file (.yaml, .yml or .toml)
    #[arg(short, long, global = true)]
    grammar: Option<PathBuf>,

    /// Generator configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Maximum expression nesting per instruction
    #[arg(long)]
    max_depth: Option<usize>,

    /// Never take the corruption path
    #[arg(long)]
    pure: bool,

    /// Seed for the corruption roll
    #[arg(long, env = "ASTFORGE_SEED")]
    seed: Option<u64>,

    /// Probability in [0, 1] that an instruction is corrupted
    #[arg(long)]
    corruption_rate: Option<f64>,

    /// Pretty-print each instruction instead of one JSON object per line
    #[arg(long)]
    pretty: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default configuration
    Config,
    /// Validate a grammar and print it back as YAML
    CheckGrammar,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Some(Commands::Config) => {
            let config = GeneratorConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        Some(Commands::CheckGrammar) => {
            let grammar = load_grammar(cli.grammar.as_deref())?;
            print!("{}", grammar.to_yaml()?);
            return Ok(());
        }
        None => {}
    }

    let config = build_config(&cli)?;
    let grammar = load_grammar(cli.grammar.as_deref())?;
    let source = read_program(cli.program.as_deref())?;

    let parser = Parser::with_config(grammar, &config);
    let mut reader = TokenReader::from_source(&source).context("Failed to tokenize program")?;
    let mut register = IdentifierRegister::new();
    let mut allocator = VariableIdAllocator::new();

    debug!(
        "Generating with depth {}, corruption rate {}, seed {}",
        config.max_recursion_depth, config.corruption.rate, config.corruption.seed
    );

    let (instructions, failure) = match parser.parse_all(
        &mut reader,
        &mut register,
        &mut allocator,
        config.max_recursion_depth,
    ) {
        Ok(instructions) => (instructions, None),
        Err(err) => (err.instructions, Some(err.error)),
    };

    emit(&instructions, cli.pretty)?;

    let corrupted = instructions.iter().filter(|i| i.is_corrupted()).count();
    info!(
        "Generated {} instructions ({} corrupted), {} identifiers",
        instructions.len(),
        corrupted,
        register.len()
    );

    if let Some(err) = failure {
        error!("{}", err);
        std::process::exit(1);
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    // Override with CLI options
    if let Some(depth) = cli.max_depth {
        config.max_recursion_depth = depth;
    }
    if cli.pure {
        config.pure_run = true;
    }
    if let Some(seed) = cli.seed {
        config.corruption.seed = seed;
    }
    if let Some(rate) = cli.corruption_rate {
        config.corruption = CorruptionConfig {
            rate,
            ..config.corruption
        };
        config.corruption.validate()?;
    }

    Ok(config)
}

fn load_grammar(path: Option<&Path>) -> Result<Grammar> {
    match path {
        Some(path) => {
            debug!("Loading grammar: {}", path.display());
            Grammar::load(path)
                .with_context(|| format!("Failed to load grammar: {}", path.display()))
        }
        None => Grammar::from_yaml_str(DEFAULT_GRAMMAR).context("Built-in grammar is invalid"),
    }
}

fn read_program(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read program: {}", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read from stdin")?;
            Ok(source)
        }
    }
}

fn emit(instructions: &[Instruction], pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for instruction in instructions {
        let line = if pretty {
            serde_json::to_string_pretty(instruction)?
        } else {
            serde_json::to_string(instruction)?
        };
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}
