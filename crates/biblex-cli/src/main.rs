//! biblex CLI

use biblex_error::{DiagnosticRenderer, Diagnostics, LexFault, SourceCache};
use biblex_lexer::{check, Lexer, Token, TokenKind};
use biblex_symbols::{is_special_entry_type, resolve_accents, EntryClass};
use clap::{ArgAction, Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter, e.g. `biblex_lexer=trace`
const LOG_ENV: &str = "BIBLEX_LOG";

#[derive(Parser)]
#[command(name = "biblex")]
#[command(version)]
#[command(about = "BibTeX tokenizer and checker", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable ANSI colors in diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shows the tokens of a .bib file
    Lex {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Checks a .bib file for truncated entries and stray characters
    Check {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Counts the entries of a .bib file by type
    Stats {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Resolves LaTeX accent commands in a value
    Accents {
        /// Raw value, e.g. "Erd\H{o}s"
        #[arg(value_name = "TEXT")]
        text: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("internal lexer fault: {0}")]
    Fault(#[from] LexFault),
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_source(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// How a token's text is shown by `biblex lex`
fn display_text(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::EndOfInput if token.text.is_empty() => "EOF".to_string(),
        TokenKind::EndOfInput => format!("EOF after {:?}", token.text),
        kind if kind.is_punctuation() => token.text.to_string(),
        _ => format!("{:?}", token.text),
    }
}

/// Entries per class, plus `@string`/`@preamble`/`@comment` blocks
#[derive(Debug, Default, PartialEq, Eq)]
struct EntryCounts {
    by_class: BTreeMap<EntryClass, usize>,
    special: usize,
}

impl EntryCounts {
    fn total(&self) -> usize {
        self.by_class.values().sum()
    }
}

/// Classifies every entry by the text token that follows its `@`
fn count_entries(tokens: &[Token<'_>]) -> EntryCounts {
    let mut counts = EntryCounts::default();

    for pair in tokens.windows(2) {
        if !(pair[0].is(TokenKind::At) && pair[1].is(TokenKind::Text)) {
            continue;
        }

        let entry_type = pair[1].into_entry_type();
        if is_special_entry_type(entry_type.text) {
            counts.special += 1;
        } else {
            *counts
                .by_class
                .entry(EntryClass::from_entry_type(entry_type.text))
                .or_insert(0) += 1;
        }
    }

    counts
}

fn print_diagnostics(cache: &SourceCache, diagnostics: &Diagnostics, colors: bool) {
    let renderer = DiagnosticRenderer::new(cache).with_colors(colors);
    for diag in diagnostics {
        eprintln!("{}", renderer.render(diag));
    }
}

fn run_lex(input: &Path, colors: bool) -> Result<ExitCode, CliError> {
    let source = read_source(input)?;
    let mut cache = SourceCache::new();
    let file_id = cache.add(input.display().to_string(), source.as_str());

    println!("Tokenizing: {}\n", input.display());

    let mut lexer = Lexer::new(&source, file_id);
    let tokens = lexer.tokenize()?;
    let diagnostics = check(&lexer, &tokens);

    for token in &tokens {
        println!(
            "  {:4}:{:<3}  {:<13}  {}",
            token.line(),
            token.column(),
            token.kind.name(),
            display_text(token)
        );
    }

    println!("\nTotal: {} tokens", tokens.len());

    if !diagnostics.is_empty() {
        println!();
        print_diagnostics(&cache, &diagnostics, colors);
    }

    Ok(exit_code(&diagnostics))
}

fn run_check(input: &Path, colors: bool) -> Result<ExitCode, CliError> {
    let source = read_source(input)?;
    let mut cache = SourceCache::new();
    let file_id = cache.add(input.display().to_string(), source.as_str());

    println!("Checking: {}\n", input.display());

    let mut lexer = Lexer::new(&source, file_id);
    let tokens = lexer.tokenize()?;
    let diagnostics = check(&lexer, &tokens);
    let entries = tokens.iter().filter(|t| t.is(TokenKind::At)).count();

    info!(tokens = tokens.len(), entries, "scanned");

    print_diagnostics(&cache, &diagnostics, colors);

    if diagnostics.has_errors() {
        println!("  [error] {} error(s)", diagnostics.error_count());
    } else {
        println!("  [ok] {} entries, {} tokens", entries, tokens.len());
    }

    let warnings = diagnostics.warning_count();
    if warnings > 0 {
        warn!(warnings, "ignored characters inside entries");
        println!("  [warn] {} warning(s)", warnings);
    }

    Ok(exit_code(&diagnostics))
}

fn run_stats(input: &Path, colors: bool) -> Result<ExitCode, CliError> {
    let source = read_source(input)?;
    let mut cache = SourceCache::new();
    let file_id = cache.add(input.display().to_string(), source.as_str());

    let mut lexer = Lexer::new(&source, file_id);
    let tokens = lexer.tokenize()?;
    let diagnostics = check(&lexer, &tokens);
    let counts = count_entries(&tokens);

    debug!(?counts, "entry counts");

    for (class, count) in &counts.by_class {
        println!("  {:<14} {:>5}", class, count);
    }
    println!("  {:<14} {:>5}", "total", counts.total());
    if counts.special > 0 {
        println!("  ({} @string/@preamble/@comment blocks)", counts.special);
    }

    if diagnostics.has_errors() {
        println!();
        print_diagnostics(&cache, &diagnostics, colors);
    }

    Ok(exit_code(&diagnostics))
}

fn exit_code(diagnostics: &Diagnostics) -> ExitCode {
    if diagnostics.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let colors = !cli.no_color;

    let result = match cli.command {
        Commands::Lex { input } => run_lex(&input, colors),
        Commands::Check { input } => run_check(&input, colors),
        Commands::Stats { input } => run_stats(&input, colors),
        Commands::Accents { text } => {
            println!("{}", resolve_accents(&text));
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
