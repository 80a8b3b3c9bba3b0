use clap::{Parser, Subcommand, ValueEnum};
use csslint_lexer::{Dialect, Scanner};
use csslint_parser::{Classifier, LintOptions, Linter, Tokenizer};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "csslint")]
#[command(about = "csslint: error-recovering CSS, Less and SCSS checker")]
#[command(version)]
struct Cli {
    /// Log recovery steps to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a stylesheet and print its diagnostics
    Check {
        /// Input .css, .less or .scss file
        path: String,

        /// Stylesheet dialect; defaults to the file extension, then css
        #[arg(long, value_enum)]
        dialect: Option<DialectArg>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print the significant tokens the checker sees
    Tokens {
        /// Input .css, .less or .scss file
        path: String,

        /// Stylesheet dialect; defaults to the file extension, then css
        #[arg(long, value_enum)]
        dialect: Option<DialectArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Css,
    Less,
    Scss,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Css => Dialect::Css,
            DialectArg::Less => Dialect::Less,
            DialectArg::Scss => Dialect::Scss,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Check {
            path,
            dialect,
            format,
        } => cmd_check(&path, dialect, format),
        Command::Tokens { path, dialect } => cmd_tokens(&path, dialect),
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "csslint_parser=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn resolve_dialect(path: &str, arg: Option<DialectArg>) -> Dialect {
    if let Some(arg) = arg {
        return arg.into();
    }
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Dialect::from_extension)
        .unwrap_or_default()
}

fn cmd_check(path: &str, dialect: Option<DialectArg>, format: Format) {
    let source = read_source(path);
    let dialect = resolve_dialect(path, dialect);
    tracing::debug!(%dialect, path, "checking");

    let report = Linter::new(LintOptions::new(dialect)).run(&source);

    match format {
        Format::Json => {
            let output = serde_json::json!({
                "path": path,
                "dialect": dialect.name(),
                "diagnostics": report.diagnostics,
                "fault": report.fault.as_ref().map(|fault| fault.to_string()),
            });
            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error encoding diagnostics: {e}");
                    std::process::exit(1);
                }
            }
        }
        Format::Text => {
            for diagnostic in &report.diagnostics {
                println!("{path}:{diagnostic}");
            }
            if let Some(fault) = &report.fault {
                eprintln!("{path}: checking stopped early: {fault}");
            } else if report.diagnostics.is_empty() {
                eprintln!("OK: {path}");
            }
        }
    }

    if report.has_errors() {
        std::process::exit(1);
    }
}

fn cmd_tokens(path: &str, dialect: Option<DialectArg>) {
    let source = read_source(path);
    let dialect = resolve_dialect(path, dialect);

    let raw = Scanner::tokenize(&source, dialect);
    let mut tokenizer = Tokenizer::new(raw.into_iter(), Classifier::new());
    loop {
        let token = tokenizer.get_next_token();
        println!(
            "{}:{}-{}\t{}\t{:?}",
            token.start_line + 1,
            token.start_column + 1,
            token.end_column + 1,
            token.style,
            token.text
        );
        if token.is_eof() {
            break;
        }
    }
}
