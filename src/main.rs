use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use lakeql::{
    EvalMode,
    cli::{self, CliError, InputFormat, OutputFormat, RunOptions, RunResult},
};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "lakeql")]
#[command(about = "LakeQL - run a SQL subset against a JSON or CSV table")]
#[command(version)]
struct Cli {
    /// Log execution details to stderr (overrides LAKEQL_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and execute a query
    Run {
        /// The query to execute
        query: String,

        /// JSON or CSV table file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Input format (defaults to csv for .csv files, json otherwise)
        #[arg(long, value_enum)]
        input_format: Option<SourceFormat>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax and print the parsed query
        #[arg(long)]
        syntax_only: bool,

        /// Report errors inside expressions instead of treating them as NULL
        #[arg(long)]
        strict: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'lakeql docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            query,
            input,
            input_format,
            format,
            pretty,
            syntax_only,
            strict,
        } => run(query, input, input_format, format, pretty, syntax_only, strict),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("LAKEQL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(
    query: String,
    input: Option<PathBuf>,
    input_format: Option<SourceFormat>,
    format: Format,
    pretty: bool,
    syntax_only: bool,
    strict: bool,
) -> Result<(), CliError> {
    let input_format = match (input_format, &input) {
        (Some(SourceFormat::Json), _) => InputFormat::Json,
        (Some(SourceFormat::Csv), _) => InputFormat::Csv,
        (None, Some(path)) => InputFormat::from_path(path),
        (None, None) => InputFormat::Json,
    };

    let input = match input {
        Some(path) => Some(fs::read_to_string(path)?),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let format = match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
    };

    let options = RunOptions {
        query,
        input,
        input_format,
        format,
        pretty,
        syntax_only,
        mode: if strict { EvalMode::Strict } else { EvalMode::Lenient },
    };

    match cli::execute_run(&options)? {
        RunResult::SyntaxValid(canonical) => println!("Syntax is valid: {}", canonical),
        RunResult::Success(table) => {
            print!("{}", cli::render(&table, options.format, options.pretty));
            if options.format == OutputFormat::Text {
                println!("({} rows)", table.num_rows());
            }
        }
    }
    Ok(())
}
