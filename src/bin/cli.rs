// EmberSQL - interactive shell for the Ember engine
//
// Loads CSV files into in-memory tables and runs SQL against them, either
// interactively or one-shot.

use std::fs::File;
use std::io::Seek;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::util::pretty::pretty_format_batches;
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use emberdb::engine::{init_with_config, Engine};
use emberdb::storage::TableOptions;
use emberdb::{ConfigBuilder, LoggerOptions, init_logger, version};

const HISTORY_FILE: &str = ".embersql_history";

#[derive(Parser)]
#[command(name = "embersql", version, about = "SQL shell for the Ember engine")]
struct Cli {
    /// Load a CSV file as a table before running, as NAME=PATH. Repeatable.
    #[arg(long = "load", value_name = "NAME=PATH")]
    load: Vec<String>,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the interactive shell (the default).
    Shell,
    /// Run a single query and print the result.
    Query {
        /// The SQL text to run.
        sql: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&LoggerOptions { debug_logs: cli.debug });

    let engine = init_with_config(ConfigBuilder::new())?;
    for spec in &cli.load {
        load_csv(&engine, spec)?;
    }

    match cli.command {
        Some(Command::Query { sql }) => run_query(&engine, &sql),
        Some(Command::Shell) | None => run_shell(&engine),
    }
}

fn run_query(engine: &Engine, sql: &str) -> Result<()> {
    let result = engine.sql(sql)?;
    println!("{}", pretty_format_batches(&[result.to_arrow()?])?);
    Ok(())
}

fn run_shell(engine: &Engine) -> Result<()> {
    println!("EmberSQL {} - type \\q to quit, \\? for help", version());

    let mut rl = Editor::<(), DefaultHistory>::new()?;
    let _ = rl.load_history(HISTORY_FILE);

    loop {
        match rl.readline("embersql> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                match dispatch(engine, line) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(err) => eprintln!("error: {:#}", err),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("input error: {}", err);
                break;
            }
        }
    }
    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}

/// Handle one shell line. Returns true when the shell should exit.
fn dispatch(engine: &Engine, line: &str) -> Result<bool> {
    if let Some(command) = line.strip_prefix('\\') {
        match command.split_once(' ') {
            None => match command {
                "q" => return Ok(true),
                "?" => print_help(),
                "tables" => {
                    for name in engine.data_mgr().list_tables() {
                        println!("{}", name);
                    }
                }
                other => bail!("unknown command: \\{}", other),
            },
            Some(("explain", sql)) => println!("{}", engine.explain(sql)?),
            Some(("load", spec)) => load_csv(engine, spec.trim())?,
            Some((other, _)) => bail!("unknown command: \\{}", other),
        }
        return Ok(false);
    }
    run_query(engine, line.trim_end_matches(';'))?;
    Ok(false)
}

fn print_help() {
    println!("\\q                 quit");
    println!("\\tables            list tables");
    println!("\\load NAME=PATH    import a CSV file as a table");
    println!("\\explain SQL       show the physical plan");
    println!("any other input is executed as SQL");
}

/// Import `NAME=PATH` as a table, inferring the schema from the CSV header
/// and a sample of rows.
fn load_csv(engine: &Engine, spec: &str) -> Result<()> {
    let (name, path) = spec
        .split_once('=')
        .with_context(|| format!("bad --load spec (expected NAME=PATH): {}", spec))?;

    let mut file = File::open(path).with_context(|| format!("opening {}", path))?;
    let format = Format::default().with_header(true);
    let (schema, _) = format
        .infer_schema(&mut file, Some(1000))
        .with_context(|| format!("inferring schema of {}", path))?;
    file.rewind()?;

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_format(format)
        .build(file)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    let options = TableOptions {
        fragment_size: engine.config().storage.default_fragment_size,
    };
    let info = engine
        .storage()
        .import_record_batches(&batches, name, &options)?;
    println!("loaded {} ({} rows)", info.name, info.row_count);
    Ok(())
}
