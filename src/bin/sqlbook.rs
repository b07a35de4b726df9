//! sqlbook — inspect named SQL files from the command line.
//!
//! # Usage
//!
//! ```bash
//! # List every query in a file
//! sqlbook queries.sql
//!
//! # Show one query in full
//! sqlbook queries.sql --query publishBlog
//!
//! # Dump the compiled set as JSON
//! sqlbook queries.sql --format json
//! ```

use clap::{Parser, ValueEnum};
use colored::*;
use sqlbook::prelude::*;

#[derive(Parser)]
#[command(name = "sqlbook")]
#[command(version)]
#[command(about = "Compile and inspect named SQL files", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlbook queries.sql
    sqlbook queries.sql --query publishBlog
    sqlbook queries.sql --format json")]
struct Cli {
    /// The annotated SQL file to compile
    file: String,

    /// Show a single query in full instead of the listing
    #[arg(short, long)]
    query: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let source = std::fs::read_to_string(&cli.file)
        .map_err(|e| format!("cannot read {}: {}", cli.file, e))?;
    let queries = sqlbook::compile(&source).map_err(|e| e.to_string())?;

    if let Some(name) = &cli.query {
        let query = queries
            .get(name)
            .ok_or_else(|| format!("no query named '{}' in {}", name, cli.file))?;
        show_query(query);
        return Ok(());
    }

    match cli.format {
        OutputFormat::Json => println!("{}", queries.to_json()?),
        OutputFormat::Table => list_queries(&queries),
    }

    Ok(())
}

fn list_queries(queries: &CompiledSet) {
    if queries.is_empty() {
        println!("{}", "(no queries)".dimmed());
        return;
    }

    let name_width = queries.iter().map(|q| q.name.len()).max().unwrap_or(0);

    for query in queries.iter() {
        // Pad before coloring: escape codes would count toward the width.
        let name = format!("{:<name_width$}", query.name);
        let operation = format!("{:<22}", format!("{:?}", query.operation));
        println!(
            "{}  {}  {}",
            name.cyan().bold(),
            operation.yellow(),
            param_summary(query)
        );
        if let Some(first_doc_line) = query.docs.lines().next() {
            println!("{:<name_width$}  {}", "", first_doc_line.dimmed());
        }
    }

    println!();
    println!("{} queries", queries.len());
}

fn show_query(query: &Query) {
    println!(
        "{} {}",
        query.name.cyan().bold(),
        format!("({:?})", query.operation).yellow()
    );
    for line in query.docs.lines() {
        println!("{}", line.dimmed());
    }
    if !query.query_string.is_empty() {
        println!();
        println!("{}", query.query_string);
    }
    if !query.params.is_empty() {
        println!();
        println!("{} {}", "Placeholders:".green(), param_summary(query));
    }
}

fn param_summary(query: &Query) -> String {
    let parts: Vec<String> = query
        .params
        .iter()
        .map(|p| match p {
            Parameter::Positional => "?".to_string(),
            Parameter::Named { name } => format!(":{}", name),
        })
        .collect();
    parts.join(" ")
}
