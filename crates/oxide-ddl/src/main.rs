//! oxide-ddl CLI
//!
//! Command-line tool for compiling migration units to dialect SQL.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_ddl::input::load_units;
use oxide_ddl::prelude::*;

/// Dialect-pluggable DDL compiler for schema migrations.
#[derive(Parser)]
#[command(name = "oxide-ddl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile migration unit files to SQL.
    Compile {
        /// JSON files holding one migration unit or an array of them.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Target dialect.
        #[arg(short, long, env = "OXIDE_DDL_DIALECT", default_value = "generic")]
        dialect: Dialect,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Render suppressed errors as SQL guards where the dialect can.
        #[arg(long)]
        inline_guards: bool,
    },

    /// List the supported dialects.
    Dialects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// SQL script with comment lines for bindings.
    Text,
    /// JSON array of compiled statements.
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Compile {
            files,
            dialect,
            format,
            inline_guards,
        } => {
            let mut statements = Vec::new();
            for file in &files {
                let units = load_units(file)?;
                info!("Compiling {} unit(s) from {} for {dialect}", units.len(), file.display());
                for unit in &units {
                    statements.extend(oxide_ddl::compile(dialect, unit)?);
                }
            }

            if inline_guards {
                let compiler = dialect.compiler();
                for statement in &mut statements {
                    if let Some(guarded) = compiler.inline_error_guard(statement) {
                        *statement = guarded;
                    }
                }
            }

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&statements)?);
                }
                OutputFormat::Text => {
                    for statement in &statements {
                        print!("{}", render_text(statement));
                    }
                }
            }
        }

        Commands::Dialects => {
            println!("{:<12} {:>16}", "dialect", "max identifier");
            println!("{:-<29}", "");
            for dialect in Dialect::ALL {
                let limit = match dialect.max_identifier_length() {
                    usize::MAX => String::from("unbounded"),
                    n => n.to_string(),
                };
                println!("{:<12} {:>16}", dialect.name(), limit);
            }
        }
    }

    Ok(())
}

fn render_text(statement: &CompiledStatement) -> String {
    let mut out = format!("{};\n", statement.sql);
    if !statement.bindings.is_empty() {
        let bindings: Vec<String> = statement
            .bindings
            .iter()
            .map(SqlValue::to_sql_inline)
            .collect();
        out.push_str(&format!("-- bindings: {}\n", bindings.join(", ")));
    }
    if let Some(code) = statement.suppress_error_code {
        out.push_str(&format!("-- suppress error {code}\n"));
    }
    out
}
