use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser as ClapParser, Subcommand};
use shapejson::{stringify_value, FieldSelection, Parser, Shape, Source, Value};
use tracing::*;

use crate::config::Config;
use crate::report::Input;

mod config;
mod logging;
mod report;
mod shape_expr;

#[derive(Debug, ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults to `shapejson.toml` in the working directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a JSON document against a shape and print it back as compact JSON.
    Fmt {
        /// The path to a JSON file, or `-` for stdin.
        input: PathBuf,
        /// Shape expression, e.g. `map<i32, list<f64>>` or `record{@id: u64, note: string}`.
        #[arg(long)]
        shape: Option<String>,
        /// Only write record fields that are explicitly mapped to a wire key.
        #[arg(long)]
        bound_only: bool,
    },
    /// Parse a JSON document against a shape and report any error.
    Check {
        /// The path to a JSON file, or `-` for stdin.
        input: PathBuf,
        /// Shape expression, e.g. `list<datetime>`.
        #[arg(long)]
        shape: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    logging::setup_logging();

    let cli = Args::parse();

    debug!(?cli);

    let config = Config::load_from(cli.config.as_deref())?;

    debug!(?config);

    match cli.command {
        Command::Fmt {
            input,
            shape,
            bound_only,
        } => {
            let shape = resolve_shape(shape.as_deref(), &config)?;
            let input = read_input(&input)?;
            let value = parse_input(&input, &shape, &config)?;
            let fields = if bound_only || config.bound_fields_only {
                FieldSelection::OnlyBoundFields
            } else {
                FieldSelection::AllFields
            };
            println!("{}", stringify_value(&value, fields));
        }
        Command::Check { input, shape } => {
            let shape = resolve_shape(shape.as_deref(), &config)?;
            let input = read_input(&input)?;
            parse_input(&input, &shape, &config)?;
            println!("{}: ok", input.path);
        }
    }

    Ok(())
}

fn resolve_shape(expr: Option<&str>, config: &Config) -> anyhow::Result<Shape> {
    let src = expr.unwrap_or(&config.default_shape);
    match shape_expr::parse(src) {
        Ok(shape) => {
            debug!(%shape);
            Ok(shape)
        }
        Err(errors) => {
            report::shape_errors(src, &errors)?;
            bail!("invalid shape expression `{src}`");
        }
    }
}

fn read_input(input: &Path) -> anyhow::Result<Input> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(Input {
            path: String::from("<stdin>"),
            text,
            from_stdin: true,
        });
    }

    let text = match std::fs::read_to_string(input) {
        Ok(file) => file,
        Err(e) => {
            error!(path = ?input, "failed to read input");
            return Err(e).with_context(|| format!("failed to read file `{}`", input.display()));
        }
    };

    Ok(Input {
        path: input.display().to_string(),
        text,
        from_stdin: false,
    })
}

#[instrument(skip_all, fields(path = %input.path))]
fn parse_input(input: &Input, shape: &Shape, config: &Config) -> anyhow::Result<Value> {
    let mut parser = Parser::from_str(&input.text).with_max_depth(config.max_depth);

    let value = match parser.parse_document(shape) {
        Ok(value) => value,
        Err(err) => {
            debug!(?err);
            input.parse_error(&err, shape)?;
            bail!("failed to parse `{}`", input.path);
        }
    };

    let end = parser.offset();
    let mut rest = parser.into_source();
    if rest.peek()?.is_some() {
        input.error(end..end + 1, "unexpected characters after the JSON value", None)?;
        bail!("failed to parse `{}`", input.path);
    }

    Ok(value)
}
