// Links in the allocator crate, which sets the global allocator to jemalloc.
extern crate allocator;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// A thin CLI front-end over the corto object store and virtual store
/// dispatcher: the exposed surface named in §6 (`start`/`stop`/`select`/
/// `subscribe`/`publish`), wired to subcommands rather than an embedding
/// application's own calls into `runtime`.
#[derive(Debug, Parser)]
#[command(name = "corto", about, version)]
struct Cli {
    /// The app name passed to `runtime::start`.
    #[arg(long, default_value = "corto", env = "CORTO_APP_NAME")]
    app_name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints the crate's build/version string (`get_build`, §6).
    Version,
    /// Generates a random identifier (`random_id`, §6).
    RandomId {
        /// Number of characters to generate.
        #[arg(default_value_t = 8)]
        length: usize,
    },
    /// Runs a `select` query against the running instance and prints each
    /// matching result's id and path.
    Select {
        /// Glob/regex-like identifier pattern (`Query::expr`).
        expr: String,
        /// Scope the pattern is relative to (`Query::from`), default root.
        #[arg(long, default_value = "/")]
        from: String,
        /// Restrict results to this type name (`Query::type_filter`).
        #[arg(long)]
        r#type: Option<String>,
        /// Maximum number of results to print.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Publishes an event without requiring a stored object (§4.F
    /// `publish`).
    Publish {
        /// Object id the event targets, e.g. `x/y`.
        id: String,
        /// MIME content type of `value` (e.g. `application/json`).
        content_type: String,
        /// Serialized payload bytes, read as UTF-8 and passed through.
        value: String,
        /// Event kind: declare, define, update, delete, or invalidate.
        #[arg(long, default_value = "update")]
        event: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let code = runtime::start(&cli.app_name);
    if code != 0 {
        anyhow::bail!("runtime::start failed with exit code {code}");
    }

    let result = run(&cli.command);

    let stop_code = runtime::stop();
    if stop_code != 0 {
        tracing::warn!(stop_code, "runtime::stop returned a nonzero code");
    }

    result
}

fn run(command: &Command) -> Result<()> {
    match command {
        Command::Version => {
            println!("{}", runtime::get_build());
            Ok(())
        }
        Command::RandomId { length } => {
            println!("{}", runtime::random_id(*length));
            Ok(())
        }
        Command::Select { expr, from, r#type, limit } => {
            let mut select = runtime::select(expr.clone()).from(from.clone());
            if let Some(ty) = r#type {
                select = select.type_filter(ty.clone());
            }
            if let Some(limit) = limit {
                select = select.limit(*limit);
            }
            let rows = select.iter().context("select failed")?;
            for row in rows {
                println!("{}\t{}\t{}", row.id, row.path, row.ty.name);
            }
            Ok(())
        }
        Command::Publish { id, content_type, value, event } => {
            let event = parse_event(event)?;
            runtime::publish(event, id, content_type, value.as_bytes()).context("publish failed")?;
            Ok(())
        }
    }
}

fn parse_event(name: &str) -> Result<observer::Event> {
    match name.to_ascii_lowercase().as_str() {
        "declare" => Ok(observer::Event::DECLARE),
        "define" => Ok(observer::Event::DEFINE),
        "update" => Ok(observer::Event::UPDATE),
        "delete" => Ok(observer::Event::DELETE),
        "invalidate" => Ok(observer::Event::INVALIDATE),
        other => anyhow::bail!("unknown event kind {other:?} (expected declare/define/update/delete/invalidate)"),
    }
}
