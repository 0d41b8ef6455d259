//! mmake CLI - Run and complete Makefile targets by label

mod completion;

use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use mmake_core::{split_import_args, CancellationToken, MmakeError, Query, Workspace};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "mmake")]
#[command(about = "Run Makefile targets across a workspace by label", long_about = None)]
#[command(after_help = "Examples:\n  \
    mmake //services/api:build        run a target\n  \
    mmake //services/api:build info   describe a target\n  \
    mmake //tools:fmt -- gofmt -w .    record a command as a new target and run it")]
struct Cli {
    /// Path to the workspace, or any path inside it
    #[arg(short, long, global = true, env = "MMAKE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create WORKSPACE.mmake in the current directory
    Init,

    /// Remove a package's build output
    Clean {
        /// Package label, e.g. //services/api
        label: String,
    },

    /// Describe a target by its recipe
    Info {
        /// Target label, e.g. //services/api:build
        label: String,
    },

    /// Print the bash completion script
    Completion,

    /// Complete a partial label (used by the completion script)
    Compgen {
        /// Partial label, e.g. //serv or //services/api:b
        prefix: String,

        /// Package levels to scan below the prefix (0 = unlimited; default from config)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// List packages whose path starts with a prefix
    Query {
        /// Label prefix, e.g. //services/
        prefix: String,
    },

    /// //<package>[:<target>] [run|info|clean]
    #[command(external_subcommand)]
    Label(Vec<String>),
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let (args, import) = split_import_args(&args);
    let cli = Cli::parse_from(args);
    let json = cli.json;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = match tokio::task::spawn_blocking(move || run(cli, import, &cancel)).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        // make has already reported the failure
        if e.is_delegated_failure() {
            std::process::exit(1);
        }
        if json {
            let code = if e.is_not_found() {
                "not_found"
            } else if e.is_malformed_input() {
                "invalid_input"
            } else {
                "error"
            };
            let error_json = serde_json::json!({ "code": code, "message": e.to_string() });
            eprintln!("{}", serde_json::to_string_pretty(&error_json).unwrap());
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("MMAKE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli, import: Option<String>, cancel: &CancellationToken) -> mmake_core::Result<()> {
    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        std::process::exit(1);
    };

    if let Commands::Init = command {
        return cmd_init(cli.workspace);
    }

    let ws = Workspace::discover(cancel, &cli.workspace.unwrap_or_default())?;
    ws.init_output_dir()?;

    if let Some(import) = import {
        let Commands::Label(args) = command else {
            return Err(MmakeError::InvalidQuery {
                query: "--".to_string(),
                reason: "a command to import must follow a label".to_string(),
            });
        };
        return cmd_import(&ws, &args[0], &import, cancel);
    }

    match command {
        Commands::Init => unreachable!("handled above"),
        Commands::Clean { label } => cmd_clean(&ws, &label, cli.json),
        Commands::Info { label } => cmd_info(&ws, &label, cli.json, cancel),
        Commands::Completion => {
            print!("{}", completion::script());
            Ok(())
        }
        Commands::Compgen { prefix, depth } => cmd_compgen(&ws, &prefix, depth, cancel),
        Commands::Query { prefix } => cmd_query(&ws, &prefix, cli.json, cancel),
        Commands::Label(args) => cmd_label(&ws, &args, cli.json, cancel),
    }
}

fn cmd_init(dir: Option<PathBuf>) -> mmake_core::Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let marker = Workspace::init(&dir)?;
    println!("{} {}", "Created".green(), marker.display());
    Ok(())
}

fn cmd_label(
    ws: &Workspace,
    args: &[String],
    json: bool,
    cancel: &CancellationToken,
) -> mmake_core::Result<()> {
    let label = &args[0];
    match args.get(1).map(String::as_str).unwrap_or("run") {
        "run" => ws.run_target(cancel, label),
        "info" => cmd_info(ws, label, json, cancel),
        "clean" => cmd_clean(ws, label, json),
        other => Err(MmakeError::InvalidLabel {
            label: label.clone(),
            reason: format!("unknown command {other:?} (expected run, info or clean)"),
        }),
    }
}

fn cmd_import(
    ws: &Workspace,
    label: &str,
    command: &str,
    cancel: &CancellationToken,
) -> mmake_core::Result<()> {
    eprintln!("{} {} as {}", "Importing".green(), command, label.cyan());
    ws.import(cancel, label, command)
}

fn cmd_clean(ws: &Workspace, label: &str, json: bool) -> mmake_core::Result<()> {
    let removed = ws.clean(label)?;
    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else {
        println!("{} {}", "Cleaned".yellow(), removed.display());
    }
    Ok(())
}

fn cmd_info(
    ws: &Workspace,
    label: &str,
    json: bool,
    cancel: &CancellationToken,
) -> mmake_core::Result<()> {
    let info = ws.info(cancel, label)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "label": label, "info": info }))
                .unwrap()
        );
    } else {
        println!("{}", info);
    }
    Ok(())
}

fn cmd_compgen(
    ws: &Workspace,
    prefix: &str,
    depth: Option<usize>,
    cancel: &CancellationToken,
) -> mmake_core::Result<()> {
    let depth = depth.unwrap_or(ws.config().completion.depth);
    let mut query = Query::new(ws, prefix);
    query.update(cancel, depth)?;
    match query.gen_comp(prefix) {
        Ok(completions) => print!("{}", completions),
        // Nothing to offer; stay quiet so the shell shows no diagnostics
        Err(e) if e.is_malformed_input() => {
            tracing::debug!(%prefix, error = %e, "no completions");
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

fn cmd_query(
    ws: &Workspace,
    prefix: &str,
    json: bool,
    cancel: &CancellationToken,
) -> mmake_core::Result<()> {
    let mut query = Query::new(ws, prefix);
    query.update(cancel, 0)?;
    let files = query.query_files_by_prefix(prefix)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&files).unwrap());
    } else {
        for file in &files {
            println!(
                "{}\t{}",
                file.label.to_string().cyan(),
                file.description.as_deref().unwrap_or("")
            );
        }
    }
    Ok(())
}
