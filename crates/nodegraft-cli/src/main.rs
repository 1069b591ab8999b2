//! `nodegraft` binary

use std::path::PathBuf;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use nodegraft_cli::{read_document, render, rewrite, RewriteRules};
use nodegraft_node::hash_code;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    Command::new("nodegraft")
        .version(nodegraft_cli::VERSION)
        .about("Rewrite JSON documents through the nodegraft graph visitor")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Write logs as JSON lines"),
        )
        .subcommand(
            Command::new("rewrite")
                .about("Apply a rename/drop/redact ruleset to every object of a document")
                .arg(
                    Arg::new("rules")
                        .long("rules")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("YAML or JSON rules file"),
                )
                .arg(
                    Arg::new("input")
                        .long("input")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON document to rewrite (stdin if omitted)"),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print the output"),
                ),
        )
        .subcommand(
            Command::new("hash")
                .about("Print the bucketing hash of a string")
                .arg(Arg::new("text").required(true).help("Text to hash")),
        )
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("NODEGRAFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"), matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("rewrite", args)) => {
            let rules_path = args
                .get_one::<PathBuf>("rules")
                .context("--rules is required")?;
            let rules = RewriteRules::from_path(rules_path)?;
            let document = read_document(args.get_one::<PathBuf>("input").map(PathBuf::as_path))?;
            let out = rewrite(document, &rules)?;
            println!("{}", render(&out, args.get_flag("pretty"))?);
        }
        Some(("hash", args)) => {
            let text = args.get_one::<String>("text").context("missing text")?;
            println!("{}", hash_code(text));
        }
        _ => {}
    }
    Ok(())
}
