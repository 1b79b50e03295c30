//! `annot` - annotate extraction datasets from the command line
//!
//! Every invocation opens the session stored under the data directory,
//! runs one command (or an interactive shell) and flushes state on exit.

mod app;
mod config;
mod render;
mod shell;

use app::App;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::AnnotConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Subcommands available both one-shot and inside the shell
pub(crate) fn commands() -> Vec<Command> {
    vec![
        Command::new("status").about("Show identity, questionnaire, dataset and readiness status"),
        Command::new("load")
            .about("Load a dataset (JSON, JSON array or JSONL) from a URL or file")
            .arg(
                Arg::new("source")
                    .required(true)
                    .help("http(s) URL or local path"),
            ),
        Command::new("identity")
            .about("Set annotator id, signature and consent")
            .arg(Arg::new("id").long("id").help("Annotator id"))
            .arg(Arg::new("name").long("name").help("Name signed on the consent form"))
            .arg(
                Arg::new("agree")
                    .long("agree")
                    .action(ArgAction::SetTrue)
                    .conflicts_with("revoke")
                    .help("Agree to the consent form"),
            )
            .arg(
                Arg::new("revoke")
                    .long("revoke")
                    .action(ArgAction::SetTrue)
                    .help("Withdraw consent"),
            ),
        Command::new("questionnaires")
            .about("List questionnaires, their items, options and answers")
            .arg(Arg::new("key").help("Only show this questionnaire")),
        Command::new("answer")
            .about("Answer one questionnaire item")
            .arg(Arg::new("key").required(true).help("Questionnaire key"))
            .arg(Arg::new("item").required(true).help("Item id"))
            .arg(Arg::new("value").required(true).help("Option value")),
        Command::new("show").about("Show the current task and its payload"),
        Command::new("next").about("Move to the next task"),
        Command::new("prev").about("Move to the previous task"),
        Command::new("save")
            .about("Save the payload for the current task")
            .arg(
                Arg::new("payload")
                    .long("payload")
                    .conflicts_with("file")
                    .help("Payload JSON text"),
            )
            .arg(
                Arg::new("file")
                    .long("file")
                    .value_parser(value_parser!(PathBuf))
                    .help("Read payload JSON from a file"),
            )
            .arg(
                Arg::new("reset")
                    .long("reset")
                    .action(ArgAction::SetTrue)
                    .conflicts_with_all(["payload", "file"])
                    .help("Save the original extraction"),
            )
            .arg(
                Arg::new("next")
                    .long("next")
                    .action(ArgAction::SetTrue)
                    .help("Advance to the next task after saving"),
            ),
        Command::new("correct")
            .about("Mark the current extraction as correct")
            .arg(
                Arg::new("no")
                    .long("no")
                    .action(ArgAction::SetTrue)
                    .help("Mark as not correct instead"),
            ),
        Command::new("media")
            .about("Show or configure media resolution for the current task")
            .arg(Arg::new("base-url").long("base-url").help("Media host base URL"))
            .arg(
                Arg::new("local-prefix")
                    .long("local-prefix")
                    .help("Local path prefix to strip before joining"),
            )
            .arg(
                Arg::new("reset")
                    .long("reset")
                    .action(ArgAction::SetTrue)
                    .conflicts_with_all(["base-url", "local-prefix"])
                    .help("Drop saved media settings"),
            ),
        Command::new("export")
            .about("Write all annotations and answers to a JSON file")
            .arg(
                Arg::new("out")
                    .long("out")
                    .default_value(".")
                    .value_parser(value_parser!(PathBuf))
                    .help("Directory to write into"),
            ),
        Command::new("import")
            .about("Replace the whole state with an exported file")
            .arg(
                Arg::new("file")
                    .required(true)
                    .value_parser(value_parser!(PathBuf))
                    .help("Exported JSON file"),
            ),
        Command::new("clear")
            .about("Delete all saved state")
            .arg(
                Arg::new("yes")
                    .long("yes")
                    .action(ArgAction::SetTrue)
                    .help("Confirm deletion"),
            ),
    ]
}

fn cli() -> Command {
    Command::new("annot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Annotate extraction datasets, one task at a time")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: $ANNOT_CONFIG or ./annot.toml)"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the saved state"),
        )
        .arg(
            Arg::new("dataset")
                .long("dataset")
                .global(true)
                .help("Dataset URL or path to open on start-up"),
        )
        .subcommands(commands())
        .subcommand(Command::new("shell").about("Interactive session"))
}

fn resolve_config(matches: &ArgMatches) -> anyhow::Result<AnnotConfig> {
    let mut config = AnnotConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config = config.with_data_dir(dir);
    }
    if let Some(dataset) = matches.get_one::<String>("dataset") {
        config = config.with_dataset(dataset);
    }
    Ok(config)
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(matches: ArgMatches) -> anyhow::Result<()> {
    let config = resolve_config(&matches)?;
    init_tracing(config.log_filter());

    let mut app = App::open(config).await?;
    let result = match matches.subcommand() {
        Some(("shell", _)) => shell::run(&mut app).await,
        Some((name, args)) => app.dispatch(name, args).await,
        None => Ok(()),
    };
    // Flush even when the command failed; report the command error first
    let closed = app.close();
    result.and(closed)
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(cli().get_matches()).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["annot", "status", "--data-dir", "/tmp/x"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("data-dir"),
            Some(&PathBuf::from("/tmp/x"))
        );
    }

    #[test]
    fn save_payload_and_file_conflict() {
        let err = cli()
            .try_get_matches_from(["annot", "save", "--payload", "{}", "--file", "p.json"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn answer_requires_value() {
        assert!(cli()
            .try_get_matches_from(["annot", "answer", "BFI", "1"])
            .is_err());
    }
}
