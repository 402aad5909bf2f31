use crate::commands::{run_assess, run_cohort, run_rules, AssessArgs, CohortArgs, RulesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use triage_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "ER Triage",
    about = "Score ER need, explain the rules that fired, and suggest diagnostic tests",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Assess a single patient from flags or a JSON file
    Assess(AssessArgs),
    /// List the registered probability and recommendation rules
    Rules(RulesArgs),
    /// Score a CSV cohort and report classification metrics when labelled
    Cohort(CohortArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Rules(args) => run_rules(args),
        Command::Cohort(args) => run_cohort(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_assess_flags_with_form_defaults() {
        let cli = Cli::try_parse_from(["triage", "assess", "--spo2", "88", "--chest-pain"])
            .expect("arguments parse");

        match cli.command {
            Some(Command::Assess(args)) => {
                assert_eq!(args.spo2, 88.0);
                assert_eq!(args.blood_pressure, 120.0);
                assert!(args.chest_pain);
                assert!(!args.syncope);
                assert_eq!(args.mode_of_arrival, "walk_in");
            }
            other => panic!("expected assess command, got {other:?}"),
        }
    }

    #[test]
    fn parses_cohort_paths() {
        let cli = Cli::try_parse_from([
            "triage",
            "cohort",
            "--input",
            "data/test.csv",
            "--output",
            "out.csv",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Cohort(args)) => {
                assert_eq!(args.input, PathBuf::from("data/test.csv"));
                assert_eq!(args.output, Some(PathBuf::from("out.csv")));
            }
            other => panic!("expected cohort command, got {other:?}"),
        }
    }

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["triage"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
