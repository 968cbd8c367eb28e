use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use hivdr_cli::predict::inference;
use hivdr_cli::predict::input::PredictConfig;
use hivdr_cli::train::input::TrainConfig;
use hivdr_cli::train::trainer;

fn config_arg() -> Arg {
    Arg::new("config")
        .help("Path to JSON configuration file")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn selection_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("model_dir")
            .short('m')
            .long("model_dir")
            .value_parser(clap::builder::NonEmptyStringValueParser::new())
            .help("Directory holding one <DRUG>/<DRUG>.json model per drug. Overrides the configuration file.")
            .value_hint(ValueHint::DirPath),
    )
    .arg(
        Arg::new("drug_class")
            .long("drug_class")
            .help("Drug class whose default drug list to use.")
            .value_parser(["protease", "nnrti", "nrti"]),
    )
    .arg(
        Arg::new("drugs")
            .long("drugs")
            .help("Comma-separated drug identifiers, e.g. FPV,ATV. Overrides the drug class defaults.")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .value_parser(clap::builder::NonEmptyStringValueParser::new()),
    )
    .arg(
        Arg::new("representation")
            .short('r')
            .long("representation")
            .help("Residue property used to encode sequences.")
            .value_parser(["mw", "pka"]),
    )
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("HIVDR_LOG", "error,hivdr=info"))
        .init();

    let matches = Command::new("hivdr")
        .version(clap::crate_version!())
        .about("HIV drug-resistance prediction from protein sequences")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(selection_args(
            Command::new("predict")
                .about("Predict log10 fold-change in resistance for one or more sequences")
                .arg(config_arg())
                .arg(
                    Arg::new("sequence")
                        .short('s')
                        .long("sequence")
                        .help("Amino-acid sequence to predict.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("fasta")
                        .short('f')
                        .long("fasta")
                        .help("FASTA file of sequences to predict.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .help("Path to the output file for predictions (*.tsv or *.csv). Defaults to stdout.")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("summary_file")
                        .long("summary")
                        .help("Also write per-drug interval summaries to this file (*.tsv or *.csv).")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("percentile")
                        .long("percentile")
                        .help("Central coverage of the summary interval, in (0, 100].")
                        .value_parser(clap::value_parser!(f64)),
                ),
        ))
        .subcommand(selection_args(
            Command::new("train")
                .about("Train one random-forest ensemble per drug from a fold-change table")
                .arg(config_arg())
                .arg(
                    Arg::new("train_data")
                        .short('d')
                        .long("train_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to training data (*.tsv or *.csv). Overrides the training data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("test_size")
                        .long("test_size")
                        .help("Held-out fraction used for evaluation; 0 disables evaluation.")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("n_estimators")
                        .long("n_estimators")
                        .help("Number of trees per drug.")
                        .value_parser(clap::value_parser!(usize)),
                ),
        ))
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("train", sub_m)) => handle_train(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    if let Some(path) = config_path {
        log::info!("[HIVDR::Predict] Prediction using config: {:?}", path);
    }

    let result = PredictConfig::from_arguments(config_path, matches)
        .and_then(|params| inference::run_prediction(&params));
    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Prediction failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    if let Some(path) = config_path {
        log::info!("[HIVDR::Train] Training from config: {:?}", path);
    }

    let result = TrainConfig::from_arguments(config_path, matches)
        .and_then(|params| trainer::run_training(&params));
    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
