use clap::{Arg, ArgAction, Command, ValueHint};
use std::path::PathBuf;

use crate::predict::input::feature_args;

/// The `diabetes` command line definition.
pub fn build_cli() -> Command {
    Command::new("diabetes")
        .version(clap::crate_version!())
        .author("Justin Sing <justincsing@gmail.com>")
        .about("Diabetes risk classifier: train on tabular data and score patient inputs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train the scaler and classifier and persist both artifacts")
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON training configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the training data (*.csv or *.tsv). \
                             Overrides the data path in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("model_dir")
                        .short('o')
                        .long("model-dir")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Directory the model and scaler artifacts are written to.")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("model_type")
                        .long("model-type")
                        .help("Override the model type from the JSON config.")
                        .value_parser(["rf", "random_forest", "gbdt"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for the train/test split and the model.")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("test_fraction")
                        .long("test-fraction")
                        .help("Fraction of rows held out for evaluation, in (0, 1).")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("lenient_schema")
                        .long("lenient-schema")
                        .help(
                            "Train on the schema features present in the data instead of failing.",
                        )
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .help("Write an HTML training report to this path.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Score one patient against the trained artifacts")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .help("Path to a JSON inference configuration file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("model_dir")
                        .short('m')
                        .long("model-dir")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Directory holding the model and scaler artifacts.")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("fallback_on_scale_error")
                        .long("fallback-on-scale-error")
                        .help("Score the unscaled input when scaling fails instead of aborting.")
                        .action(ArgAction::SetTrue),
                )
                .args(feature_args()),
        )
        .subcommand(
            Command::new("schema").about("Print the feature schema, input bounds and fingerprint"),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
}
