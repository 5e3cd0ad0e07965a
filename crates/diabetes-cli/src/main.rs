use anyhow::Result;
use clap::ArgMatches;
use log::LevelFilter;
use std::path::PathBuf;

use diabetes_cli::cli::build_cli;
use diabetes_cli::predict::input::PredictArgs;
use diabetes_cli::predict::run_prediction;
use diabetes_cli::train::{input as train_input, run_training};
use diabetes_cli::util::render_schema;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("DIABETES_LOG", "error,diabetes=info"))
        .init();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("schema", _)) => {
            println!("{}", render_schema());
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[Diabetes::Train] Training from config: {:?}", path),
        None => log::info!("[Diabetes::Train] No config provided; using defaults."),
    }

    let result = train_input::from_arguments(config_path, matches)
        .and_then(|config| run_training(&config));
    if let Err(e) = result {
        log::error!("Training failed: {:#}", e);
        std::process::exit(1)
    }
    Ok(())
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");

    let result = PredictArgs::from_arguments(config_path, matches)
        .and_then(|args| run_prediction(&args));
    if let Err(e) = result {
        log::error!("Prediction failed: {:#}", e);
        std::process::exit(1)
    }
    Ok(())
}
