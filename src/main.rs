use clap::Parser;
use pizza_forecast::ForecastError;
use pizza_forecast::cli::{self, Args};
use std::process;

fn main() {
    let args = Args::parse();
    cli::setup_logging(&args);

    match cli::run(&args) {
        Ok(_stats) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            if let Some(cause) = error.downcast_ref::<ForecastError>() {
                if matches!(
                    cause,
                    ForecastError::UnknownPizza { .. } | ForecastError::UnknownSize { .. }
                ) {
                    eprintln!("Hint: pass --skip-unknown-pizzas to leave such orders out");
                } else if cause.is_record_level() {
                    eprintln!("Hint: fix the offending record in the input tables and rerun");
                }
            }
            process::exit(1);
        }
    }
}
