//! Forecast the last days of a simulated product and compare with the real values.
//!
//! Usage: `forecast_demo [config.toml]`. The API key is read from the
//! environment (a `.env` file is honoured).

use std::process::ExitCode;
use volume_forecast::data::split_holdout;
use volume_forecast::error::Result;
use volume_forecast::simulation::SimulatedSales;
use volume_forecast::{AppConfig, LlmForecaster, OpenAiClient, SalesFilter};

fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };

    let sales = SimulatedSales::seasonal(2, 100, 10.0, 10.0, 0.0)?;
    let data = sales.to_sales_data();
    let series = data.volumes(&SalesFilter::all().product("0"));

    let horizon = config.prediction.predict_frame;
    let (history, actual) = split_holdout(&series, horizon)?;
    log::info!(
        "Forecasting {} days from {} days of history",
        horizon,
        history.len()
    );

    let client = OpenAiClient::from_config(&config.service)?;
    let mut forecaster = LlmForecaster::from_config(client, &config)?;
    let forecast = forecaster.predict(history, horizon)?;

    println!("actual:   {:?}", actual);
    println!("forecast: {:?}", forecast.values());
    if forecast.is_complete() {
        println!("MAE: {:.3}", forecast.mean_absolute_error(actual)?);
    } else {
        println!(
            "Service returned {} of {} values",
            forecast.values().len(),
            horizon
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
