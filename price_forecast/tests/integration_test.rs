use approx::assert_relative_eq;
use chrono::NaiveDate;
use price_forecast::source::{CsvSource, SyntheticSource};
use price_forecast::{
    fit_scale, inverse_scale, ForecastError, ForecastPipeline, PriceSeries, FORECAST_HORIZON,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::fs;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Geometric random walk with a slight upward drift
fn sample_prices(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let returns = Normal::new(0.0005, 0.012).unwrap();
    let mut price = 150.0;
    (0..n)
        .map(|_| {
            price *= f64::exp(returns.sample(&mut rng));
            price
        })
        .collect()
}

#[test]
fn test_full_forecast_workflow() {
    let series =
        PriceSeries::from_values("AAPL", date(2023, 1, 1), &sample_prices(300, 17)).unwrap();
    let today = date(2024, 5, 20);
    let pipeline = ForecastPipeline::new(SyntheticSource::default(), date(2023, 1, 1));

    let outcome = pipeline.forecast_series(&series, today).unwrap();

    assert_eq!(outcome.ticker, "AAPL");
    assert!(outcome.score.rmse() >= 0.0);
    assert_eq!(outcome.forecast.horizon(), FORECAST_HORIZON);

    let dates = outcome.forecast.dates();
    assert_eq!(dates[0], today);
    for pair in dates.windows(2) {
        assert_eq!(pair[0].succ_opt(), Some(pair[1]));
    }
    assert!(outcome.forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_scaling_round_trip_law() {
    for seed in [1, 2, 3] {
        let values = sample_prices(120, seed);
        let series = PriceSeries::from_values("TSLA", date(2024, 1, 1), &values).unwrap();
        let (scaled, state) = fit_scale(&series).unwrap();

        let restored = inverse_scale(&state, &scaled).unwrap();
        assert_eq!(restored.dates(), series.dates());
        for (a, b) in restored.closes().iter().zip(&values) {
            assert_relative_eq!(*a, *b, max_relative = 1e-12);
        }
    }
}

#[test]
fn test_pipeline_over_csv_source() {
    let dir = tempdir().unwrap();
    let mut rows = String::from("Date,Open,High,Low,Close,Volume\n");
    for (day, close) in date(2024, 1, 1).iter_days().zip(sample_prices(200, 5)) {
        rows.push_str(&format!(
            "{},{:.4},{:.4},{:.4},{:.4},1000\n",
            day,
            close,
            close * 1.01,
            close * 0.99,
            close
        ));
    }
    fs::write(dir.path().join("IBM.csv"), rows).unwrap();

    let pipeline = ForecastPipeline::new(CsvSource::new(dir.path()), date(2024, 1, 1));
    let today = date(2024, 7, 18);
    let outcome = pipeline.run_as_of("ibm", today).unwrap();

    assert_eq!(outcome.ticker, "IBM");
    assert_eq!(outcome.forecast.first_date(), today);
    assert_eq!(outcome.forecast.horizon(), 30);
}

#[test]
fn test_pipeline_unknown_ticker() {
    let dir = tempdir().unwrap();
    let pipeline = ForecastPipeline::new(CsvSource::new(dir.path()), date(2024, 1, 1));

    let result = pipeline.run_as_of("ZZZZ", date(2024, 6, 1));
    assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
}

#[test]
fn test_pipeline_short_history() {
    // strongly mean reverting, so no differencing is needed
    let mut rng = StdRng::seed_from_u64(9);
    let wiggle = Normal::new(0.0, 0.3).unwrap();
    let values: Vec<f64> = (0..25)
        .map(|i| {
            let swing = if i % 2 == 0 { 2.0 } else { -2.0 };
            100.0 + swing + wiggle.sample(&mut rng)
        })
        .collect();
    let series = PriceSeries::from_values("NEW", date(2024, 1, 1), &values).unwrap();
    let pipeline = ForecastPipeline::new(SyntheticSource::default(), date(2024, 1, 1));

    let result = pipeline.forecast_series(&series, date(2024, 2, 1));
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}
