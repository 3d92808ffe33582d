use chrono::NaiveDate;
use price_forecast::evaluation::{Evaluator, HOLDOUT_WINDOW};
use price_forecast::models::arima::{ArimaModel, AR_ORDER, MA_ORDER};
use price_forecast::stationarity::StationarityAnalyzer;
use price_forecast::{fit_scale, ForecastError, ForecastModel, PriceSeries, TrainedForecastModel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rstest::rstest;

fn noise(n: usize, sd: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, sd).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

fn series(values: &[f64]) -> PriceSeries {
    PriceSeries::from_values("TEST", NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), values).unwrap()
}

#[test]
fn test_stationary_series_needs_no_differencing() {
    let values: Vec<f64> = noise(250, 1.0, 42).iter().map(|v| 100.0 + v).collect();
    let order = StationarityAnalyzer::new()
        .differencing_order(&series(&values))
        .unwrap();
    assert_eq!(order, 0);
}

#[test]
fn test_linear_trend_needs_one_difference() {
    let values: Vec<f64> = noise(200, 0.5, 8)
        .iter()
        .enumerate()
        .map(|(i, e)| 50.0 + i as f64 + e)
        .collect();
    let order = StationarityAnalyzer::new()
        .differencing_order(&series(&values))
        .unwrap();
    assert_eq!(order, 1);
}

#[test]
fn test_constant_series_cannot_be_scaled() {
    let result = fit_scale(&series(&[250.0; 100]));
    assert!(matches!(result, Err(ForecastError::DegenerateSeries(_))));
}

#[test]
fn test_evaluate_short_series() {
    let values = noise(20, 1.0, 1);
    assert!(matches!(
        Evaluator::new().evaluate(&values, 0),
        Err(ForecastError::InsufficientData(_))
    ));
}

#[rstest]
#[case(61, 0)]
#[case(90, 1)]
#[case(250, 1)]
#[case(400, 2)]
fn test_evaluate_never_fails_on_well_behaved_series(#[case] n: usize, #[case] d: usize) {
    let walk: Vec<f64> = noise(n, 1.0, n as u64)
        .iter()
        .scan(0.0, |level, step| {
            *level += step;
            Some(*level)
        })
        .collect();
    let score = Evaluator::new().evaluate(&walk, d).unwrap();
    assert!(score.rmse() >= 0.0);
    assert!(n > 2 * HOLDOUT_WINDOW);
}

#[rstest]
#[case(40)]
#[case(120)]
#[case(500)]
fn test_forecast_has_thirty_points(#[case] n: usize) {
    let values = noise(n, 1.0, 99);
    let model = ArimaModel::daily(1);
    assert_eq!(model.name(), format!("ARIMA({},1,{})", AR_ORDER, MA_ORDER));

    let trained = model.train(&values).unwrap();
    let forecast = trained.forecast(30).unwrap();
    assert_eq!(forecast.len(), 30);
    assert!(forecast.iter().all(|v| v.is_finite()));
}
