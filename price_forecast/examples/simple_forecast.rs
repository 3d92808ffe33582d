use chrono::NaiveDate;
use price_forecast::source::SyntheticSource;
use price_forecast::{DateRange, ForecastPipeline, PriceSource, StationarityAnalyzer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = SyntheticSource::default();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let today = NaiveDate::from_ymd_opt(2024, 12, 31).ok_or("invalid end date")?;

    // Load closing prices
    let series = source.close_prices("DEMO", &DateRange::new(start, today)?)?;
    println!("Loaded {} closing prices for {}", series.len(), series.ticker());

    let analyzer = StationarityAnalyzer::new();
    println!(
        "ADF p-value: {:.3}",
        analyzer.stationarity_p_value(&series)?
    );

    let pipeline = ForecastPipeline::new(source, start);
    let outcome = pipeline.forecast_series(&series, today)?;

    println!(
        "ARIMA(30,{},30) hold-out RMSE: {}",
        outcome.differencing_order, outcome.score
    );
    for point in outcome.forecast.points() {
        println!("{}: {:.2}", point.date, point.price);
    }

    Ok(())
}
