//! Candlestick chart with the forecast overlaid, as a Plotly HTML page

use price_forecast::{AccuracyScore, ForecastResult, OhlcSeries};
use serde_json::{json, Value};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Plotly figure: historical candlesticks plus the forecast line
pub fn forecast_figure(ticker: &str, history: &OhlcSeries, forecast: &ForecastResult) -> Value {
    let bars = history.bars();
    let candles = json!({
        "type": "candlestick",
        "name": "Historical",
        "x": bars.iter().map(|b| b.date.to_string()).collect::<Vec<_>>(),
        "open": bars.iter().map(|b| b.open).collect::<Vec<_>>(),
        "high": bars.iter().map(|b| b.high).collect::<Vec<_>>(),
        "low": bars.iter().map(|b| b.low).collect::<Vec<_>>(),
        "close": bars.iter().map(|b| b.close).collect::<Vec<_>>(),
    });
    let line = json!({
        "type": "scatter",
        "mode": "lines+markers",
        "name": "Forecast (Close)",
        "x": forecast.dates().iter().map(|d| d.to_string()).collect::<Vec<_>>(),
        "y": forecast.values(),
        "line": {"color": "blue", "width": 2},
    });

    json!({
        "data": [candles, line],
        "layout": {
            "title": {"text": format!("Candlestick + 30-Day Forecast for {}", ticker)},
            "xaxis": {"title": {"text": "Date"}, "rangeslider": {"visible": false}},
            "yaxis": {"title": {"text": "Price"}},
            "template": "plotly_white",
        },
    })
}

/// Self-contained page for a successful forecast
pub fn forecast_page(ticker: &str, score: AccuracyScore, figure: &Value) -> String {
    let body = format!(
        "<h1>{ticker}</h1>\n<p>Hold-out RMSE (scaled units): {score}</p>\n\
<div id=\"chart\"></div>\n<script>\nconst figure = {figure};\n\
Plotly.newPlot(\"chart\", figure.data, figure.layout);\n</script>",
        ticker = escape(ticker),
        score = score,
        figure = figure,
    );
    page(&format!("{} forecast", escape(ticker)), &body)
}

/// Page carrying only the user-facing error line
pub fn error_page(message: &str) -> String {
    page(
        "Forecast error",
        &format!("<p class=\"error\">{}</p>", escape(message)),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
<script src=\"{}\"></script>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        title, PLOTLY_CDN, body
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use price_forecast::{ForecastPoint, OhlcBar};

    fn fixtures() -> (OhlcSeries, ForecastResult) {
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let history = OhlcSeries::new(
            "AAPL",
            vec![
                OhlcBar {
                    date: day(1),
                    open: 10.0,
                    high: 12.0,
                    low: 9.0,
                    close: 11.0,
                    volume: None,
                },
                OhlcBar {
                    date: day(4),
                    open: 11.0,
                    high: 13.0,
                    low: 10.5,
                    close: 12.5,
                    volume: Some(5),
                },
            ],
        )
        .unwrap();
        let forecast = ForecastResult::new(vec![
            ForecastPoint {
                date: day(5),
                price: 12.7,
            },
            ForecastPoint {
                date: day(6),
                price: 12.9,
            },
        ])
        .unwrap();
        (history, forecast)
    }

    #[test]
    fn test_figure_traces() {
        let (history, forecast) = fixtures();
        let figure = forecast_figure("AAPL", &history, &forecast);

        let candles = &figure["data"][0];
        assert_eq!(candles["type"], "candlestick");
        assert_eq!(candles["name"], "Historical");
        assert_eq!(candles["x"], json!(["2024-03-01", "2024-03-04"]));
        assert_eq!(candles["close"], json!([11.0, 12.5]));

        let line = &figure["data"][1];
        assert_eq!(line["mode"], "lines+markers");
        assert_eq!(line["name"], "Forecast (Close)");
        assert_eq!(line["y"], json!([12.7, 12.9]));
        assert_eq!(line["line"], json!({"color": "blue", "width": 2}));

        let layout = &figure["layout"];
        assert_eq!(layout["title"]["text"], "Candlestick + 30-Day Forecast for AAPL");
        assert_eq!(layout["template"], "plotly_white");
        assert_eq!(layout["xaxis"]["rangeslider"]["visible"], false);
    }

    #[test]
    fn test_forecast_page_embeds_figure() {
        let (history, forecast) = fixtures();
        let figure = forecast_figure("AAPL", &history, &forecast);
        let html = forecast_page("AAPL", AccuracyScore::new(0.4249), &figure);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Hold-out RMSE (scaled units): 0.42"));
        assert!(html.contains("\"Forecast (Close)\""));
        assert!(html.contains("Plotly.newPlot"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = error_page("Error: '<script>' is not a valid ticker");
        assert!(html.contains("Error: &#39;&lt;script&gt;&#39; is not a valid ticker"));
        assert!(!html.contains("'<script>'"));
    }
}
