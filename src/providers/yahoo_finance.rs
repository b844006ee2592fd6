use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::price::{HistoryProvider, HistoryRequest, RawPoint, RawSeries, RawTimestamp};

pub const SOURCE_NAME: &str = "yahoo_finance";

// YahooFinanceProvider implementation for HistoryProvider
pub struct YahooFinanceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pricefeed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    currency: Option<String>,
    #[serde(alias = "gmtoffset", default)]
    gmt_offset: i32,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

/// Picks the close column, preferring adjusted closes when asked for.
fn closes(indicators: &Indicators, adjusted: bool) -> Option<&[Option<f64>]> {
    let adjusted_closes = indicators
        .adjclose
        .as_ref()
        .and_then(|a| a.first())
        .and_then(|a| a.adjclose.as_deref());
    let raw_closes = indicators.quote.first().and_then(|q| q.close.as_deref());

    if adjusted {
        adjusted_closes.or(raw_closes)
    } else {
        raw_closes
    }
}

fn to_raw_series(symbol: &str, item: ChartItem, adjusted: bool) -> Result<RawSeries> {
    let offset = FixedOffset::east_opt(item.meta.gmt_offset)
        .ok_or_else(|| anyhow!("Invalid GMT offset for symbol: {}", symbol))?;

    let (Some(timestamps), Some(indicators)) = (item.timestamp, item.indicators) else {
        debug!("No bars in chart response");
        return Ok(RawSeries::new(symbol, item.meta.currency, Vec::new()));
    };
    let closes = closes(&indicators, adjusted)
        .ok_or_else(|| anyhow!("No close prices found for symbol: {}", symbol))?;

    if closes.len() != timestamps.len() {
        return Err(anyhow!(
            "Mismatched timestamps ({}) and closes ({}) for symbol: {}",
            timestamps.len(),
            closes.len(),
            symbol
        ));
    }

    let points = timestamps
        .iter()
        .zip(closes)
        .map(|(ts, close)| -> Result<RawPoint> {
            let timestamp = DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| anyhow!("Invalid timestamp {} for symbol: {}", ts, symbol))?
                .with_timezone(&offset);
            Ok(RawPoint::new(RawTimestamp::Aware(timestamp), *close))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RawSeries::new(symbol, item.meta.currency, points))
}

#[async_trait]
impl HistoryProvider for YahooFinanceProvider {
    fn source(&self) -> &str {
        SOURCE_NAME
    }

    #[instrument(
        name = "YahooHistoryFetch",
        skip(self, request),
        fields(symbol = %symbol, range = %request.range)
    )]
    async fn fetch_history(&self, symbol: &str, request: &HistoryRequest) -> Result<RawSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}&events=div,split",
            self.base_url, symbol, request.range, request.interval
        );
        debug!("Requesting price history from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        debug!(status = %response.status(), "Received Yahoo response");

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        if let Some(description) = data.chart.error.and_then(|e| e.description) {
            return Err(anyhow!("Yahoo error for symbol {}: {}", symbol, description));
        }

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))?;

        to_raw_series(symbol, item, request.adjusted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::{Interval, Range};
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(symbol: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v8/finance/chart/{symbol}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn request(adjusted: bool) -> HistoryRequest {
        HistoryRequest {
            range: Range::Max,
            interval: Interval::OneDay,
            adjusted,
        }
    }

    const CHART_RESPONSE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "currency": "USD",
                    "symbol": "VOO",
                    "gmtoffset": -18000,
                    "exchangeTimezoneName": "America/New_York"
                },
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "close": [435.12, null, 437.5]
                    }],
                    "adjclose": [{
                        "adjclose": [430.0, null, 432.25]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[tokio::test]
    async fn test_successful_history_fetch_uses_adjusted_closes() {
        let mock_server = create_mock_server("VOO", CHART_RESPONSE).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_history("VOO", &request(true)).await.unwrap();

        assert_eq!(result.symbol, "VOO");
        assert_eq!(result.currency.as_deref(), Some("USD"));
        let values: Vec<Option<f64>> = result.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(430.0), None, Some(432.25)]);
        assert_eq!(
            result.points[0].timestamp.to_utc(),
            Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap()
        );
        let RawTimestamp::Aware(first) = result.points[0].timestamp else {
            panic!("Expected an aware timestamp");
        };
        assert_eq!(first.offset().local_minus_utc(), -18000);
    }

    #[tokio::test]
    async fn test_unadjusted_fetch_uses_raw_closes() {
        let mock_server = create_mock_server("VOO", CHART_RESPONSE).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_history("VOO", &request(false)).await.unwrap();

        let values: Vec<Option<f64>> = result.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(435.12), None, Some(437.5)]);
    }

    #[tokio::test]
    async fn test_adjusted_fetch_falls_back_to_raw_closes() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {"currency": "USD", "gmtoffset": 0},
                    "timestamp": [1709326800],
                    "indicators": {"quote": [{"close": [5137.08]}]}
                }]
            }
        }"#;
        let mock_server = create_mock_server("SPY", mock_response).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_history("SPY", &request(true)).await.unwrap();
        assert_eq!(result.points.len(), 1);
        assert_eq!(result.points[0].value, Some(5137.08));
    }

    #[tokio::test]
    async fn test_query_parameters_are_sent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/VT"))
            .and(query_param("range", "5d"))
            .and(query_param("interval", "1wk"))
            .and(query_param("events", "div,split"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CHART_RESPONSE))
            .mount(&mock_server)
            .await;

        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let request = HistoryRequest {
            range: Range::FiveDays,
            interval: Interval::OneWeek,
            adjusted: true,
        };
        assert!(provider.fetch_history("VT", &request).await.is_ok());
    }

    #[tokio::test]
    async fn test_meta_only_response_yields_empty_series() {
        let mock_response = r#"{
            "chart": {
                "result": [{"meta": {"currency": "EUR", "gmtoffset": 3600}}]
            }
        }"#;
        let mock_server = create_mock_server("VWCE.MI", mock_response).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let result = provider
            .fetch_history("VWCE.MI", &request(true))
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.currency.as_deref(), Some("EUR"));
    }

    #[tokio::test]
    async fn test_no_price_result_data() {
        let mock_response = r#"{"chart": {"result": []}}"#;
        let mock_server = create_mock_server("INVALID", mock_response).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_history("INVALID", &request(true)).await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No price data found for symbol: INVALID"
        );
    }

    #[tokio::test]
    async fn test_yahoo_error_payload() {
        let mock_response = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        let mock_server = create_mock_server("GONE", mock_response).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_history("GONE", &request(true)).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Yahoo error for symbol GONE: No data found, symbol may be delisted"
        );
    }

    #[tokio::test]
    async fn test_yahoo_api_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/VOO"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_history("VOO", &request(true)).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for symbol: VOO"
        );
    }

    #[tokio::test]
    async fn test_yahoo_api_malformed_response() {
        let mock_response = r#"{"chart": {"results": []}}"#; // "results" instead of "result"
        let mock_server = create_mock_server("VOO", mock_response).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_history("VOO", &request(true)).await;
        // missing "result" is treated as no data
        assert_eq!(
            result.unwrap_err().to_string(),
            "No price data found for symbol: VOO"
        );

        let mock_server = create_mock_server("VOO", "not json").await;
        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_history("VOO", &request(true)).await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for VOO")
        );
    }

    #[tokio::test]
    async fn test_mismatched_columns_are_rejected() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {"currency": "USD", "gmtoffset": 0},
                    "timestamp": [1709326800, 1709586000],
                    "indicators": {"quote": [{"close": [5137.08]}]}
                }]
            }
        }"#;
        let mock_server = create_mock_server("VOO", mock_response).await;

        let provider = YahooFinanceProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_history("VOO", &request(false)).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Mismatched timestamps (2) and closes (1) for symbol: VOO"
        );
    }
}
