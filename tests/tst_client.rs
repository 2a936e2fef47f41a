use option_low_tracker::FetchError;
use option_low_tracker::tracker::UpstoxClient;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chain_body() -> serde_json::Value {
        json!({
            "status": "success",
            "data": [
                {
                    "strike_price": 25950.0,
                    "call_options": {"instrument_key": "NSE_FO|1", "market_data": {"ltp": 61.5}},
                    "put_options": {"instrument_key": "NSE_FO|2", "market_data": {"ltp": 47.0}}
                },
                {"strike_price": 26000.0}
            ]
        })
    }

    #[tokio::test]
    async fn test_fetch_option_chain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/option/chain"))
            .and(query_param("instrument_key", "NSE_INDEX|Nifty 50"))
            .and(query_param("expiry_date", "2025-11-25"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chain_body()))
            .mount(&server)
            .await;

        let client = UpstoxClient::with_base_url("test-token", server.uri()).unwrap();
        let chain = client
            .fetch_option_chain("NSE_INDEX|Nifty 50", "2025-11-25")
            .await
            .unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].strike_price, Some(25950.0));
        assert!(chain[1].call_options.is_none());
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(path("/option/chain"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chain_body())
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = UpstoxClient::with_timeout(
            "t",
            server.uri(),
            std::time::Duration::from_millis(200),
        )
        .unwrap();
        let err = client.fetch_option_chain("X", "2025-11-25").await.unwrap_err();

        assert!(err.is_timeout(), "expected a timeout, got {err}");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(path("/option/chain"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token"))
            .mount(&server)
            .await;

        let client = UpstoxClient::with_base_url("bad", server.uri()).unwrap();
        let err = client.fetch_option_chain("X", "2025-11-25").await.unwrap_err();

        match err {
            FetchError::Status { status, preview } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(preview, "Invalid token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(path("/option/chain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "error", "errors": []})))
            .mount(&server)
            .await;

        let client = UpstoxClient::with_base_url("t", server.uri()).unwrap();
        let err = client.fetch_option_chain("X", "2025-11-25").await.unwrap_err();
        assert!(matches!(err, FetchError::Api(ref s) if s == "error"));
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(path("/option/chain"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = UpstoxClient::with_base_url("t", server.uri()).unwrap();
        let err = client.fetch_option_chain("X", "2025-11-25").await.unwrap_err();
        assert!(matches!(err, FetchError::NonJson(_)));
    }

    #[tokio::test]
    async fn test_candles_skip_malformed_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/historical-candle/intraday/NSE_FO%7C1/1minute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {"candles": [
                    ["2025-11-25T10:01:00+05:30", 60.0, 61.0, 58.0, 60.5, 100, 10],
                    ["2025-11-25T10:00:00+05:30", 62.0],
                    "garbage",
                    ["2025-11-25T10:00:00+05:30", 63.0, 64.0, 59.5, 62.0, 90, 10]
                ]}
            })))
            .mount(&server)
            .await;

        let client = UpstoxClient::with_base_url("t", server.uri()).unwrap();
        let candles = client.fetch_intraday_candles("NSE_FO|1").await.unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].low, 58.0);
        assert_eq!(candles[1].low, 59.5);
    }

    #[tokio::test]
    async fn test_empty_candle_payload() {
        let server = MockServer::start().await;
        Mock::given(path("/historical-candle/intraday/NSE_FO%7C9/1minute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success", "data": {}})))
            .mount(&server)
            .await;

        let client = UpstoxClient::with_base_url("t", server.uri()).unwrap();
        assert!(client.fetch_intraday_candles("NSE_FO|9").await.unwrap().is_empty());
    }
}
