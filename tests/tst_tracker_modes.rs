use option_low_tracker::tracker::{
    ClockTime, ContinuousTracker, OptionType, StopReason, TimeWindow, TrackerSettings, UpstoxClient,
    output_path, run_window_snapshot,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use serde_json::{Value, json};
    use std::time::Duration;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer, output_dir: &std::path::Path) -> TrackerSettings {
        TrackerSettings {
            api_base_url: server.uri(),
            interval: Duration::from_secs(1),
            output_dir: output_dir.to_string_lossy().to_string(),
            ..TrackerSettings::default()
        }
    }

    fn chain(call_ltp: f64, put_ltp: Option<f64>) -> Value {
        let put = match put_ltp {
            Some(ltp) => json!({"instrument_key": "NSE_FO|2", "market_data": {"ltp": ltp}}),
            None => Value::Null,
        };
        json!({
            "status": "success",
            "data": [{
                "strike_price": 25950.0,
                "call_options": {"instrument_key": "NSE_FO|1", "market_data": {"ltp": call_ltp}},
                "put_options": put
            }]
        })
    }

    fn read_output(dir: &std::path::Path) -> Value {
        let path = output_path(dir, Local::now());
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_continuous_runs_until_max_cycles() {
        let server = MockServer::start().await;
        let responses = [chain(80.0, None), chain(45.0, None), chain(60.0, None)];
        for (priority, body) in responses.into_iter().enumerate() {
            Mock::given(path("/option/chain"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .up_to_n_times(1)
                .with_priority(priority as u8 + 1)
                .mount(&server)
                .await;
        }

        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(&server, dir.path());
        settings.max_cycles = 3;

        let client = UpstoxClient::with_base_url("t", server.uri()).unwrap();
        let tracker = ContinuousTracker::new(client, settings);
        let reason = tracker.run(std::future::pending::<()>()).await.unwrap();
        assert_eq!(reason, StopReason::MaxCycles);

        let value = read_output(dir.path());
        let thread = &value["thread_1"];
        assert_eq!(thread["status"], "stopped");
        assert_eq!(thread["samples"], 1);
        assert_eq!(thread["ce_strike"]["low"], 45.0);
        assert_eq!(thread["ce_strike"]["ltp"], 60.0);
        assert_eq!(thread["ce_strike"]["samples"], 3);
        assert_eq!(thread["ce_strike"]["distance"], 5.0);
        assert!(thread["pe_strike"].is_null());
    }

    #[tokio::test]
    async fn test_failed_fetch_skips_cycle() {
        let server = MockServer::start().await;
        Mock::given(path("/option/chain"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(path("/option/chain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chain(70.0, Some(52.0))))
            .with_priority(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(&server, dir.path());
        settings.max_cycles = 2;

        let client = UpstoxClient::with_base_url("t", server.uri()).unwrap();
        let tracker = ContinuousTracker::new(client, settings);
        tracker.run(std::future::pending::<()>()).await.unwrap();

        let thread = &read_output(dir.path())["thread_1"];
        assert_eq!(thread["samples"], 2);
        assert_eq!(thread["ce_strike"]["samples"], 1);
        assert_eq!(thread["pe_strike"]["low"], 52.0);
    }

    #[tokio::test]
    async fn test_bad_instrument_does_not_sink_the_batch() {
        let server = MockServer::start().await;
        Mock::given(path("/option/chain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": [
                    {
                        "strike_price": 25950.0,
                        "call_options": {"instrument_key": "NSE_FO|1", "market_data": {"ltp": 48.0}}
                    },
                    {
                        "strike_price": 26000.0,
                        "call_options": {"instrument_key": "NSE_FO|3", "market_data": {"ltp": "-"}}
                    }
                ]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(&server, dir.path());
        settings.max_cycles = 1;

        let client = UpstoxClient::with_base_url("t", server.uri()).unwrap();
        let tracker = ContinuousTracker::new(client, settings);
        tracker.run(std::future::pending::<()>()).await.unwrap();

        let thread = &read_output(dir.path())["thread_1"];
        assert_eq!(thread["samples"], 1);
        assert_eq!(thread["ce_strike"]["strike"], 25950.0);
        assert_eq!(thread["ce_strike"]["low"], 48.0);
        assert_eq!(thread["ce_strike"]["distance"], 2.0);
    }

    #[tokio::test]
    async fn test_timed_out_fetch_skips_cycle() {
        let server = MockServer::start().await;
        Mock::given(path("/option/chain"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chain(48.0, None))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(&server, dir.path());
        settings.max_cycles = 1;
        settings.http_timeout = Duration::from_millis(200);

        let client =
            UpstoxClient::with_timeout("t", server.uri(), settings.http_timeout).unwrap();
        let tracker = ContinuousTracker::new(client, settings);
        let reason = tracker.run(std::future::pending::<()>()).await.unwrap();
        assert_eq!(reason, StopReason::MaxCycles);

        let thread = &read_output(dir.path())["thread_1"];
        assert_eq!(thread["status"], "stopped");
        assert_eq!(thread["samples"], 0);
        assert!(thread["ce_strike"].is_null());
    }

    #[tokio::test]
    async fn test_interrupt_writes_final_summary() {
        let server = MockServer::start().await;
        Mock::given(path("/option/chain"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chain(48.0, None))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&server, dir.path());
        let client = UpstoxClient::with_base_url("t", server.uri()).unwrap();
        let tracker = ContinuousTracker::new(client, settings);

        let reason = tracker
            .run(tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();
        assert_eq!(reason, StopReason::Interrupted);

        // The abandoned cycle never touched the table.
        let thread = &read_output(dir.path())["thread_1"];
        assert_eq!(thread["status"], "stopped");
        assert_eq!(thread["samples"], 0);
        assert!(thread["ce_strike"].is_null());
    }

    #[tokio::test]
    async fn test_window_snapshot_selects_window_lows() {
        let server = MockServer::start().await;
        Mock::given(path("/option/chain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": [
                    {
                        "strike_price": 25950.0,
                        "call_options": {"instrument_key": "NSE_FO|1", "market_data": {"ltp": 70.0}},
                        "put_options": {"instrument_key": "NSE_FO|2", "market_data": {"ltp": 55.0}}
                    },
                    {
                        "strike_price": 26000.0,
                        "call_options": {"instrument_key": "NSE_FO|3", "market_data": {"ltp": 50.0}}
                    }
                ]
            })))
            .mount(&server)
            .await;

        let candles = |lows: [f64; 3]| {
            json!({"status": "success", "data": {"candles": [
                ["2025-11-25T09:59:00+05:30", 1.0, 1.0, 1.0, 1.0, 0, 0],
                ["2025-11-25T10:15:00+05:30", 1.0, 1.0, lows[0], 1.0, 0, 0],
                ["2025-11-25T10:59:00+05:30", 1.0, 1.0, lows[1], 1.0, 0, 0],
                ["2025-11-25T11:00:00+05:30", 1.0, 1.0, lows[2], 1.0, 0, 0]
            ]}})
        };
        Mock::given(path("/historical-candle/intraday/NSE_FO%7C1/1minute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candles([60.0, 58.0, 59.0])))
            .mount(&server)
            .await;
        Mock::given(path("/historical-candle/intraday/NSE_FO%7C3/1minute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candles([49.0, 51.0, 47.5])))
            .mount(&server)
            .await;
        // NSE_FO|2 has no mock: wiremock answers 404, so the put drops out.

        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(&server, dir.path());
        settings.candle_window = TimeWindow::new(ClockTime::new(10, 0), ClockTime::new(11, 0));

        let client = UpstoxClient::with_base_url("t", server.uri()).unwrap();
        let report = run_window_snapshot(&client, &settings).await.unwrap().expect("report");

        assert_eq!(report.evaluated, 2);
        let call = report.result.side(OptionType::Call).unwrap();
        assert_eq!(call.strike, 26000.0);
        assert_eq!(call.low, 47.5);
        assert_eq!(call.current_price, 50.0);
        assert!(report.result.put.is_none());

        let thread = &read_output(dir.path())["thread_1"];
        assert_eq!(thread["timeframe"], "10:00-11:00");
        assert_eq!(thread["ce_strike"]["samples"], 1);
        assert!(thread["pe_strike"].is_null());
    }

    #[tokio::test]
    async fn test_window_snapshot_chain_failure_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(path("/option/chain"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&server, dir.path());
        let client = UpstoxClient::with_base_url("t", server.uri()).unwrap();

        assert!(run_window_snapshot(&client, &settings).await.unwrap().is_none());
        assert!(!output_path(dir.path(), Local::now()).exists());
    }
}
