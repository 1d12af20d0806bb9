use chrono::{TimeZone, Utc};
use kabu_api::server::{AppState, build_router};
use kabu_core::common::time::FakeClockProvider;
use kabu_core::directory::SymbolDirectory;
use kabu_core::market::error::MarketError;
use kabu_core::testing::{RecordingBroker, StubQuoteProvider};
use kabu_core::trade::port::TradeError;
use kabu_manager::dashboard::DashboardManager;
use kabu_trade::service::OrderDesk;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;

struct TestServer {
    base: String,
    client: reqwest::Client,
    provider: Arc<StubQuoteProvider>,
    broker: Arc<RecordingBroker>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

// 帮助函数：在随机端口启动测试服务器
async fn spawn_test_server(
    provider: StubQuoteProvider,
    broker: RecordingBroker,
) -> anyhow::Result<TestServer> {
    kabu_core::install_crypto_provider();

    let entries = [
        ("AAPL", "Apple Inc."),
        ("MSFT", "Microsoft Corporation"),
        ("NVDA", "NVIDIA Corporation"),
    ]
    .into_iter()
    .map(|(s, n)| (s.to_string(), n.to_string()));
    let directory = Arc::new(SymbolDirectory::from_entries(entries)?);

    let provider = Arc::new(provider);
    let broker = Arc::new(broker);
    let clock = Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
    ));

    let state = AppState {
        dashboard: Arc::new(DashboardManager::new(
            provider.clone(),
            directory.clone(),
            clock,
        )),
        order_desk: Arc::new(OrderDesk::new(broker.clone(), directory.clone())),
        directory,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base = format!("http://{}", listener.local_addr()?);
    let app = build_router(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    Ok(TestServer {
        base,
        client: reqwest::Client::new(),
        provider,
        broker,
    })
}

#[tokio::test]
async fn test_index_defaults_to_first_symbol() -> anyhow::Result<()> {
    let server = spawn_test_server(StubQuoteProvider::healthy(), RecordingBroker::accepting()).await?;

    let resp = server.client.get(server.url("/")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await?;

    assert!(html.contains("S&amp;P 500 Stock Dashboard"));
    assert!(html.contains("<option value=\"AAPL\" selected>AAPL - Apple Inc.</option>"));
    assert!(html.contains("<option value=\"NVDA\">NVDA - NVIDIA Corporation</option>"));
    for heading in [
        "Company Overview",
        "Business Description",
        "Financial Statements",
        "Valuation Multiples",
        "Ownership Information",
        "Trade with Alpaca (Paper Trading)",
    ] {
        assert!(html.contains(heading), "missing section {}", heading);
    }
    assert!(html.contains("<svg"));
    assert_eq!(server.provider.calls(), 8);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_failure_renders_message_only() -> anyhow::Result<()> {
    let server = spawn_test_server(StubQuoteProvider::failing(), RecordingBroker::accepting()).await?;

    let resp = server.client.get(server.url("/?symbol=MSFT")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await?;

    assert!(html.contains("Failed to fetch price/volume info. Please try another stock."));
    assert!(html.contains("<option value=\"MSFT\" selected>"));
    assert!(!html.contains("Company Overview"));
    assert_eq!(server.provider.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_symbol_page_is_404() -> anyhow::Result<()> {
    let server = spawn_test_server(StubQuoteProvider::healthy(), RecordingBroker::accepting()).await?;

    let resp = server.client.get(server.url("/?symbol=ZZZZ")).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.provider.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_trade_form_places_order_once() -> anyhow::Result<()> {
    let server = spawn_test_server(StubQuoteProvider::healthy(), RecordingBroker::accepting()).await?;

    let resp = server
        .client
        .post(server.url("/trade"))
        .form(&[("symbol", "aapl"), ("quantity", "10"), ("side", "buy")])
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await?;

    assert!(html.contains("Buy order placed for 10 shares of AAPL"));
    assert!(html.contains("stub-order-1"));
    let orders = server.broker.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].symbol(), "AAPL");
    assert_eq!(orders[0].quantity(), 10);
    Ok(())
}

#[tokio::test]
async fn test_trade_form_rejects_bad_input_without_broker() -> anyhow::Result<()> {
    let server = spawn_test_server(StubQuoteProvider::healthy(), RecordingBroker::accepting()).await?;

    for (quantity, side) in [("0", "buy"), ("2.5", "sell"), ("abc", "buy"), ("5", "short")] {
        let html = server
            .client
            .post(server.url("/trade"))
            .form(&[("symbol", "AAPL"), ("quantity", quantity), ("side", side)])
            .send()
            .await?
            .text()
            .await?;
        assert!(html.contains("Order failed:"), "input {} {}", quantity, side);
    }
    assert!(server.broker.orders().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_trade_form_shows_outcome_when_snapshot_fails() -> anyhow::Result<()> {
    let server = spawn_test_server(StubQuoteProvider::failing(), RecordingBroker::accepting()).await?;

    let html = server
        .client
        .post(server.url("/trade"))
        .form(&[("symbol", "MSFT"), ("quantity", "3"), ("side", "sell")])
        .send()
        .await?
        .text()
        .await?;

    assert!(html.contains("Sell order placed for 3 shares of MSFT"));
    assert!(html.contains("Failed to fetch price/volume info. Please try another stock."));
    assert_eq!(server.broker.orders().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_json_dashboard_and_symbols() -> anyhow::Result<()> {
    let mut provider = StubQuoteProvider::healthy();
    provider.major_holders = Err(MarketError::NotFound);
    let server = spawn_test_server(provider, RecordingBroker::accepting()).await?;

    let symbols: Value = server
        .client
        .get(server.url("/api/v1/symbols"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(symbols["success"], true);
    assert_eq!(symbols["data"].as_array().map(Vec::len), Some(3));
    assert_eq!(symbols["data"][0]["symbol"], "AAPL");

    let resp = server.client.get(server.url("/api/v1/market/aapl")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["symbol"], "AAPL");
    assert_eq!(body["data"]["heading"], "Apple Inc.");
    assert_eq!(body["data"]["profile"]["available"], true);
    assert_eq!(body["data"]["major_holders"]["available"], false);
    assert_eq!(body["data"]["statements"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn test_json_error_statuses() -> anyhow::Result<()> {
    let server = spawn_test_server(StubQuoteProvider::failing(), RecordingBroker::accepting()).await?;

    let resp = server.client.get(server.url("/api/v1/market/ZZZZ")).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server.client.get(server.url("/api/v1/market/AAPL")).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = resp.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Failed to fetch price/volume info. Please try another stock."
    );

    let resp = server
        .client
        .get(server.url("/api/v1/market/candles/AAPL?tf=5m"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .client
        .get(server.url("/api/v1/market/candles/AAPL?days=0"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_json_candles_and_svg_chart() -> anyhow::Result<()> {
    let server = spawn_test_server(StubQuoteProvider::healthy(), RecordingBroker::accepting()).await?;

    let body: Value = server
        .client
        .get(server.url("/api/v1/market/candles/AAPL?tf=1d&days=30"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(252));

    let resp = server.client.get(server.url("/chart/AAPL.svg")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/svg+xml")
    );
    assert!(resp.text().await?.starts_with("<svg"));

    let resp = server.client.get(server.url("/chart/AAPL.png")).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_json_order_endpoint() -> anyhow::Result<()> {
    let server = spawn_test_server(StubQuoteProvider::healthy(), RecordingBroker::accepting()).await?;

    let resp = server
        .client
        .post(server.url("/api/v1/orders"))
        .json(&serde_json::json!({"symbol": "nvda", "quantity": " 4 ", "side": "SELL"}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["id"], "stub-order-1");
    assert_eq!(body["data"]["symbol"], "NVDA");
    assert_eq!(body["data"]["quantity"], 4);
    assert_eq!(body["data"]["side"], "sell");
    assert_eq!(body["data"]["message"], "Sell order placed for 4 shares of NVDA");

    let resp = server
        .client
        .post(server.url("/api/v1/orders"))
        .json(&serde_json::json!({"symbol": "NVDA", "quantity": "-1", "side": "buy"}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.broker.orders().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_json_order_broker_rejection() -> anyhow::Result<()> {
    let broker = RecordingBroker::rejecting(TradeError::Rejected {
        status: 403,
        message: "insufficient buying power".into(),
    });
    let server = spawn_test_server(StubQuoteProvider::healthy(), broker).await?;

    let resp = server
        .client
        .post(server.url("/api/v1/orders"))
        .json(&serde_json::json!({"symbol": "AAPL", "quantity": "1000000", "side": "buy"}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = resp.json().await?;
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|e| e.contains("insufficient buying power"))
    );
    Ok(())
}

#[tokio::test]
async fn test_openapi_document_lists_json_routes() -> anyhow::Result<()> {
    let server = spawn_test_server(StubQuoteProvider::healthy(), RecordingBroker::accepting()).await?;

    let doc: Value = server
        .client
        .get(server.url("/api-docs/openapi.json"))
        .send()
        .await?
        .json()
        .await?;
    let paths = doc["paths"].as_object().unwrap();
    for path in [
        "/api/v1/symbols",
        "/api/v1/market/{symbol}",
        "/api/v1/market/candles/{symbol}",
        "/api/v1/orders",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
    assert!(!paths.contains_key("/trade"));
    Ok(())
}
