use chrono::{Duration, TimeZone, Utc};
use kabu_core::common::TimeFrame;
use kabu_core::common::time::FakeClockProvider;
use kabu_core::directory::SymbolDirectory;
use kabu_core::market::entity::StatementKind;
use kabu_core::market::error::MarketError;
use kabu_core::market::port::QuoteProvider;
use kabu_core::testing::StubQuoteProvider;
use kabu_manager::dashboard::{DashboardManager, STATEMENT_LOOKBACK_DAYS, ViewError};
use std::sync::Arc;

fn directory() -> Arc<SymbolDirectory> {
    let entries = [("AAPL", "Apple Inc."), ("MSFT", "Microsoft Corporation")]
        .into_iter()
        .map(|(s, n)| (s.to_string(), n.to_string()));
    Arc::new(SymbolDirectory::from_entries(entries).unwrap())
}

fn manager(provider: Arc<StubQuoteProvider>) -> DashboardManager {
    let clock = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
    DashboardManager::new(
        provider,
        directory(),
        Arc::new(FakeClockProvider::new(clock)),
    )
}

#[tokio::test]
async fn test_load_full_view() -> anyhow::Result<()> {
    let provider = Arc::new(StubQuoteProvider::healthy());
    let view = manager(provider.clone()).load("aapl").await?;

    assert_eq!(view.symbol, "AAPL");
    assert_eq!(view.directory_name, "Apple Inc.");
    assert_eq!(view.heading(), "Apple Inc.");
    assert_eq!(view.candles.as_ref().map(Vec::len), Ok(252));
    assert_eq!(view.statements.len(), 3);
    for kind in StatementKind::ALL {
        let statement = view.statement(kind).unwrap().as_ref().unwrap();
        assert!(!statement.is_empty());
    }
    assert!(view.major_holders.is_ok());
    assert_eq!(view.generated_at, Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap());
    // 快照 + 档案 + K 线 + 三张报表 + 两类持有人
    assert_eq!(provider.calls(), 8);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_failure_stops_loading() {
    let provider = Arc::new(StubQuoteProvider::failing());
    let err = manager(provider.clone()).load("AAPL").await.unwrap_err();

    assert!(matches!(err, ViewError::SnapshotUnavailable(_)));
    assert_eq!(
        err.to_string(),
        "Failed to fetch price/volume info. Please try another stock."
    );
    assert_eq!(provider.calls(), 1);
}

/// 全失败的行情源对每个端口方法都返回同一个网络错误
#[tokio::test]
async fn test_failing_provider_rejects_every_call() {
    let provider = StubQuoteProvider::failing();
    let end = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
    let start = end - Duration::days(365);
    let refused = MarketError::Network("connection refused".into());

    assert_eq!(provider.fetch_snapshot("AAPL").await.unwrap_err(), refused);
    assert_eq!(provider.fetch_profile("AAPL").await.unwrap_err(), refused);
    assert_eq!(
        provider
            .fetch_candles("AAPL", TimeFrame::Day1, start, end)
            .await
            .unwrap_err(),
        refused
    );
    for kind in [
        StatementKind::Income,
        StatementKind::BalanceSheet,
        StatementKind::CashFlow,
    ] {
        assert_eq!(
            provider
                .fetch_statement("AAPL", kind, start, end)
                .await
                .unwrap_err(),
            refused
        );
    }
    assert_eq!(provider.fetch_major_holders("AAPL").await.unwrap_err(), refused);
    assert_eq!(
        provider
            .fetch_institutional_holders("AAPL")
            .await
            .unwrap_err(),
        refused
    );
}

/// 随仓库分发的完整代码目录中，每个代码在行情源全部失败时都只得到快照错误
#[tokio::test]
async fn test_every_directory_symbol_survives_total_outage() {
    let bundled = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../data")
        .join(kabu_store::config::DIRECTORY_FILE);
    let directory = Arc::new(kabu_store::directory::load_directory(&bundled).unwrap());
    assert!(directory.len() >= 500);

    let provider = Arc::new(StubQuoteProvider::failing());
    let manager = DashboardManager::new(
        provider.clone(),
        directory.clone(),
        Arc::new(FakeClockProvider::new(Utc::now())),
    );
    for entry in directory.entries() {
        assert!(matches!(
            manager.load(&entry.symbol).await,
            Err(ViewError::SnapshotUnavailable(_))
        ));
    }
    // 每个代码只尝试了快照
    assert_eq!(provider.calls(), directory.len());
}

#[tokio::test]
async fn test_statement_window_follows_injected_clock() -> anyhow::Result<()> {
    let provider = Arc::new(StubQuoteProvider::healthy());
    manager(provider.clone()).load("MSFT").await?;

    let now = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
    assert_eq!(
        provider.statement_window(),
        Some((now - Duration::days(STATEMENT_LOOKBACK_DAYS), now))
    );
    Ok(())
}

#[tokio::test]
async fn test_section_failures_are_isolated() -> anyhow::Result<()> {
    let mut stub = StubQuoteProvider::healthy();
    stub.profile = Err(MarketError::NotFound);
    stub.balance_sheet = Err(MarketError::Network("timed out".into()));
    stub.institutional_holders = Ok(Vec::new());
    let view = manager(Arc::new(stub)).load("AAPL").await?;

    assert!(view.profile.is_err());
    assert_eq!(view.heading(), "AAPL");
    assert!(view.candles.is_ok());
    assert!(view.statement(StatementKind::Income).unwrap().is_ok());
    assert!(view.statement(StatementKind::BalanceSheet).unwrap().is_err());
    assert!(view.statement(StatementKind::CashFlow).unwrap().is_ok());
    assert_eq!(view.institutional_holders, Ok(Vec::new()));
    Ok(())
}

#[tokio::test]
async fn test_unknown_symbol_is_rejected_without_fetching() {
    let provider = Arc::new(StubQuoteProvider::healthy());
    let err = manager(provider.clone()).load("ZZZZ").await.unwrap_err();
    assert_eq!(err, ViewError::UnknownSymbol("ZZZZ".into()));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_load_candles_validates_range() -> anyhow::Result<()> {
    let provider = Arc::new(StubQuoteProvider::healthy());
    let manager = manager(provider);

    let candles = manager.load_candles("MSFT", TimeFrame::Day1, 30).await?;
    assert!(!candles.is_empty());

    let err = manager
        .load_candles("MSFT", TimeFrame::Day1, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ViewError::InvalidRange(_)));
    Ok(())
}
