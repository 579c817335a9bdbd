use offer_reconciler::{api, create_pool, AppConfig, PgRequestSource, ReconciliationService};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!(
        "Starting server on {}:{} (offer columns: {}/{}, cache: {}, ttl {}s, max {} entries)",
        config.server.host,
        config.server.port,
        config.offer.article_column,
        config.offer.quantity_column,
        config.cache.enabled,
        config.cache.ttl_secs,
        config.cache.max_entries
    );

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let service = Arc::new(
        ReconciliationService::new(PgRequestSource::new(pool), config.offer.format())
            .with_cache(config.cache.enabled)
            .with_cache_limits(
                Duration::from_secs(config.cache.ttl_secs),
                config.cache.max_entries,
            ),
    );

    let app = api::router(service).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/requests/:anfrage_id/positions - request positions");
    info!("  POST /api/offers/normalize                - normalize offer CSV");
    info!("  POST /api/compare                         - compare two position lists");
    info!("  POST /api/reconcile?anfrage_id=N          - reconcile request vs offer CSV");
    info!("  POST /api/reconcile/export?anfrage_id=N   - same, as CSV download");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
