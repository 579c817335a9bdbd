use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, ConnectivityError, NormalizeError};
use crate::models::{CanonicalMapping, LineItem, NormalizedOffer, ReconciliationReport};
use crate::service::cache::TimedCache;
use crate::service::comparator::compare;
use crate::service::normalizer::{normalize_offer, normalize_request, OfferFormat};
use crate::service::source::{RequestFilter, RequestSource};

/// 对账服务: 取需求明细, 规范化报价, 比较
///
/// 缓存在这一层: 需求明细按过滤条件缓存, 报价按上传内容的 SHA-256 缓存。
/// 两者都有过期时间和容量上限。核心函数本身无状态。
pub struct ReconciliationService<S> {
    source: S,
    format: OfferFormat,
    cache_enabled: bool,
    request_cache: TimedCache<RequestFilter, Vec<LineItem>>,
    offer_cache: TimedCache<String, NormalizedOffer>,
}

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_CACHE_ENTRIES: usize = 64;

impl<S: RequestSource> ReconciliationService<S> {
    pub fn new(source: S, format: OfferFormat) -> Self {
        Self {
            source,
            format,
            cache_enabled: true,
            request_cache: TimedCache::new(DEFAULT_CACHE_TTL, DEFAULT_CACHE_ENTRIES),
            offer_cache: TimedCache::new(DEFAULT_CACHE_TTL, DEFAULT_CACHE_ENTRIES),
        }
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// 设置缓存过期时间和每个缓存的容量上限
    pub fn with_cache_limits(mut self, ttl: Duration, max_entries: usize) -> Self {
        self.request_cache = TimedCache::new(ttl, max_entries);
        self.offer_cache = TimedCache::new(ttl, max_entries);
        self
    }

    async fn fetch_rows(&self, filter: RequestFilter) -> Result<Arc<Vec<LineItem>>, ConnectivityError> {
        if self.cache_enabled {
            if let Some(rows) = self.request_cache.get(&filter) {
                tracing::debug!("Request rows for {:?} served from cache", filter);
                return Ok(rows);
            }
        }

        let rows = Arc::new(self.source.fetch(filter).await?);
        tracing::info!("Fetched {} request rows for {:?}", rows.len(), filter);

        if self.cache_enabled {
            self.request_cache.insert(filter, rows.clone());
        }
        Ok(rows)
    }

    /// 需求明细 -> 规范化映射
    pub async fn request_mapping(&self, filter: RequestFilter) -> Result<CanonicalMapping, AppError> {
        let rows = self.fetch_rows(filter).await.map_err(|e| {
            tracing::error!("Request fetch for {:?} failed: {}", filter, e);
            e
        })?;
        Ok(normalize_request(&rows))
    }

    /// 报价文本 -> 规范化结果
    pub fn offer(&self, raw: &str) -> Result<Arc<NormalizedOffer>, NormalizeError> {
        let key = content_key(raw);
        if self.cache_enabled {
            if let Some(offer) = self.offer_cache.get(&key) {
                tracing::debug!("Offer {} served from cache", &key[..12]);
                return Ok(offer);
            }
        }

        let offer = match normalize_offer(raw, &self.format) {
            Ok(offer) => Arc::new(offer),
            Err(e) => {
                tracing::warn!("Offer rejected: {}", e);
                return Err(e);
            }
        };

        if !offer.dropped.is_empty() {
            tracing::warn!(
                "Offer: {} of {} rows dropped (unusable quantity or article)",
                offer.dropped.len(),
                offer.rows_read
            );
        }
        if !offer.zero_quantity.is_empty() {
            tracing::warn!("Offer: {} articles have a total quantity of 0", offer.zero_quantity.len());
        }
        tracing::info!("Offer normalized: {} articles from {} rows", offer.mapping.len(), offer.rows_read);

        if self.cache_enabled {
            self.offer_cache.insert(key, offer.clone());
        }
        Ok(offer)
    }

    /// 完整对账: 先校验报价, 再取需求, 最后比较
    pub async fn reconcile(&self, filter: RequestFilter, raw_offer: &str) -> Result<ReconciliationReport, AppError> {
        let offer = self.offer(raw_offer)?;
        let requested = self.request_mapping(filter).await?;

        if requested.is_empty() {
            tracing::warn!("No request positions found for {:?}", filter);
        }
        if offer.mapping.is_empty() {
            tracing::warn!("Offer contains no usable positions");
        }

        let table = compare(&requested, &offer.mapping).map_err(|e| {
            tracing::error!("Reconciliation invariant violated: {}", e);
            e
        })?;
        let summary = table.summary();

        tracing::info!(
            "对账完成 {:?}: 共 {} 个商品, OK: {}, 数量不同: {}, 缺失: {}, 多出: {}",
            filter,
            summary.total,
            summary.matched,
            summary.quantity_mismatches,
            summary.missing_from_offer,
            summary.extra_in_offer
        );

        Ok(ReconciliationReport {
            table,
            summary,
            dropped: offer.dropped.clone(),
            zero_quantity: offer.zero_quantity.clone(),
            generated_at: Utc::now(),
        })
    }
}

fn content_key(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReconciliationStatus;
    use bigdecimal::BigDecimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        rows: Vec<LineItem>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeSource {
        fn with_rows(rows: Vec<LineItem>) -> Self {
            Self {
                rows,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    impl RequestSource for FakeSource {
        async fn fetch(&self, filter: RequestFilter) -> Result<Vec<LineItem>, ConnectivityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ConnectivityError::Network("connection refused".into()));
            }
            match filter {
                RequestFilter::Request(7) | RequestFilter::All => Ok(self.rows.clone()),
                RequestFilter::Request(_) => Ok(Vec::new()),
            }
        }
    }

    fn rows() -> Vec<LineItem> {
        vec![
            LineItem::new("A1", BigDecimal::from(5)),
            LineItem::new("B2", BigDecimal::from(2)),
            LineItem::new("A1", BigDecimal::from(1)),
        ]
    }

    const OFFER: &str = "article_id,quantity\nA1,6\nC3,1\nB2,abc\n";

    #[tokio::test]
    async fn reconcile_classifies_and_reports_dropped_rows() {
        let service = ReconciliationService::new(FakeSource::with_rows(rows()), OfferFormat::default());
        let report = service.reconcile(RequestFilter::Request(7), OFFER).await.unwrap();

        let statuses: Vec<(&str, ReconciliationStatus)> = report
            .table
            .iter()
            .map(|r| (r.article_id.as_str(), r.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("A1", ReconciliationStatus::Match),
                ("B2", ReconciliationStatus::MissingFromOffer),
                ("C3", ReconciliationStatus::ExtraInOffer),
            ]
        );
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].article_id, "B2");
    }

    #[tokio::test]
    async fn unknown_request_gives_offer_only_rows() {
        let service = ReconciliationService::new(FakeSource::with_rows(rows()), OfferFormat::default());
        let report = service.reconcile(RequestFilter::Request(99), OFFER).await.unwrap();
        assert!(report
            .table
            .iter()
            .all(|r| r.status == ReconciliationStatus::ExtraInOffer));
    }

    #[tokio::test]
    async fn request_rows_cached_per_filter() {
        let service = ReconciliationService::new(FakeSource::with_rows(rows()), OfferFormat::default());
        let first = service.request_mapping(RequestFilter::Request(7)).await.unwrap();
        let second = service.request_mapping(RequestFilter::Request(7)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(service.source.calls.load(Ordering::SeqCst), 1);

        service.request_mapping(RequestFilter::All).await.unwrap();
        assert_eq!(service.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_request_rows_fetched_again() {
        let service = ReconciliationService::new(FakeSource::with_rows(rows()), OfferFormat::default())
            .with_cache_limits(Duration::from_millis(20), 8);
        service.request_mapping(RequestFilter::Request(7)).await.unwrap();
        service.request_mapping(RequestFilter::Request(7)).await.unwrap();
        assert_eq!(service.source.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(40)).await;
        service.request_mapping(RequestFilter::Request(7)).await.unwrap();
        assert_eq!(service.source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn offer_cache_bounded() {
        let service = ReconciliationService::new(FakeSource::with_rows(vec![]), OfferFormat::default())
            .with_cache_limits(Duration::from_secs(60), 2);
        for i in 0..5 {
            service.offer(&format!("article_id,quantity\nA{i},1\n")).unwrap();
        }
        assert_eq!(service.offer_cache.len(), 2);
    }

    #[tokio::test]
    async fn report_lists_zero_quantity_offer_articles() {
        let service = ReconciliationService::new(FakeSource::with_rows(rows()), OfferFormat::default());
        let report = service
            .reconcile(RequestFilter::Request(7), "article_id,quantity\nA1,6\nZ9,0\n")
            .await
            .unwrap();
        assert_eq!(report.zero_quantity, vec!["Z9".to_string()]);
        assert!(report.table.iter().all(|r| r.article_id != "Z9"));
    }

    #[tokio::test]
    async fn cache_disabled_always_fetches() {
        let service = ReconciliationService::new(FakeSource::with_rows(rows()), OfferFormat::default())
            .with_cache(false);
        service.request_mapping(RequestFilter::All).await.unwrap();
        service.request_mapping(RequestFilter::All).await.unwrap();
        assert_eq!(service.source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn offer_cached_by_content() {
        let service = ReconciliationService::new(FakeSource::with_rows(vec![]), OfferFormat::default());
        let first = service.offer(OFFER).unwrap();
        let second = service.offer(OFFER).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let other = service.offer("article_id,quantity\nZ,1\n").unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[tokio::test]
    async fn schema_error_stops_before_fetch() {
        let service = ReconciliationService::new(FakeSource::with_rows(rows()), OfferFormat::default());
        let err = service
            .reconcile(RequestFilter::Request(7), "article_id\nA1\n")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Normalize(NormalizeError::Schema { .. })));
        assert_eq!(service.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn connectivity_error_not_cached() {
        let mut source = FakeSource::with_rows(rows());
        source.fail = true;
        let service = ReconciliationService::new(source, OfferFormat::default());

        for _ in 0..2 {
            let err = service.reconcile(RequestFilter::Request(7), OFFER).await.unwrap_err();
            assert!(matches!(err, AppError::Connectivity(ConnectivityError::Network(_))));
        }
        assert_eq!(service.source.calls.load(Ordering::SeqCst), 2);
    }
}
