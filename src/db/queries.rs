use sqlx::PgPool;

use crate::error::ConnectivityError;
use crate::models::LineItem;
use crate::service::{RequestFilter, RequestSource};

/// 查询需求明细 (anfrage_positionen)
///
/// 过滤条件为 All 时返回全部需求的明细。数量为空或为负的行不返回。
pub async fn list_request_positions(
    pool: &PgPool,
    filter: RequestFilter,
) -> Result<Vec<LineItem>, sqlx::Error> {
    sqlx::query_as::<_, LineItem>(
        r#"
        SELECT article_number::text AS article_id,
               quantity::numeric AS quantity
        FROM anfrage_positionen
        WHERE ($1::bigint IS NULL OR anfrage_id = $1)
          AND article_number IS NOT NULL
          AND quantity IS NOT NULL
          AND quantity >= 0
        ORDER BY anfrage_id, article_number
        "#,
    )
    .bind(filter.request_id())
    .fetch_all(pool)
    .await
}

/// 基于 PostgreSQL 的需求明细来源
#[derive(Clone)]
pub struct PgRequestSource {
    pool: PgPool,
}

impl PgRequestSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RequestSource for PgRequestSource {
    async fn fetch(&self, filter: RequestFilter) -> Result<Vec<LineItem>, ConnectivityError> {
        let start = std::time::Instant::now();
        let rows = list_request_positions(&self.pool, filter).await?;
        tracing::debug!("anfrage_positionen 查询 {:?}: {} 行, 耗时: {:?}", filter, rows.len(), start.elapsed());
        Ok(rows)
    }
}
