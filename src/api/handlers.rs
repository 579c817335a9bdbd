use crate::error::{AppError, ConnectivityError};
use crate::models::{
    LineItem, ReconciliationReport, ReconciliationSummary, ReconciliationTable, RowCoercionWarning,
};
use crate::service::{
    compare, decode_upload, normalize_request, table_to_csv, ReconciliationService, RequestFilter,
    RequestSource,
};
use axum::{
    body::Bytes,
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 查询参数: 需求ID (0 或缺省表示不过滤)
#[derive(Debug, Deserialize)]
pub struct ReconcileParams {
    #[serde(default)]
    pub anfrage_id: i64,
}

/// 请求体: 两组明细 (不访问数据库)
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub requested: Vec<LineItem>,
    pub offered: Vec<LineItem>,
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PositionsResponse {
    pub success: bool,
    pub message: String,
    pub positions: Vec<LineItem>,
}

#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub success: bool,
    pub message: String,
    pub positions: Vec<LineItem>,
    pub dropped: Vec<RowCoercionWarning>,
    pub zero_quantity: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub message: String,
    pub rows: ReconciliationTable,
    pub summary: ReconciliationSummary,
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub success: bool,
    pub message: String,
    pub report: ReconciliationReport,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Normalize(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Connectivity(ConnectivityError::Query(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Connectivity(_) => StatusCode::BAD_GATEWAY,
            AppError::Unclassified(_) | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let response = ErrorResponse {
            success: false,
            message: format!("Error: {}", self),
        };
        (status, Json(response)).into_response()
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 对比两组明细 (纯计算)
pub async fn compare_items(Json(req): Json<CompareRequest>) -> Result<Json<CompareResponse>, AppError> {
    let requested = normalize_request(&req.requested);
    let offered = normalize_request(&req.offered);
    let rows = compare(&requested, &offered)?;
    let summary = rows.summary();

    Ok(Json(CompareResponse {
        success: true,
        message: format!("Compared {} articles", summary.total),
        rows,
        summary,
    }))
}

/// 某个需求的规范化明细
pub async fn request_positions<S: RequestSource>(
    State(service): State<Arc<ReconciliationService<S>>>,
    Path(anfrage_id): Path<i64>,
) -> Result<Json<PositionsResponse>, AppError> {
    let filter = RequestFilter::from_id(anfrage_id);
    let mapping = service.request_mapping(filter).await?;

    let message = if mapping.is_empty() {
        format!("No positions found for request {}", anfrage_id)
    } else {
        format!("{} articles", mapping.len())
    };
    Ok(Json(PositionsResponse {
        success: true,
        message,
        positions: mapping.to_line_items(),
    }))
}

/// 上传报价文件并规范化
pub async fn normalize_offer_upload<S: RequestSource>(
    State(service): State<Arc<ReconciliationService<S>>>,
    body: Bytes,
) -> Result<Json<OfferResponse>, AppError> {
    let text = decode_upload(&body);
    let offer = service.offer(&text)?;

    Ok(Json(OfferResponse {
        success: true,
        message: format!(
            "{} articles from {} rows, {} rows dropped, {} articles with quantity 0",
            offer.mapping.len(),
            offer.rows_read,
            offer.dropped.len(),
            offer.zero_quantity.len()
        ),
        positions: offer.mapping.to_line_items(),
        dropped: offer.dropped.clone(),
        zero_quantity: offer.zero_quantity.clone(),
    }))
}

/// 对账: 需求 (数据库) vs 报价 (上传文件)
pub async fn reconcile<S: RequestSource>(
    State(service): State<Arc<ReconciliationService<S>>>,
    Query(params): Query<ReconcileParams>,
    body: Bytes,
) -> Result<Json<ReconcileResponse>, AppError> {
    let filter = RequestFilter::from_id(params.anfrage_id);
    let report = service.reconcile(filter, &decode_upload(&body)).await?;

    let message = if report.table.is_empty() {
        "Comparison produced no rows: neither request nor offer contain positions".to_string()
    } else {
        format!(
            "{} articles compared, {} OK, {} need attention",
            report.summary.total,
            report.summary.matched,
            report.summary.total - report.summary.matched
        )
    };
    Ok(Json(ReconcileResponse {
        success: true,
        message,
        report,
    }))
}

/// 对账并以 CSV 下载
pub async fn reconcile_export<S: RequestSource>(
    State(service): State<Arc<ReconciliationService<S>>>,
    Query(params): Query<ReconcileParams>,
    body: Bytes,
) -> Result<Response, AppError> {
    let filter = RequestFilter::from_id(params.anfrage_id);
    let report = service.reconcile(filter, &decode_upload(&body)).await?;
    let csv = table_to_csv(&report.table)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"reconciliation.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
