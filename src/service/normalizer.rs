use bigdecimal::BigDecimal;
use std::str::FromStr;

use crate::error::NormalizeError;
use crate::models::{CanonicalMapping, DropReason, LineItem, NormalizedOffer, RowCoercionWarning};
use crate::service::ingest::sniff_delimiter;

/// 报价文件格式: 必需列名 + 分隔符 (None 表示自动识别)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferFormat {
    pub article_column: String,
    pub quantity_column: String,
    pub delimiter: Option<u8>,
}

impl Default for OfferFormat {
    fn default() -> Self {
        Self {
            article_column: "article_id".to_string(),
            quantity_column: "quantity".to_string(),
            delimiter: None,
        }
    }
}

/// 需求明细规范化: 按商品编号分组求和
///
/// 输入已是数值类型, 不做转换。负数或超出范围的行跳过。
pub fn normalize_request(rows: &[LineItem]) -> CanonicalMapping {
    let mut mapping = CanonicalMapping::new();
    for row in rows {
        // 被拒绝的行不计入汇总
        let _ = mapping.accumulate(&row.article_id, &row.quantity);
    }
    mapping.finish().0
}

/// 报价文本规范化
///
/// 第一行为表头。缺少必需列 -> `Schema`; 没有数据行 -> `EmptyInput`。
/// 数量无法解析 (或为负数, 超出范围, 或商品编号为空) 的行被丢弃并记录在 `dropped` 中,
/// 其余行按商品编号分组求和。汇总为零的商品记录在 `zero_quantity` 中。
pub fn normalize_offer(raw: &str, format: &OfferFormat) -> Result<NormalizedOffer, NormalizeError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    if text.trim().is_empty() {
        return Err(NormalizeError::EmptyInput);
    }

    let delimiter = format.delimiter.unwrap_or_else(|| sniff_delimiter(text));
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| NormalizeError::Malformed(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let (article_idx, quantity_idx) = match (
        position(&format.article_column),
        position(&format.quantity_column),
    ) {
        (Some(a), Some(q)) => (a, q),
        (a, q) => {
            let mut missing = Vec::new();
            if a.is_none() {
                missing.push(format.article_column.clone());
            }
            if q.is_none() {
                missing.push(format.quantity_column.clone());
            }
            return Err(NormalizeError::Schema { missing });
        }
    };

    let mut mapping = CanonicalMapping::new();
    let mut dropped = Vec::new();
    let mut rows_read = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| NormalizeError::Malformed(e.to_string()))?;
        rows_read += 1;

        let article_id = record.get(article_idx).unwrap_or("");
        let raw_quantity = record.get(quantity_idx).unwrap_or("");

        let accepted = if article_id.is_empty() {
            Err(DropReason::MissingArticleId)
        } else {
            parse_quantity(raw_quantity)
                .ok_or(DropReason::UnparseableQuantity)
                .and_then(|quantity| mapping.accumulate(article_id, &quantity))
        };

        if let Err(reason) = accepted {
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(rows_read as u64 + 1);
            dropped.push(RowCoercionWarning {
                line,
                article_id: article_id.to_string(),
                raw_quantity: raw_quantity.to_string(),
                reason,
            });
        }
    }

    if rows_read == 0 {
        return Err(NormalizeError::EmptyInput);
    }

    let (mapping, zero_quantity) = mapping.finish();
    Ok(NormalizedOffer {
        mapping,
        dropped,
        rows_read,
        zero_quantity,
    })
}

fn parse_quantity(raw: &str) -> Option<BigDecimal> {
    BigDecimal::from_str(raw.trim()).ok()
}
