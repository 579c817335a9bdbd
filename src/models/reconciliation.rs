use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::RowCoercionWarning;

/// 对账结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconciliationStatus {
    /// 双方都有且数量相同
    #[serde(rename = "OK")]
    Match,
    /// 双方都有但数量不同
    #[serde(rename = "QUANTITY_MISMATCH")]
    QuantityMismatch,
    /// 需求中有, 报价中缺失
    #[serde(rename = "MISSING_FROM_OFFER")]
    MissingFromOffer,
    /// 报价中多出 (可能是替代品, 仅提示)
    #[serde(rename = "EXTRA_IN_OFFER")]
    ExtraInOffer,
}

impl ReconciliationStatus {
    pub const ALL: [ReconciliationStatus; 4] = [
        Self::Match,
        Self::QuantityMismatch,
        Self::MissingFromOffer,
        Self::ExtraInOffer,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Match => "OK",
            Self::QuantityMismatch => "QUANTITY_MISMATCH",
            Self::MissingFromOffer => "MISSING_FROM_OFFER",
            Self::ExtraInOffer => "EXTRA_IN_OFFER",
        }
    }
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown reconciliation status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ReconciliationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// 对账表的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub article_id: String,
    pub requested_quantity: BigDecimal, // 需求数量, 缺失时为 0
    pub offered_quantity: BigDecimal,   // 报价数量, 缺失时为 0
    pub status: ReconciliationStatus,
}

/// 对账表: 需求商品按出现顺序在前, 其后为仅报价中出现的商品
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconciliationTable {
    pub rows: Vec<ReconciliationRow>,
}

impl ReconciliationTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReconciliationRow> {
        self.rows.iter()
    }

    pub fn summary(&self) -> ReconciliationSummary {
        let mut summary = ReconciliationSummary {
            total: self.rows.len(),
            ..Default::default()
        };
        for row in &self.rows {
            match row.status {
                ReconciliationStatus::Match => summary.matched += 1,
                ReconciliationStatus::QuantityMismatch => summary.quantity_mismatches += 1,
                ReconciliationStatus::MissingFromOffer => summary.missing_from_offer += 1,
                ReconciliationStatus::ExtraInOffer => summary.extra_in_offer += 1,
            }
        }
        summary
    }
}

/// 对账统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub total: usize,
    pub matched: usize,
    pub quantity_mismatches: usize,
    pub missing_from_offer: usize,
    pub extra_in_offer: usize,
}

/// 一次完整对账的结果 (服务层返回)
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub table: ReconciliationTable,
    pub summary: ReconciliationSummary,
    pub dropped: Vec<RowCoercionWarning>,
    pub zero_quantity: Vec<String>, // 报价中汇总为 0 的商品 (不参与比较)
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, status: ReconciliationStatus) -> ReconciliationRow {
        ReconciliationRow {
            article_id: id.into(),
            requested_quantity: BigDecimal::from(1),
            offered_quantity: BigDecimal::from(1),
            status,
        }
    }

    #[test]
    fn status_labels_parse_back() {
        for status in ReconciliationStatus::ALL {
            assert_eq!(status.label().parse::<ReconciliationStatus>(), Ok(status));
        }
        assert!("Erreur".parse::<ReconciliationStatus>().is_err());
    }

    #[test]
    fn status_serializes_with_export_label() {
        let json = serde_json::to_string(&ReconciliationStatus::Match).unwrap();
        assert_eq!(json, "\"OK\"");
    }

    #[test]
    fn summary_counts_each_status() {
        let table = ReconciliationTable {
            rows: vec![
                row("A", ReconciliationStatus::Match),
                row("B", ReconciliationStatus::Match),
                row("C", ReconciliationStatus::QuantityMismatch),
                row("D", ReconciliationStatus::ExtraInOffer),
            ],
        };
        let s = table.summary();
        assert_eq!(s.total, 4);
        assert_eq!(s.matched, 2);
        assert_eq!(s.quantity_mismatches, 1);
        assert_eq!(s.missing_from_offer, 0);
        assert_eq!(s.extra_in_offer, 1);
    }
}
