use serde::Serialize;

use crate::models::CanonicalMapping;

/// 被丢弃行的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    UnparseableQuantity,
    NegativeQuantity,
    OutOfRange,
    MissingArticleId,
}

/// 报价行被丢弃的提示 (不是错误)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowCoercionWarning {
    pub line: u64,          // 文件中的行号 (表头为第 1 行)
    pub article_id: String,
    pub raw_quantity: String,
    pub reason: DropReason,
}

/// 报价规范化结果
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOffer {
    pub mapping: CanonicalMapping,
    pub dropped: Vec<RowCoercionWarning>,
    pub rows_read: usize, // 数据行总数 (不含表头)
    pub zero_quantity: Vec<String>, // 汇总数量为 0 的商品 (不进入映射)
}
