use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 明细行: 商品编号 + 数量
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LineItem {
    pub article_id: String,   // 商品编号, 原样保留 (区分大小写和空白)
    pub quantity: BigDecimal, // 数量
}

impl LineItem {
    pub fn new(article_id: impl Into<String>, quantity: BigDecimal) -> Self {
        Self {
            article_id: article_id.into(),
            quantity,
        }
    }
}
