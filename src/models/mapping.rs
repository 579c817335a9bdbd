use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;

use crate::models::{DropReason, LineItem};

/// 数量的最大小数位数/指数 (绝对值)
pub const MAX_QUANTITY_SCALE: i64 = 64;
/// 数量尾数的最大位数 (二进制)
pub const MAX_QUANTITY_BITS: u64 = 256;

/// 数量是否在可安全计算的范围内
///
/// 指数极大或极小的数在相加、比较或格式化时需要按 10 的巨大幂次重新缩放。
pub fn quantity_in_range(quantity: &BigDecimal) -> bool {
    let (mantissa, scale) = quantity.as_bigint_and_exponent();
    scale.abs() <= MAX_QUANTITY_SCALE && mantissa.bits() <= MAX_QUANTITY_BITS
}

/// 规范化映射: 商品编号 -> 汇总数量
///
/// 按首次出现顺序保存, 每个商品编号最多出现一次。
/// 汇总为零的商品不保存, `quantity_of` 对其返回 0。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalMapping {
    totals: IndexMap<String, BigDecimal>,
}

impl CanonicalMapping {
    pub fn new() -> Self {
        Self {
            totals: IndexMap::new(),
        }
    }

    /// 累加一行数量; 负数或超出范围的数量不接受
    pub(crate) fn accumulate(&mut self, article_id: &str, quantity: &BigDecimal) -> Result<(), DropReason> {
        // 先检查范围: 与零比较本身也会重新缩放
        if !quantity_in_range(quantity) {
            return Err(DropReason::OutOfRange);
        }
        if *quantity < BigDecimal::zero() {
            return Err(DropReason::NegativeQuantity);
        }
        match self.totals.get_mut(article_id) {
            Some(total) => *total += quantity,
            None => {
                self.totals.insert(article_id.to_string(), quantity.clone());
            }
        }
        Ok(())
    }

    /// 去掉汇总为零的商品 (保序), 同时返回被去掉的商品编号
    pub(crate) fn finish(mut self) -> (Self, Vec<String>) {
        let zero_totals = self
            .totals
            .iter()
            .filter(|(_, total)| total.is_zero())
            .map(|(id, _)| id.clone())
            .collect();
        self.totals.retain(|_, total| *total > BigDecimal::zero());
        (self, zero_totals)
    }

    /// 获取某商品的数量, 不存在时为 0
    pub fn quantity_of(&self, article_id: &str) -> BigDecimal {
        self.totals.get(article_id).cloned().unwrap_or_else(BigDecimal::zero)
    }

    pub fn contains(&self, article_id: &str) -> bool {
        self.totals.contains_key(article_id)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// 按首次出现顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BigDecimal)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn article_ids(&self) -> impl Iterator<Item = &str> {
        self.totals.keys().map(String::as_str)
    }

    pub fn to_line_items(&self) -> Vec<LineItem> {
        self.iter()
            .map(|(id, qty)| LineItem::new(id, qty.clone()))
            .collect()
    }
}
