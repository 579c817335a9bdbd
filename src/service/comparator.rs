use bigdecimal::{BigDecimal, Zero};

use crate::error::UnclassifiedError;
use crate::models::{CanonicalMapping, ReconciliationRow, ReconciliationStatus, ReconciliationTable};

/// 按优先级判定一个商品的对账结果, 命中第一条规则即返回
///
/// 两边数量都为零时没有规则命中, 返回 `None`。
pub fn classify(requested: &BigDecimal, offered: &BigDecimal) -> Option<ReconciliationStatus> {
    let zero = BigDecimal::zero();
    let in_request = *requested > zero;
    let in_offer = *offered > zero;

    if in_request && in_offer && requested == offered {
        Some(ReconciliationStatus::Match)
    } else if in_request && in_offer {
        Some(ReconciliationStatus::QuantityMismatch)
    } else if in_request && *offered == zero {
        Some(ReconciliationStatus::MissingFromOffer)
    } else if *requested == zero && in_offer {
        Some(ReconciliationStatus::ExtraInOffer)
    } else {
        None
    }
}

/// 全外连接两边的规范化映射并逐个分类
///
/// 输出顺序: 先按需求中的出现顺序, 再追加仅出现在报价中的商品 (按报价中的出现顺序)。
/// 两边都为空时返回空表。
pub fn compare(
    requested: &CanonicalMapping,
    offered: &CanonicalMapping,
) -> Result<ReconciliationTable, UnclassifiedError> {
    let union = requested
        .article_ids()
        .chain(offered.article_ids().filter(|id| !requested.contains(id)));

    let mut rows = Vec::with_capacity(requested.len() + offered.len());
    for article_id in union {
        let requested_quantity = requested.quantity_of(article_id);
        let offered_quantity = offered.quantity_of(article_id);

        let status = classify(&requested_quantity, &offered_quantity).ok_or_else(|| {
            UnclassifiedError {
                article_id: article_id.to_string(),
            }
        })?;

        rows.push(ReconciliationRow {
            article_id: article_id.to_string(),
            requested_quantity,
            offered_quantity,
            status,
        });
    }

    Ok(ReconciliationTable { rows })
}
