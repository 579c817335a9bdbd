use std::future::Future;

use crate::error::ConnectivityError;
use crate::models::LineItem;

/// 需求过滤条件: 单个需求ID, 或不过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestFilter {
    All,
    Request(i64),
}

impl RequestFilter {
    /// ID <= 0 表示不过滤
    pub fn from_id(anfrage_id: i64) -> Self {
        if anfrage_id > 0 {
            Self::Request(anfrage_id)
        } else {
            Self::All
        }
    }

    pub fn request_id(&self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Request(id) => Some(*id),
        }
    }
}

/// 需求明细来源; 没有匹配时返回空列表而不是错误
pub trait RequestSource: Send + Sync {
    fn fetch(
        &self,
        filter: RequestFilter,
    ) -> impl Future<Output = Result<Vec<LineItem>, ConnectivityError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_id_means_no_filter() {
        assert_eq!(RequestFilter::from_id(0), RequestFilter::All);
        assert_eq!(RequestFilter::from_id(-3), RequestFilter::All);
        assert_eq!(RequestFilter::from_id(42), RequestFilter::Request(42));
        assert_eq!(RequestFilter::from_id(42).request_id(), Some(42));
        assert_eq!(RequestFilter::All.request_id(), None);
    }
}
