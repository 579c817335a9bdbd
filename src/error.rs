use thiserror::Error;

/// 报价规范化失败 (整个调用失败, 无部分输出)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("offer is missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("offer contains no data rows")]
    EmptyInput,
    #[error("offer could not be read: {0}")]
    Malformed(String),
}

/// 两边数量都为零的商品, 说明并集构建有误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("article '{article_id}' has neither a requested nor an offered quantity")]
pub struct UnclassifiedError {
    pub article_id: String,
}

/// 数据库连接/查询失败
#[derive(Error, Debug)]
pub enum ConnectivityError {
    #[error("authentication failed, check user and password: {0}")]
    Authentication(String),
    #[error("database not found: {0}")]
    DatabaseNotFound(String),
    #[error("database server unreachable, check host and network: {0}")]
    Network(String),
    #[error("query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for ConnectivityError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("28000") | Some("28P01") => Self::Authentication(db.message().to_string()),
                Some("3D000") => Self::DatabaseNotFound(db.message().to_string()),
                _ => Self::Query(err.to_string()),
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Self::Network(err.to_string()),
            _ => Self::Query(err.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("row {line}: invalid {field} '{value}'")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },
}

/// 服务层/接口层错误
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Unclassified(#[from] UnclassifiedError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
