// ==========================================
// 零部件供应链溯源系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: NotFound / EmptyInput / PhysicalDelete 的错误文案
//       与既有部署保持位级一致, 不得改写
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 契约错误（文案不可变更）=====
    #[error("record not found")]
    NotFound,

    #[error("{entity} entities is empty")]
    EmptyInput { entity: String },

    #[error("failed to physically delete record from table {table} : {source}")]
    PhysicalDelete {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    // ===== 数据库错误 =====
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 空输入错误（例: "cfp entities is empty"）
    pub fn empty_input(entity: &str) -> Self {
        RepositoryError::EmptyInput {
            entity: entity.to_string(),
        }
    }

    /// 物理删除失败（例: "failed to physically delete record from table trades : ..."）
    pub fn physical_delete(table: &str, source: rusqlite::Error) -> Self {
        RepositoryError::PhysicalDelete {
            table: table.to_string(),
            source,
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound,
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
