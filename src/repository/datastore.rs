// ==========================================
// 零部件供应链溯源系统 - 持久化网关
// ==========================================
// 职责: 持有共享数据库连接, 提供事务/软删除/物理删除原语
// 红线: 网关不含业务逻辑; 失败时原样上抛驱动错误, 不做重试
// ==========================================

use crate::db::{
    configure_sqlite_connection, init_schema, open_sqlite_connection, read_schema_version,
    CURRENT_SCHEMA_VERSION,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ==========================================
// Datastore - 持久化网关
// ==========================================
// 并发模型: 多个请求处理器共享同一连接, Mutex 串行化访问;
// 事务期间持锁, 回调内不得执行长耗时操作
#[derive(Clone)]
pub struct Datastore {
    conn: Arc<Mutex<Connection>>,
}

impl Datastore {
    /// 打开数据库文件并应用统一 PRAGMA
    ///
    /// 说明: schema_version 与代码期望不一致时仅告警, 不做自动迁移
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseQueryError(e.to_string()))?;

        match read_schema_version(&conn) {
            Ok(Some(v)) if v != CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    "schema_version 不一致: 期望 {}, 实际 {} (路径: {})",
                    CURRENT_SCHEMA_VERSION,
                    v,
                    db_path
                );
            }
            Ok(None) => {
                tracing::warn!("schema 未初始化: {} (请先运行 reset-traceability-db)", db_path);
            }
            _ => {}
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 打开内存数据库并初始化 schema（测试/维护工具用）
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建网关（连接需已应用统一 PRAGMA）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取共享连接句柄（供各仓储共用同一连接）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// 获取数据库连接（仓储层共用）
    pub(crate) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在单个事务内执行回调
    ///
    /// # 语义
    /// - 回调返回 Ok: 提交全部写入
    /// - 回调返回 Err: 回滚全部写入, 错误原样上抛
    pub fn in_transaction<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> RepositoryResult<T>,
    {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let result = f(&tx)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(result)
    }

    /// 软删除: 设置 deleted_at = now（已软删除的行不重复打标）
    pub fn soft_delete(
        tx: &Transaction<'_>,
        table: &str,
        predicate: &str,
        predicate_params: Vec<Value>,
    ) -> RepositoryResult<usize> {
        let sql = format!(
            "UPDATE {} SET deleted_at = ? WHERE {} AND deleted_at IS NULL",
            table, predicate
        );

        let mut params: Vec<Value> = vec![Value::from(format_datetime(now()))];
        params.extend(predicate_params);

        let rows = tx.execute(&sql, params_from_iter(params.iter()))?;
        Ok(rows)
    }

    /// 物理删除: 无视软删除标记直接移除行
    ///
    /// 失败时包装为契约文案
    /// "failed to physically delete record from table <table> : <cause>"
    pub fn hard_delete(
        &self,
        table: &str,
        predicate: &str,
        predicate_params: Vec<Value>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Self::execute_hard_delete(&conn, table, predicate, predicate_params)
    }

    /// 物理删除（事务内版本）
    pub fn hard_delete_tx(
        tx: &Transaction<'_>,
        table: &str,
        predicate: &str,
        predicate_params: Vec<Value>,
    ) -> RepositoryResult<usize> {
        Self::execute_hard_delete(tx, table, predicate, predicate_params)
    }

    fn execute_hard_delete(
        conn: &Connection,
        table: &str,
        predicate: &str,
        predicate_params: Vec<Value>,
    ) -> RepositoryResult<usize> {
        let sql = format!("DELETE FROM {} WHERE {}", table, predicate);

        let rows = conn
            .execute(&sql, params_from_iter(predicate_params.iter()))
            .map_err(|e| RepositoryError::physical_delete(table, e))?;
        Ok(rows)
    }
}

// ==========================================
// 行值解析辅助函数
// ==========================================
// 约定: TEXT 存储的 UUID/时间戳, 损坏值按教条退化为默认值,
// 读取路径不因历史脏数据中断

/// 当前时间（UTC, 秒精度与落库格式一致）
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// 时间戳落库格式化 (YYYY-MM-DD HH:MM:SS)
pub fn format_datetime(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 日期落库格式化 (YYYY-MM-DD)
pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// 解析 TEXT 存储的 UUID（损坏值退化为 nil-UUID）
pub fn parse_uuid_text(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_default()
}

/// 解析可空 UUID 列
pub fn parse_opt_uuid_text(s: Option<String>) -> Option<Uuid> {
    s.map(|v| parse_uuid_text(&v))
}

/// 解析 TEXT 存储的时间戳
pub fn parse_datetime_text(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| NaiveDateTime::default())
}

/// 解析可空时间戳列
pub fn parse_opt_datetime_text(s: Option<String>) -> Option<NaiveDateTime> {
    s.map(|v| parse_datetime_text(&v))
}

/// 解析可空日期列
pub fn parse_opt_date_text(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
}

// ==========================================
// 单元测试
// ==========================================
