// ==========================================
// 零部件供应链溯源系统 - 取引数据仓储
// ==========================================
// 职责: trades 表的检索与取引/依赖状态的成对落库
// 约定: 所有读取过滤软删除; 操作者不匹配一律表现为 record not found
// ==========================================

use crate::domain::request_status::RequestStatus;
use crate::domain::trade::{ResponseAnswer, Trade, TradeRequest, TradeResponseInput};
use crate::repository::datastore::{
    format_date, format_datetime, now, parse_datetime_text, parse_opt_date_text,
    parse_opt_datetime_text, parse_opt_uuid_text, parse_uuid_text, Datastore,
};
use crate::repository::error::RepositoryResult;
use crate::repository::sql_builder::{build_in_placeholders, build_upsert_sql, SqlQueryBuilder};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Transaction};
use uuid::Uuid;


/// trades 表的 SELECT 列清单（与 map_trade_row 的列序一致）
const TRADE_COLUMNS: &str = "trade_id, downstream_operator_id, upstream_operator_id, \
     downstream_trace_id, upstream_trace_id, trade_date, \
     created_at, created_user_id, updated_at, updated_user_id, deleted_at";

/// JOIN 查询用, 带 t. 前缀的列清单
const TRADE_COLUMNS_T: &str = "t.trade_id, t.downstream_operator_id, t.upstream_operator_id, \
     t.downstream_trace_id, t.upstream_trace_id, t.trade_date, \
     t.created_at, t.created_user_id, t.updated_at, t.updated_user_id, t.deleted_at";

// ==========================================
// TradeRepository - 取引仓储
// ==========================================
pub struct TradeRepository {
    store: Datastore,
}

impl TradeRepository {
    /// 创建新的取引仓储
    pub fn new(store: Datastore) -> Self {
        Self { store }
    }

    // ==========================================
    // 读取操作
    // ==========================================

    /// 查询下游事业者发出的依赖（JOIN request_status）
    ///
    /// # 参数
    /// - `downstream_operator_id`: 下游事业者标识
    /// - `limit`: 返回上限
    /// - `downstream_trace_ids`: 非空时限定下游溯源标识的集合
    ///
    /// # 返回
    /// - `Ok(Vec<Trade>)`: 按 request_status.created_at 降序
    pub fn find_requests(
        &self,
        downstream_operator_id: &Uuid,
        limit: Option<usize>,
        downstream_trace_ids: &[Uuid],
    ) -> RepositoryResult<Vec<Trade>> {
        let conn = self.store.get_conn()?;

        let mut params: Vec<Value> = vec![Value::from(downstream_operator_id.to_string())];

        let mut builder = SqlQueryBuilder::new(&format!(
            "SELECT {} FROM trades t \
             INNER JOIN request_status rs ON rs.trade_id = t.trade_id",
            TRADE_COLUMNS_T
        ))
        .where_clause("t.deleted_at IS NULL")
        .where_clause("rs.deleted_at IS NULL")
        .where_clause("t.downstream_operator_id = ?");

        if !downstream_trace_ids.is_empty() {
            let in_clause = format!(
                "t.downstream_trace_id IN ({})",
                build_in_placeholders(downstream_trace_ids.len())
            );
            builder = builder.where_clause(&in_clause);
            for trace_id in downstream_trace_ids {
                params.push(Value::from(trace_id.to_string()));
            }
        }

        let sql = builder
            .order_by("rs.created_at DESC")
            .limit_if(limit)
            .build();

        let mut stmt = conn.prepare(&sql)?;
        let trades = stmt
            .query_map(params_from_iter(params.iter()), map_trade_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(trades)
    }

    /// 查询上游事业者需要回答的依赖（JOIN request_status）
    ///
    /// # 返回
    /// - `Ok(Vec<Trade>)`: 按 request_status.created_at 降序
    pub fn find_responses(
        &self,
        upstream_operator_id: &Uuid,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<Trade>> {
        let conn = self.store.get_conn()?;

        let sql = SqlQueryBuilder::new(&format!(
            "SELECT {} FROM trades t \
             INNER JOIN request_status rs ON rs.trade_id = t.trade_id",
            TRADE_COLUMNS_T
        ))
        .where_clause("t.deleted_at IS NULL")
        .where_clause("rs.deleted_at IS NULL")
        .where_clause("t.upstream_operator_id = ?")
        .order_by("rs.created_at DESC")
        .limit_if(limit)
        .build();

        let mut stmt = conn.prepare(&sql)?;
        let trades = stmt
            .query_map(params![upstream_operator_id.to_string()], map_trade_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(trades)
    }

    /// 按下游溯源标识查询第一个取引
    pub fn find_by_downstream_trace_id(&self, trace_id: &Uuid) -> RepositoryResult<Trade> {
        let conn = self.store.get_conn()?;

        let trade = conn.query_row(
            &format!(
                "SELECT {} FROM trades \
                 WHERE downstream_trace_id = ?1 AND deleted_at IS NULL \
                 ORDER BY trade_id ASC LIMIT 1",
                TRADE_COLUMNS
            ),
            params![trace_id.to_string()],
            map_trade_row,
        )?;

        Ok(trade)
    }

    /// 按取引标识查询单个取引
    pub fn find_by_trade_id(&self, trade_id: &Uuid) -> RepositoryResult<Trade> {
        let conn = self.store.get_conn()?;

        let trade = conn.query_row(
            &format!(
                "SELECT {} FROM trades WHERE trade_id = ?1 AND deleted_at IS NULL",
                TRADE_COLUMNS
            ),
            params![trade_id.to_string()],
            map_trade_row,
        )?;

        Ok(trade)
    }

    /// 按上游溯源标识查询全部取引
    pub fn list_by_upstream_trace_id(&self, trace_id: &Uuid) -> RepositoryResult<Vec<Trade>> {
        self.list_by_column("upstream_trace_id", trace_id)
    }

    /// 按下游溯源标识查询全部取引
    pub fn list_by_downstream_trace_id(&self, trace_id: &Uuid) -> RepositoryResult<Vec<Trade>> {
        self.list_by_column("downstream_trace_id", trace_id)
    }

    fn list_by_column(&self, column: &str, value: &Uuid) -> RepositoryResult<Vec<Trade>> {
        let conn = self.store.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM trades \
             WHERE {} = ?1 AND deleted_at IS NULL \
             ORDER BY created_at DESC",
            TRADE_COLUMNS, column
        ))?;

        let trades = stmt
            .query_map(params![value.to_string()], map_trade_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(trades)
    }

    /// 查询事业者参与的全部取引（下游或上游）
    pub fn list_by_operator_id(&self, operator_id: &Uuid) -> RepositoryResult<Vec<Trade>> {
        let conn = self.store.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM trades \
             WHERE (downstream_operator_id = ?1 OR upstream_operator_id = ?1) \
               AND deleted_at IS NULL \
             ORDER BY created_at DESC",
            TRADE_COLUMNS
        ))?;

        let trades = stmt
            .query_map(params![operator_id.to_string()], map_trade_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(trades)
    }

    /// 统计下游事业者发出的依赖数
    pub fn count_requests(&self, operator_id: &Uuid) -> RepositoryResult<i64> {
        self.count_joined("t.downstream_operator_id = ?1", operator_id)
    }

    /// 统计上游事业者需要回答的依赖数
    pub fn count_responses(&self, operator_id: &Uuid) -> RepositoryResult<i64> {
        self.count_joined("t.upstream_operator_id = ?1", operator_id)
    }

    fn count_joined(&self, predicate: &str, operator_id: &Uuid) -> RepositoryResult<i64> {
        let conn = self.store.get_conn()?;

        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM trades t \
                 INNER JOIN request_status rs ON rs.trade_id = t.trade_id \
                 WHERE t.deleted_at IS NULL AND rs.deleted_at IS NULL AND {}",
                predicate
            ),
            params![operator_id.to_string()],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 成对落库取引与依赖状态（单事务 upsert）
    ///
    /// # 步骤
    /// 1. upsert trades（conflict: trade_id, 更新全部非主键列）
    /// 2. upsert request_status（conflict: status_id, 更新全部非主键列）
    ///
    /// # 返回
    /// - `Ok(TradeRequest)`: 落库的取引依赖对
    /// - `Err`: 任一步失败, 全部回滚
    pub fn put_request(&self, request: &TradeRequest) -> RepositoryResult<TradeRequest> {
        self.store.in_transaction(|tx| {
            upsert_trade(tx, &request.trade)?;
            upsert_request_status(tx, &request.status)?;
            Ok(())
        })?;

        tracing::debug!(
            "取引依赖落库: trade_id={} status_id={}",
            request.trade.trade_id,
            request.status.status_id
        );

        Ok(request.clone())
    }

    /// 上游回答（单事务更新取引与依赖状态, 提交后重读取引）
    ///
    /// # 步骤
    /// 1. trades.upstream_trace_id := input.trace_id, updated_at := now
    /// 2. 依赖状态更新为给定的回答状态; completed_count 给定时
    ///    同步写入 completed_count_modified_at := now
    /// 3. 提交后重读取引并返回（重读失败返回读取错误, 提交不回滚）
    pub fn put_response(
        &self,
        input: &TradeResponseInput,
        answer: &ResponseAnswer,
    ) -> RepositoryResult<Trade> {
        let now_text = format_datetime(now());

        self.store.in_transaction(|tx| {
            tx.execute(
                "UPDATE trades SET upstream_trace_id = ?1, updated_at = ?2 \
                 WHERE trade_id = ?3 AND deleted_at IS NULL",
                params![
                    input.trace_id.to_string(),
                    now_text,
                    input.trade_id.to_string(),
                ],
            )?;

            // 依赖状态与取引 1:1, 按 trade_id 定位
            match answer.completed_count {
                Some(completed_count) => {
                    tx.execute(
                        "UPDATE request_status \
                         SET cfp_response_status = ?1, trade_tree_status = ?2, \
                             completed_count = ?3, completed_count_modified_at = ?4, \
                             updated_at = ?5 \
                         WHERE trade_id = ?6 AND deleted_at IS NULL",
                        params![
                            answer.cfp_response_status.to_string(),
                            answer.trade_tree_status.to_string(),
                            completed_count,
                            now_text,
                            now_text,
                            input.trade_id.to_string(),
                        ],
                    )?;
                }
                None => {
                    tx.execute(
                        "UPDATE request_status \
                         SET cfp_response_status = ?1, trade_tree_status = ?2, updated_at = ?3 \
                         WHERE trade_id = ?4 AND deleted_at IS NULL",
                        params![
                            answer.cfp_response_status.to_string(),
                            answer.trade_tree_status.to_string(),
                            now_text,
                            input.trade_id.to_string(),
                        ],
                    )?;
                }
            }

            Ok(())
        })?;

        // 事务已提交, 重读失败原样返回读取错误
        self.find_by_trade_id(&input.trade_id)
    }

    /// 按取引标识物理删除取引
    ///
    /// # 返回
    /// - `Err(PhysicalDelete)`: 文案
    ///   "failed to physically delete record from table trades : <cause>"
    pub fn delete_by_trade_id(&self, trade_id: &Uuid) -> RepositoryResult<usize> {
        self.store.hard_delete(
            "trades",
            "trade_id = ?",
            vec![Value::from(trade_id.to_string())],
        )
    }
}

// ==========================================
// upsert 原语
// ==========================================

/// upsert 取引行（conflict: trade_id, 更新全部非主键列）
fn upsert_trade(tx: &Transaction<'_>, trade: &Trade) -> RepositoryResult<()> {
    let sql = build_upsert_sql(
        "trades",
        &[
            "trade_id",
            "downstream_operator_id",
            "upstream_operator_id",
            "downstream_trace_id",
            "upstream_trace_id",
            "trade_date",
            "created_at",
            "created_user_id",
            "updated_at",
            "updated_user_id",
            "deleted_at",
        ],
        &["trade_id"],
        &[
            "downstream_operator_id",
            "upstream_operator_id",
            "downstream_trace_id",
            "upstream_trace_id",
            "trade_date",
            "created_at",
            "created_user_id",
            "updated_at",
            "updated_user_id",
            "deleted_at",
        ],
    );

    tx.execute(
        &sql,
        params![
            trade.trade_id.to_string(),
            trade.downstream_operator_id.to_string(),
            trade.upstream_operator_id.map(|u| u.to_string()),
            trade.downstream_trace_id.to_string(),
            trade.upstream_trace_id.map(|u| u.to_string()),
            trade.trade_date.map(format_date),
            format_datetime(trade.created_at),
            trade.created_user_id,
            format_datetime(trade.updated_at),
            trade.updated_user_id,
            trade.deleted_at.map(format_datetime),
        ],
    )?;

    Ok(())
}

/// upsert 依赖状态行（conflict: status_id, 更新全部非主键列）
fn upsert_request_status(tx: &Transaction<'_>, status: &RequestStatus) -> RepositoryResult<()> {
    let sql = build_upsert_sql(
        "request_status",
        &[
            "status_id",
            "trade_id",
            "cfp_response_status",
            "trade_tree_status",
            "message",
            "reply_message",
            "request_type",
            "response_due_date",
            "completed_count",
            "completed_count_modified_at",
            "trades_count",
            "trades_count_modified_at",
            "created_at",
            "created_user_id",
            "updated_at",
            "updated_user_id",
            "deleted_at",
        ],
        &["status_id"],
        &[
            "trade_id",
            "cfp_response_status",
            "trade_tree_status",
            "message",
            "reply_message",
            "request_type",
            "response_due_date",
            "completed_count",
            "completed_count_modified_at",
            "trades_count",
            "trades_count_modified_at",
            "created_at",
            "created_user_id",
            "updated_at",
            "updated_user_id",
            "deleted_at",
        ],
    );

    tx.execute(
        &sql,
        params![
            status.status_id.to_string(),
            status.trade_id.to_string(),
            status.cfp_response_status.to_string(),
            status.trade_tree_status.to_string(),
            status.message,
            status.reply_message,
            status.request_type.to_string(),
            status.response_due_date.map(format_date),
            status.completed_count,
            status.completed_count_modified_at.map(format_datetime),
            status.trades_count,
            status.trades_count_modified_at.map(format_datetime),
            format_datetime(status.created_at),
            status.created_user_id,
            format_datetime(status.updated_at),
            status.updated_user_id,
            status.deleted_at.map(format_datetime),
        ],
    )?;

    Ok(())
}

// ==========================================
// 行映射
// ==========================================

/// 映射数据库行到 Trade（列序与 TRADE_COLUMNS 一致）
pub(crate) fn map_trade_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Trade> {
    Ok(Trade {
        trade_id: parse_uuid_text(&row.get::<_, String>(0)?),
        downstream_operator_id: parse_uuid_text(&row.get::<_, String>(1)?),
        upstream_operator_id: parse_opt_uuid_text(row.get(2)?),
        downstream_trace_id: parse_uuid_text(&row.get::<_, String>(3)?),
        upstream_trace_id: parse_opt_uuid_text(row.get(4)?),
        trade_date: parse_opt_date_text(row.get(5)?),
        created_at: parse_datetime_text(&row.get::<_, String>(6)?),
        created_user_id: row.get(7)?,
        updated_at: parse_datetime_text(&row.get::<_, String>(8)?),
        updated_user_id: row.get(9)?,
        deleted_at: parse_opt_datetime_text(row.get(10)?),
    })
}
