// ==========================================
// 零部件供应链溯源系统 - 依赖状态数据仓储
// ==========================================
// 职责: request_status 表的检索与生命周期迁移 (取消/拒绝)
// 状态机: pending → accepted → completed;
//         替代终态 cancelled (下游) / rejected (上游)
// 约定: 守卫不命中 (操作者不拥有对应侧) 一律返回 record not found,
//       不区分"不存在"与"无权限" (既有部署行为, 不得更改)
// ==========================================

use crate::domain::request_status::RequestStatus;
use crate::domain::trade::Trade;
use crate::domain::types::{
    parse_cfp_response_status, parse_request_type, parse_trade_tree_status, CfpResponseStatus,
    StatusTarget, TradeTreeStatus,
};
use crate::repository::datastore::{
    format_datetime, now, parse_datetime_text, parse_opt_date_text, parse_opt_datetime_text,
    parse_uuid_text, Datastore,
};
use crate::repository::error::RepositoryResult;
use crate::repository::sql_builder::SqlQueryBuilder;
use crate::repository::trade_repo::map_trade_row;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// request_status 表的 SELECT 列清单（与 map_status_row 的列序一致）
const STATUS_COLUMNS: &str = "status_id, trade_id, cfp_response_status, trade_tree_status, \
     message, reply_message, request_type, response_due_date, \
     completed_count, completed_count_modified_at, trades_count, trades_count_modified_at, \
     created_at, created_user_id, updated_at, updated_user_id, deleted_at";

/// JOIN 查询用, 带 rs. 前缀的列清单
const STATUS_COLUMNS_RS: &str =
    "rs.status_id, rs.trade_id, rs.cfp_response_status, rs.trade_tree_status, \
     rs.message, rs.reply_message, rs.request_type, rs.response_due_date, \
     rs.completed_count, rs.completed_count_modified_at, rs.trades_count, \
     rs.trades_count_modified_at, \
     rs.created_at, rs.created_user_id, rs.updated_at, rs.updated_user_id, rs.deleted_at";

// ==========================================
// RequestStatusRepository - 依赖状态仓储
// ==========================================
pub struct RequestStatusRepository {
    store: Datastore,
}

impl RequestStatusRepository {
    /// 创建新的依赖状态仓储
    pub fn new(store: Datastore) -> Self {
        Self { store }
    }

    // ==========================================
    // 读取操作
    // ==========================================

    /// 按查询对象检索依赖状态（JOIN trades）
    ///
    /// # 谓词
    /// - `Request`: trades.downstream_operator_id = operator_id,
    ///   trace_id 给定时追加 trades.downstream_trace_id = trace_id
    /// - `Response`: trades.upstream_operator_id = operator_id,
    ///   status_id 给定时追加 request_status.status_id = status_id
    /// - `Any`: 上下游任一侧 = operator_id, status_id 给定时追加过滤
    ///
    /// # 返回
    /// - `Ok(Vec<RequestStatus>)`: 按 request_status.created_at 降序, 截断至 limit
    pub fn find_status(
        &self,
        operator_id: &Uuid,
        limit: Option<usize>,
        status_id: Option<&Uuid>,
        trace_id: Option<&Uuid>,
        target: StatusTarget,
    ) -> RepositoryResult<Vec<RequestStatus>> {
        let conn = self.store.get_conn()?;

        let mut builder = SqlQueryBuilder::new(&format!(
            "SELECT {} FROM request_status rs \
             INNER JOIN trades t ON rs.trade_id = t.trade_id",
            STATUS_COLUMNS_RS
        ))
        .where_clause("rs.deleted_at IS NULL")
        .where_clause("t.deleted_at IS NULL");

        let mut params: Vec<Value> = Vec::new();
        builder = apply_target_predicate(builder, &mut params, operator_id, status_id, trace_id, target);

        let sql = builder
            .order_by("rs.created_at DESC")
            .limit_if(limit)
            .build();

        let mut stmt = conn.prepare(&sql)?;
        let statuses = stmt
            .query_map(params_from_iter(params.iter()), map_status_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(statuses)
    }

    /// 按查询对象统计依赖状态（与 find_status 同一谓词构造）
    pub fn count_status(
        &self,
        operator_id: &Uuid,
        status_id: Option<&Uuid>,
        trace_id: Option<&Uuid>,
        target: StatusTarget,
    ) -> RepositoryResult<i64> {
        let conn = self.store.get_conn()?;

        let mut builder = SqlQueryBuilder::new(
            "SELECT COUNT(*) FROM request_status rs \
             INNER JOIN trades t ON rs.trade_id = t.trade_id",
        )
        .where_clause("rs.deleted_at IS NULL")
        .where_clause("t.deleted_at IS NULL");

        let mut params: Vec<Value> = Vec::new();
        builder = apply_target_predicate(builder, &mut params, operator_id, status_id, trace_id, target);

        let count: i64 = conn.query_row(&builder.build(), params_from_iter(params.iter()), |row| {
            row.get(0)
        })?;

        Ok(count)
    }

    /// 按取引标识查询依赖状态（与取引 1:1）
    ///
    /// # 返回
    /// - `Ok(RequestStatus)`: 找到状态
    /// - `Err(NotFound)`: 不存在或已软删除
    pub fn find_by_trade_id(&self, trade_id: &Uuid) -> RepositoryResult<RequestStatus> {
        let conn = self.store.get_conn()?;

        let status = conn.query_row(
            &format!(
                "SELECT {} FROM request_status \
                 WHERE trade_id = ?1 AND deleted_at IS NULL",
                STATUS_COLUMNS
            ),
            params![trade_id.to_string()],
            map_status_row,
        )?;

        Ok(status)
    }

    /// 按状态标识查询依赖状态
    pub fn find_by_status_id(&self, status_id: &Uuid) -> RepositoryResult<RequestStatus> {
        let conn = self.store.get_conn()?;

        let status = conn.query_row(
            &format!(
                "SELECT {} FROM request_status \
                 WHERE status_id = ?1 AND deleted_at IS NULL",
                STATUS_COLUMNS
            ),
            params![status_id.to_string()],
            map_status_row,
        )?;

        Ok(status)
    }

    // ==========================================
    // 生命周期迁移
    // ==========================================

    /// 下游取消依赖（取引与依赖状态同事务软删除）
    ///
    /// # 守卫
    /// - 仅取引的下游事业者可取消; 不命中时返回 record not found
    ///
    /// # 步骤
    /// 1. 按 status_id 读取依赖状态
    /// 2. 按 (trade_id, downstream_operator_id = operator_id) 读取取引
    /// 3. 单事务: 软删除依赖状态行; 软删除取引行
    pub fn put_status_cancel(
        &self,
        status_id: &Uuid,
        operator_id: &Uuid,
    ) -> RepositoryResult<()> {
        let status = self.find_by_status_id(status_id)?;
        let trade = self.load_trade_guarded(
            &status.trade_id,
            "downstream_operator_id",
            operator_id,
        )?;

        self.store.in_transaction(|tx| {
            Datastore::soft_delete(
                tx,
                "request_status",
                "status_id = ?",
                vec![Value::from(status_id.to_string())],
            )?;
            Datastore::soft_delete(
                tx,
                "trades",
                "trade_id = ?",
                vec![Value::from(trade.trade_id.to_string())],
            )?;
            Ok(())
        })?;

        tracing::debug!(
            "依赖取消: status_id={} trade_id={}",
            status_id,
            trade.trade_id
        );

        Ok(())
    }

    /// 上游拒绝依赖
    ///
    /// # 守卫
    /// - 仅取引的上游事业者可拒绝; 不命中时返回 record not found
    ///
    /// # 步骤
    /// 1. 按 status_id 读取依赖状态
    /// 2. 按 (trade_id, upstream_operator_id = operator_id) 读取取引
    /// 3. 单事务: 依赖状态置 {rejected, unterminated, reply_message, updated_at=now};
    ///    取引的 upstream_operator_id / upstream_trace_id 置空
    /// 4. 提交后重读依赖状态并返回（重读失败返回读取错误, 提交不回滚）
    pub fn put_status_reject(
        &self,
        status_id: &Uuid,
        reply_message: Option<&str>,
        operator_id: &Uuid,
    ) -> RepositoryResult<RequestStatus> {
        let status = self.find_by_status_id(status_id)?;
        let trade = self.load_trade_guarded(
            &status.trade_id,
            "upstream_operator_id",
            operator_id,
        )?;

        let now_text = format_datetime(now());

        self.store.in_transaction(|tx| {
            tx.execute(
                "UPDATE request_status \
                 SET cfp_response_status = ?1, trade_tree_status = ?2, \
                     reply_message = ?3, updated_at = ?4 \
                 WHERE status_id = ?5 AND deleted_at IS NULL",
                params![
                    CfpResponseStatus::Rejected.to_string(),
                    TradeTreeStatus::Unterminated.to_string(),
                    reply_message,
                    now_text,
                    status_id.to_string(),
                ],
            )?;

            // 拒绝后取引回到未受理状态, 上游侧绑定清空
            tx.execute(
                "UPDATE trades \
                 SET upstream_operator_id = NULL, upstream_trace_id = NULL \
                 WHERE trade_id = ?1 AND deleted_at IS NULL",
                params![trade.trade_id.to_string()],
            )?;

            Ok(())
        })?;

        tracing::debug!(
            "依赖拒绝: status_id={} trade_id={}",
            status_id,
            trade.trade_id
        );

        // 事务已提交, 重读失败原样返回读取错误
        self.find_by_status_id(status_id)
    }

    /// 按取引标识物理删除依赖状态
    pub fn delete_by_trade_id(&self, trade_id: &Uuid) -> RepositoryResult<usize> {
        self.store.hard_delete(
            "request_status",
            "trade_id = ?",
            vec![Value::from(trade_id.to_string())],
        )
    }

    /// 按所有权侧读取取引（守卫不命中表现为 record not found）
    fn load_trade_guarded(
        &self,
        trade_id: &Uuid,
        operator_column: &str,
        operator_id: &Uuid,
    ) -> RepositoryResult<Trade> {
        let conn = self.store.get_conn()?;

        let result = conn.query_row(
            &format!(
                "SELECT trade_id, downstream_operator_id, upstream_operator_id, \
                        downstream_trace_id, upstream_trace_id, trade_date, \
                        created_at, created_user_id, updated_at, updated_user_id, deleted_at \
                 FROM trades \
                 WHERE trade_id = ?1 AND {} = ?2 AND deleted_at IS NULL",
                operator_column
            ),
            params![trade_id.to_string(), operator_id.to_string()],
            map_trade_row,
        );

        match result {
            Ok(trade) => Ok(trade),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                tracing::warn!(
                    "取引所有权守卫不命中: trade_id={} {}={}",
                    trade_id,
                    operator_column,
                    operator_id
                );
                Err(rusqlite::Error::QueryReturnedNoRows.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ==========================================
// 谓词构造
// ==========================================

/// 按查询对象在构建器上追加谓词与绑定参数
fn apply_target_predicate(
    builder: SqlQueryBuilder,
    params: &mut Vec<Value>,
    operator_id: &Uuid,
    status_id: Option<&Uuid>,
    trace_id: Option<&Uuid>,
    target: StatusTarget,
) -> SqlQueryBuilder {
    match target {
        StatusTarget::Request => {
            params.push(Value::from(operator_id.to_string()));
            let mut builder = builder.where_clause("t.downstream_operator_id = ?");
            if let Some(trace_id) = trace_id {
                builder = builder.where_clause("t.downstream_trace_id = ?");
                params.push(Value::from(trace_id.to_string()));
            }
            builder
        }
        StatusTarget::Response => {
            params.push(Value::from(operator_id.to_string()));
            let mut builder = builder.where_clause("t.upstream_operator_id = ?");
            if let Some(status_id) = status_id {
                builder = builder.where_clause("rs.status_id = ?");
                params.push(Value::from(status_id.to_string()));
            }
            builder
        }
        StatusTarget::Any => {
            params.push(Value::from(operator_id.to_string()));
            params.push(Value::from(operator_id.to_string()));
            let mut builder = builder
                .where_clause("(t.upstream_operator_id = ? OR t.downstream_operator_id = ?)");
            if let Some(status_id) = status_id {
                builder = builder.where_clause("rs.status_id = ?");
                params.push(Value::from(status_id.to_string()));
            }
            builder
        }
    }
}

// ==========================================
// 行映射
// ==========================================

/// 映射数据库行到 RequestStatus（列序与 STATUS_COLUMNS 一致）
fn map_status_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RequestStatus> {
    Ok(RequestStatus {
        status_id: parse_uuid_text(&row.get::<_, String>(0)?),
        trade_id: parse_uuid_text(&row.get::<_, String>(1)?),
        cfp_response_status: parse_cfp_response_status(&row.get::<_, String>(2)?),
        trade_tree_status: parse_trade_tree_status(&row.get::<_, String>(3)?),
        message: row.get(4)?,
        reply_message: row.get(5)?,
        request_type: parse_request_type(&row.get::<_, String>(6)?),
        response_due_date: parse_opt_date_text(row.get(7)?),
        completed_count: row.get(8)?,
        completed_count_modified_at: parse_opt_datetime_text(row.get(9)?),
        trades_count: row.get(10)?,
        trades_count_modified_at: parse_opt_datetime_text(row.get(11)?),
        created_at: parse_datetime_text(&row.get::<_, String>(12)?),
        created_user_id: row.get(13)?,
        updated_at: parse_datetime_text(&row.get::<_, String>(14)?),
        updated_user_id: row.get(15)?,
        deleted_at: parse_opt_datetime_text(row.get(16)?),
    })
}
