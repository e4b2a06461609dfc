// ==========================================
// 零部件供应链溯源系统 - 零部件数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑, 只做数据映射
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

use crate::domain::part::{Part, PartsFilter};
use crate::domain::types::parse_amount_required_unit;
use crate::repository::datastore::{
    parse_datetime_text, parse_opt_datetime_text, parse_uuid_text, Datastore,
};
use crate::repository::error::RepositoryResult;
use crate::repository::sql_builder::SqlQueryBuilder;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use uuid::Uuid;

/// parts 表的 SELECT 列清单（与 map_part_row 的列序一致）
pub(crate) const PART_COLUMNS: &str = "trace_id, operator_id, plant_id, parts_name, \
     support_parts_name, terminated_flag, amount_required, amount_required_unit, \
     parts_label_name, parts_add_info1, parts_add_info2, parts_add_info3, \
     created_at, created_user_id, updated_at, updated_user_id, deleted_at";

// ==========================================
// PartsRepository - 零部件仓储
// ==========================================
// 职责: parts 表的检索/计数/物理删除
// 说明: 零部件的创建/更新经由部品構成仓储的 put_structure 落库
pub struct PartsRepository {
    store: Datastore,
}

impl PartsRepository {
    /// 创建新的零部件仓储
    pub fn new(store: Datastore) -> Self {
        Self { store }
    }

    // ==========================================
    // 读取操作
    // ==========================================

    /// 按条件检索零部件（软删除行不可见）
    ///
    /// # 参数
    /// - `filter`: 检索条件（operator_id 必填）
    ///
    /// # 返回
    /// - `Ok(Vec<Part>)`: 按 (parts_name ASC, support_parts_name ASC) 排序,
    ///   截断至 filter.limit
    ///
    /// # 说明
    /// - parent_flag=true 时仅返回根零件
    ///   （部品構成边 parent_trace_id = nil-UUID 的零部件）
    pub fn find_by_filter(&self, filter: &PartsFilter) -> RepositoryResult<Vec<Part>> {
        let conn = self.store.get_conn()?;

        let mut params: Vec<Value> = vec![Value::from(filter.operator_id.to_string())];

        let mut builder = SqlQueryBuilder::new(&format!("SELECT {} FROM parts", PART_COLUMNS))
            .where_clause("deleted_at IS NULL")
            .where_clause("operator_id = ?");

        if let Some(trace_id) = &filter.trace_id {
            builder = builder.where_clause("trace_id = ?");
            params.push(Value::from(trace_id.to_string()));
        }
        if let Some(parts_name) = &filter.parts_name {
            builder = builder.where_clause("parts_name = ?");
            params.push(Value::from(parts_name.clone()));
        }
        if let Some(plant_id) = &filter.plant_id {
            builder = builder.where_clause("plant_id = ?");
            params.push(Value::from(plant_id.to_string()));
        }
        if filter.parent_flag == Some(true) {
            builder = builder.where_clause(
                "EXISTS (SELECT 1 FROM parts_structures ps \
                 WHERE ps.trace_id = parts.trace_id \
                   AND ps.parent_trace_id = ? \
                   AND ps.deleted_at IS NULL)",
            );
            params.push(Value::from(Uuid::nil().to_string()));
        }

        let sql = builder
            .order_by("parts_name ASC, support_parts_name ASC")
            .limit_if(filter.limit)
            .build();

        let mut stmt = conn.prepare(&sql)?;
        let parts = stmt
            .query_map(params_from_iter(params.iter()), map_part_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(parts)
    }

    /// 按溯源标识查询单个零部件
    ///
    /// # 返回
    /// - `Ok(Part)`: 找到零部件
    /// - `Err(NotFound)`: 不存在或已软删除
    pub fn find_by_trace_id(&self, trace_id: &Uuid) -> RepositoryResult<Part> {
        let conn = self.store.get_conn()?;

        let part = conn.query_row(
            &format!(
                "SELECT {} FROM parts WHERE trace_id = ?1 AND deleted_at IS NULL",
                PART_COLUMNS
            ),
            params![trace_id.to_string()],
            map_part_row,
        )?;

        Ok(part)
    }

    /// 统计事业者持有的零部件数（软删除行不计）
    pub fn count_by_operator_id(&self, operator_id: &Uuid) -> RepositoryResult<i64> {
        let conn = self.store.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM parts WHERE operator_id = ?1 AND deleted_at IS NULL",
            params![operator_id.to_string()],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 按溯源标识物理删除零部件
    ///
    /// # 返回
    /// - `Ok(usize)`: 删除的行数
    /// - `Err(PhysicalDelete)`: 驱动错误, 携带表名上下文
    pub fn delete_by_trace_id(&self, trace_id: &Uuid) -> RepositoryResult<usize> {
        self.store.hard_delete(
            "parts",
            "trace_id = ?",
            vec![Value::from(trace_id.to_string())],
        )
    }
}

// ==========================================
// 行映射
// ==========================================

/// 映射数据库行到 Part（列序与 PART_COLUMNS 一致）
pub(crate) fn map_part_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Part> {
    Ok(Part {
        trace_id: parse_uuid_text(&row.get::<_, String>(0)?),
        operator_id: parse_uuid_text(&row.get::<_, String>(1)?),
        plant_id: parse_uuid_text(&row.get::<_, String>(2)?),
        parts_name: row.get(3)?,
        support_parts_name: row.get(4)?,
        terminated_flag: row.get(5)?,
        amount_required: row.get(6)?,
        amount_required_unit: row
            .get::<_, Option<String>>(7)?
            .map(|s| parse_amount_required_unit(&s)),
        parts_label_name: row.get(8)?,
        parts_add_info1: row.get(9)?,
        parts_add_info2: row.get(10)?,
        parts_add_info3: row.get(11)?,
        created_at: parse_datetime_text(&row.get::<_, String>(12)?),
        created_user_id: row.get(13)?,
        updated_at: parse_datetime_text(&row.get::<_, String>(14)?),
        updated_user_id: row.get(15)?,
        deleted_at: parse_opt_datetime_text(row.get(16)?),
    })
}

// ==========================================
// 单元测试
// ==========================================
