// ==========================================
// 零部件供应链溯源系统 - 部品構成数据仓储
// ==========================================
// 语义: parts_structures 为 BOM 边表, (trace_id, parent_trace_id) 复合主键
// 约定: 根零件持有 parent_trace_id = nil-UUID 的边
// 红线: 只提供一级结构访问, 不做递归遍历
// ==========================================

use crate::domain::part::{Part, PartsStructure, PartsStructureEdge};
use crate::repository::datastore::{
    format_datetime, parse_datetime_text, parse_opt_datetime_text, parse_uuid_text, Datastore,
};
use crate::repository::error::RepositoryResult;
use crate::repository::parts_repo::{map_part_row, PART_COLUMNS};
use crate::repository::sql_builder::build_upsert_sql;
use rusqlite::types::Value;
use rusqlite::{params, Transaction};
use uuid::Uuid;

/// parts_structures 表的 SELECT 列清单
const EDGE_COLUMNS: &str = "trace_id, parent_trace_id, \
     created_at, created_user_id, updated_at, updated_user_id, deleted_at";

// ==========================================
// PartsStructureRepository - 部品構成仓储
// ==========================================
pub struct PartsStructureRepository {
    store: Datastore,
}

impl PartsStructureRepository {
    /// 创建新的部品構成仓储
    pub fn new(store: Datastore) -> Self {
        Self { store }
    }

    // ==========================================
    // 读取操作
    // ==========================================

    /// 查询一级结构（父件 + 直接子件）
    ///
    /// # 参数
    /// - `trace_id`: 父件溯源标识
    /// - `operator_id`: 事业者标识（父件与子件都限定在该事业者范围内）
    ///
    /// # 返回
    /// - `Ok(PartsStructure)`: 子件按 trace_id 升序
    /// - `Err(NotFound)`: 父件不存在
    pub fn find_structure(
        &self,
        trace_id: &Uuid,
        operator_id: &Uuid,
    ) -> RepositoryResult<PartsStructure> {
        let conn = self.store.get_conn()?;

        let parent = conn.query_row(
            &format!(
                "SELECT {} FROM parts \
                 WHERE trace_id = ?1 AND operator_id = ?2 AND deleted_at IS NULL",
                PART_COLUMNS
            ),
            params![trace_id.to_string(), operator_id.to_string()],
            map_part_row,
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM parts \
             WHERE operator_id = ?1 \
               AND deleted_at IS NULL \
               AND trace_id IN (SELECT trace_id FROM parts_structures \
                                WHERE parent_trace_id = ?2 AND deleted_at IS NULL) \
             ORDER BY trace_id ASC",
            PART_COLUMNS
        ))?;

        let children = stmt
            .query_map(
                params![operator_id.to_string(), trace_id.to_string()],
                map_part_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PartsStructure { parent, children })
    }

    /// 按子件溯源标识查询构成边
    ///
    /// # 返回
    /// - `Ok(PartsStructureEdge)`: 找到边（一个零部件至多一条父边）
    /// - `Err(NotFound)`: 不存在
    pub fn find_edge_by_trace_id(&self, trace_id: &Uuid) -> RepositoryResult<PartsStructureEdge> {
        let conn = self.store.get_conn()?;

        let edge = conn.query_row(
            &format!(
                "SELECT {} FROM parts_structures \
                 WHERE trace_id = ?1 AND deleted_at IS NULL \
                 ORDER BY parent_trace_id ASC LIMIT 1",
                EDGE_COLUMNS
            ),
            params![trace_id.to_string()],
            map_edge_row,
        )?;

        Ok(edge)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 整体落库一级结构（父件 + 子件 + 构成边, 单事务）
    ///
    /// # 步骤
    /// 1. 父件 trace_id 为 nil-UUID 时生成新 UUID
    /// 2. upsert 父件（conflict: trace_id）
    /// 3. upsert 父件根边 (parent.trace_id, nil-UUID)
    /// 4. 逐个子件: nil-UUID 则生成, upsert 子件, upsert 边 (child, parent)
    ///
    /// # 返回
    /// - `Ok(PartsStructure)`: 落库后的结构（含生成的 UUID）
    /// - `Err`: 任一步失败, 全部回滚
    pub fn put_structure(
        &self,
        parent: &Part,
        children: &[Part],
    ) -> RepositoryResult<PartsStructure> {
        let mut stored_parent = parent.clone();
        if stored_parent.trace_id.is_nil() {
            stored_parent.trace_id = Uuid::new_v4();
        }

        let mut stored_children: Vec<Part> = Vec::with_capacity(children.len());
        for child in children {
            let mut stored = child.clone();
            if stored.trace_id.is_nil() {
                stored.trace_id = Uuid::new_v4();
            }
            stored_children.push(stored);
        }

        self.store.in_transaction(|tx| {
            upsert_part(tx, &stored_parent)?;
            upsert_edge(tx, &stored_parent, &Uuid::nil())?;

            for child in &stored_children {
                upsert_part(tx, child)?;
                upsert_edge(tx, child, &stored_parent.trace_id)?;
            }

            Ok(())
        })?;

        tracing::debug!(
            "部品構成落库: parent={} children={}",
            stored_parent.trace_id,
            stored_children.len()
        );

        Ok(PartsStructure {
            parent: stored_parent,
            children: stored_children,
        })
    }

    /// 按子件溯源标识物理删除构成边
    pub fn delete_by_trace_id(&self, trace_id: &Uuid) -> RepositoryResult<usize> {
        self.store.hard_delete(
            "parts_structures",
            "trace_id = ?",
            vec![Value::from(trace_id.to_string())],
        )
    }
}

// ==========================================
// upsert 原语
// ==========================================

/// upsert 零部件行（conflict: trace_id, 不覆盖创建审计）
fn upsert_part(tx: &Transaction<'_>, part: &Part) -> RepositoryResult<()> {
    let sql = build_upsert_sql(
        "parts",
        &[
            "trace_id",
            "operator_id",
            "plant_id",
            "parts_name",
            "support_parts_name",
            "terminated_flag",
            "amount_required",
            "amount_required_unit",
            "parts_label_name",
            "parts_add_info1",
            "parts_add_info2",
            "parts_add_info3",
            "created_at",
            "created_user_id",
            "updated_at",
            "updated_user_id",
        ],
        &["trace_id"],
        &[
            "operator_id",
            "plant_id",
            "parts_name",
            "support_parts_name",
            "terminated_flag",
            "amount_required",
            "amount_required_unit",
            "parts_label_name",
            "parts_add_info1",
            "parts_add_info2",
            "parts_add_info3",
            "updated_at",
            "updated_user_id",
        ],
    );

    tx.execute(
        &sql,
        params![
            part.trace_id.to_string(),
            part.operator_id.to_string(),
            part.plant_id.to_string(),
            part.parts_name,
            part.support_parts_name,
            part.terminated_flag,
            part.amount_required,
            part.amount_required_unit.map(|u| u.to_string()),
            part.parts_label_name,
            part.parts_add_info1,
            part.parts_add_info2,
            part.parts_add_info3,
            format_datetime(part.created_at),
            part.created_user_id,
            format_datetime(part.updated_at),
            part.updated_user_id,
        ],
    )?;

    Ok(())
}

/// upsert 构成边（conflict: 复合主键, 只刷新更新审计）
fn upsert_edge(tx: &Transaction<'_>, part: &Part, parent_trace_id: &Uuid) -> RepositoryResult<()> {
    let sql = build_upsert_sql(
        "parts_structures",
        &[
            "trace_id",
            "parent_trace_id",
            "created_at",
            "created_user_id",
            "updated_at",
            "updated_user_id",
        ],
        &["trace_id", "parent_trace_id"],
        &["updated_at", "updated_user_id"],
    );

    tx.execute(
        &sql,
        params![
            part.trace_id.to_string(),
            parent_trace_id.to_string(),
            format_datetime(part.created_at),
            part.created_user_id,
            format_datetime(part.updated_at),
            part.updated_user_id,
        ],
    )?;

    Ok(())
}

// ==========================================
// 行映射
// ==========================================

/// 映射数据库行到 PartsStructureEdge（列序与 EDGE_COLUMNS 一致）
fn map_edge_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PartsStructureEdge> {
    Ok(PartsStructureEdge {
        trace_id: parse_uuid_text(&row.get::<_, String>(0)?),
        parent_trace_id: parse_uuid_text(&row.get::<_, String>(1)?),
        created_at: parse_datetime_text(&row.get::<_, String>(2)?),
        created_user_id: row.get(3)?,
        updated_at: parse_datetime_text(&row.get::<_, String>(4)?),
        updated_user_id: row.get(5)?,
        deleted_at: parse_opt_datetime_text(row.get(6)?),
    })
}

// ==========================================
// 单元测试
// ==========================================
