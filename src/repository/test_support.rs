// ==========================================
// 仓储层单元测试辅助 (仅 cfg(test))
// ==========================================
// 职责: 直接写入底层行, 用于构造仓储公开接口无法直接
//       制造的前置状态（如软删除行/指定审计时间）
// ==========================================

use crate::domain::request_status::RequestStatus;
use crate::domain::trade::Trade;
use crate::domain::types::{CfpResponseStatus, RequestType, TradeTreeStatus};
use crate::repository::datastore::Datastore;
use chrono::NaiveDateTime;
use rusqlite::params;
use uuid::Uuid;

/// 解析测试用固定时间戳
pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

// ==========================================
// TestPart - parts 行的测试描述
// ==========================================
pub struct TestPart {
    pub trace_id: Uuid,
    pub operator_id: Uuid,
    pub plant_id: Uuid,
    pub parts_name: String,
    pub support_parts_name: Option<String>,
    pub deleted: bool,
}

impl TestPart {
    pub fn new(parts_name: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            operator_id: Uuid::new_v4(),
            plant_id: Uuid::new_v4(),
            parts_name: parts_name.to_string(),
            support_parts_name: None,
            deleted: false,
        }
    }
}

/// 直接插入 parts 行
pub fn insert_part_row(store: &Datastore, part: &TestPart) {
    let conn = store.connection();
    let guard = conn.lock().unwrap();

    guard
        .execute(
            r#"
            INSERT INTO parts (
                trace_id, operator_id, plant_id, parts_name, support_parts_name,
                terminated_flag, created_at, created_user_id,
                updated_at, updated_user_id, deleted_at
            ) VALUES (?, ?, ?, ?, ?, 0, ?, 'tester', ?, 'tester', ?)
            "#,
            params![
                part.trace_id.to_string(),
                part.operator_id.to_string(),
                part.plant_id.to_string(),
                part.parts_name,
                part.support_parts_name,
                "2026-01-10 09:00:00",
                "2026-01-10 09:00:00",
                part.deleted.then(|| "2026-01-11 09:00:00".to_string()),
            ],
        )
        .unwrap();
}

/// 直接插入部品構成边
pub fn insert_structure_edge_row(store: &Datastore, trace_id: &Uuid, parent_trace_id: &Uuid) {
    let conn = store.connection();
    let guard = conn.lock().unwrap();

    guard
        .execute(
            r#"
            INSERT INTO parts_structures (
                trace_id, parent_trace_id,
                created_at, created_user_id, updated_at, updated_user_id
            ) VALUES (?, ?, ?, 'tester', ?, 'tester')
            "#,
            params![
                trace_id.to_string(),
                parent_trace_id.to_string(),
                "2026-01-10 09:00:00",
                "2026-01-10 09:00:00",
            ],
        )
        .unwrap();
}

/// 构造测试取引（审计时间固定, 便于断言排序）
pub fn make_trade(downstream_operator_id: Uuid, upstream_operator_id: Option<Uuid>) -> Trade {
    Trade {
        trade_id: Uuid::new_v4(),
        downstream_operator_id,
        downstream_trace_id: Uuid::new_v4(),
        upstream_operator_id,
        upstream_trace_id: None,
        trade_date: None,
        created_at: ts("2026-01-10 09:00:00"),
        created_user_id: "tester".to_string(),
        updated_at: ts("2026-01-10 09:00:00"),
        updated_user_id: "tester".to_string(),
        deleted_at: None,
    }
}

/// 构造测试依赖状态（created_at 可指定, 便于断言排序）
pub fn make_status(trade_id: Uuid, created_at: &str) -> RequestStatus {
    RequestStatus {
        status_id: Uuid::new_v4(),
        trade_id,
        cfp_response_status: CfpResponseStatus::Pending,
        trade_tree_status: TradeTreeStatus::Unterminated,
        message: Some("CFP 提供をお願いします".to_string()),
        reply_message: None,
        request_type: RequestType::Cfp,
        response_due_date: None,
        completed_count: None,
        completed_count_modified_at: None,
        trades_count: None,
        trades_count_modified_at: None,
        created_at: ts(created_at),
        created_user_id: "tester".to_string(),
        updated_at: ts(created_at),
        updated_user_id: "tester".to_string(),
        deleted_at: None,
    }
}

/// 将指定取引行软删除（绕过仓储公开接口, 构造前置状态用）
pub fn soft_delete_trade_row(store: &Datastore, trade_id: &Uuid) {
    let conn = store.connection();
    let guard = conn.lock().unwrap();

    guard
        .execute(
            "UPDATE trades SET deleted_at = '2026-01-11 09:00:00' WHERE trade_id = ?1",
            params![trade_id.to_string()],
        )
        .unwrap();
}
