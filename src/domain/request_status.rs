// ==========================================
// 零部件供应链溯源系统 - 依赖状态领域模型
// ==========================================
// 对齐: scripts/dev_db/schema.sql request_status 表
// 不变式: 每个取引恰有一条依赖状态（1:1, 同事务创建/删除）
// ==========================================

use crate::domain::types::{CfpResponseStatus, RequestType, TradeTreeStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// RequestStatus - 依赖状态
// ==========================================
// 生命周期: pending → accepted → completed
// 替代终态: cancelled (下游取消, 行软删除) / rejected (上游拒绝)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestStatus {
    // ===== 主键与关联 =====
    pub status_id: Uuid, // 状态标识
    pub trade_id: Uuid,  // 关联取引（FK）

    // ===== 状态 =====
    pub cfp_response_status: CfpResponseStatus, // CFP 回答状态
    pub trade_tree_status: TradeTreeStatus,     // 取引树终端状态（正交维度）

    // ===== 消息 =====
    pub message: Option<String>,       // 请求方留言
    pub reply_message: Option<String>, // 应答方回复（拒绝理由等）

    // ===== 依赖信息 =====
    pub request_type: RequestType,            // 依赖种别
    pub response_due_date: Option<NaiveDate>, // 回答期限

    // ===== 进度统计 =====
    pub completed_count: Option<i64>,                      // 完成件数
    pub completed_count_modified_at: Option<NaiveDateTime>, // 完成件数更新时间
    pub trades_count: Option<i64>,                         // 取引件数
    pub trades_count_modified_at: Option<NaiveDateTime>,   // 取引件数更新时间

    // ===== 审计字段 =====
    pub created_at: NaiveDateTime,
    pub created_user_id: String,
    pub updated_at: NaiveDateTime,
    pub updated_user_id: String,
    pub deleted_at: Option<NaiveDateTime>,
}
