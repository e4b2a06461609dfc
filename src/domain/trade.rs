// ==========================================
// 零部件供应链溯源系统 - 取引领域模型
// ==========================================
// 对齐: scripts/dev_db/schema.sql trades 表
// 语义: downstream 为请求方, upstream 为应答方
// ==========================================

use crate::domain::request_status::RequestStatus;
use crate::domain::types::{CfpResponseStatus, TradeTreeStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Trade - 取引（下游请求方 ↔ 上游应答方）
// ==========================================
// upstream_operator_id / upstream_trace_id 在应答方受理并回答之前为空,
// 拒绝时再次被置空
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    // ===== 主键 =====
    pub trade_id: Uuid, // 取引标识

    // ===== 下游（请求方）=====
    pub downstream_operator_id: Uuid, // 下游事业者标识
    pub downstream_trace_id: Uuid,    // 下游零部件溯源标识

    // ===== 上游（应答方）=====
    pub upstream_operator_id: Option<Uuid>, // 上游事业者标识（受理前为空）
    pub upstream_trace_id: Option<Uuid>,    // 上游零部件溯源标识（回答前为空）

    // ===== 取引信息 =====
    pub trade_date: Option<NaiveDate>, // 取引日

    // ===== 审计字段 =====
    pub created_at: NaiveDateTime,
    pub created_user_id: String,
    pub updated_at: NaiveDateTime,
    pub updated_user_id: String,
    pub deleted_at: Option<NaiveDateTime>,
}

// ==========================================
// TradeRequest - 取引依赖对
// ==========================================
// 用途: put_request 的输入/输出; 取引与其依赖状态同事务落库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRequest {
    pub trade: Trade,          // 取引行
    pub status: RequestStatus, // 依赖状态行（与取引 1:1）
}

// ==========================================
// TradeResponseInput - 回答输入
// ==========================================
// 用途: put_response 第一段更新（上游回答绑定自方 trace）
#[derive(Debug, Clone)]
pub struct TradeResponseInput {
    pub trade_id: Uuid, // 目标取引
    pub trace_id: Uuid, // 上游零部件溯源标识
}

// ==========================================
// ResponseAnswer - 回答时的状态变更
// ==========================================
// completed_count 给定时, 同步刷新 completed_count_modified_at
#[derive(Debug, Clone)]
pub struct ResponseAnswer {
    pub cfp_response_status: CfpResponseStatus, // 回答后的状态
    pub trade_tree_status: TradeTreeStatus,     // 取引树终端状态
    pub completed_count: Option<i64>,           // 完成件数（可选）
}
