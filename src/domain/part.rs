// ==========================================
// 零部件供应链溯源系统 - 零部件领域模型
// ==========================================
// 对齐: scripts/dev_db/schema.sql parts / parts_structures 表
// 红线: 可空列以 Option 端到端表达, 不得以零值冒充缺失
// ==========================================

use crate::domain::types::AmountRequiredUnit;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Part - 零部件
// ==========================================
// 用途: 事业者在特定工厂登记的零部件实例
// trace_id 将零部件与其 CFP 以及取引关系关联起来
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    // ===== 主键 =====
    pub trace_id: Uuid, // 溯源标识（全局唯一）

    // ===== 归属 =====
    pub operator_id: Uuid, // 事业者标识
    pub plant_id: Uuid,    // 工厂标识

    // ===== 基础信息 =====
    pub parts_name: String,                 // 零部件名
    pub support_parts_name: Option<String>, // 辅助零部件名（补充项次）
    pub terminated_flag: bool,              // 终端标志（true=溯源到此为止）

    // ===== 数量维度 =====
    pub amount_required: Option<f64>,                     // 必要数量
    pub amount_required_unit: Option<AmountRequiredUnit>, // 必要数量单位

    // ===== 附加信息 =====
    pub parts_label_name: Option<String>, // 零部件标签名
    pub parts_add_info1: Option<String>,  // 附加信息1
    pub parts_add_info2: Option<String>,  // 附加信息2
    pub parts_add_info3: Option<String>,  // 附加信息3

    // ===== 审计字段 =====
    pub created_at: NaiveDateTime,          // 记录创建时间
    pub created_user_id: String,            // 创建者
    pub updated_at: NaiveDateTime,          // 记录更新时间
    pub updated_user_id: String,            // 更新者
    pub deleted_at: Option<NaiveDateTime>,  // 软删除时间（非空=对读取不可见）
}

// ==========================================
// PartsStructureEdge - 部品構成边
// ==========================================
// 语义: trace_id 是 parent_trace_id 的直接子件
// 根零件持有 parent_trace_id = nil-UUID 的边
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartsStructureEdge {
    // ===== 复合主键 =====
    pub trace_id: Uuid,        // 子件溯源标识
    pub parent_trace_id: Uuid, // 父件溯源标识（nil-UUID=根）

    // ===== 审计字段 =====
    pub created_at: NaiveDateTime,
    pub created_user_id: String,
    pub updated_at: NaiveDateTime,
    pub updated_user_id: String,
    pub deleted_at: Option<NaiveDateTime>,
}

// ==========================================
// PartsStructure - 一级结构视图
// ==========================================
// 用途: find_structure 的返回值（父件 + 直接子件, 不递归）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartsStructure {
    pub parent: Part,        // 父件
    pub children: Vec<Part>, // 直接子件（按 trace_id 升序）
}

// ==========================================
// PartsFilter - 零部件检索条件
// ==========================================
// operator_id 必填, 其余为可选过滤项
#[derive(Debug, Clone, Default)]
pub struct PartsFilter {
    pub operator_id: Uuid,              // 事业者标识（必填）
    pub trace_id: Option<Uuid>,         // 按溯源标识过滤
    pub parts_name: Option<String>,     // 按零部件名过滤
    pub plant_id: Option<Uuid>,         // 按工厂过滤
    pub parent_flag: Option<bool>,      // true=仅根零件（部品構成边 parent 为 nil-UUID）
    pub limit: Option<usize>,           // 返回上限
}
