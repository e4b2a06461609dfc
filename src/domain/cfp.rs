// ==========================================
// 零部件供应链溯源系统 - CFP 领域模型
// ==========================================
// 对齐: scripts/dev_db/schema.sql cfp_infomation / cfp_certificates 表
// 说明: 表名 cfp_infomation 的拼写沿用既有部署
// ==========================================

use crate::domain::types::{CfpType, DqrType, GhgDeclaredUnit};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Cfp - Carbon Footprint of Product
// ==========================================
// 复合主键 (cfp_id, cfp_type): 同一 cfp_id 按生命周期阶段分解为多行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cfp {
    // ===== 复合主键 =====
    pub cfp_id: Uuid,      // CFP 标识
    pub cfp_type: CfpType, // CFP 类型（前/主 × 生产/部件）

    // ===== 关联 =====
    pub trace_id: Uuid, // 对应零部件的溯源标识

    // ===== 排放量 =====
    pub ghg_emission: Option<f64>,           // GHG 排放量
    pub ghg_declared_unit: GhgDeclaredUnit,  // 排放申告单位

    // ===== DQR (数据质量评级) =====
    pub dqr_type: DqrType,   // DQR 类型
    pub te_r: Option<f64>,   // 技术代表性 (TeR)
    pub ge_r: Option<f64>,   // 地理代表性 (GeR)
    pub ti_r: Option<f64>,   // 时间代表性 (TiR)

    // ===== 证书 =====
    // put 时整体替换: 旧行物理删除, 新行按给定顺序编号 1..N
    pub certificates: Vec<String>, // 证书 URL 列表

    // ===== 审计字段 =====
    pub created_at: NaiveDateTime,
    pub created_user_id: String,
    pub updated_at: NaiveDateTime,
    pub updated_user_id: String,
    pub deleted_at: Option<NaiveDateTime>,
}

// ==========================================
// CfpCertification - 证明书信息
// ==========================================
// 用途: get_certifications 的返回值
// 注意: 当前为进程内固定数据, 尚未接入证明书存储表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfpCertification {
    pub certification_id: Uuid,      // 证明书标识
    pub cfp_id: Uuid,                // 关联 CFP
    pub trace_id: Uuid,              // 关联零部件
    pub link_url: String,            // 证明书链接
    pub description: Option<String>, // 说明
}
