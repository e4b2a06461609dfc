// ==========================================
// 零部件供应链溯源系统 - 领域类型定义
// ==========================================
// 红线: 枚举落库字符串与既有部署位级一致, 不得更改
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CFP 类型 (CFP Type)
// ==========================================
// 生命周期阶段分解: 前/主 × 生产/部件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CfpType {
    PreProduction,  // 前工序-自社生产
    MainProduction, // 主工序-自社生产
    PreComponent,   // 前工序-部件合计
    MainComponent,  // 主工序-部件合计
}

impl CfpType {
    /// 落库字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            CfpType::PreProduction => "preProduction",
            CfpType::MainProduction => "mainProduction",
            CfpType::PreComponent => "preComponent",
            CfpType::MainComponent => "mainComponent",
        }
    }
}

impl fmt::Display for CfpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 解析 CFP 类型字符串
pub fn parse_cfp_type(s: &str) -> CfpType {
    match s {
        "preProduction" => CfpType::PreProduction,
        "mainProduction" => CfpType::MainProduction,
        "preComponent" => CfpType::PreComponent,
        "mainComponent" => CfpType::MainComponent,
        _ => CfpType::PreProduction, // 默认值
    }
}

// ==========================================
// DQR 类型 (Data Quality Rating Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DqrType {
    PreProcessing,  // 前工序
    MainProcessing, // 主工序
}

impl DqrType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DqrType::PreProcessing => "preProcessing",
            DqrType::MainProcessing => "mainProcessing",
        }
    }
}

impl fmt::Display for DqrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 解析 DQR 类型字符串
pub fn parse_dqr_type(s: &str) -> DqrType {
    match s {
        "mainProcessing" => DqrType::MainProcessing,
        _ => DqrType::PreProcessing, // 默认值
    }
}

// ==========================================
// GHG 排放申告单位 (GHG Declared Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GhgDeclaredUnit {
    #[serde(rename = "kgCO2e/kilogram")]
    KgCo2ePerKilogram, // 每千克
    #[serde(rename = "kgCO2e/liter")]
    KgCo2ePerLiter, // 每升
}

impl GhgDeclaredUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            GhgDeclaredUnit::KgCo2ePerKilogram => "kgCO2e/kilogram",
            GhgDeclaredUnit::KgCo2ePerLiter => "kgCO2e/liter",
        }
    }
}

impl fmt::Display for GhgDeclaredUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 解析 GHG 排放申告单位字符串
pub fn parse_ghg_declared_unit(s: &str) -> GhgDeclaredUnit {
    match s {
        "kgCO2e/liter" => GhgDeclaredUnit::KgCo2ePerLiter,
        _ => GhgDeclaredUnit::KgCo2ePerKilogram, // 默认值
    }
}

// ==========================================
// 必要数量单位 (Amount Required Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountRequiredUnit {
    Kilogram, // 千克
    Liter,    // 升
}

impl AmountRequiredUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountRequiredUnit::Kilogram => "kilogram",
            AmountRequiredUnit::Liter => "liter",
        }
    }
}

impl fmt::Display for AmountRequiredUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 解析必要数量单位字符串
pub fn parse_amount_required_unit(s: &str) -> AmountRequiredUnit {
    match s {
        "liter" => AmountRequiredUnit::Liter,
        _ => AmountRequiredUnit::Kilogram, // 默认值
    }
}

// ==========================================
// CFP 回答状态 (CFP Response Status)
// ==========================================
// 状态机: pending → accepted → completed
// 替代终态: cancelled (下游取消) / rejected (上游拒绝)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CfpResponseStatus {
    Pending,   // 待回答
    Accepted,  // 已受理
    Rejected,  // 已拒绝
    Cancelled, // 已取消
    Completed, // 已完成
}

impl CfpResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CfpResponseStatus::Pending => "pending",
            CfpResponseStatus::Accepted => "accepted",
            CfpResponseStatus::Rejected => "rejected",
            CfpResponseStatus::Cancelled => "cancelled",
            CfpResponseStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CfpResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 解析 CFP 回答状态字符串
pub fn parse_cfp_response_status(s: &str) -> CfpResponseStatus {
    match s {
        "accepted" => CfpResponseStatus::Accepted,
        "rejected" => CfpResponseStatus::Rejected,
        "cancelled" => CfpResponseStatus::Cancelled,
        "completed" => CfpResponseStatus::Completed,
        _ => CfpResponseStatus::Pending, // 默认值
    }
}

// ==========================================
// 取引树终端状态 (Trade Tree Status)
// ==========================================
// 与回答状态正交; 核心只保证拒绝时重置为 unterminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeTreeStatus {
    Terminated,   // 已终端化
    Unterminated, // 未终端化
}

impl TradeTreeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeTreeStatus::Terminated => "terminated",
            TradeTreeStatus::Unterminated => "unterminated",
        }
    }
}

impl fmt::Display for TradeTreeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 解析取引树终端状态字符串
pub fn parse_trade_tree_status(s: &str) -> TradeTreeStatus {
    match s {
        "terminated" => TradeTreeStatus::Terminated,
        _ => TradeTreeStatus::Unterminated, // 默认值
    }
}

// ==========================================
// 依赖种别 (Request Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    #[serde(rename = "CFP")]
    Cfp, // CFP 回答依赖
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Cfp => "CFP",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 解析依赖种别字符串（当前仅有 CFP 一种）
pub fn parse_request_type(_s: &str) -> RequestType {
    RequestType::Cfp
}

// ==========================================
// 状态查询对象 (Status Target)
// ==========================================
// 查询谓词的标签变体; 未知取值折叠为 Any 以兼容既有调用方
// 不落库, 仅作进程内选择器, 解析入口为 parse_status_target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTarget {
    Request,  // 下游视角: 自己发出的依赖
    Response, // 上游视角: 需要自己回答的依赖
    Any,      // 双向
}

impl StatusTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTarget::Request => "REQUEST",
            StatusTarget::Response => "RESPONSE",
            StatusTarget::Any => "",
        }
    }
}

/// 解析状态查询对象字符串（未知取值折叠为 Any）
pub fn parse_status_target(s: &str) -> StatusTarget {
    match s {
        "REQUEST" => StatusTarget::Request,
        "RESPONSE" => StatusTarget::Response,
        _ => StatusTarget::Any,
    }
}

// ==========================================
// 单元测试
// ==========================================
