// ==========================================
// 零部件供应链溯源系统 - 数据访问层核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 供应链溯源后端的数据访问与请求状态层
// 边界: HTTP 路由/输入校验/认证由上层服务承担,
//       本层只消费已认证的 operator_id 并暴露仓储操作
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 数据库路径与连接参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema 建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AmountRequiredUnit, CfpResponseStatus, CfpType, DqrType, GhgDeclaredUnit, RequestType,
    StatusTarget, TradeTreeStatus,
};

// 领域实体
pub use domain::{
    Cfp, CfpCertification, Part, PartsFilter, PartsStructure, PartsStructureEdge, RequestStatus,
    ResponseAnswer, Trade, TradeRequest, TradeResponseInput,
};

// 仓储
pub use repository::{
    CfpRepository, Datastore, PartsRepository, PartsStructureRepository, RepositoryError,
    RepositoryResult, RequestStatusRepository, TradeRepository,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "零部件供应链溯源系统";

// ==========================================
// 预编译检查
// ==========================================
