// ==========================================
// 零部件供应链溯源系统 - 配置层
// ==========================================
// 职责: 数据库路径解析与连接参数配置
// 说明: 上层服务负责加载业务配置, 本层只管数据访问所需的最小集合
// ==========================================

pub mod database_config;

// 重导出核心配置类型
pub use database_config::{default_db_path, DatabaseConfig};
