// ==========================================
// 零部件供应链溯源系统 - 数据库配置
// ==========================================
// 职责: 数据库文件路径解析（环境变量优先, 其次用户数据目录）
// ==========================================

use std::path::PathBuf;

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;

/// 数据访问层连接配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    pub db_path: String,
    /// busy_timeout（毫秒）
    pub busy_timeout_ms: u64,
}

impl DatabaseConfig {
    /// 以默认路径与默认超时构造配置
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(default_db_path())
    }
}

/// 解析默认数据库文件路径
///
/// # 优先级
/// 1. 环境变量 CFP_TRACEABILITY_DB（便于调试/测试/CI）
/// 2. 用户数据目录下的 cfp-traceability/traceability.db
/// 3. 当前目录回退值 ./traceability.db
pub fn default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("CFP_TRACEABILITY_DB") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 先给一个默认回退值，后续如果能拿到 data_dir 再覆盖
    let mut path = PathBuf::from("./traceability.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("cfp-traceability-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("cfp-traceability");
        }

        path = path.join("traceability.db");
    }

    path.to_string_lossy().to_string()
}
