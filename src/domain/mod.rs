// ==========================================
// 零部件供应链溯源系统 - 领域层
// ==========================================
// 职责: 行结构实体与类型定义
// 红线: 领域层不含数据访问逻辑
// ==========================================

pub mod cfp;
pub mod part;
pub mod request_status;
pub mod trade;
pub mod types;

// 重导出核心实体
pub use cfp::{Cfp, CfpCertification};
pub use part::{Part, PartsFilter, PartsStructure, PartsStructureEdge};
pub use request_status::RequestStatus;
pub use trade::{ResponseAnswer, Trade, TradeRequest, TradeResponseInput};
