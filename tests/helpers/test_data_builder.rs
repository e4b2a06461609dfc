// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use cfp_traceability::domain::types::{
    CfpResponseStatus, CfpType, DqrType, GhgDeclaredUnit, RequestType, TradeTreeStatus,
};
use cfp_traceability::domain::{Cfp, Part, RequestStatus, Trade};
use chrono::NaiveDateTime;
use uuid::Uuid;

/// 解析测试用固定时间戳
pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

// ==========================================
// Part 构建器
// ==========================================

pub struct PartBuilder {
    trace_id: Uuid,
    operator_id: Uuid,
    plant_id: Uuid,
    parts_name: String,
    support_parts_name: Option<String>,
    terminated_flag: bool,
}

impl PartBuilder {
    pub fn new(parts_name: &str) -> Self {
        Self {
            trace_id: Uuid::nil(), // put_structure 生成
            operator_id: Uuid::new_v4(),
            plant_id: Uuid::new_v4(),
            parts_name: parts_name.to_string(),
            support_parts_name: None,
            terminated_flag: false,
        }
    }

    pub fn trace_id(mut self, trace_id: Uuid) -> Self {
        self.trace_id = trace_id;
        self
    }

    pub fn operator(mut self, operator_id: Uuid) -> Self {
        self.operator_id = operator_id;
        self
    }

    pub fn plant(mut self, plant_id: Uuid) -> Self {
        self.plant_id = plant_id;
        self
    }

    pub fn support_parts_name(mut self, name: &str) -> Self {
        self.support_parts_name = Some(name.to_string());
        self
    }

    pub fn terminated(mut self) -> Self {
        self.terminated_flag = true;
        self
    }

    pub fn build(self) -> Part {
        Part {
            trace_id: self.trace_id,
            operator_id: self.operator_id,
            plant_id: self.plant_id,
            parts_name: self.parts_name,
            support_parts_name: self.support_parts_name,
            terminated_flag: self.terminated_flag,
            amount_required: None,
            amount_required_unit: None,
            parts_label_name: None,
            parts_add_info1: None,
            parts_add_info2: None,
            parts_add_info3: None,
            created_at: ts("2026-01-10 09:00:00"),
            created_user_id: "tester".to_string(),
            updated_at: ts("2026-01-10 09:00:00"),
            updated_user_id: "tester".to_string(),
            deleted_at: None,
        }
    }
}

// ==========================================
// Cfp 构建器
// ==========================================

pub struct CfpBuilder {
    cfp_id: Uuid,
    cfp_type: CfpType,
    trace_id: Uuid,
    ghg_emission: Option<f64>,
    certificates: Vec<String>,
    updated_at: NaiveDateTime,
}

impl CfpBuilder {
    pub fn new(cfp_type: CfpType) -> Self {
        Self {
            cfp_id: Uuid::new_v4(),
            cfp_type,
            trace_id: Uuid::new_v4(),
            ghg_emission: Some(1.2),
            certificates: Vec::new(),
            updated_at: ts("2026-01-10 09:00:00"),
        }
    }

    pub fn cfp_id(mut self, cfp_id: Uuid) -> Self {
        self.cfp_id = cfp_id;
        self
    }

    pub fn trace(mut self, trace_id: Uuid) -> Self {
        self.trace_id = trace_id;
        self
    }

    pub fn emission(mut self, ghg_emission: f64) -> Self {
        self.ghg_emission = Some(ghg_emission);
        self
    }

    pub fn certificates(mut self, urls: &[&str]) -> Self {
        self.certificates = urls.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn updated_at(mut self, at: &str) -> Self {
        self.updated_at = ts(at);
        self
    }

    pub fn build(self) -> Cfp {
        Cfp {
            cfp_id: self.cfp_id,
            cfp_type: self.cfp_type,
            trace_id: self.trace_id,
            ghg_emission: self.ghg_emission,
            ghg_declared_unit: GhgDeclaredUnit::KgCo2ePerKilogram,
            dqr_type: DqrType::PreProcessing,
            te_r: Some(1.0),
            ge_r: None,
            ti_r: None,
            certificates: self.certificates,
            created_at: ts("2026-01-10 09:00:00"),
            created_user_id: "tester".to_string(),
            updated_at: self.updated_at,
            updated_user_id: "tester".to_string(),
            deleted_at: None,
        }
    }
}

// ==========================================
// Trade / RequestStatus 构建器
// ==========================================

pub struct TradeBuilder {
    trade_id: Uuid,
    downstream_operator_id: Uuid,
    upstream_operator_id: Option<Uuid>,
    downstream_trace_id: Uuid,
    upstream_trace_id: Option<Uuid>,
}

impl TradeBuilder {
    pub fn new(downstream_operator_id: Uuid) -> Self {
        Self {
            trade_id: Uuid::new_v4(),
            downstream_operator_id,
            upstream_operator_id: None,
            downstream_trace_id: Uuid::new_v4(),
            upstream_trace_id: None,
        }
    }

    pub fn upstream(mut self, operator_id: Uuid) -> Self {
        self.upstream_operator_id = Some(operator_id);
        self
    }

    pub fn downstream_trace(mut self, trace_id: Uuid) -> Self {
        self.downstream_trace_id = trace_id;
        self
    }

    pub fn upstream_trace(mut self, trace_id: Uuid) -> Self {
        self.upstream_trace_id = Some(trace_id);
        self
    }

    pub fn build(self) -> Trade {
        Trade {
            trade_id: self.trade_id,
            downstream_operator_id: self.downstream_operator_id,
            downstream_trace_id: self.downstream_trace_id,
            upstream_operator_id: self.upstream_operator_id,
            upstream_trace_id: self.upstream_trace_id,
            trade_date: None,
            created_at: ts("2026-01-10 09:00:00"),
            created_user_id: "tester".to_string(),
            updated_at: ts("2026-01-10 09:00:00"),
            updated_user_id: "tester".to_string(),
            deleted_at: None,
        }
    }
}

pub struct RequestStatusBuilder {
    status_id: Uuid,
    trade_id: Uuid,
    message: Option<String>,
    created_at: NaiveDateTime,
}

impl RequestStatusBuilder {
    pub fn new(trade_id: Uuid) -> Self {
        Self {
            status_id: Uuid::new_v4(),
            trade_id,
            message: None,
            created_at: ts("2026-01-10 09:00:00"),
        }
    }

    pub fn message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn created_at(mut self, at: &str) -> Self {
        self.created_at = ts(at);
        self
    }

    pub fn build(self) -> RequestStatus {
        RequestStatus {
            status_id: self.status_id,
            trade_id: self.trade_id,
            cfp_response_status: CfpResponseStatus::Pending,
            trade_tree_status: TradeTreeStatus::Unterminated,
            message: self.message,
            reply_message: None,
            request_type: RequestType::Cfp,
            response_due_date: None,
            completed_count: None,
            completed_count_modified_at: None,
            trades_count: None,
            trades_count_modified_at: None,
            created_at: self.created_at,
            created_user_id: "tester".to_string(),
            updated_at: self.created_at,
            updated_user_id: "tester".to_string(),
            deleted_at: None,
        }
    }
}
