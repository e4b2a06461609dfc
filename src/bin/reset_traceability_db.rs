// ==========================================
// 零部件供应链溯源系统 - 数据库重置与演示数据种子工具
// ==========================================
// 用法: reset-traceability-db [db_path]
// 行为: 备份既有数据库文件 → 重建 schema → 写入演示数据
// ==========================================

use chrono::Utc;
use rusqlite::params;
use std::error::Error;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use cfp_traceability::config::default_db_path;
use cfp_traceability::db::{init_schema, open_sqlite_connection, read_schema_version};
use cfp_traceability::domain::types::{CfpResponseStatus, RequestType, TradeTreeStatus};
use cfp_traceability::domain::{Part, RequestStatus, Trade, TradeRequest};
use cfp_traceability::repository::datastore::now;
use cfp_traceability::repository::{Datastore, PartsStructureRepository, TradeRepository};

const SEED_USER: &str = "seed";

fn main() -> Result<(), Box<dyn Error>> {
    cfp_traceability::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(default_db_path);

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    tracing::info!(
        "schema 已重建: {} (version={:?})",
        db_path,
        read_schema_version(&conn)?
    );

    let store = Datastore::open(&db_path)?;
    seed_demo_data(&store)?;
    print_quick_counts(&store)?;

    Ok(())
}

/// 备份既有数据库文件后删除（含 -wal / -shm 附属文件）
fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    if Path::new(db_path).exists() {
        let backup_path = format!("{}.{}.bak", db_path, Utc::now().format("%Y%m%d%H%M%S"));
        fs::copy(db_path, &backup_path)?;
        fs::remove_file(db_path)?;
        tracing::info!("既有数据库已备份: {}", backup_path);
    }

    for suffix in ["-wal", "-shm"] {
        let sidecar = format!("{}{}", db_path, suffix);
        if Path::new(&sidecar).exists() {
            fs::remove_file(&sidecar)?;
        }
    }

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    Ok(())
}

/// 写入演示数据: 两个事业者、一个零部件树、一个待回答的取引依赖
fn seed_demo_data(store: &Datastore) -> Result<(), Box<dyn Error>> {
    let downstream_operator = Uuid::new_v4();
    let upstream_operator = Uuid::new_v4();
    let plant = Uuid::new_v4();

    // 零部件树: B01 与其子件 B01-1 / B01-2
    let structure_repo = PartsStructureRepository::new(store.clone());
    let parent = make_seed_part(downstream_operator, plant, "B01", None);
    let children = vec![
        make_seed_part(downstream_operator, plant, "B01", Some("B01-1")),
        make_seed_part(downstream_operator, plant, "B01", Some("B01-2")),
    ];
    let structure = structure_repo.put_structure(&parent, &children)?;
    tracing::info!(
        "零部件树已写入: parent={} children={}",
        structure.parent.trace_id,
        structure.children.len()
    );

    // 待回答的取引依赖
    let trade_repo = TradeRepository::new(store.clone());
    let trade = Trade {
        trade_id: Uuid::new_v4(),
        downstream_operator_id: downstream_operator,
        downstream_trace_id: structure.children[0].trace_id,
        upstream_operator_id: Some(upstream_operator),
        upstream_trace_id: None,
        trade_date: Some(Utc::now().date_naive()),
        created_at: now(),
        created_user_id: SEED_USER.to_string(),
        updated_at: now(),
        updated_user_id: SEED_USER.to_string(),
        deleted_at: None,
    };
    let status = RequestStatus {
        status_id: Uuid::new_v4(),
        trade_id: trade.trade_id,
        cfp_response_status: CfpResponseStatus::Pending,
        trade_tree_status: TradeTreeStatus::Unterminated,
        message: Some("CFP の提供をお願いします".to_string()),
        reply_message: None,
        request_type: RequestType::Cfp,
        response_due_date: None,
        completed_count: None,
        completed_count_modified_at: None,
        trades_count: None,
        trades_count_modified_at: None,
        created_at: now(),
        created_user_id: SEED_USER.to_string(),
        updated_at: now(),
        updated_user_id: SEED_USER.to_string(),
        deleted_at: None,
    };
    let pair = trade_repo.put_request(&TradeRequest { trade, status })?;
    tracing::info!(
        "取引依赖已写入: trade_id={} status_id={}",
        pair.trade.trade_id,
        pair.status.status_id
    );

    Ok(())
}

fn make_seed_part(
    operator_id: Uuid,
    plant_id: Uuid,
    parts_name: &str,
    support_parts_name: Option<&str>,
) -> Part {
    Part {
        trace_id: Uuid::nil(), // put_structure 生成
        operator_id,
        plant_id,
        parts_name: parts_name.to_string(),
        support_parts_name: support_parts_name.map(|s| s.to_string()),
        terminated_flag: false,
        amount_required: Some(1.0),
        amount_required_unit: Some(cfp_traceability::AmountRequiredUnit::Kilogram),
        parts_label_name: None,
        parts_add_info1: None,
        parts_add_info2: None,
        parts_add_info3: None,
        created_at: now(),
        created_user_id: SEED_USER.to_string(),
        updated_at: now(),
        updated_user_id: SEED_USER.to_string(),
        deleted_at: None,
    }
}

/// 打印各表行数, 便于快速确认种子结果
fn print_quick_counts(store: &Datastore) -> Result<(), Box<dyn Error>> {
    let conn = store.connection();
    let guard = conn.lock().map_err(|e| e.to_string())?;

    for table in [
        "parts",
        "parts_structures",
        "cfp_infomation",
        "cfp_certificates",
        "trades",
        "request_status",
    ] {
        let count: i64 = guard.query_row(
            &format!("SELECT COUNT(*) FROM {}", table),
            params![],
            |row| row.get(0),
        )?;
        tracing::info!("{}: {} 行", table, count);
    }

    Ok(())
}
