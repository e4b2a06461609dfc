// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 跨仓储验证软删除可见性、结构往返、证书替换与排序保证
// ==========================================

mod helpers;

use cfp_traceability::domain::types::{CfpType, StatusTarget};
use cfp_traceability::domain::{PartsFilter, TradeRequest};
use cfp_traceability::logging;
use cfp_traceability::repository::{
    CfpRepository, Datastore, PartsRepository, PartsStructureRepository, RequestStatusRepository,
    TradeRepository,
};
use helpers::test_data_builder::{CfpBuilder, PartBuilder, RequestStatusBuilder, TradeBuilder};
use rusqlite::params;
use uuid::Uuid;

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_structure_round_trip_with_generated_uuids() {
    logging::init_test();
    let store = test_helpers::create_test_datastore();
    let structure_repo = PartsStructureRepository::new(store.clone());
    let parts_repo = PartsRepository::new(store.clone());

    let operator = Uuid::new_v4();
    let plant = Uuid::new_v4();

    // 父件与子件的 trace_id 均为 nil, 由 put_structure 生成
    let parent = PartBuilder::new("B01").operator(operator).plant(plant).build();
    let children = vec![PartBuilder::new("B01-1")
        .operator(operator)
        .plant(plant)
        .support_parts_name("sub-assy")
        .build()];

    let stored = structure_repo.put_structure(&parent, &children).unwrap();
    assert!(!stored.parent.trace_id.is_nil());
    assert!(!stored.children[0].trace_id.is_nil());

    // 两条 parts 行
    assert_eq!(parts_repo.count_by_operator_id(&operator).unwrap(), 2);

    // 两条构成边: 父件根边 (parent → nil) 与子边 (child → parent)
    let root_edge = structure_repo
        .find_edge_by_trace_id(&stored.parent.trace_id)
        .unwrap();
    assert_eq!(root_edge.parent_trace_id, Uuid::nil());

    let child_edge = structure_repo
        .find_edge_by_trace_id(&stored.children[0].trace_id)
        .unwrap();
    assert_eq!(child_edge.parent_trace_id, stored.parent.trace_id);

    // 结构往返: 读回的父件与子件集合与输入一致
    let structure = structure_repo
        .find_structure(&stored.parent.trace_id, &operator)
        .unwrap();
    assert_eq!(structure.parent.trace_id, stored.parent.trace_id);
    assert_eq!(structure.parent.parts_name, "B01");
    assert_eq!(structure.children.len(), 1);
    assert_eq!(structure.children[0].parts_name, "B01-1");

    // 根零件过滤: parent_flag=true 只返回 B01
    let roots = parts_repo
        .find_by_filter(&PartsFilter {
            operator_id: operator,
            parent_flag: Some(true),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].trace_id, stored.parent.trace_id);
}

#[test]
fn test_empty_cfp_batch_rejected_with_exact_message() {
    let store = test_helpers::create_test_datastore();
    let cfp_repo = CfpRepository::new(store.clone());

    let err = cfp_repo.batch_create(&[]).unwrap_err();
    assert_eq!(err.to_string(), "cfp entities is empty");

    // 无任何行写入
    let conn = store.connection();
    let guard = conn.lock().unwrap();
    let count: i64 = guard
        .query_row("SELECT COUNT(*) FROM cfp_infomation", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn test_certificate_replacement_leaves_exactly_input_rows() {
    let store = test_helpers::create_test_datastore();
    let cfp_repo = CfpRepository::new(store.clone());

    let mut cfp = CfpBuilder::new(CfpType::PreProduction)
        .certificates(&["u1", "u2"])
        .build();
    cfp_repo.batch_create(&[cfp.clone()]).unwrap();
    cfp_repo.put(&cfp).unwrap();

    cfp.certificates = vec!["v1".to_string(), "v2".to_string(), "v3".to_string()];
    cfp_repo.put(&cfp).unwrap();

    let stored = cfp_repo.find_by_key(&cfp.cfp_id, CfpType::PreProduction).unwrap();
    assert_eq!(stored.certificates, vec!["v1", "v2", "v3"]);

    // 旧 URL 无残留, 新行恰好 N 条且编号 1..N
    let conn = store.connection();
    let guard = conn.lock().unwrap();
    let remaining_old: i64 = guard
        .query_row(
            "SELECT COUNT(*) FROM cfp_certificates WHERE url IN ('u1', 'u2')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(remaining_old, 0);

    let indices: Vec<i64> = guard
        .prepare("SELECT cert_index FROM cfp_certificates WHERE cfp_id = ?1 ORDER BY cert_index")
        .unwrap()
        .query_map(params![cfp.cfp_id.to_string()], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[test]
fn test_cfp_listing_ordered_by_updated_at_desc() {
    let store = test_helpers::create_test_datastore();
    let cfp_repo = CfpRepository::new(store);

    let trace = Uuid::new_v4();
    let older = CfpBuilder::new(CfpType::PreProduction)
        .trace(trace)
        .updated_at("2026-01-10 09:00:00")
        .build();
    let middle = CfpBuilder::new(CfpType::MainProduction)
        .trace(trace)
        .updated_at("2026-01-11 09:00:00")
        .build();
    let newest = CfpBuilder::new(CfpType::PreComponent)
        .trace(trace)
        .updated_at("2026-01-12 09:00:00")
        .build();

    cfp_repo
        .batch_create(&[older.clone(), newest.clone(), middle.clone()])
        .unwrap();

    // updated_at 非递增
    let cfps = cfp_repo.list_by_trace_id(&trace).unwrap();
    let ids: Vec<Uuid> = cfps.iter().map(|c| c.cfp_id).collect();
    assert_eq!(ids, vec![newest.cfp_id, middle.cfp_id, older.cfp_id]);
}

#[test]
fn test_soft_deleted_rows_hidden_from_all_reads() {
    let store = test_helpers::create_test_datastore();
    let trade_repo = TradeRepository::new(store.clone());
    let status_repo = RequestStatusRepository::new(store.clone());

    let downstream = Uuid::new_v4();
    let trade = TradeBuilder::new(downstream).build();
    let status = RequestStatusBuilder::new(trade.trade_id).build();
    let pair = trade_repo
        .put_request(&TradeRequest { trade, status })
        .unwrap();

    // 取消 → 两行软删除
    status_repo
        .put_status_cancel(&pair.status.status_id, &downstream)
        .unwrap();

    // 所有读取路径都不可见
    assert!(trade_repo.find_by_trade_id(&pair.trade.trade_id).is_err());
    assert!(trade_repo.find_requests(&downstream, None, &[]).unwrap().is_empty());
    assert!(trade_repo.list_by_operator_id(&downstream).unwrap().is_empty());
    assert_eq!(trade_repo.count_requests(&downstream).unwrap(), 0);
    assert!(status_repo.find_by_trade_id(&pair.trade.trade_id).is_err());
    assert!(status_repo
        .find_status(&downstream, None, None, None, StatusTarget::Any)
        .unwrap()
        .is_empty());
    assert_eq!(
        status_repo
            .count_status(&downstream, None, None, StatusTarget::Any)
            .unwrap(),
        0
    );

    // 物理行仍然存在
    let conn = store.connection();
    let guard = conn.lock().unwrap();
    let physical: i64 = guard
        .query_row(
            "SELECT COUNT(*) FROM trades WHERE trade_id = ?1",
            params![pair.trade.trade_id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(physical, 1);
}

#[test]
fn test_trade_status_pairing_and_physical_delete() {
    let store = test_helpers::create_test_datastore();
    let trade_repo = TradeRepository::new(store.clone());
    let status_repo = RequestStatusRepository::new(store.clone());

    let downstream = Uuid::new_v4();
    let trade = TradeBuilder::new(downstream).build();
    let status = RequestStatusBuilder::new(trade.trade_id).build();
    let pair = trade_repo
        .put_request(&TradeRequest { trade, status })
        .unwrap();

    // 成对读取
    let stored_trade = trade_repo.find_by_trade_id(&pair.trade.trade_id).unwrap();
    let stored_status = status_repo.find_by_trade_id(&pair.trade.trade_id).unwrap();
    assert_eq!(stored_status.trade_id, stored_trade.trade_id);
    assert_eq!(stored_status.status_id, pair.status.status_id);

    // 两个仓储各自物理删除后, 均不再返回行
    status_repo.delete_by_trade_id(&pair.trade.trade_id).unwrap();
    trade_repo.delete_by_trade_id(&pair.trade.trade_id).unwrap();

    assert!(trade_repo.find_by_trade_id(&pair.trade.trade_id).is_err());
    assert!(status_repo.find_by_trade_id(&pair.trade.trade_id).is_err());
}

#[test]
fn test_file_backed_database_round_trip() {
    // 文件数据库与内存数据库走同一份 DDL
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();

    let store = Datastore::open(&db_path).unwrap();
    let structure_repo = PartsStructureRepository::new(store.clone());
    let parts_repo = PartsRepository::new(store);

    let operator = Uuid::new_v4();
    let parent = PartBuilder::new("B01").operator(operator).build();
    let stored = structure_repo.put_structure(&parent, &[]).unwrap();

    let found = parts_repo.find_by_trace_id(&stored.parent.trace_id).unwrap();
    assert_eq!(found.parts_name, "B01");
}
