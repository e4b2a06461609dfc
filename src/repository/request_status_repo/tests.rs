use super::RequestStatusRepository;
use crate::domain::trade::TradeRequest;
use crate::domain::types::{CfpResponseStatus, StatusTarget, TradeTreeStatus};
use crate::repository::datastore::Datastore;
use crate::repository::error::RepositoryError;
use crate::repository::test_support::{make_status, make_trade};
use crate::repository::trade_repo::TradeRepository;
use rusqlite::params;
use uuid::Uuid;

fn setup() -> (Datastore, RequestStatusRepository, TradeRepository) {
    let store = Datastore::open_in_memory().unwrap();
    let status_repo = RequestStatusRepository::new(store.clone());
    let trade_repo = TradeRepository::new(store.clone());
    (store, status_repo, trade_repo)
}

/// 落库一个 (取引, 依赖状态) 对
fn put_pair(
    trade_repo: &TradeRepository,
    downstream_operator_id: Uuid,
    upstream_operator_id: Option<Uuid>,
    status_created_at: &str,
) -> TradeRequest {
    let trade = make_trade(downstream_operator_id, upstream_operator_id);
    let status = make_status(trade.trade_id, status_created_at);
    trade_repo
        .put_request(&TradeRequest { trade, status })
        .unwrap()
}

/// 读取底层行的 deleted_at（表名, 主键列, 主键值）
fn read_deleted_at(store: &Datastore, table: &str, key_column: &str, key: &Uuid) -> Option<String> {
    let conn = store.connection();
    let guard = conn.lock().unwrap();
    guard
        .query_row(
            &format!(
                "SELECT deleted_at FROM {} WHERE {} = ?1",
                table, key_column
            ),
            params![key.to_string()],
            |row| row.get(0),
        )
        .unwrap()
}

// ==========================================
// 检索
// ==========================================

#[test]
fn test_find_by_trade_id() {
    let (_store, status_repo, trade_repo) = setup();
    let pair = put_pair(&trade_repo, Uuid::new_v4(), None, "2026-01-10 09:00:00");

    let status = status_repo.find_by_trade_id(&pair.trade.trade_id).unwrap();
    assert_eq!(status.status_id, pair.status.status_id);
    assert_eq!(status.cfp_response_status, CfpResponseStatus::Pending);
}

#[test]
fn test_find_by_trade_id_not_found() {
    let (_store, status_repo, _trade_repo) = setup();

    let err = status_repo.find_by_trade_id(&Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
    assert_eq!(err.to_string(), "record not found");
}

#[test]
fn test_find_status_request_target() {
    let (_store, status_repo, trade_repo) = setup();
    let downstream = Uuid::new_v4();

    let a = put_pair(&trade_repo, downstream, None, "2026-01-10 09:00:00");
    let b = put_pair(&trade_repo, downstream, None, "2026-01-11 09:00:00");
    let _other = put_pair(&trade_repo, Uuid::new_v4(), None, "2026-01-12 09:00:00");

    // 下游视角: created_at 降序
    let statuses = status_repo
        .find_status(&downstream, None, None, None, StatusTarget::Request)
        .unwrap();
    let ids: Vec<Uuid> = statuses.iter().map(|s| s.status_id).collect();
    assert_eq!(ids, vec![b.status.status_id, a.status.status_id]);

    // trace_id 过滤
    let statuses = status_repo
        .find_status(
            &downstream,
            None,
            None,
            Some(&a.trade.downstream_trace_id),
            StatusTarget::Request,
        )
        .unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].status_id, a.status.status_id);
}

#[test]
fn test_find_status_response_target() {
    let (_store, status_repo, trade_repo) = setup();
    let upstream = Uuid::new_v4();

    let a = put_pair(&trade_repo, Uuid::new_v4(), Some(upstream), "2026-01-10 09:00:00");
    let b = put_pair(&trade_repo, Uuid::new_v4(), Some(upstream), "2026-01-11 09:00:00");

    let statuses = status_repo
        .find_status(&upstream, None, None, None, StatusTarget::Response)
        .unwrap();
    assert_eq!(statuses.len(), 2);

    // status_id 过滤
    let statuses = status_repo
        .find_status(
            &upstream,
            None,
            Some(&a.status.status_id),
            None,
            StatusTarget::Response,
        )
        .unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].status_id, a.status.status_id);

    // 下游视角看不到 RESPONSE 对象
    let statuses = status_repo
        .find_status(
            &b.trade.downstream_operator_id,
            None,
            None,
            None,
            StatusTarget::Response,
        )
        .unwrap();
    assert!(statuses.is_empty());
}

#[test]
fn test_find_status_any_target_covers_both_sides() {
    let (_store, status_repo, trade_repo) = setup();
    let operator = Uuid::new_v4();

    let as_down = put_pair(&trade_repo, operator, None, "2026-01-10 09:00:00");
    let as_up = put_pair(&trade_repo, Uuid::new_v4(), Some(operator), "2026-01-11 09:00:00");
    let _other = put_pair(&trade_repo, Uuid::new_v4(), None, "2026-01-12 09:00:00");

    let statuses = status_repo
        .find_status(&operator, None, None, None, StatusTarget::Any)
        .unwrap();
    let ids: Vec<Uuid> = statuses.iter().map(|s| s.status_id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&as_down.status.status_id));
    assert!(ids.contains(&as_up.status.status_id));
}

#[test]
fn test_find_status_limit() {
    let (_store, status_repo, trade_repo) = setup();
    let downstream = Uuid::new_v4();

    for day in 10..15 {
        put_pair(
            &trade_repo,
            downstream,
            None,
            &format!("2026-01-{:02} 09:00:00", day),
        );
    }

    let statuses = status_repo
        .find_status(&downstream, Some(3), None, None, StatusTarget::Request)
        .unwrap();
    assert_eq!(statuses.len(), 3);
}

#[test]
fn test_count_status_matches_predicate() {
    let (_store, status_repo, trade_repo) = setup();
    let operator = Uuid::new_v4();

    put_pair(&trade_repo, operator, None, "2026-01-10 09:00:00");
    put_pair(&trade_repo, operator, None, "2026-01-11 09:00:00");
    put_pair(&trade_repo, Uuid::new_v4(), Some(operator), "2026-01-12 09:00:00");

    assert_eq!(
        status_repo
            .count_status(&operator, None, None, StatusTarget::Request)
            .unwrap(),
        2
    );
    assert_eq!(
        status_repo
            .count_status(&operator, None, None, StatusTarget::Response)
            .unwrap(),
        1
    );
    assert_eq!(
        status_repo
            .count_status(&operator, None, None, StatusTarget::Any)
            .unwrap(),
        3
    );
}

// ==========================================
// 取消 (下游)
// ==========================================

#[test]
fn test_put_status_cancel_soft_deletes_pair() {
    let (store, status_repo, trade_repo) = setup();
    let downstream = Uuid::new_v4();
    let pair = put_pair(&trade_repo, downstream, None, "2026-01-10 09:00:00");

    status_repo
        .put_status_cancel(&pair.status.status_id, &downstream)
        .unwrap();

    // 两行均被软删除（物理仍存在）
    assert!(read_deleted_at(&store, "request_status", "status_id", &pair.status.status_id).is_some());
    assert!(read_deleted_at(&store, "trades", "trade_id", &pair.trade.trade_id).is_some());

    // 读取不可见
    let err = status_repo
        .find_by_trade_id(&pair.trade.trade_id)
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
    let err = trade_repo.find_by_trade_id(&pair.trade.trade_id).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_put_status_cancel_by_wrong_operator_is_not_found() {
    let (store, status_repo, trade_repo) = setup();
    let downstream = Uuid::new_v4();
    let upstream = Uuid::new_v4();
    let pair = put_pair(&trade_repo, downstream, Some(upstream), "2026-01-10 09:00:00");

    // 上游事业者不得取消; 错误与"不存在"不可区分
    let err = status_repo
        .put_status_cancel(&pair.status.status_id, &upstream)
        .unwrap_err();
    assert_eq!(err.to_string(), "record not found");

    // 两行均未被改动
    assert!(read_deleted_at(&store, "request_status", "status_id", &pair.status.status_id).is_none());
    assert!(read_deleted_at(&store, "trades", "trade_id", &pair.trade.trade_id).is_none());
}

#[test]
fn test_put_status_cancel_unknown_status_is_not_found() {
    let (_store, status_repo, _trade_repo) = setup();

    let err = status_repo
        .put_status_cancel(&Uuid::new_v4(), &Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

// ==========================================
// 拒绝 (上游)
// ==========================================

#[test]
fn test_put_status_reject_clears_upstream_binding() {
    let (store, status_repo, trade_repo) = setup();
    let downstream = Uuid::new_v4();
    let upstream = Uuid::new_v4();

    let mut pair = put_pair(&trade_repo, downstream, Some(upstream), "2026-01-10 09:00:00");
    pair.trade.upstream_trace_id = Some(Uuid::new_v4());
    trade_repo.put_request(&pair).unwrap();

    let rejected = status_repo
        .put_status_reject(&pair.status.status_id, Some("please revise"), &upstream)
        .unwrap();

    // 重读的状态: rejected / unterminated / 回复已写入
    assert_eq!(rejected.cfp_response_status, CfpResponseStatus::Rejected);
    assert_eq!(rejected.trade_tree_status, TradeTreeStatus::Unterminated);
    assert_eq!(rejected.reply_message.as_deref(), Some("please revise"));

    // 取引的上游侧绑定清空
    let trade = trade_repo.find_by_trade_id(&pair.trade.trade_id).unwrap();
    assert_eq!(trade.upstream_operator_id, None);
    assert_eq!(trade.upstream_trace_id, None);

    // 行未被软删除
    assert!(read_deleted_at(&store, "request_status", "status_id", &pair.status.status_id).is_none());
}

#[test]
fn test_put_status_reject_by_wrong_operator_is_not_found() {
    let (_store, status_repo, trade_repo) = setup();
    let downstream = Uuid::new_v4();
    let upstream = Uuid::new_v4();
    let pair = put_pair(&trade_repo, downstream, Some(upstream), "2026-01-10 09:00:00");

    // 下游事业者不得拒绝
    let err = status_repo
        .put_status_reject(&pair.status.status_id, None, &downstream)
        .unwrap_err();
    assert_eq!(err.to_string(), "record not found");

    // 取引保持原样
    let trade = trade_repo.find_by_trade_id(&pair.trade.trade_id).unwrap();
    assert_eq!(trade.upstream_operator_id, Some(upstream));
}

#[test]
fn test_put_status_reject_without_upstream_is_not_found() {
    let (_store, status_repo, trade_repo) = setup();
    let pair = put_pair(&trade_repo, Uuid::new_v4(), None, "2026-01-10 09:00:00");

    // 尚未受理的取引没有上游, 任何操作者的拒绝都不命中
    let err = status_repo
        .put_status_reject(&pair.status.status_id, None, &Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

// ==========================================
// 物理删除
// ==========================================

#[test]
fn test_delete_by_trade_id_is_physical() {
    let (store, status_repo, trade_repo) = setup();
    let pair = put_pair(&trade_repo, Uuid::new_v4(), None, "2026-01-10 09:00:00");

    let rows = status_repo.delete_by_trade_id(&pair.trade.trade_id).unwrap();
    assert_eq!(rows, 1);

    let conn = store.connection();
    let guard = conn.lock().unwrap();
    let count: i64 = guard
        .query_row(
            "SELECT COUNT(*) FROM request_status WHERE trade_id = ?1",
            params![pair.trade.trade_id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 0);
}
