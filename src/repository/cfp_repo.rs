// ==========================================
// 零部件供应链溯源系统 - CFP 数据仓储
// ==========================================
// 职责: cfp_infomation 主表与 cfp_certificates 子表的访问
// 不变式: put 时证书集合整体替换（旧行物理删除, 新行按输入顺序编号 1..N）
// ==========================================

use crate::domain::cfp::{Cfp, CfpCertification};
use crate::domain::types::{parse_cfp_type, parse_dqr_type, parse_ghg_declared_unit, CfpType};
use crate::repository::datastore::{
    format_datetime, parse_datetime_text, parse_opt_datetime_text, parse_uuid_text, Datastore,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use uuid::Uuid;

/// cfp_infomation 表的 SELECT 列清单（与 map_cfp_row 的列序一致）
const CFP_COLUMNS: &str = "cfp_id, cfp_type, trace_id, ghg_emission, ghg_declared_unit, \
     dqr_type, te_r, ge_r, ti_r, \
     created_at, created_user_id, updated_at, updated_user_id, deleted_at";

// ==========================================
// CfpRepository - CFP 仓储
// ==========================================
pub struct CfpRepository {
    store: Datastore,
}

impl CfpRepository {
    /// 创建新的 CFP 仓储
    pub fn new(store: Datastore) -> Self {
        Self { store }
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 批量创建 CFP 行
    ///
    /// # 参数
    /// - `cfps`: CFP 实体列表（空列表为错误）
    ///
    /// # 返回
    /// - `Ok(Vec<Cfp>)`: 落库的实体
    /// - `Err(EmptyInput)`: 输入为空, 文案 "cfp entities is empty"
    ///
    /// # 说明
    /// - 沿用既有行为: 逐行插入且**不包事务**, 中途失败时已插入的行保留
    ///   （调用方按幂等重试处理）
    /// - 证书列表不在此处落库, 经由 put 整体替换
    pub fn batch_create(&self, cfps: &[Cfp]) -> RepositoryResult<Vec<Cfp>> {
        if cfps.is_empty() {
            return Err(RepositoryError::empty_input("cfp"));
        }

        let conn = self.store.get_conn()?;

        for cfp in cfps {
            conn.execute(
                r#"
                INSERT INTO cfp_infomation (
                    cfp_id, cfp_type, trace_id, ghg_emission, ghg_declared_unit,
                    dqr_type, te_r, ge_r, ti_r,
                    created_at, created_user_id, updated_at, updated_user_id
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    cfp.cfp_id.to_string(),
                    cfp.cfp_type.to_string(),
                    cfp.trace_id.to_string(),
                    cfp.ghg_emission,
                    cfp.ghg_declared_unit.to_string(),
                    cfp.dqr_type.to_string(),
                    cfp.te_r,
                    cfp.ge_r,
                    cfp.ti_r,
                    format_datetime(cfp.created_at),
                    cfp.created_user_id,
                    format_datetime(cfp.updated_at),
                    cfp.updated_user_id,
                ],
            )?;
        }

        Ok(cfps.to_vec())
    }

    /// 更新 CFP 行并整体替换证书集合（单事务）
    ///
    /// # 步骤
    /// 1. 按 (cfp_id, cfp_type) 更新 CFP 行
    /// 2. 物理删除该 cfp_id 的全部既有证书行
    /// 3. 按输入顺序插入证书行, cert_index 取 1..N
    ///
    /// # 返回
    /// - `Ok(Cfp)`: 提交后重新读取的实体
    /// - `Err`: 任一步失败, 全部回滚
    pub fn put(&self, cfp: &Cfp) -> RepositoryResult<Cfp> {
        self.store.in_transaction(|tx| {
            tx.execute(
                r#"
                UPDATE cfp_infomation
                SET trace_id = ?, ghg_emission = ?, ghg_declared_unit = ?,
                    dqr_type = ?, te_r = ?, ge_r = ?, ti_r = ?,
                    updated_at = ?, updated_user_id = ?
                WHERE cfp_id = ? AND cfp_type = ? AND deleted_at IS NULL
                "#,
                params![
                    cfp.trace_id.to_string(),
                    cfp.ghg_emission,
                    cfp.ghg_declared_unit.to_string(),
                    cfp.dqr_type.to_string(),
                    cfp.te_r,
                    cfp.ge_r,
                    cfp.ti_r,
                    format_datetime(cfp.updated_at),
                    cfp.updated_user_id,
                    cfp.cfp_id.to_string(),
                    cfp.cfp_type.to_string(),
                ],
            )?;

            Datastore::hard_delete_tx(
                tx,
                "cfp_certificates",
                "cfp_id = ?",
                vec![Value::from(cfp.cfp_id.to_string())],
            )?;

            for (i, url) in cfp.certificates.iter().enumerate() {
                tx.execute(
                    r#"
                    INSERT INTO cfp_certificates (
                        cfp_id, cert_index, url,
                        created_at, created_user_id, updated_at, updated_user_id
                    ) VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                    params![
                        cfp.cfp_id.to_string(),
                        (i + 1) as i64,
                        url,
                        format_datetime(cfp.updated_at),
                        cfp.updated_user_id,
                        format_datetime(cfp.updated_at),
                        cfp.updated_user_id,
                    ],
                )?;
            }

            Ok(())
        })?;

        self.find_by_key(&cfp.cfp_id, cfp.cfp_type)
    }

    /// 按 cfp_id 物理删除 CFP 行与其证书子行（单事务）
    pub fn delete_by_cfp_id(&self, cfp_id: &Uuid) -> RepositoryResult<usize> {
        self.store.in_transaction(|tx| {
            let rows = Datastore::hard_delete_tx(
                tx,
                "cfp_infomation",
                "cfp_id = ?",
                vec![Value::from(cfp_id.to_string())],
            )?;

            // 子行不得残留孤儿
            Datastore::hard_delete_tx(
                tx,
                "cfp_certificates",
                "cfp_id = ?",
                vec![Value::from(cfp_id.to_string())],
            )?;

            Ok(rows)
        })
    }

    // ==========================================
    // 读取操作
    // ==========================================

    /// 按复合主键查询单个 CFP（证书列表一并填充）
    ///
    /// # 返回
    /// - `Ok(Cfp)`: 找到 CFP
    /// - `Err(NotFound)`: 不存在或已软删除
    pub fn find_by_key(&self, cfp_id: &Uuid, cfp_type: CfpType) -> RepositoryResult<Cfp> {
        let conn = self.store.get_conn()?;

        let mut cfp = conn.query_row(
            &format!(
                "SELECT {} FROM cfp_infomation \
                 WHERE cfp_id = ?1 AND cfp_type = ?2 AND deleted_at IS NULL",
                CFP_COLUMNS
            ),
            params![cfp_id.to_string(), cfp_type.to_string()],
            map_cfp_row,
        )?;

        cfp.certificates = load_certificates(&conn, cfp_id)?;
        Ok(cfp)
    }

    /// 查询溯源标识对应的全部 CFP 行
    ///
    /// # 返回
    /// - `Ok(Vec<Cfp>)`: 按 updated_at 降序, 每行证书列表已填充
    pub fn list_by_trace_id(&self, trace_id: &Uuid) -> RepositoryResult<Vec<Cfp>> {
        let conn = self.store.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM cfp_infomation \
             WHERE trace_id = ?1 AND deleted_at IS NULL \
             ORDER BY updated_at DESC",
            CFP_COLUMNS
        ))?;

        let mut cfps = stmt
            .query_map(params![trace_id.to_string()], map_cfp_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for cfp in &mut cfps {
            cfp.certificates = load_certificates(&conn, &cfp.cfp_id)?;
        }

        Ok(cfps)
    }

    /// 查询溯源标识对应的第一个 CFP（类型不限）
    ///
    /// # 返回
    /// - `Ok(Cfp)`: 按 (cfp_id ASC, cfp_type ASC) 的第一行
    /// - `Err(NotFound)`: 不存在
    pub fn find_by_trace_id(&self, trace_id: &Uuid) -> RepositoryResult<Cfp> {
        let conn = self.store.get_conn()?;

        let mut cfp = conn.query_row(
            &format!(
                "SELECT {} FROM cfp_infomation \
                 WHERE trace_id = ?1 AND deleted_at IS NULL \
                 ORDER BY cfp_id ASC, cfp_type ASC LIMIT 1",
                CFP_COLUMNS
            ),
            params![trace_id.to_string()],
            map_cfp_row,
        )?;

        let cfp_id = cfp.cfp_id;
        cfp.certificates = load_certificates(&conn, &cfp_id)?;
        Ok(cfp)
    }

    /// 查询证明书信息
    ///
    /// 注意: 当前返回进程内固定数据, 尚未接入证明书存储表;
    /// 沿用既有部署的行为, 接入真实表前保持原样
    pub fn get_certifications(
        &self,
        operator_id: &Uuid,
        cfp_id: &Uuid,
    ) -> RepositoryResult<Vec<CfpCertification>> {
        let _ = operator_id;

        Ok(vec![CfpCertification {
            certification_id: Uuid::nil(),
            cfp_id: *cfp_id,
            trace_id: Uuid::nil(),
            link_url: "https://www.example.com/certification".to_string(),
            description: Some("sample certification".to_string()),
        }])
    }
}

// ==========================================
// 行映射与子表读取
// ==========================================

/// 读取证书 URL 列表（创建时间降序, 同时刻按 cert_index 升序兜底）
fn load_certificates(conn: &Connection, cfp_id: &Uuid) -> RepositoryResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT url FROM cfp_certificates \
         WHERE cfp_id = ?1 \
         ORDER BY created_at DESC, cert_index ASC",
    )?;

    let urls = stmt
        .query_map(params![cfp_id.to_string()], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(urls)
}

/// 映射数据库行到 Cfp（证书列表由调用方另行填充）
fn map_cfp_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Cfp> {
    Ok(Cfp {
        cfp_id: parse_uuid_text(&row.get::<_, String>(0)?),
        cfp_type: parse_cfp_type(&row.get::<_, String>(1)?),
        trace_id: parse_uuid_text(&row.get::<_, String>(2)?),
        ghg_emission: row.get(3)?,
        ghg_declared_unit: parse_ghg_declared_unit(&row.get::<_, String>(4)?),
        dqr_type: parse_dqr_type(&row.get::<_, String>(5)?),
        te_r: row.get(6)?,
        ge_r: row.get(7)?,
        ti_r: row.get(8)?,
        certificates: Vec::new(),
        created_at: parse_datetime_text(&row.get::<_, String>(9)?),
        created_user_id: row.get(10)?,
        updated_at: parse_datetime_text(&row.get::<_, String>(11)?),
        updated_user_id: row.get(12)?,
        deleted_at: parse_opt_datetime_text(row.get(13)?),
    })
}

// ==========================================
// 单元测试
// ==========================================
