// ==========================================
// 零部件供应链溯源系统 - SQL 构建工具模块
// ==========================================
// 职责: 提供动态 SQL 语句构建的公共函数
// 约束: 只拼接 SQL 结构, 取值一律走参数绑定
// ==========================================

/// SQL 查询构建器（流式 API）
///
/// # 功能
/// - 提供链式调用的 SQL 构建接口
/// - 支持动态添加条件、排序、限制
///
/// # 示例
/// ```
/// use cfp_traceability::repository::sql_builder::SqlQueryBuilder;
///
/// let sql = SqlQueryBuilder::new("SELECT * FROM parts")
///     .where_clause("operator_id = ?")
///     .and_if(Some("plant_id = ?"))
///     .order_by("parts_name ASC, support_parts_name ASC")
///     .limit(100)
///     .build();
///
/// assert!(sql.contains("WHERE operator_id = ?"));
/// assert!(sql.contains("AND plant_id = ?"));
/// assert!(sql.contains("ORDER BY parts_name ASC, support_parts_name ASC"));
/// assert!(sql.contains("LIMIT 100"));
/// ```
#[derive(Debug, Clone)]
pub struct SqlQueryBuilder {
    select_clause: String,
    where_clauses: Vec<String>,
    order_by_clause: Option<String>,
    limit_clause: Option<usize>,
}

impl SqlQueryBuilder {
    /// 创建新的 SQL 查询构建器
    pub fn new(select: &str) -> Self {
        Self {
            select_clause: select.to_string(),
            where_clauses: Vec::new(),
            order_by_clause: None,
            limit_clause: None,
        }
    }

    /// 添加 WHERE 条件
    pub fn where_clause(mut self, condition: &str) -> Self {
        self.where_clauses.push(condition.to_string());
        self
    }

    /// 条件添加 AND 子句
    pub fn and_if(mut self, condition: Option<&str>) -> Self {
        if let Some(cond) = condition {
            self.where_clauses.push(cond.to_string());
        }
        self
    }

    /// 添加 ORDER BY 子句
    pub fn order_by(mut self, order: &str) -> Self {
        self.order_by_clause = Some(order.to_string());
        self
    }

    /// 添加 LIMIT 子句
    pub fn limit(mut self, n: usize) -> Self {
        self.limit_clause = Some(n);
        self
    }

    /// 条件添加 LIMIT 子句
    pub fn limit_if(mut self, n: Option<usize>) -> Self {
        self.limit_clause = n;
        self
    }

    /// 构建最终的 SQL 语句
    pub fn build(&self) -> String {
        let mut sql = self.select_clause.clone();

        // 添加 WHERE 条件
        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }

        // 添加 ORDER BY
        if let Some(order) = &self.order_by_clause {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        // 添加 LIMIT
        if let Some(limit) = self.limit_clause {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }
}

/// 构建 upsert 语句（INSERT ... ON CONFLICT ... DO UPDATE）
///
/// # 参数
/// - `table`: 表名
/// - `columns`: 全部插入列（按绑定顺序）
/// - `conflict_columns`: 冲突判定列（主键/唯一键）
/// - `update_columns`: 冲突时需要更新的列（excluded.<col> 取新值）
///
/// # 示例
/// ```
/// use cfp_traceability::repository::sql_builder::build_upsert_sql;
///
/// let sql = build_upsert_sql(
///     "parts_structures",
///     &["trace_id", "parent_trace_id", "created_at", "updated_at"],
///     &["trace_id", "parent_trace_id"],
///     &["updated_at"],
/// );
///
/// assert_eq!(
///     sql,
///     "INSERT INTO parts_structures (trace_id, parent_trace_id, created_at, updated_at) \
///      VALUES (?, ?, ?, ?) \
///      ON CONFLICT(trace_id, parent_trace_id) DO UPDATE SET updated_at = excluded.updated_at"
/// );
/// ```
pub fn build_upsert_sql(
    table: &str,
    columns: &[&str],
    conflict_columns: &[&str],
    update_columns: &[&str],
) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    let assignments = update_columns
        .iter()
        .map(|c| format!("{} = excluded.{}", c, c))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO UPDATE SET {}",
        table,
        columns.join(", "),
        placeholders,
        conflict_columns.join(", "),
        assignments
    )
}

/// 构建 IN (?, ?, ...) 占位符列表
///
/// # 示例
/// ```
/// use cfp_traceability::repository::sql_builder::build_in_placeholders;
///
/// assert_eq!(build_in_placeholders(3), "?, ?, ?");
/// ```
pub fn build_in_placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

// ==========================================
// 单元测试
// ==========================================
