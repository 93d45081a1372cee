// ==========================================
// 考场座位分配系统 - 考生名单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 名单整体替换（事务内 DELETE + INSERT），按导入顺序读取
// ==========================================

use crate::db;
use crate::domain::candidate::Candidate;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

const SELECT_COLUMNS: &str =
    "code, last_name, first_name, region, province, language, exam_center, extra_json";

// ==========================================
// CandidateRepository - 考生仓储
// ==========================================
pub struct CandidateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CandidateRepository {
    /// 打开数据库并确保表结构存在
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = db::open_and_init(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 整体替换考生名单
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    /// - Err(DuplicateKey): 名单内存在重复编号（事务回滚，原名单保留）
    #[instrument(skip_all, fields(count = candidates.len()))]
    pub fn replace_all(&self, candidates: &[Candidate]) -> RepositoryResult<usize> {
        let mut seen = HashSet::new();
        if let Some(dup) = candidates.iter().find(|c| !seen.insert(c.code.as_str())) {
            return Err(RepositoryError::DuplicateKey(format!(
                "考生编号重复: {}",
                dup.code
            )));
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute("DELETE FROM candidates", [])?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO candidates (
                    code, last_name, first_name, region, province,
                    language, exam_center, extra_json
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for c in candidates {
                let extra_json = serde_json::to_string(&c.extra)?;
                stmt.execute(params![
                    c.code,
                    c.last_name,
                    c.first_name,
                    c.region,
                    c.province,
                    c.language,
                    c.exam_center,
                    extra_json,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        debug!(count = candidates.len(), "考生名单已替换");
        Ok(candidates.len())
    }

    /// 全部考生（导入顺序）
    pub fn find_all(&self) -> RepositoryResult<Vec<Candidate>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM candidates ORDER BY seq", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_candidate_row)?;
        collect_candidates(rows)
    }

    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Candidate>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM candidates WHERE code = ?1", SELECT_COLUMNS);
        let raw = conn
            .query_row(&sql, params![code], map_candidate_row)
            .optional()?;
        raw.map(RawCandidate::into_candidate).transpose()
    }

    /// 按考试中心标签精确查询（标签为原始自由文本）
    pub fn find_by_exam_center(&self, label: &str) -> RepositoryResult<Vec<Candidate>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM candidates WHERE exam_center = ?1 ORDER BY seq",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![label], map_candidate_row)?;
        collect_candidates(rows)
    }

    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM candidates", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

// ==========================================
// 行映射
// ==========================================

struct RawCandidate {
    candidate: Candidate,
    extra_json: String,
}

impl RawCandidate {
    fn into_candidate(self) -> RepositoryResult<Candidate> {
        let mut candidate = self.candidate;
        candidate.extra = serde_json::from_str::<BTreeMap<String, String>>(&self.extra_json)?;
        Ok(candidate)
    }
}

fn map_candidate_row(row: &Row<'_>) -> rusqlite::Result<RawCandidate> {
    Ok(RawCandidate {
        candidate: Candidate {
            code: row.get(0)?,
            last_name: row.get(1)?,
            first_name: row.get(2)?,
            region: row.get(3)?,
            province: row.get(4)?,
            language: row.get(5)?,
            exam_center: row.get(6)?,
            extra: BTreeMap::new(),
        },
        extra_json: row.get(7)?,
    })
}

fn collect_candidates<I>(rows: I) -> RepositoryResult<Vec<Candidate>>
where
    I: Iterator<Item = rusqlite::Result<RawCandidate>>,
{
    let mut candidates = Vec::new();
    for raw in rows {
        candidates.push(raw?.into_candidate()?);
    }
    Ok(candidates)
}
