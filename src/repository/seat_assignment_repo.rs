// ==========================================
// 考场座位分配系统 - 分配结果仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 只保留"最近一次分配"；保存时在同一事务内先清空再写入，
//       失败则回滚，旧结果保持不变
// ==========================================

use crate::db;
use crate::domain::assignment::{AllocationRun, RoomOccupancy, SeatAssignment};
use crate::domain::types::{AllocationMode, RoomType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

// ==========================================
// SeatAssignmentRepository - 分配结果仓储
// ==========================================
pub struct SeatAssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SeatAssignmentRepository {
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

    /// 保存分配结果（整体替换上一次结果）
    #[instrument(skip_all, fields(run_id = %run.run_id, assignments = run.assignments.len()))]
    pub fn save_run(&self, run: &AllocationRun) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 子表由外键级联清除
        tx.execute("DELETE FROM allocation_run", [])?;

        tx.execute(
            "INSERT INTO allocation_run (run_id, mode, seed, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                run.run_id,
                run.mode.as_str(),
                run.seed.map(|s| s as i64),
                run.created_at.to_rfc3339(),
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO seat_assignment (
                    run_id, code, last_name, first_name, region, province,
                    center, room, seat_number, room_type, language
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )?;
            for a in &run.assignments {
                stmt.execute(params![
                    run.run_id,
                    a.code,
                    a.last_name,
                    a.first_name,
                    a.region,
                    a.province,
                    a.center,
                    a.room,
                    a.seat_number,
                    a.room_type.as_str(),
                    a.language,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO room_occupancy (run_id, center, room, room_type, capacity, occupied)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for o in &run.occupancy {
                stmt.execute(params![
                    run.run_id,
                    o.center,
                    o.room,
                    o.room_type.as_str(),
                    o.capacity,
                    o.occupied,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        info!(run_id = %run.run_id, mode = %run.mode, "分配结果已保存");
        Ok(())
    }

    /// 读取最近一次分配结果（从未成功分配时返回 None）
    pub fn load_last(&self) -> RepositoryResult<Option<AllocationRun>> {
        let conn = self.get_conn()?;

        let header: Option<(String, String, Option<i64>, String)> = conn
            .query_row(
                "SELECT run_id, mode, seed, created_at FROM allocation_run LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((run_id, mode, seed, created_at)) = header else {
            return Ok(None);
        };

        let mode = parse_field::<AllocationMode>("mode", &mode)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::FieldValueError {
                field: "created_at".to_string(),
                message: e.to_string(),
            })?;

        let raw_assignments: Vec<(SeatAssignment, String)> = {
            let mut stmt = conn.prepare(
                r#"
                SELECT code, last_name, first_name, region, province,
                       center, room, seat_number, room_type, language
                FROM seat_assignment
                WHERE run_id = ?1
                ORDER BY id
                "#,
            )?;
            let rows = stmt.query_map(params![run_id], |row| {
                Ok((
                    SeatAssignment {
                        code: row.get(0)?,
                        last_name: row.get(1)?,
                        first_name: row.get(2)?,
                        region: row.get(3)?,
                        province: row.get(4)?,
                        center: row.get(5)?,
                        room: row.get(6)?,
                        seat_number: row.get(7)?,
                        room_type: RoomType::Grande,
                        language: row.get(9)?,
                    },
                    row.get::<_, String>(8)?,
                ))
            })?;
            rows.collect::<Result<_, _>>()?
        };

        let mut assignments = Vec::with_capacity(raw_assignments.len());
        for (mut assignment, room_type) in raw_assignments {
            assignment.room_type = parse_field("room_type", &room_type)?;
            assignments.push(assignment);
        }

        let raw_occupancy: Vec<(String, String, String, u32, u32)> = {
            let mut stmt = conn.prepare(
                r#"
                SELECT center, room, room_type, capacity, occupied
                FROM room_occupancy
                WHERE run_id = ?1
                ORDER BY id
                "#,
            )?;
            let rows = stmt.query_map(params![run_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?;
            rows.collect::<Result<_, _>>()?
        };

        let mut occupancy = Vec::with_capacity(raw_occupancy.len());
        for (center, room, room_type, capacity, occupied) in raw_occupancy {
            occupancy.push(RoomOccupancy {
                center,
                room,
                room_type: parse_field("room_type", &room_type)?,
                capacity,
                occupied,
            });
        }

        Ok(Some(AllocationRun {
            run_id,
            mode,
            seed: seed.map(|s| s as u64),
            created_at,
            assignments,
            occupancy,
        }))
    }

    /// 最近一次分配使用的模式
    pub fn last_policy(&self) -> RepositoryResult<Option<AllocationMode>> {
        let conn = self.get_conn()?;
        let mode: Option<String> = conn
            .query_row("SELECT mode FROM allocation_run LIMIT 1", [], |row| row.get(0))
            .optional()?;
        mode.map(|m| parse_field("mode", &m)).transpose()
    }

    /// 清空分配结果
    pub fn clear(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM allocation_run", [])?;
        Ok(())
    }
}

fn parse_field<T>(field: &str, value: &str) -> RepositoryResult<T>
where
    T: FromStr<Err = String>,
{
    value
        .parse::<T>()
        .map_err(|message| RepositoryError::FieldValueError {
            field: field.to_string(),
            message,
        })
}
