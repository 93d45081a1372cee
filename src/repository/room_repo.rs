// ==========================================
// 考场座位分配系统 - 考场清单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: centers (中心) / rooms (考场, center_id 外键, ON DELETE CASCADE)
// 约束: 读取顺序 = 写入顺序（按自增 id），保证 Grande/Petite 内部顺序稳定
// ==========================================

use crate::db;
use crate::domain::room::{CapacityTotals, Room, RoomInventory};
use crate::domain::types::RoomType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

// ==========================================
// RoomRepository - 考场仓储
// ==========================================
pub struct RoomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RoomRepository {
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

    // ==========================================
    // 整体替换 / 读取
    // ==========================================

    /// 整体替换考场清单（含没有考场的已声明中心）
    #[instrument(skip_all, fields(centers = inventory.centers().len(), rooms = inventory.rooms().len()))]
    pub fn replace_inventory(&self, inventory: &RoomInventory) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute("DELETE FROM rooms", [])?;
        tx.execute("DELETE FROM centers", [])?;

        for center in inventory.centers() {
            ensure_center(&tx, &center.name)?;
        }
        for room in inventory.rooms() {
            insert_room(&tx, room)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        info!(rooms = inventory.rooms().len(), "考场清单已替换");
        Ok(inventory.rooms().len())
    }

    /// 读取考场清单快照
    pub fn load_inventory(&self) -> RepositoryResult<RoomInventory> {
        let conn = self.get_conn()?;

        let centers: Vec<String> = {
            let mut stmt = conn.prepare("SELECT name FROM centers ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            rows.collect::<Result<_, _>>()?
        };

        let raw_rooms: Vec<(String, String, i64, bool, bool, String)> = {
            let mut stmt = conn.prepare(
                r#"
                SELECT c.name, r.name, r.capacity, r.climatise, r.camera, r.type
                FROM rooms r
                JOIN centers c ON c.id = r.center_id
                ORDER BY r.id
                "#,
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?;
            rows.collect::<Result<_, _>>()?
        };

        let mut rooms = Vec::with_capacity(raw_rooms.len());
        for (center, name, capacity, climatise, camera, room_type) in raw_rooms {
            let room_type = room_type
                .parse::<RoomType>()
                .map_err(|message| RepositoryError::FieldValueError {
                    field: "type".to_string(),
                    message,
                })?;
            let capacity = u32::try_from(capacity).map_err(|e| RepositoryError::FieldValueError {
                field: "capacity".to_string(),
                message: e.to_string(),
            })?;
            rooms.push(Room {
                center,
                name,
                capacity,
                room_type,
                climatise,
                camera,
            });
        }

        debug!(centers = centers.len(), rooms = rooms.len(), "考场清单已读取");
        Ok(RoomInventory::new(centers, rooms))
    }

    // ==========================================
    // 单条维护
    // ==========================================

    /// 新增中心（已存在时返回原 id）
    pub fn add_center(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        ensure_center(&conn, name)
    }

    /// 新增考场（中心不存在时自动创建）
    pub fn add_room(&self, room: &Room) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        insert_room(&tx, room)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 更新考场（按原中心名 + 原考场名定位）
    pub fn update_room(&self, center: &str, name: &str, room: &Room) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let room_id = find_room_id(&tx, center, name)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Room".to_string(),
            id: format!("{}/{}", center, name),
        })?;
        let new_center_id = ensure_center(&tx, &room.center)?;

        tx.execute(
            r#"
            UPDATE rooms
            SET center_id = ?1, name = ?2, capacity = ?3, climatise = ?4, camera = ?5, type = ?6
            WHERE id = ?7
            "#,
            params![
                new_center_id,
                room.name.trim(),
                room.capacity,
                room.climatise,
                room.camera,
                room.room_type.as_str(),
                room_id,
            ],
        )?;
        delete_center_if_empty(&tx, center)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 删除考场；中心因此变空时一并删除
    ///
    /// # 返回
    /// - Ok(true): 中心也被删除
    /// - Ok(false): 中心仍有其他考场
    pub fn delete_room(&self, center: &str, name: &str) -> RepositoryResult<bool> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let room_id = find_room_id(&tx, center, name)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Room".to_string(),
            id: format!("{}/{}", center, name),
        })?;
        tx.execute("DELETE FROM rooms WHERE id = ?1", params![room_id])?;
        let center_deleted = delete_center_if_empty(&tx, center)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        if center_deleted {
            info!(center = %center, "中心已无考场，已删除");
        }
        Ok(center_deleted)
    }

    /// 容量汇总（总计/大考场/小考场）
    pub fn total_capacity(&self) -> RepositoryResult<CapacityTotals> {
        let conn = self.get_conn()?;
        let (total, grande, petite): (i64, i64, i64) = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(capacity), 0),
                COALESCE(SUM(CASE WHEN type = 'Grande' THEN capacity ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN type = 'Petite' THEN capacity ELSE 0 END), 0)
            FROM rooms
            "#,
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok(CapacityTotals {
            total: total as u64,
            grande: grande as u64,
            petite: petite as u64,
        })
    }
}

// ==========================================
// 内部 SQL 辅助（接受 Connection 或 Transaction）
// ==========================================

fn ensure_center(conn: &Connection, name: &str) -> RepositoryResult<i64> {
    let name = name.trim();
    conn.execute(
        "INSERT OR IGNORE INTO centers (name) VALUES (?1)",
        params![name],
    )?;
    let id = conn.query_row(
        "SELECT id FROM centers WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn insert_room(tx: &Transaction<'_>, room: &Room) -> RepositoryResult<()> {
    let center_id = ensure_center(tx, &room.center)?;
    tx.execute(
        r#"
        INSERT INTO rooms (center_id, name, capacity, climatise, camera, type)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            center_id,
            room.name.trim(),
            room.capacity,
            room.climatise,
            room.camera,
            room.room_type.as_str(),
        ],
    )?;
    Ok(())
}

fn find_room_id(conn: &Connection, center: &str, name: &str) -> RepositoryResult<Option<i64>> {
    let id = conn
        .query_row(
            r#"
            SELECT r.id FROM rooms r
            JOIN centers c ON c.id = r.center_id
            WHERE c.name = ?1 AND r.name = ?2
            "#,
            params![center.trim(), name.trim()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

fn delete_center_if_empty(conn: &Connection, center: &str) -> RepositoryResult<bool> {
    let deleted = conn.execute(
        r#"
        DELETE FROM centers
        WHERE name = ?1
          AND NOT EXISTS (SELECT 1 FROM rooms WHERE rooms.center_id = centers.id)
        "#,
        params![center.trim()],
    )?;
    Ok(deleted > 0)
}
