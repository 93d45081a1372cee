// ==========================================
// 考场座位分配系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::allocation_config_trait::AllocationConfigReader;
use crate::db::{configure_sqlite_connection, open_and_init};
use crate::domain::types::{AllocationMode, AmbiguityPolicy};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_and_init(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（已存在则覆盖）
    pub fn set(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 删除配置值（恢复默认）
    pub fn unset(&self, key: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM config_kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// 全部配置（按键排序）
    pub fn list_all(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }
}

#[async_trait]
impl AllocationConfigReader for ConfigManager {
    async fn get_default_mode(&self) -> RepositoryResult<AllocationMode> {
        let value = self.get_config_or_default(config_keys::DEFAULT_MODE, "PRIORITY")?;
        Ok(value.parse().unwrap_or_else(|e: String| {
            warn!(key = config_keys::DEFAULT_MODE, error = %e, "配置值无效，使用 PRIORITY");
            AllocationMode::Priority
        }))
    }

    async fn get_random_seed(&self) -> RepositoryResult<Option<u64>> {
        let Some(value) = self.get(config_keys::RANDOM_SEED)? else {
            return Ok(None);
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<u64>()
            .map(Some)
            .map_err(|e| RepositoryError::FieldValueError {
                field: config_keys::RANDOM_SEED.to_string(),
                message: e.to_string(),
            })
    }

    async fn get_ambiguity_policy(&self) -> RepositoryResult<AmbiguityPolicy> {
        let value = self.get_config_or_default(config_keys::AMBIGUITY_POLICY, "REJECT")?;
        Ok(value.parse().unwrap_or_else(|e: String| {
            warn!(key = config_keys::AMBIGUITY_POLICY, error = %e, "配置值无效，使用 REJECT");
            AmbiguityPolicy::Reject
        }))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 分配
    pub const DEFAULT_MODE: &str = "allocation.default_mode";
    pub const RANDOM_SEED: &str = "allocation.random_seed";

    // 中心解析
    pub const AMBIGUITY_POLICY: &str = "resolver.ambiguity_policy";

    /// 可通过 CLI 设置的全部键
    pub const ALL: [&str; 3] = [DEFAULT_MODE, RANDOM_SEED, AMBIGUITY_POLICY];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let config = manager();
        assert_eq!(config.get_default_mode().await.unwrap(), AllocationMode::Priority);
        assert_eq!(config.get_random_seed().await.unwrap(), None);
        assert_eq!(config.get_ambiguity_policy().await.unwrap(), AmbiguityPolicy::Reject);
    }

    #[tokio::test]
    async fn test_set_overrides_and_invalid_seed() {
        let config = manager();
        config.set(config_keys::DEFAULT_MODE, "aleatoire").unwrap();
        config.set(config_keys::AMBIGUITY_POLICY, "FIRST_MATCH").unwrap();
        config.set(config_keys::RANDOM_SEED, "42").unwrap();

        assert_eq!(config.get_default_mode().await.unwrap(), AllocationMode::Random);
        assert_eq!(config.get_ambiguity_policy().await.unwrap(), AmbiguityPolicy::FirstMatch);
        assert_eq!(config.get_random_seed().await.unwrap(), Some(42));

        config.set(config_keys::RANDOM_SEED, "abc").unwrap();
        assert!(config.get_random_seed().await.is_err());

        assert!(config.unset(config_keys::RANDOM_SEED).unwrap());
        assert_eq!(config.list_all().unwrap().len(), 2);
    }
}
