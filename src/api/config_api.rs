// ==========================================
// 考场座位分配系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新（写入前校验键与值）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, ConfigManager};
use crate::domain::types::{AllocationMode, AmbiguityPolicy};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    pub fn list_configs(&self) -> ApiResult<BTreeMap<String, String>> {
        Ok(self.config_manager.list_all()?)
    }

    pub fn get_config(&self, key: &str) -> ApiResult<Option<String>> {
        check_key(key)?;
        Ok(self.config_manager.get(key)?)
    }

    /// 更新配置（值按键的类型校验后以标准形式保存）
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<String> {
        check_key(key)?;
        let normalized = normalize_value(key, value)?;
        self.config_manager.set(key, &normalized)?;
        info!(key, value = %normalized, "配置已更新");
        Ok(normalized)
    }
}

fn check_key(key: &str) -> ApiResult<()> {
    if config_keys::ALL.contains(&key) {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "未知配置键: {}（可用: {}）",
            key,
            config_keys::ALL.join(", ")
        )))
    }
}

fn normalize_value(key: &str, value: &str) -> ApiResult<String> {
    let value = value.trim();
    match key {
        config_keys::DEFAULT_MODE => value
            .parse::<AllocationMode>()
            .map(|m| m.as_str().to_string())
            .map_err(ApiError::InvalidInput),
        config_keys::AMBIGUITY_POLICY => value
            .parse::<AmbiguityPolicy>()
            .map(|p| p.to_string())
            .map_err(ApiError::InvalidInput),
        config_keys::RANDOM_SEED if value.is_empty() => Ok(String::new()),
        config_keys::RANDOM_SEED => value
            .parse::<u64>()
            .map(|s| s.to_string())
            .map_err(|e| ApiError::InvalidInput(format!("随机种子必须为非负整数: {}", e))),
        _ => Ok(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn api() -> ConfigApi {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let manager = ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        ConfigApi::new(Arc::new(manager))
    }

    #[test]
    fn test_update_config_normalizes_values() {
        let api = api();
        assert_eq!(
            api.update_config(config_keys::DEFAULT_MODE, "aleatoire").unwrap(),
            "RANDOM"
        );
        assert_eq!(
            api.get_config(config_keys::DEFAULT_MODE).unwrap(),
            Some("RANDOM".to_string())
        );
    }

    #[test]
    fn test_update_config_rejects_bad_input() {
        let api = api();
        assert!(matches!(
            api.update_config("unknown.key", "x"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.update_config(config_keys::RANDOM_SEED, "-3"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(api.list_configs().unwrap().is_empty());
    }
}
