// ==========================================
// 考场座位分配系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约束: 所有仓储共享同一个 SQLite 连接
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{AllocationApi, ConfigApi, ImportApi, RoomApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::RosterImporterImpl;
use crate::repository::{CandidateRepository, RoomRepository, SeatAssignmentRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "EXAM_SEATING_DB_PATH";

/// 数据库文件名
const DB_FILE_NAME: &str = "exam_seating.db";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 分配API
    pub allocation_api: Arc<AllocationApi<ConfigManager>>,

    /// 导入API
    pub import_api: Arc<ImportApi>,

    /// 考场维护API
    pub room_api: Arc<RoomApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 用于测试）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("无法初始化数据库表结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        Self::from_connection(db_path, conn)
    }

    /// 从已有连接创建（连接须已完成建表）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let candidate_repo = Arc::new(CandidateRepository::from_connection(conn.clone()));
        let room_repo = Arc::new(RoomRepository::from_connection(conn.clone()));
        let seat_repo = Arc::new(SeatAssignmentRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let importer = Arc::new(RosterImporterImpl::new(
            candidate_repo.clone(),
            room_repo.clone(),
        ));

        let allocation_api = Arc::new(AllocationApi::new(
            candidate_repo,
            room_repo.clone(),
            seat_repo,
            config_manager.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(importer));
        let room_api = Arc::new(RoomApi::new(room_repo));
        let config_api = Arc::new(ConfigApi::new(config_manager));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            allocation_api,
            import_api,
            room_api,
            config_api,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 EXAM_SEATING_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("exam-seating");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}
