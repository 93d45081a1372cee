// ==========================================
// 考场座位分配系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 按考试中心将考生分配到考场座位（大考场优先）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 校验/解析/分配
pub mod engine;

// 导入层 - 外部表格
pub mod importer;

// 导出层 - 结果文件
pub mod exporter;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AllocationMode, AmbiguityPolicy, RoomType};

// 领域实体
pub use domain::{AllocationRun, Candidate, Room, RoomInventory, SeatAssignment};

// 引擎
pub use engine::{
    AllocationError, AllocationOrchestrator, CenterResolver, SeatAllocator, ValidationIssue,
    ValidationReport, Validator,
};

// API
pub use api::{AllocationApi, ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "考场座位分配系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
