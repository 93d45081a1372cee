// ==========================================
// 考场座位分配系统 - API 层
// ==========================================
// 职责: 对外业务接口，组合仓储/引擎/导入导出
// ==========================================

pub mod allocation_api;
pub mod config_api;
pub mod error;
pub mod import_api;
pub mod room_api;

pub use allocation_api::{AllocationApi, ExportResponse, StatsResponse};
pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use room_api::RoomApi;
