// ==========================================
// 考场座位分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod candidate;
pub mod room;
pub mod types;

// 重导出核心类型
pub use assignment::{AllocationRun, RoomOccupancy, SeatAssignment};
pub use candidate::Candidate;
pub use room::{CapacityTotals, Center, CenterStats, Room, RoomId, RoomInventory};
pub use types::{AllocationMode, AmbiguityPolicy, RoomType};
