// ==========================================
// 考场座位分配系统 - 引擎层
// ==========================================
// 职责: 实现分配规则,不拼 SQL
// 红线: Engine 不拼 SQL, 任何失败必须指明考生编号/中心/字段
// ==========================================

pub mod allocator;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod ordering;
pub mod resolver;
pub mod summary;
pub mod validator;

// 重导出核心引擎
pub use allocator::{AllocationOutcome, SeatAllocator};
pub use error::{AllocationError, AllocationResult, ResolveError, ValidationIssue, ValidationReport};
pub use ledger::OccupationLedger;
pub use orchestrator::AllocationOrchestrator;
pub use ordering::CandidateOrdering;
pub use resolver::{CenterMapping, CenterResolver};
pub use summary::{center_seating, center_summaries, unused_rooms, CenterSummary, RoomSeating};
pub use validator::{Validator, REQUIRED_CANDIDATE_FIELDS, REQUIRED_ROOM_FIELDS};
