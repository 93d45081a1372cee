// ==========================================
// 考场座位分配系统 - 分配结果领域模型
// ==========================================
// 生命周期: 引擎生成 → 持久化为"最近一次分配"（新结果整体替换旧结果）
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::room::Room;
use crate::domain::types::{AllocationMode, RoomType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// SeatAssignment - 座位分配记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub code: String,
    pub last_name: String,
    pub first_name: String,
    pub region: String,
    pub province: String,
    pub center: String,      // 解析后的标准中心名
    pub room: String,        // 考场名称
    pub seat_number: u32,    // 考场内座位号（从 1 开始）
    pub room_type: RoomType,
    pub language: String,
}

impl SeatAssignment {
    /// 由考生 + 考场 + 座位号构建（考生信息为冗余拷贝）
    pub fn new(candidate: &Candidate, room: &Room, seat_number: u32) -> Self {
        Self {
            code: candidate.code.clone(),
            last_name: candidate.last_name.clone(),
            first_name: candidate.first_name.clone(),
            region: candidate.region.clone(),
            province: candidate.province.clone(),
            center: room.center.clone(),
            room: room.name.clone(),
            seat_number,
            room_type: room.room_type,
            language: candidate.language.clone(),
        }
    }
}

/// 单考场占用情况（来自本次分配的占用台账）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomOccupancy {
    pub center: String,
    pub room: String,
    pub room_type: RoomType,
    pub capacity: u32,
    pub occupied: u32,
}

// ==========================================
// AllocationRun - 一次完整的分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRun {
    pub run_id: String,
    pub mode: AllocationMode,
    pub seed: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub assignments: Vec<SeatAssignment>,
    pub occupancy: Vec<RoomOccupancy>,
}

impl AllocationRun {
    pub fn candidate_count(&self) -> usize {
        self.assignments.len()
    }

    /// 被使用的考场数
    pub fn rooms_used(&self) -> usize {
        self.occupancy.iter().filter(|o| o.occupied > 0).count()
    }
}
