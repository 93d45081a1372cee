// ==========================================
// 考场座位分配系统 - 座位分配引擎
// ==========================================
// 红线: 要么全部安置并返回完整结果，要么整体失败（不产生部分结果）
// 落位规则: 同一中心内先 Grande 后 Petite，按清单顺序首次适配
// ==========================================
// 输入: 考生名单 + 考场清单 + 中心映射 + 模式 + 随机源
// 输出: AllocationOutcome（座位列表 + 各考场占用）
// ==========================================

use crate::domain::assignment::{RoomOccupancy, SeatAssignment};
use crate::domain::candidate::Candidate;
use crate::domain::room::RoomInventory;
use crate::domain::types::AllocationMode;
use crate::engine::error::{AllocationError, AllocationResult, ResolveError};
use crate::engine::ledger::OccupationLedger;
use crate::engine::ordering::CandidateOrdering;
use crate::engine::resolver::CenterMapping;
use rand::Rng;
use tracing::{debug, instrument};

/// 单次分配的产出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOutcome {
    pub assignments: Vec<SeatAssignment>,
    pub occupancy: Vec<RoomOccupancy>,
}

// ==========================================
// SeatAllocator - 座位分配引擎
// ==========================================
pub struct SeatAllocator {
    ordering: CandidateOrdering,
}

impl SeatAllocator {
    pub fn new() -> Self {
        Self {
            ordering: CandidateOrdering::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行一次完整分配
    ///
    /// # 参数
    /// - `candidates`: 考生名单（只读）
    /// - `inventory`: 考场清单快照
    /// - `mapping`: 考试中心标签 → 标准中心名
    /// - `mode`: PRIORITY / RANDOM
    /// - `rng`: 随机源（仅 RANDOM 使用）
    ///
    /// # 返回
    /// - Ok(AllocationOutcome): 每名考生恰好一个座位
    /// - Err(NoSeatAvailable / UnresolvedCenter / IncompleteAllocation)
    #[instrument(skip_all, fields(
        mode = %mode,
        candidates = candidates.len(),
        rooms = inventory.rooms().len()
    ))]
    pub fn allocate<R: Rng + ?Sized>(
        &self,
        candidates: &[Candidate],
        inventory: &RoomInventory,
        mapping: &CenterMapping,
        mode: AllocationMode,
        rng: &mut R,
    ) -> AllocationResult<AllocationOutcome> {
        let mut ledger = OccupationLedger::new(inventory);
        let mut assignments = Vec::with_capacity(candidates.len());

        for candidate in self.ordering.order(candidates, mode, rng) {
            let label = candidate.exam_center_label().ok_or(ResolveError::Blank)?;
            let center = mapping.get(label).ok_or_else(|| ResolveError::NotFound {
                label: label.to_string(),
            })?;

            let assignment = self.place_one(candidate, center, inventory, &mut ledger)?;
            assignments.push(assignment);
        }

        // 兜底检查（校验通过后不应触发）：结果条数与台账占用须一致
        let placed = ledger.total_occupied() as usize;
        check_complete(placed, assignments.len(), candidates.len())?;

        debug!(placed = assignments.len(), "分配完成");

        Ok(AllocationOutcome {
            occupancy: ledger.snapshot(inventory),
            assignments,
        })
    }

    /// 为单个考生在指定中心落位
    ///
    /// 1) 按清单顺序遍历 Grande 考场，取第一个未满的
    /// 2) Grande 全满则同样遍历 Petite
    /// 3) 均无空位 → NoSeatAvailable（中止整次分配）
    pub fn place_one(
        &self,
        candidate: &Candidate,
        center: &str,
        inventory: &RoomInventory,
        ledger: &mut OccupationLedger,
    ) -> AllocationResult<SeatAssignment> {
        let no_seat = || AllocationError::NoSeatAvailable {
            code: candidate.code.clone(),
            center: center.to_string(),
        };

        let center_rooms = inventory.center(center).ok_or_else(no_seat)?;

        for room_id in center_rooms.rooms_in_fill_order() {
            if let Some(seat_number) = ledger.take_seat(room_id) {
                return Ok(SeatAssignment::new(
                    candidate,
                    inventory.room(room_id),
                    seat_number,
                ));
            }
        }

        Err(no_seat())
    }
}

/// 分配后置条件: 台账占用数 == 结果条数 == 考生人数
fn check_complete(placed: usize, recorded: usize, expected: usize) -> AllocationResult<()> {
    if placed != expected || recorded != expected {
        return Err(AllocationError::IncompleteAllocation {
            placed: placed.min(recorded),
            expected,
        });
    }
    Ok(())
}

impl Default for SeatAllocator {
    fn default() -> Self {
        Self::new()
    }
}
