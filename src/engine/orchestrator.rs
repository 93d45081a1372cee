// ==========================================
// 考场座位分配系统 - 分配编排器
// ==========================================
// 流程: 校验 → 中心解析 → 选择随机源 → 分配 → 汇总日志
// 约束: 校验报告非空时不进入分配；失败不产生任何部分结果
// ==========================================

use crate::domain::assignment::AllocationRun;
use crate::domain::candidate::Candidate;
use crate::domain::room::RoomInventory;
use crate::domain::types::{AllocationMode, AmbiguityPolicy};
use crate::engine::allocator::SeatAllocator;
use crate::engine::error::{AllocationError, AllocationResult};
use crate::engine::resolver::CenterResolver;
use crate::engine::validator::Validator;
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// AllocationOrchestrator - 分配编排器
// ==========================================
pub struct AllocationOrchestrator {
    resolver: CenterResolver,
    validator: Validator,
    allocator: SeatAllocator,
}

impl AllocationOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - policy: 中心标签歧义处理策略
    pub fn new(policy: AmbiguityPolicy) -> Self {
        let resolver = CenterResolver::new(policy);
        Self {
            resolver,
            validator: Validator::new(resolver),
            allocator: SeatAllocator::new(),
        }
    }

    /// 执行一次完整分配
    ///
    /// # 参数
    /// - seed: 指定时使用 ChaCha8 可复现随机源，否则使用线程本地随机源
    ///
    /// # 返回
    /// - Ok(AllocationRun): 完整结果（尚未持久化）
    /// - Err(Validation): 校验未通过，分配未执行
    #[instrument(skip_all, fields(mode = %mode, seed = ?seed))]
    pub fn run(
        &self,
        candidates: &[Candidate],
        inventory: &RoomInventory,
        mode: AllocationMode,
        seed: Option<u64>,
    ) -> AllocationResult<AllocationRun> {
        match seed {
            Some(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                self.run_with_rng(candidates, inventory, mode, Some(seed), &mut rng)
            }
            None => {
                let mut rng = rand::rng();
                self.run_with_rng(candidates, inventory, mode, None, &mut rng)
            }
        }
    }

    /// 使用调用方提供的随机源执行分配
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        candidates: &[Candidate],
        inventory: &RoomInventory,
        mode: AllocationMode,
        seed: Option<u64>,
        rng: &mut R,
    ) -> AllocationResult<AllocationRun> {
        // === 步骤 1: 校验 ===
        let report = self.validator.validate(candidates, inventory);
        if !report.is_ok() {
            warn!(issues = report.len(), "校验未通过，分配未执行");
            return Err(AllocationError::Validation(report));
        }

        // === 步骤 2: 中心解析 ===
        let center_names = inventory.center_names();
        let mapping = self.resolver.resolve_all(
            candidates.iter().filter_map(|c| c.exam_center_label()),
            &center_names,
        )?;

        // === 步骤 3: 分配 ===
        let outcome = self
            .allocator
            .allocate(candidates, inventory, &mapping, mode, rng)?;

        let run = AllocationRun {
            run_id: Uuid::new_v4().to_string(),
            mode,
            seed,
            created_at: Utc::now(),
            assignments: outcome.assignments,
            occupancy: outcome.occupancy,
        };

        info!(
            run_id = %run.run_id,
            mode = %run.mode,
            candidates = run.candidate_count(),
            rooms_used = run.rooms_used(),
            "分配完成"
        );
        Ok(run)
    }
}

impl Default for AllocationOrchestrator {
    fn default() -> Self {
        Self::new(AmbiguityPolicy::default())
    }
}
