// ==========================================
// 考场座位分配系统 - 分配 API
// ==========================================
// 职责: 读取名单/清单快照 → 编排分配 → 持久化最近一次结果
// 约束: 分配运行串行化；失败时不写入，上一次结果保持不变
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::AllocationConfigReader;
use crate::domain::assignment::AllocationRun;
use crate::domain::room::{CapacityTotals, CenterStats};
use crate::domain::types::AllocationMode;
use crate::engine::orchestrator::AllocationOrchestrator;
use crate::engine::summary::{center_seating, center_summaries, CenterSummary, RoomSeating};
use crate::exporter::{CsvExporter, ExportError};
use crate::repository::{CandidateRepository, RoomRepository, SeatAssignmentRepository};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, instrument};

/// 数据概况
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub candidates: usize,
    pub capacity: CapacityTotals,
    pub centers: Vec<CenterStats>,
    pub last_mode: Option<AllocationMode>,
    pub last_summary: Vec<CenterSummary>,
}

/// 导出结果
#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    pub seat_rows: usize,
    pub summary_rows: Option<usize>,
    pub unused_rows: Option<usize>,
}

// ==========================================
// AllocationApi - 分配 API
// ==========================================
pub struct AllocationApi<C>
where
    C: AllocationConfigReader,
{
    candidate_repo: Arc<CandidateRepository>,
    room_repo: Arc<RoomRepository>,
    seat_repo: Arc<SeatAssignmentRepository>,
    config: Arc<C>,
    run_lock: AsyncMutex<()>,
}

impl<C> AllocationApi<C>
where
    C: AllocationConfigReader,
{
    pub fn new(
        candidate_repo: Arc<CandidateRepository>,
        room_repo: Arc<RoomRepository>,
        seat_repo: Arc<SeatAssignmentRepository>,
        config: Arc<C>,
    ) -> Self {
        Self {
            candidate_repo,
            room_repo,
            seat_repo,
            config,
            run_lock: AsyncMutex::new(()),
        }
    }

    /// 执行分配并保存结果
    ///
    /// # 参数
    /// - mode: 未指定时读取配置 allocation.default_mode
    /// - seed: 未指定时读取配置 allocation.random_seed（仍为空则不可复现）
    #[instrument(skip(self))]
    pub async fn allocate(
        &self,
        mode: Option<AllocationMode>,
        seed: Option<u64>,
    ) -> ApiResult<AllocationRun> {
        let _guard = self.run_lock.lock().await;

        let mode = match mode {
            Some(m) => m,
            None => self.config.get_default_mode().await?,
        };
        let seed = match seed {
            Some(s) => Some(s),
            None => self.config.get_random_seed().await?,
        };
        let policy = self.config.get_ambiguity_policy().await?;

        // 运行开始时读取快照
        let candidates = self.candidate_repo.find_all()?;
        let inventory = self.room_repo.load_inventory()?;

        let run = AllocationOrchestrator::new(policy).run(&candidates, &inventory, mode, seed)?;
        self.seat_repo.save_run(&run)?;

        info!(run_id = %run.run_id, "分配结果已更新");
        Ok(run)
    }

    /// 最近一次分配结果
    pub fn last_run(&self) -> ApiResult<Option<AllocationRun>> {
        Ok(self.seat_repo.load_last()?)
    }

    /// 最近一次分配中指定中心的座位表（按考场分组）
    ///
    /// # 错误
    /// - NotFound: 尚无分配结果 / 中心不在该次分配中 / 中心没有考生
    pub fn center_seating(&self, center: &str) -> ApiResult<Vec<RoomSeating>> {
        let name = center.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("中心名称不能为空".to_string()));
        }
        let run = self
            .seat_repo
            .load_last()?
            .ok_or_else(|| ApiError::NotFound("分配结果".to_string()))?;

        if !run.occupancy.iter().any(|o| o.center == name) {
            return Err(ApiError::NotFound(format!("中心 '{}' 不在最近一次分配中", name)));
        }
        let seating = center_seating(&run, name);
        if seating.is_empty() {
            return Err(ApiError::NotFound(format!("中心 '{}' 没有分配到任何考生", name)));
        }
        Ok(seating)
    }

    /// 数据概况（名单人数、容量、各中心统计、最近一次分配汇总）
    pub fn stats(&self) -> ApiResult<StatsResponse> {
        let inventory = self.room_repo.load_inventory()?;
        let last = self.seat_repo.load_last()?;

        Ok(StatsResponse {
            candidates: self.candidate_repo.count()?,
            capacity: inventory.capacity_totals(),
            centers: inventory.stats_by_center(),
            last_mode: last.as_ref().map(|r| r.mode),
            last_summary: last.as_ref().map(center_summaries).unwrap_or_default(),
        })
    }

    /// 导出最近一次分配结果
    pub fn export(
        &self,
        seat_list: &Path,
        summary: Option<&Path>,
        unused: Option<&Path>,
    ) -> ApiResult<ExportResponse> {
        let run = self
            .seat_repo
            .load_last()?
            .ok_or(ExportError::NoAllocation)?;

        let exporter = CsvExporter;
        let seat_rows = exporter.export_seat_list(&run, seat_list)?;
        let summary_rows = summary
            .map(|p| exporter.export_center_summary(&run, p))
            .transpose()?;
        let unused_rows = unused
            .map(|p| exporter.export_unused_rooms(&run, p))
            .transpose()?;

        Ok(ExportResponse {
            seat_rows,
            summary_rows,
            unused_rows,
        })
    }

    /// 清空分配结果
    pub fn clear(&self) -> ApiResult<()> {
        self.seat_repo.clear().map_err(ApiError::from)
    }
}
