// ==========================================
// 考场座位分配系统 - 名单/清单导入器
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 表头检查 → 映射/清洗 → 文件内重复检查 → 落库
// 约束: 任何一行失败则整批不落库（已有数据保持不变）
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::room::{Room, RoomInventory};
use crate::engine::validator::{Validator, REQUIRED_CANDIDATE_FIELDS, REQUIRED_ROOM_FIELDS};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{CandidateFieldMapper, RoomFieldMapper, RoomImportLayout};
use crate::importer::file_parser::{FileParser, RawTable, UniversalFileParser};
use crate::repository::{CandidateRepository, RoomRepository};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 单次导入结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub file_path: String,
    pub total_rows: usize,
    pub imported: usize,
    pub elapsed_ms: u64,
}

// ==========================================
// RosterImporter Trait
// ==========================================
#[async_trait]
pub trait RosterImporter: Send + Sync {
    /// 导入考生名单（整体替换）
    async fn import_candidates(&self, file_path: &Path) -> ImportResult<ImportSummary>;

    /// 导入考场清单（整体替换）
    async fn import_rooms(
        &self,
        file_path: &Path,
        layout: RoomImportLayout,
    ) -> ImportResult<ImportSummary>;
}

// ==========================================
// RosterImporterImpl - 导入器实现
// ==========================================
pub struct RosterImporterImpl {
    candidate_repo: Arc<CandidateRepository>,
    room_repo: Arc<RoomRepository>,
    file_parser: Box<dyn FileParser>,
}

impl RosterImporterImpl {
    /// 使用默认解析器（按扩展名识别 CSV / Excel）
    pub fn new(candidate_repo: Arc<CandidateRepository>, room_repo: Arc<RoomRepository>) -> Self {
        Self::with_parser(candidate_repo, room_repo, Box::new(UniversalFileParser))
    }

    pub fn with_parser(
        candidate_repo: Arc<CandidateRepository>,
        room_repo: Arc<RoomRepository>,
        file_parser: Box<dyn FileParser>,
    ) -> Self {
        Self {
            candidate_repo,
            room_repo,
            file_parser,
        }
    }

    /// 解析并映射考生名单（不落库）
    pub fn read_candidates(&self, file_path: &Path) -> ImportResult<Vec<Candidate>> {
        let table = self.parse_checked(file_path, "candidate", &REQUIRED_CANDIDATE_FIELDS)?;
        let mapper = CandidateFieldMapper::new();

        let mut candidates = Vec::with_capacity(table.rows.len());
        let mut errors = Vec::new();
        let mut first_row_by_code: HashMap<String, usize> = HashMap::new();

        for row in &table.rows {
            let row_number = row.line;
            match mapper.map(&row.values, row_number) {
                Ok(candidate) => {
                    if let Some(first) = first_row_by_code.get(&candidate.code) {
                        errors.push(format!(
                            "第 {} 行: 考生编号 {} 与第 {} 行重复",
                            row_number, candidate.code, first
                        ));
                        continue;
                    }
                    first_row_by_code.insert(candidate.code.clone(), row_number);
                    candidates.push(candidate);
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        if !errors.is_empty() {
            warn!(errors = errors.len(), "考生名单存在行级错误");
            return Err(ImportError::RowErrors(errors));
        }
        Ok(candidates)
    }

    /// 解析并映射考场清单（不落库）
    pub fn read_rooms(&self, file_path: &Path, layout: RoomImportLayout) -> ImportResult<RoomInventory> {
        let required: &[&str] = match layout {
            RoomImportLayout::Standard => &REQUIRED_ROOM_FIELDS,
            RoomImportLayout::Legacy => &REQUIRED_ROOM_FIELDS[..3],
        };
        let table = self.parse_checked(file_path, "room", required)?;
        let mapper = RoomFieldMapper::new(layout);

        let mut rooms: Vec<Room> = Vec::with_capacity(table.rows.len());
        let mut errors = Vec::new();
        let mut first_row_by_key: HashMap<(String, String), usize> = HashMap::new();

        for row in &table.rows {
            let row_number = row.line;
            match mapper.map(&row.values, row_number) {
                Ok(room) => {
                    let key = (room.center.clone(), room.name.clone());
                    if let Some(first) = first_row_by_key.get(&key) {
                        errors.push(format!(
                            "第 {} 行: 考场 {}/{} 与第 {} 行重复",
                            row_number, room.center, room.name, first
                        ));
                        continue;
                    }
                    first_row_by_key.insert(key, row_number);
                    rooms.push(room);
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        if !errors.is_empty() {
            warn!(errors = errors.len(), "考场清单存在行级错误");
            return Err(ImportError::RowErrors(errors));
        }
        Ok(RoomInventory::from_rooms(rooms))
    }

    /// 解析文件并检查必需列
    fn parse_checked(&self, file_path: &Path, entity: &str, required: &[&str]) -> ImportResult<RawTable> {
        debug!(file = %file_path.display(), entity, "解析文件");
        let table = self.file_parser.parse(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;

        let missing = Validator::check_columns(entity, &table.headers, required);
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }
        if table.rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        Ok(table)
    }
}

#[async_trait]
impl RosterImporter for RosterImporterImpl {
    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_candidates(&self, file_path: &Path) -> ImportResult<ImportSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(file_path = %file_path.display(), "开始导入考生名单");

        let candidates = self.read_candidates(file_path)?;
        let imported = self.candidate_repo.replace_all(&candidates)?;

        let summary = ImportSummary {
            batch_id,
            file_path: file_path.display().to_string(),
            total_rows: candidates.len(),
            imported,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
        info!(imported = summary.imported, elapsed_ms = summary.elapsed_ms, "考生名单导入完成");
        Ok(summary)
    }

    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_rooms(
        &self,
        file_path: &Path,
        layout: RoomImportLayout,
    ) -> ImportResult<ImportSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(file_path = %file_path.display(), ?layout, "开始导入考场清单");

        let inventory = self.read_rooms(file_path, layout)?;
        let imported = self.room_repo.replace_inventory(&inventory)?;

        let summary = ImportSummary {
            batch_id,
            file_path: file_path.display().to_string(),
            total_rows: inventory.rooms().len(),
            imported,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
        info!(imported = summary.imported, elapsed_ms = summary.elapsed_ms, "考场清单导入完成");
        Ok(summary)
    }
}

/// 同时导入考生名单与考场清单
///
/// 两个导入互不依赖，各自返回结果；一方失败不影响另一方。
pub async fn import_both<I: RosterImporter + ?Sized>(
    importer: &I,
    candidates_path: &Path,
    rooms_path: &Path,
    layout: RoomImportLayout,
) -> (ImportResult<ImportSummary>, ImportResult<ImportSummary>) {
    futures::future::join(
        importer.import_candidates(candidates_path),
        importer.import_rooms(rooms_path, layout),
    )
    .await
}
