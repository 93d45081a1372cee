// ==========================================
// 考场座位分配系统 - 导入 API
// ==========================================
// 职责: 封装名单/清单导入
// ==========================================

use crate::api::error::ApiResult;
use crate::importer::{import_both, ImportSummary, RoomImportLayout, RosterImporter};
use std::path::Path;
use std::sync::Arc;

/// 导入 API
pub struct ImportApi {
    importer: Arc<dyn RosterImporter>,
}

impl ImportApi {
    pub fn new(importer: Arc<dyn RosterImporter>) -> Self {
        Self { importer }
    }

    /// 导入考生名单（整体替换）
    pub async fn import_candidates(&self, file_path: &str) -> ApiResult<ImportSummary> {
        Ok(self.importer.import_candidates(Path::new(file_path)).await?)
    }

    /// 导入考场清单（整体替换）
    ///
    /// # 参数
    /// - legacy: 历史表格布局（无 type 列，默认 Grande）
    pub async fn import_rooms(&self, file_path: &str, legacy: bool) -> ApiResult<ImportSummary> {
        let layout = if legacy {
            RoomImportLayout::Legacy
        } else {
            RoomImportLayout::Standard
        };
        Ok(self
            .importer
            .import_rooms(Path::new(file_path), layout)
            .await?)
    }

    /// 同时导入名单与清单
    pub async fn import_all(
        &self,
        candidates_path: &str,
        rooms_path: &str,
        legacy: bool,
    ) -> ApiResult<(ImportSummary, ImportSummary)> {
        let layout = if legacy {
            RoomImportLayout::Legacy
        } else {
            RoomImportLayout::Standard
        };
        let (candidates, rooms) = import_both(
            self.importer.as_ref(),
            Path::new(candidates_path),
            Path::new(rooms_path),
            layout,
        )
        .await;
        Ok((candidates?, rooms?))
    }
}
