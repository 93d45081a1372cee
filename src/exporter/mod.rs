// ==========================================
// 考场座位分配系统 - 导出层
// ==========================================
// 职责: 将最近一次分配结果写出为 CSV
// ==========================================

pub mod csv_exporter;
pub mod error;

pub use csv_exporter::{CsvExporter, SEAT_LIST_HEADERS};
pub use error::{ExportError, ExportResult};
