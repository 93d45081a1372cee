// ==========================================
// 考场座位分配系统 - 导入层
// ==========================================
// 职责: 外部表格导入，生成考生名单与考场清单
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod roster_importer;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{CandidateFieldMapper, RoomFieldMapper, RoomImportLayout};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawTable, UniversalFileParser};
pub use roster_importer::{import_both, ImportSummary, RosterImporter, RosterImporterImpl};
