// ==========================================
// 考场座位分配系统 - 导入模块错误类型
// ==========================================
// 约束: 行级错误必须带行号与字段名，便于用户回到表格修正
// ==========================================

use crate::engine::error::ValidationIssue;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: '{0}'（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("{format} 解析失败: {message}")]
    ParseError {
        format: &'static str,
        message: String,
    },

    // ===== 表头 / 单元格 =====
    #[error("表头缺少必需列: {}", .0.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("; "))]
    MissingColumns(Vec<ValidationIssue>),

    #[error("第 {row} 行: 必填字段 {field} 为空")]
    RequiredFieldEmpty { row: usize, field: String },

    #[error("第 {row} 行: 字段 {field} 取值无效: {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    // ===== 整批 =====
    #[error("导入数据存在 {} 处错误:\n{}", .0.len(), .0.join("\n"))]
    RowErrors(Vec<String>),

    #[error("文件中没有任何数据行")]
    EmptyFile,

    #[error("落库失败: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            return ImportError::FileReadError(err.to_string());
        }
        ImportError::ParseError {
            format: "CSV",
            message: err.to_string(),
        }
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ParseError {
            format: "Excel",
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
