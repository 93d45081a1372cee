// ==========================================
// 考场座位分配系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 表头 + 行记录（列名 → 去空白后的文本）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;

const CSV_EXTENSIONS: [&str; 1] = ["csv"];
const EXCEL_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// 原始数据行
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 文件中的行号（表头为第 1 行），空行也计入
    pub line: usize,
    pub values: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// 原始表格（表头保留原始顺序，供必需列检查使用）
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// 由表头与（行号, 单元格文本）构造；行号先于空行过滤确定
    fn build<R, C>(headers: Vec<String>, records: R) -> Self
    where
        R: IntoIterator<Item = (usize, C)>,
        C: IntoIterator<Item = String>,
    {
        let rows = records
            .into_iter()
            .map(|(line, cells)| RawRow {
                line,
                values: headers
                    .iter()
                    .cloned()
                    .zip(cells.into_iter().map(|v| v.trim().to_string()))
                    .collect(),
            })
            .filter(|row| row.values.values().any(|v| !v.is_empty()))
            .collect();
        Self { headers, rows }
    }

    /// 由工作表区域构造（区域可能不从第 1 行开始）
    fn from_range(range: &Range<Data>) -> Self {
        let header_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| normalize_header(&cell.to_string()))
                .collect(),
            // 空工作表按无表头处理，由必需列检查报告
            None => return Self::default(),
        };

        Self::build(
            headers,
            rows.enumerate().map(|(idx, row)| {
                (
                    header_line + idx + 1,
                    row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>(),
                )
            }),
        )
    }
}

/// 文件解析接口
pub trait FileParser: Send + Sync {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable>;
}

/// 小写扩展名（无扩展名时为空串）
fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 检查文件存在且扩展名受支持
fn check_file(path: &Path, allowed: &[&str]) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let ext = extension_of(path);
    if !allowed.contains(&ext.as_str()) {
        return Err(ImportError::UnsupportedFormat(ext));
    }
    Ok(())
}

/// 表头去空白；Excel 另存的 CSV 常带 BOM
fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable> {
        check_file(file_path, &CSV_EXTENSIONS)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_path(file_path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
        let records = reader
            .records()
            .collect::<Result<Vec<_>, csv::Error>>()?;

        // position 记录的是物理行号，已跳过的空行同样计数
        Ok(RawTable::build(
            headers,
            records.iter().enumerate().map(|(idx, r)| {
                let line = r
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(idx + 2);
                (line, r.iter().map(str::to_string).collect::<Vec<_>>())
            }),
        ))
    }
}

// ==========================================
// Excel Parser 实现（只读取第一个工作表）
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable> {
        check_file(file_path, &EXCEL_EXTENSIONS)?;

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ParseError {
                format: "Excel",
                message: "工作簿中没有工作表".to_string(),
            })?;
        let range = workbook.worksheet_range(&sheet_name)?;

        Ok(RawTable::from_range(&range))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable> {
        let ext = extension_of(file_path);
        if CSV_EXTENSIONS.contains(&ext.as_str()) {
            CsvParser.parse(file_path)
        } else if EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            ExcelParser.parse(file_path)
        } else {
            Err(ImportError::UnsupportedFormat(ext))
        }
    }
}
