// ==========================================
// 考场座位分配系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 布尔标记归一 / 整数容量解析
// ==========================================

use crate::importer::error::{ImportError, ImportResult};

pub struct DataCleaner;

impl DataCleaner {
    /// 清洗文本字段（TRIM）
    pub fn clean_text(&self, value: &str) -> String {
        value.trim().to_string()
    }

    /// 标准化 NULL 值（空字符串/空白/"nan"/"None" → None）
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            match trimmed.to_lowercase().as_str() {
                "" | "nan" | "none" | "null" => None,
                _ => Some(trimmed.to_string()),
            }
        })
    }

    /// 归一化 是/否 标记
    ///
    /// "oui"/"yes"/"true"/"1"/"y"/"是" → true，其余（含空值）→ false
    pub fn parse_flag(&self, value: Option<&str>) -> bool {
        self.normalize_null(value)
            .map(|v| {
                matches!(
                    v.to_lowercase().as_str(),
                    "oui" | "yes" | "true" | "1" | "y" | "是"
                )
            })
            .unwrap_or(false)
    }

    /// 解析考场容量
    ///
    /// 兼容 Excel 数值单元格的 "30.0" 写法；必须为正整数
    pub fn parse_capacity(&self, value: &str, row: usize, field: &str) -> ImportResult<u32> {
        let trimmed = value.trim();
        let parsed = trimmed.parse::<u32>().ok().or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u32)
        });

        match parsed {
            Some(cap) if cap > 0 => Ok(cap),
            Some(cap) => Err(ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: format!("容量必须为正整数，实际 {}", cap),
            }),
            None => Err(ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: format!("无法解析为整数: {}", trimmed),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ")), None);
        assert_eq!(cleaner.normalize_null(Some("nan")), None);
        assert_eq!(cleaner.normalize_null(None), None);
        assert_eq!(cleaner.normalize_null(Some(" Rabat ")), Some("Rabat".to_string()));
    }

    #[test]
    fn test_parse_flag() {
        let cleaner = DataCleaner;
        assert!(cleaner.parse_flag(Some("Oui")));
        assert!(cleaner.parse_flag(Some("TRUE")));
        assert!(cleaner.parse_flag(Some("1")));
        assert!(cleaner.parse_flag(Some("是")));
        assert!(!cleaner.parse_flag(Some("Non")));
        assert!(!cleaner.parse_flag(Some("o")));
        assert!(!cleaner.parse_flag(Some("1.0")));
        assert!(!cleaner.parse_flag(Some("")));
        assert!(!cleaner.parse_flag(None));
    }

    #[test]
    fn test_parse_capacity() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_capacity("30", 1, "capacity").unwrap(), 30);
        assert_eq!(cleaner.parse_capacity("24.0", 1, "capacity").unwrap(), 24);
        assert!(cleaner.parse_capacity("0", 1, "capacity").is_err());
        assert!(cleaner.parse_capacity("12.5", 1, "capacity").is_err());
        assert!(cleaner.parse_capacity("abc", 2, "capacity").is_err());
    }
}
