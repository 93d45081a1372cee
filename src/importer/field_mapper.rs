// ==========================================
// 考场座位分配系统 - 字段映射器实现
// ==========================================
// 职责: 源列名（含历史表格别名） → 标准字段 + 类型转换
// 约束: 类型转换失败给出字段级错误，不向下游传递原始空值
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::room::Room;
use crate::domain::types::RoomType;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::{BTreeMap, HashMap};

/// 标准字段 → 可接受的列名（第一个为标准名）
pub fn column_aliases(field: &str) -> &'static [&'static str] {
    match field {
        // 考生
        "Code" => &["Code", "code"],
        "LastName" => &["LastName", "lastname", "last_name"],
        "FirstName" => &["FirstName", "firstname", "first_name"],
        "region" => &["region", "Region", "Région"],
        "province" => &["province", "Province"],
        "exam_center" => &["exam_center", "centreExamen", "CentreExamen", "centre_examen"],
        "language" => &["language", "langues", "Langues", "langue"],
        // 考场
        "center" => &["center", "centre", "Centres d'examen", "Centre"],
        "name" => &["name", "nom", "Locaux d'examen", "Salle"],
        "capacity" => &["capacity", "capacite", "Capacité", "capacité"],
        "type" => &["type", "Type", "TypeSalle"],
        "climatise" => &["climatise", "Climatisé", "climatisé"],
        "camera" => &["camera", "Camera", "Caméra"],
        _ => &[],
    }
}

/// 按别名取值（空白视为缺失）
fn lookup<'r>(row: &'r HashMap<String, String>, field: &str) -> Option<&'r str> {
    column_aliases(field)
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

const CANDIDATE_FIELDS: [&str; 7] = [
    "Code",
    "LastName",
    "FirstName",
    "region",
    "province",
    "exam_center",
    "language",
];

// ==========================================
// CandidateFieldMapper - 考生字段映射
// ==========================================
pub struct CandidateFieldMapper {
    cleaner: DataCleaner,
}

impl CandidateFieldMapper {
    pub fn new() -> Self {
        Self { cleaner: DataCleaner }
    }

    /// 将原始行映射为 Candidate
    ///
    /// # 参数
    /// - row: 原始行记录
    /// - row_number: 文件行号（表头为第 1 行）
    pub fn map(&self, row: &HashMap<String, String>, row_number: usize) -> ImportResult<Candidate> {
        let code = self.required(row, "Code", row_number)?;

        let mut extra = BTreeMap::new();
        for (column, value) in row {
            let known = CANDIDATE_FIELDS
                .iter()
                .any(|f| column_aliases(f).iter().any(|alias| *alias == column.as_str()));
            if !known {
                if let Some(v) = self.cleaner.normalize_null(Some(value.as_str())) {
                    extra.insert(column.clone(), v);
                }
            }
        }

        Ok(Candidate {
            code,
            last_name: self.required(row, "LastName", row_number)?,
            first_name: self.required(row, "FirstName", row_number)?,
            region: self.optional(row, "region"),
            province: self.optional(row, "province"),
            language: self.optional(row, "language"),
            exam_center: self.cleaner.normalize_null(lookup(row, "exam_center")),
            extra,
        })
    }

    fn required(&self, row: &HashMap<String, String>, field: &str, row_number: usize) -> ImportResult<String> {
        self.cleaner
            .normalize_null(lookup(row, field))
            .ok_or_else(|| ImportError::RequiredFieldEmpty {
                row: row_number,
                field: field.to_string(),
            })
    }

    fn optional(&self, row: &HashMap<String, String>, field: &str) -> String {
        self.cleaner
            .normalize_null(lookup(row, field))
            .unwrap_or_default()
    }
}

impl Default for CandidateFieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// RoomFieldMapper - 考场字段映射
// ==========================================

/// 考场表格布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomImportLayout {
    /// 必须包含 type 列
    #[default]
    Standard,
    /// 历史表格: 无 type 列，默认 Grande
    Legacy,
}

pub struct RoomFieldMapper {
    cleaner: DataCleaner,
    layout: RoomImportLayout,
}

impl RoomFieldMapper {
    pub fn new(layout: RoomImportLayout) -> Self {
        Self {
            cleaner: DataCleaner,
            layout,
        }
    }

    pub fn layout(&self) -> RoomImportLayout {
        self.layout
    }

    /// 将原始行映射为 Room
    pub fn map(&self, row: &HashMap<String, String>, row_number: usize) -> ImportResult<Room> {
        let center = self.required(row, "center", row_number)?;
        let name = self.required(row, "name", row_number)?;
        let capacity_raw = self.required(row, "capacity", row_number)?;
        let capacity = self
            .cleaner
            .parse_capacity(&capacity_raw, row_number, "capacity")?;

        let room_type = match (lookup(row, "type"), self.layout) {
            (Some(raw), _) => raw
                .parse::<RoomType>()
                .map_err(|message| ImportError::TypeConversionError {
                    row: row_number,
                    field: "type".to_string(),
                    message,
                })?,
            (None, RoomImportLayout::Legacy) => RoomType::Grande,
            (None, RoomImportLayout::Standard) => {
                return Err(ImportError::RequiredFieldEmpty {
                    row: row_number,
                    field: "type".to_string(),
                })
            }
        };

        Ok(Room {
            center,
            name,
            capacity,
            room_type,
            climatise: self.cleaner.parse_flag(lookup(row, "climatise")),
            camera: self.cleaner.parse_flag(lookup(row, "camera")),
        })
    }

    fn required(&self, row: &HashMap<String, String>, field: &str, row_number: usize) -> ImportResult<String> {
        self.cleaner
            .normalize_null(lookup(row, field))
            .ok_or_else(|| ImportError::RequiredFieldEmpty {
                row: row_number,
                field: field.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_candidate_mapping_with_legacy_columns() {
        let r = row(&[
            ("Code", "C001"),
            ("LastName", "Alami"),
            ("FirstName", "Sara"),
            ("region", "Rabat-Salé"),
            ("province", "Rabat"),
            ("centreExamen", "Lycée Ibn Sina"),
            ("langues", "AR/FR"),
            ("Genre", "F"),
            ("Score", ""),
        ]);

        let c = CandidateFieldMapper::new().map(&r, 2).unwrap();
        assert_eq!(c.code, "C001");
        assert_eq!(c.exam_center.as_deref(), Some("Lycée Ibn Sina"));
        assert_eq!(c.language, "AR/FR");
        assert_eq!(c.extra.get("Genre"), Some(&"F".to_string()));
        // 空透传字段不保留
        assert!(!c.extra.contains_key("Score"));
    }

    #[test]
    fn test_candidate_missing_code() {
        let r = row(&[("Code", " "), ("LastName", "Alami"), ("FirstName", "Sara")]);
        let err = CandidateFieldMapper::new().map(&r, 5).unwrap_err();
        assert!(matches!(err, ImportError::RequiredFieldEmpty { row: 5, ref field } if field == "Code"));
    }

    #[test]
    fn test_room_mapping_with_spreadsheet_columns() {
        let r = row(&[
            ("Centres d'examen", "Lycée Ibn Sina"),
            ("Locaux d'examen", "Salle 3"),
            ("Capacité", "24.0"),
            ("Climatisé", "Oui"),
            ("Camera", "Non"),
        ]);

        let room = RoomFieldMapper::new(RoomImportLayout::Legacy).map(&r, 2).unwrap();
        assert_eq!(room.center, "Lycée Ibn Sina");
        assert_eq!(room.capacity, 24);
        assert_eq!(room.room_type, RoomType::Grande);
        assert!(room.climatise);
        assert!(!room.camera);
    }

    #[test]
    fn test_room_type_required_in_standard_layout() {
        let r = row(&[("center", "A"), ("name", "R1"), ("capacity", "10")]);
        let err = RoomFieldMapper::new(RoomImportLayout::Standard).map(&r, 3).unwrap_err();
        assert!(matches!(err, ImportError::RequiredFieldEmpty { row: 3, ref field } if field == "type"));

        let r = row(&[("center", "A"), ("name", "R1"), ("capacity", "10"), ("type", "Moyenne")]);
        let err = RoomFieldMapper::new(RoomImportLayout::Standard).map(&r, 4).unwrap_err();
        assert!(matches!(err, ImportError::TypeConversionError { row: 4, .. }));
    }
}
