// ==========================================
// 考场座位分配系统 - 分配前校验
// ==========================================
// 规则: 所有检查全部执行并汇总为一份报告；
//       只要报告非空，分配引擎不运行（在运行边界快速失败，而非在检查边界）
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::room::RoomInventory;
use crate::engine::error::{ValidationIssue, ValidationReport};
use crate::engine::resolver::CenterResolver;
use crate::importer::field_mapper::column_aliases;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// 考生名单必需列（标准名）
pub const REQUIRED_CANDIDATE_FIELDS: [&str; 7] = [
    "Code",
    "LastName",
    "FirstName",
    "region",
    "province",
    "exam_center",
    "language",
];

/// 考场清单必需列（标准名）
pub const REQUIRED_ROOM_FIELDS: [&str; 4] = ["center", "name", "capacity", "type"];

// ==========================================
// Validator - 校验器
// ==========================================
pub struct Validator {
    resolver: CenterResolver,
}

impl Validator {
    pub fn new(resolver: CenterResolver) -> Self {
        Self { resolver }
    }

    /// 校验表头是否包含必需列（允许别名）
    ///
    /// # 参数
    /// - `entity`: "candidate" / "room"
    /// - `headers`: 文件表头
    /// - `required`: 必需列标准名
    pub fn check_columns(entity: &str, headers: &[String], required: &[&str]) -> Vec<ValidationIssue> {
        let present: HashSet<&str> = headers.iter().map(|h| h.trim()).collect();

        required
            .iter()
            .filter(|field| {
                !column_aliases(field)
                    .iter()
                    .any(|alias| present.contains(alias))
            })
            .map(|field| ValidationIssue::MissingField {
                entity: entity.to_string(),
                field: field.to_string(),
                context: Some("文件表头缺少该列".to_string()),
            })
            .collect()
    }

    /// 对名单与清单执行全部检查
    #[instrument(skip_all, fields(candidates = candidates.len(), rooms = inventory.rooms().len()))]
    pub fn validate(&self, candidates: &[Candidate], inventory: &RoomInventory) -> ValidationReport {
        let mut report = ValidationReport::new();

        if candidates.is_empty() {
            report.push(ValidationIssue::EmptyRoster);
        }
        if inventory.is_empty() {
            report.push(ValidationIssue::EmptyInventory);
        }

        self.check_candidate_records(candidates, &mut report);
        self.check_room_records(inventory, &mut report);

        // 总容量
        let total_capacity = inventory.total_capacity();
        let required = candidates.len() as u64;
        if !inventory.is_empty() && total_capacity < required {
            report.push(ValidationIssue::InsufficientCapacity {
                center: None,
                capacity: total_capacity,
                required,
            });
        }

        self.check_centers(candidates, inventory, &mut report);

        debug!(issues = report.len(), "校验完成");
        report
    }

    // ==========================================
    // 分项检查
    // ==========================================

    fn check_candidate_records(&self, candidates: &[Candidate], report: &mut ValidationReport) {
        let mut names_by_code: HashMap<&str, Vec<String>> = HashMap::new();
        let mut code_order: Vec<&str> = Vec::new();

        for (idx, candidate) in candidates.iter().enumerate() {
            let code = candidate.code.trim();
            if code.is_empty() {
                report.push(missing_candidate_field("Code", format!("第 {} 条记录", idx + 1)));
                continue;
            }
            if candidate.last_name.trim().is_empty() {
                report.push(missing_candidate_field("LastName", format!("考生 {}", code)));
            }
            if candidate.first_name.trim().is_empty() {
                report.push(missing_candidate_field("FirstName", format!("考生 {}", code)));
            }

            let names = names_by_code.entry(code).or_insert_with(|| {
                code_order.push(code);
                Vec::new()
            });
            names.push(candidate.full_name());
        }

        for code in code_order {
            let names = &names_by_code[code];
            if names.len() > 1 {
                report.push(ValidationIssue::DuplicateCandidate {
                    code: code.to_string(),
                    names: names.join(", "),
                });
            }
        }
    }

    fn check_room_records(&self, inventory: &RoomInventory, report: &mut ValidationReport) {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();

        for room in inventory.rooms() {
            if room.center.is_empty() {
                report.push(ValidationIssue::MissingField {
                    entity: "room".to_string(),
                    field: "center".to_string(),
                    context: Some(format!("考场 '{}'", room.name)),
                });
            }
            if room.name.is_empty() {
                report.push(ValidationIssue::MissingField {
                    entity: "room".to_string(),
                    field: "name".to_string(),
                    context: Some(format!("中心 '{}'", room.center)),
                });
                continue;
            }
            if room.capacity == 0 {
                report.push(ValidationIssue::InvalidCapacity {
                    center: room.center.clone(),
                    room: room.name.clone(),
                    capacity: room.capacity,
                });
            }
            if !seen.insert((room.center.as_str(), room.name.as_str())) {
                report.push(ValidationIssue::DuplicateRoom {
                    center: room.center.clone(),
                    room: room.name.clone(),
                });
            }
        }
    }

    /// 中心相关检查: 未分配/无法解析/空中心/单中心容量
    fn check_centers(
        &self,
        candidates: &[Candidate],
        inventory: &RoomInventory,
        report: &mut ValidationReport,
    ) {
        let center_names = inventory.center_names();
        let mut resolved: HashMap<&str, Option<&str>> = HashMap::new();
        let mut center_order: Vec<&str> = Vec::new();
        let mut demand: HashMap<&str, u64> = HashMap::new();

        for candidate in candidates {
            let Some(label) = candidate.exam_center_label() else {
                report.push(ValidationIssue::UnassignedCenter {
                    code: candidate.code.clone(),
                });
                continue;
            };

            let center = *resolved.entry(label).or_insert_with(|| {
                match self.resolver.resolve(label, &center_names) {
                    Ok(center) => Some(center),
                    Err(err) => {
                        report.push(ValidationIssue::UnresolvedCenter(err));
                        None
                    }
                }
            });

            if let Some(center) = center {
                let count = demand.entry(center).or_insert_with(|| {
                    center_order.push(center);
                    0
                });
                *count += 1;
            }
        }

        for center in center_order {
            let rooms = inventory.center(center).map(|c| c.room_count()).unwrap_or(0);
            if rooms == 0 {
                report.push(ValidationIssue::EmptyCenter {
                    center: center.to_string(),
                });
                continue;
            }

            let capacity = inventory.center_capacity(center);
            let required = demand[center];
            if capacity < required {
                report.push(ValidationIssue::InsufficientCapacity {
                    center: Some(center.to_string()),
                    capacity,
                    required,
                });
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(CenterResolver::default())
    }
}

fn missing_candidate_field(field: &str, context: String) -> ValidationIssue {
    ValidationIssue::MissingField {
        entity: "candidate".to_string(),
        field: field.to_string(),
        context: Some(context),
    }
}
