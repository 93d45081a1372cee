// ==========================================
// 考场座位分配系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 每个错误都必须带上可直接定位的上下文（考生编号/中心/字段）
// ==========================================

use std::fmt;
use thiserror::Error;

// ==========================================
// ResolveError - 中心解析错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("考试中心 '{label}' 在考场清单中不存在")]
    NotFound { label: String },

    #[error("考试中心 '{label}' 匹配到多个中心: {}", .matches.join(", "))]
    Ambiguous { label: String, matches: Vec<String> },

    #[error("考试中心标签为空")]
    Blank,
}

// ==========================================
// ValidationIssue - 分配前校验问题
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("考生名单为空")]
    EmptyRoster,

    #[error("考场清单为空")]
    EmptyInventory,

    #[error("缺少必填字段 ({entity}.{field}){}", context_suffix(.context))]
    MissingField {
        entity: String,
        field: String,
        context: Option<String>,
    },

    #[error("容量不足{}: {capacity} 个座位, {required} 名考生", center_suffix(.center))]
    InsufficientCapacity {
        center: Option<String>,
        capacity: u64,
        required: u64,
    },

    #[error("考试中心 '{center}' 没有任何考场")]
    EmptyCenter { center: String },

    #[error("考生 {code} 未指定考试中心")]
    UnassignedCenter { code: String },

    #[error(transparent)]
    UnresolvedCenter(#[from] ResolveError),

    #[error("考生编号重复: {code}（{names}）")]
    DuplicateCandidate { code: String, names: String },

    #[error("考场重复: 中心 '{center}' 中的 '{room}'")]
    DuplicateRoom { center: String, room: String },

    #[error("考场容量无效: 中心 '{center}' 中的 '{room}' 容量为 {capacity}")]
    InvalidCapacity {
        center: String,
        room: String,
        capacity: u32,
    },
}

fn context_suffix(context: &Option<String>) -> String {
    context.as_ref().map(|c| format!(": {}", c)).unwrap_or_default()
}

fn center_suffix(center: &Option<String>) -> String {
    center
        .as_ref()
        .map(|c| format!("（中心 '{}'）", c))
        .unwrap_or_default()
}

// ==========================================
// ValidationReport - 汇总校验报告
// ==========================================
// 所有检查一次跑完，整体失败
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// 是否包含满足条件的问题（测试/调用方判断用）
    pub fn has(&self, pred: impl Fn(&ValidationIssue) -> bool) -> bool {
        self.issues.iter().any(pred)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 个校验问题", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

// ==========================================
// AllocationError - 分配运行错误
// ==========================================
// NoSeatAvailable / IncompleteAllocation 表示校验之后的数据不一致或逻辑缺陷，
// 均中止整次运行，不产生任何结果。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("分配前校验失败: {0}")]
    Validation(ValidationReport),

    #[error(transparent)]
    UnresolvedCenter(#[from] ResolveError),

    #[error("中心 '{center}' 已无空余座位，无法安置考生 {code}")]
    NoSeatAvailable { code: String, center: String },

    #[error("分配不完整: 仅安置 {placed} / {expected} 名考生")]
    IncompleteAllocation { placed: usize, expected: usize },
}

/// Result 类型别名
pub type AllocationResult<T> = Result<T, AllocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display_lists_every_issue() {
        let mut report = ValidationReport::new();
        report.push(ValidationIssue::EmptyRoster);
        report.push(ValidationIssue::InsufficientCapacity {
            center: None,
            capacity: 3,
            required: 4,
        });

        let text = report.to_string();
        assert!(text.starts_with("2 个校验问题"));
        assert!(text.contains("3 个座位, 4 名考生"));
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = AllocationError::NoSeatAvailable {
            code: "C42".to_string(),
            center: "Lycée A".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("C42"));
        assert!(msg.contains("Lycée A"));

        let issue = ValidationIssue::MissingField {
            entity: "candidate".to_string(),
            field: "Code".to_string(),
            context: Some("第 3 行".to_string()),
        };
        assert_eq!(issue.to_string(), "缺少必填字段 (candidate.Code): 第 3 行");

        let amb = ResolveError::Ambiguous {
            label: "Lycée".to_string(),
            matches: vec!["Lycée A".to_string(), "Lycée B".to_string()],
        };
        assert!(amb.to_string().contains("Lycée A, Lycée B"));
    }
}
