// ==========================================
// 考场座位分配系统 - 考生领域模型
// ==========================================
// 约束: Code 在同一名单内唯一
// 约束: 进入分配后只读，引擎只复制不修改
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Candidate - 考生
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    // ===== 主键 =====
    pub code: String, // 考生编号

    // ===== 身份信息 =====
    pub last_name: String,
    pub first_name: String,

    // ===== 排序/分组维度 =====
    pub region: String,
    pub province: String,
    pub language: String, // 可能为复合值（如 "AR/FR"）

    // ===== 考试中心标签（自由文本，可为空） =====
    pub exam_center: Option<String>,

    // ===== 透传字段（算法不使用） =====
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Candidate {
    /// 构造最小考生记录（透传字段为空）
    pub fn new(
        code: impl Into<String>,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        region: impl Into<String>,
        province: impl Into<String>,
        language: impl Into<String>,
        exam_center: Option<&str>,
    ) -> Self {
        Self {
            code: code.into(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            region: region.into(),
            province: province.into(),
            language: language.into(),
            exam_center: exam_center.map(|s| s.to_string()),
            extra: BTreeMap::new(),
        }
    }

    /// 非空考试中心标签（空白视为未分配）
    pub fn exam_center_label(&self) -> Option<&str> {
        self.exam_center
            .as_deref()
            .filter(|label| !label.trim().is_empty())
    }

    /// 全名（用于日志与错误提示）
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
