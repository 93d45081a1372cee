// ==========================================
// 考场座位分配系统 - 考试中心解析器
// ==========================================
// 职责: 考生的自由文本"考试中心"标签 → 考场清单中的标准中心名
// 规则:
//   1) 去空白后大小写不敏感的完全匹配
//   2) 否则大小写不敏感的双向包含匹配
//   3) 否则报错 NotFound
// 同一阶段命中多个中心时按 AmbiguityPolicy 处理
// ==========================================

use crate::domain::types::AmbiguityPolicy;
use crate::engine::error::ResolveError;
use std::collections::HashMap;
use tracing::{debug, warn};

/// 标签 → 标准中心名
pub type CenterMapping = HashMap<String, String>;

// ==========================================
// CenterResolver - 中心解析器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterResolver {
    policy: AmbiguityPolicy,
}

impl CenterResolver {
    pub fn new(policy: AmbiguityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AmbiguityPolicy {
        self.policy
    }

    /// 解析单个标签
    ///
    /// # 参数
    /// - `label`: 考生的考试中心标签
    /// - `centers`: 标准中心名（清单顺序）
    ///
    /// # 返回
    /// 命中的标准中心名
    pub fn resolve<'a>(&self, label: &str, centers: &[&'a str]) -> Result<&'a str, ResolveError> {
        let needle = label.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ResolveError::Blank);
        }

        // 1) 完全匹配
        let exact: Vec<&'a str> = centers
            .iter()
            .copied()
            .filter(|c| c.trim().to_lowercase() == needle)
            .collect();
        if !exact.is_empty() {
            return self.pick(label, exact);
        }

        // 2) 双向包含
        let partial: Vec<&'a str> = centers
            .iter()
            .copied()
            .filter(|c| {
                let hay = c.trim().to_lowercase();
                !hay.is_empty() && (hay.contains(&needle) || needle.contains(&hay))
            })
            .collect();
        if !partial.is_empty() {
            debug!(label = %label, matches = ?partial, "考试中心通过包含关系匹配");
            return self.pick(label, partial);
        }

        Err(ResolveError::NotFound {
            label: label.to_string(),
        })
    }

    /// 解析一组标签（遇到第一个错误即返回）
    pub fn resolve_all<'l, I>(&self, labels: I, centers: &[&str]) -> Result<CenterMapping, ResolveError>
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut mapping = CenterMapping::new();
        for label in labels {
            if mapping.contains_key(label) {
                continue;
            }
            let center = self.resolve(label, centers)?;
            mapping.insert(label.to_string(), center.to_string());
        }
        Ok(mapping)
    }

    fn pick<'a>(&self, label: &str, matches: Vec<&'a str>) -> Result<&'a str, ResolveError> {
        if matches.len() == 1 {
            return Ok(matches[0]);
        }

        match self.policy {
            AmbiguityPolicy::Reject => Err(ResolveError::Ambiguous {
                label: label.to_string(),
                matches: matches.iter().map(|m| m.to_string()).collect(),
            }),
            AmbiguityPolicy::FirstMatch => {
                warn!(
                    label = %label,
                    matches = ?matches,
                    chosen = %matches[0],
                    "考试中心匹配到多个中心，按清单顺序取第一个"
                );
                Ok(matches[0])
            }
        }
    }
}
