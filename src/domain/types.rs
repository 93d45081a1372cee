// ==========================================
// 考场座位分配系统 - 领域类型定义
// ==========================================
// 约定: 序列化格式与数据库存储值一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 考场类型 (Room Type)
// ==========================================
// 分配规则: 同一中心内先填满 Grande，再使用 Petite
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Grande, // 大考场
    Petite, // 小考场
}

impl RoomType {
    /// 数据库/表格中的标准写法
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Grande => "Grande",
            RoomType::Petite => "Petite",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = String;

    /// 宽松解析（大小写不敏感，兼容单字母与单数写法）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grande" | "grandes" | "grand" | "g" => Ok(RoomType::Grande),
            "petite" | "petites" | "petit" | "p" => Ok(RoomType::Petite),
            other => Err(format!("无法识别的考场类型: '{}'（期望 Grande/Petite）", other)),
        }
    }
}

// ==========================================
// 分配模式 (Allocation Mode)
// ==========================================
// PRIORITY: 全局排序，结果完全确定
// RANDOM: 组内随机打乱，同输入下各考场人数分布不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationMode {
    Priority,
    Random,
}

impl AllocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationMode::Priority => "PRIORITY",
            AllocationMode::Random => "RANDOM",
        }
    }
}

impl fmt::Display for AllocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AllocationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PRIORITY" | "PRIORITAIRE" => Ok(AllocationMode::Priority),
            "RANDOM" | "ALEATOIRE" | "ALÉATOIRE" => Ok(AllocationMode::Random),
            other => Err(format!("无效的分配模式: '{}'（期望 PRIORITY/RANDOM）", other)),
        }
    }
}

// ==========================================
// 中心匹配歧义策略 (Ambiguity Policy)
// ==========================================
// Reject: 多个中心同时命中时报错（默认）
// FirstMatch: 取清单顺序中第一个命中的中心，并记录告警
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmbiguityPolicy {
    #[default]
    Reject,
    FirstMatch,
}

impl fmt::Display for AmbiguityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbiguityPolicy::Reject => write!(f, "REJECT"),
            AmbiguityPolicy::FirstMatch => write!(f, "FIRST_MATCH"),
        }
    }
}

impl FromStr for AmbiguityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "REJECT" => Ok(AmbiguityPolicy::Reject),
            "FIRST_MATCH" | "FIRSTMATCH" => Ok(AmbiguityPolicy::FirstMatch),
            other => Err(format!("无效的歧义策略: '{}'（期望 REJECT/FIRST_MATCH）", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_parse_is_lenient() {
        assert_eq!("Grande".parse::<RoomType>().unwrap(), RoomType::Grande);
        assert_eq!(" petite ".parse::<RoomType>().unwrap(), RoomType::Petite);
        assert_eq!("G".parse::<RoomType>().unwrap(), RoomType::Grande);
        assert!("moyenne".parse::<RoomType>().is_err());
    }

    #[test]
    fn test_allocation_mode_accepts_legacy_names() {
        assert_eq!("prioritaire".parse::<AllocationMode>().unwrap(), AllocationMode::Priority);
        assert_eq!("ALEATOIRE".parse::<AllocationMode>().unwrap(), AllocationMode::Random);
        assert_eq!(AllocationMode::Random.to_string(), "RANDOM");
    }

    #[test]
    fn test_ambiguity_policy_default_is_reject() {
        assert_eq!(AmbiguityPolicy::default(), AmbiguityPolicy::Reject);
        assert_eq!("first_match".parse::<AmbiguityPolicy>().unwrap(), AmbiguityPolicy::FirstMatch);
    }
}
