// ==========================================
// 考场座位分配系统 - 分配配置读取 Trait
// ==========================================
// 职责: 定义分配流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::{AllocationMode, AmbiguityPolicy};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// AllocationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait AllocationConfigReader: Send + Sync {
    /// 默认分配模式
    ///
    /// # 默认值
    /// - PRIORITY
    async fn get_default_mode(&self) -> RepositoryResult<AllocationMode>;

    /// 随机模式种子（未配置时每次运行使用新随机源）
    async fn get_random_seed(&self) -> RepositoryResult<Option<u64>>;

    /// 中心标签歧义处理策略
    ///
    /// # 默认值
    /// - REJECT
    async fn get_ambiguity_policy(&self) -> RepositoryResult<AmbiguityPolicy>;
}
