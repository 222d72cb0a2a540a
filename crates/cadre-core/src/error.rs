//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为协调存储写入路径上的失败提供集中定义，上层组件（审计、状态同步）据此决定记录、重试或放弃；
//! - 与存储实现解耦：宿主可将底层客户端的错误映射到这里的少数几个类别。
//!
//! ## 设计要求（What）
//! - 所有错误类型实现 `thiserror::Error`，可直接交给 `tracing` 字段或 `?` 传播；
//! - 每个变体提供稳定的点分错误码（`store.*`），便于日志检索与告警聚合。

use thiserror::Error;

/// 协调存储写入错误。
///
/// # 教案式说明
/// - **意图 (Why)**：合并写入可能因连接、超时、序列化或服务端拒绝而失败；调用方只关心类别与上下文。
/// - **契约 (What)**：
///   - 所有变体均 `Send + Sync + 'static`，可跨线程传播；
///   - 通过 [`StoreError::code`] 获取稳定错误码。
/// - **设计权衡 (Trade-offs)**：上下文以 `String` 保存，换取日志可读性。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    /// 与协调存储的连接已断开，通常伴随会话过期。
    #[error("coordination store `{endpoint}` is disconnected")]
    Disconnected { endpoint: String },

    /// 写入在给定时限内未完成。
    #[error("write to `{path}` timed out after {millis} ms")]
    Timeout { path: String, millis: u64 },

    /// 记录无法序列化为存储格式。
    #[error("failed to serialize record for `{path}`: {detail}")]
    Serialization { path: String, detail: String },

    /// 存储端拒绝写入，例如节点版本冲突或权限不足。
    #[error("write to `{path}` rejected: {reason}")]
    Rejected { path: String, reason: String },
}

impl StoreError {
    /// 返回稳定的错误码。
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Disconnected { .. } => "store.disconnected",
            StoreError::Timeout { .. } => "store.timeout",
            StoreError::Serialization { .. } => "store.serialization",
            StoreError::Rejected { .. } => "store.rejected",
        }
    }

    /// 判断错误是否属于瞬时故障（连接或超时）。
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Disconnected { .. } | StoreError::Timeout { .. }
        )
    }
}
