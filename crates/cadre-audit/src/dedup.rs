//! # DedupTracker：消息内容快照的首见登记
//!
//! ## 核心意图（Why）
//! - 每条消息的完整内容只需在第一次审计写入时快照一次，后续写入只追加增量状态条目；
//! - 任何处理消息生命周期的线程都可能针对同一消息 ID 调用发布器，登记必须是原子的 “检查并插入”。
//!
//! ## 行为契约（What）
//! - [`DedupTracker::mark_if_absent`] 在进程生命周期内对同一 ID 恰好返回一次 `true`；
//! - 登记没有淘汰；唯一的撤销路径是 [`DedupTracker::unmark`]，用于快照写入失败后的补写；
//!   消息 ID 不会跨进程重启复用。
//!
//! ## 风险提示（Trade-offs）
//! - 集合随消息数量单调增长，长生命周期进程的内存占用与处理过的消息总数成正比。

use dashmap::DashSet;

/// 已快照消息 ID 的并发集合。
///
/// 基于 `DashSet` 的分片锁实现，插入与查询只锁定单个分片，热点路径上不存在全局锁。
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen: DashSet<String>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 若 `message_id` 首次出现则登记并返回 `true`，否则返回 `false`。
    pub fn mark_if_absent(&self, message_id: &str) -> bool {
        // 已登记的 ID 走只读路径，避免为重复调用分配字符串。
        if self.seen.contains(message_id) {
            return false;
        }
        self.seen.insert(message_id.to_owned())
    }

    /// 撤销 `message_id` 的登记，返回此前是否已登记。
    ///
    /// 仅在快照写入失败时由发布器调用，使下一次调用重新赢得首见并补写快照。
    pub fn unmark(&self, message_id: &str) -> bool {
        self.seen.remove(message_id).is_some()
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.seen.contains(message_id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
