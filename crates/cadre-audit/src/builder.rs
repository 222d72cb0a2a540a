//! # 审计记录构建
//!
//! ## 核心意图（Why）
//! - 审计写入有两种形态：消息的完整内容快照，以及带级别的状态条目；
//! - 两者都以 [`Record`] 映射字段表达，存储端的合并语义会把它们与同一路径下的历史条目累积在一起。
//!
//! ## 行为契约（What）
//! - 构建过程没有副作用，不访问存储；唯一的外部输入是注入的 [`WallClock`]；
//! - 内容快照：条目 `"MESSAGE <id>"` 保存全部简单属性；结果属性非空时追加条目 [`MESSAGE_RESULT_ENTRY`]；
//! - 状态条目：单个条目，ID 见 [`keys::entry_id`]，内容为消息状态、附加信息、来源组件与消息 ID。

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use cadre_core::{Message, Record};

use crate::clock::{SystemWallClock, WallClock};
use crate::keys;
use crate::level::AuditLevel;
use crate::origin::OriginTag;

/// 内容快照条目 ID 的前缀。
pub const MESSAGE_ENTRY_PREFIX: &str = "MESSAGE ";
/// 结果属性条目的固定 ID。
pub const MESSAGE_RESULT_ENTRY: &str = "MessageResult";

/// 状态条目内容中的字段名。
pub const FIELD_MESSAGE_STATE: &str = "Message state";
pub const FIELD_ADDITIONAL_INFO: &str = "AdditionalInfo";
pub const FIELD_CLASS: &str = "Class";
pub const FIELD_MSG_ID: &str = "MSG_ID";

/// 一条已构建、待写入的状态条目。
///
/// `path` 为命名空间下的子路径，`entry_key` 用于成员作用域定位记录，`entry_id` 为记录中唯一的条目 ID。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEntry {
    path: String,
    entry_key: String,
    entry_id: String,
    record: Record,
}

impl StatusEntry {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn entry_key(&self) -> &str {
        &self.entry_key
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }
}

/// 审计记录构建器。
///
/// # 教案式说明
/// - **意图 (Why)**：把 “消息 → 记录” 的映射与存储写入分离，构建可单独测试，发布器只负责路由；
/// - **逻辑 (How)**：持有共享时钟，状态条目的时间戳在构建时读取一次；
/// - **契约 (What)**：构建器本身无状态，可在线程间共享。
#[derive(Clone)]
pub struct AuditRecordBuilder {
    clock: Arc<dyn WallClock>,
}

impl Default for AuditRecordBuilder {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemWallClock))
    }
}

impl fmt::Debug for AuditRecordBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditRecordBuilder").finish_non_exhaustive()
    }
}

impl AuditRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<dyn WallClock>) -> Self {
        Self { clock }
    }

    /// 创建以 `id` 命名的空记录。
    pub fn empty_record(&self, id: impl Into<String>) -> Record {
        Record::new(id)
    }

    /// 构建消息的完整内容快照。
    pub fn build_content_snapshot(&self, msg: &Message) -> Record {
        let mut record = self.empty_record(keys::record_path(msg));
        record.set_map_field(
            format!("{MESSAGE_ENTRY_PREFIX}{}", msg.id()),
            msg.simple_attributes().clone(),
        );
        if let Some(result) = msg.result_attributes()
            && !result.is_empty()
        {
            record.set_map_field(MESSAGE_RESULT_ENTRY, result.clone());
        }
        record
    }

    /// 构建带级别的状态条目。
    ///
    /// # 教案式说明
    /// - **契约 (What)**：
    ///   - `origin`：上报组件，写入 [`FIELD_CLASS`]；
    ///   - `additional_info`：自由文本，可包含捕获的错误链；
    ///   - 返回值的记录 ID 与 `path` 一致，均为 [`keys::namespace_sub_path`]。
    pub fn build_status_entry(
        &self,
        msg: &Message,
        level: AuditLevel,
        origin: &OriginTag,
        additional_info: &str,
    ) -> StatusEntry {
        let path = keys::namespace_sub_path(msg);
        let entry_id = keys::entry_id(msg, level, &self.clock.now());

        let mut content = BTreeMap::new();
        content.insert(
            FIELD_MESSAGE_STATE.to_owned(),
            msg.lifecycle_state().to_owned(),
        );
        content.insert(FIELD_ADDITIONAL_INFO.to_owned(), additional_info.to_owned());
        content.insert(FIELD_CLASS.to_owned(), origin.as_str().to_owned());
        content.insert(FIELD_MSG_ID.to_owned(), msg.id().to_owned());

        let mut record = self.empty_record(path.clone());
        record.set_map_field(entry_id.clone(), content);

        StatusEntry {
            path,
            entry_key: keys::entry_key(msg).to_owned(),
            entry_id,
            record,
        }
    }
}
