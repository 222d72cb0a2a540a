//! # 记录键派生
//!
//! ## 核心意图（Why）
//! - 成千上万条瞬时协议消息需要聚合成少量可浏览的记录：同一会话内同一分区组的全部迁移合并到一条记录，
//!   其余一次性消息（调度命令等）按类型各自聚合；
//! - 派生规则集中在此处的 `match` 中，便于审阅。
//!
//! ## 行为契约（What）
//! - 全部函数为纯函数、全函数：不读写共享状态，不返回错误；
//! - 缺失字段产生空片段而非失败（例如迁移消息缺少分区组键时路径为 `session__`）；
//! - [`entry_id`] 以定宽时间戳开头，同一记录内字典序与时间序一致；末尾的随机 UUID 保证同一微秒、
//!   同一分区组的条目仍然唯一。

use chrono::{DateTime, Utc};
use uuid::Uuid;

use cadre_core::{Message, MessageKind};

use crate::level::AuditLevel;

/// 迁移记录路径中会话 ID 与分区组键之间的分隔符。
pub const SESSION_GROUP_SEPARATOR: &str = "__";

/// 条目 ID 中时间戳的格式，渲染结果定长 22 个字符。
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S%.6f";

/// 内容快照记录的存储路径。
pub fn record_path(msg: &Message) -> String {
    match msg.kind() {
        MessageKind::StateTransition(transition) => format!(
            "{}{SESSION_GROUP_SEPARATOR}{}",
            msg.target_session_id(),
            transition.partition_group_key()
        ),
        MessageKind::Other(tag) => tag.clone(),
    }
}

/// 状态/错误记录在命名空间下的子路径。
///
/// 规则目前与 [`record_path`] 相同，两者分开是为了新消息类型可以独立演进。
pub fn namespace_sub_path(msg: &Message) -> String {
    match msg.kind() {
        MessageKind::StateTransition(transition) => format!(
            "{}{SESSION_GROUP_SEPARATOR}{}",
            msg.target_session_id(),
            transition.partition_group_key()
        ),
        MessageKind::Other(tag) => tag.clone(),
    }
}

/// 成员作用域写入时定位记录的键：迁移按分区组，其余按消息 ID。
pub fn entry_key(msg: &Message) -> &str {
    match msg.kind() {
        MessageKind::StateTransition(transition) => transition.partition_group_key(),
        MessageKind::Other(_) => msg.id(),
    }
}

/// 以 [`TIMESTAMP_FORMAT`] 渲染时间戳。
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// 生成条目 ID，随机后缀为新的 v4 UUID。
pub fn entry_id(msg: &Message, level: AuditLevel, timestamp: &DateTime<Utc>) -> String {
    entry_id_with_suffix(msg, level, timestamp, Uuid::new_v4())
}

/// 生成条目 ID，随机后缀由调用方给出。
///
/// - 迁移：`"<level> <ts> <group> Trans:<from[0]>-><to[0]>  <uuid>"`
/// - 其他：`"<level> <ts> <tag><uuid>"`
///
/// 级别右对齐到 4 列、时间戳右对齐到 26 列。
pub fn entry_id_with_suffix(
    msg: &Message,
    level: AuditLevel,
    timestamp: &DateTime<Utc>,
    suffix: Uuid,
) -> String {
    let prefix = format!("{:>4} {:>26} ", level, format_timestamp(timestamp));
    match msg.kind() {
        MessageKind::StateTransition(transition) => format!(
            "{prefix}{} Trans:{}->{}  {}",
            transition.partition_group_key(),
            leading_char(transition.from_state()),
            leading_char(transition.to_state()),
            suffix.hyphenated()
        ),
        MessageKind::Other(tag) => format!("{prefix}{tag}{}", suffix.hyphenated()),
    }
}

/// 状态名只有首字符有意义；空状态返回空片段。
fn leading_char(state: &str) -> &str {
    state
        .char_indices()
        .nth(1)
        .map_or(state, |(end, _)| &state[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64, micros: u32) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, micros * 1_000).expect("valid instant")
    }

    fn transition() -> Message {
        Message::builder("m-1", MessageKind::state_transition("P1", "OFFLINE", "SLAVE"))
            .target("node1", "s-42")
            .build()
    }

    #[test]
    fn transition_rules() {
        let msg = transition();
        assert_eq!(record_path(&msg), "s-42__P1");
        assert_eq!(namespace_sub_path(&msg), "s-42__P1");
        assert_eq!(entry_key(&msg), "P1");
    }

    #[test]
    fn other_kind_rules() {
        let msg = Message::builder("m-7", MessageKind::other("SCHEDULER_MSG"))
            .target("node2", "s-1")
            .build();
        assert_eq!(record_path(&msg), "SCHEDULER_MSG");
        assert_eq!(namespace_sub_path(&msg), "SCHEDULER_MSG");
        assert_eq!(entry_key(&msg), "m-7");
    }

    #[test]
    fn timestamp_is_fixed_width() {
        // 2023-11-14T22:13:20.000042Z
        assert_eq!(format_timestamp(&at(1_700_000_000, 42)), "20231114-221320.000042");
        assert_eq!(format_timestamp(&at(0, 0)).len(), 22);
    }

    #[test]
    fn transition_entry_id_layout() {
        let ts = at(1_700_000_000, 42);
        let id = entry_id_with_suffix(&transition(), AuditLevel::Info, &ts, Uuid::nil());
        assert_eq!(
            id,
            "INFO     20231114-221320.000042 P1 Trans:O->S  00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn other_entry_id_layout() {
        let msg = Message::builder("m-7", MessageKind::other("SCHEDULER_MSG")).build();
        let ts = at(1_700_000_000, 42);
        let id = entry_id_with_suffix(&msg, AuditLevel::Warning, &ts, Uuid::nil());
        assert_eq!(
            id,
            "WARNING     20231114-221320.000042 SCHEDULER_MSG00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn missing_transition_fields_produce_empty_segments() {
        let msg = Message::builder("m-9", MessageKind::state_transition("", "", "")).build();
        assert_eq!(record_path(&msg), "__");
        assert_eq!(entry_key(&msg), "");
        let id = entry_id_with_suffix(&msg, AuditLevel::Error, &at(0, 0), Uuid::nil());
        assert!(id.contains(" Trans:->  "), "空状态应产生空片段: {id}");
    }

    #[test]
    fn entries_sort_chronologically_within_a_level() {
        let msg = transition();
        let earlier = entry_id(&msg, AuditLevel::Info, &at(1_700_000_000, 999_999));
        let later = entry_id(&msg, AuditLevel::Info, &at(1_700_000_001, 0));
        assert!(earlier < later);
    }

    #[test]
    fn leading_char_handles_multibyte_states() {
        assert_eq!(leading_char("ÉTAT"), "É");
        assert_eq!(leading_char("M"), "M");
        assert_eq!(leading_char(""), "");
    }
}
