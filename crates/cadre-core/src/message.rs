//! # 协议消息（Message）
//!
//! ## 核心意图（Why）
//! - 控制器向参与者下发状态迁移、调度命令等协议事件；执行器、分发器与审计层只读地消费同一份描述；
//! - 以带标签的枚举区分 “状态迁移” 与 “其他类型” 消息，使依赖类型的派生规则集中在一处 `match`。
//!
//! ## 行为契约（What）
//! - [`Message`] 通过 [`MessageBuilder`] 构造，构造完成后不提供任何修改接口；
//! - `simple_attributes` 是构造时刻的扁平标量快照：构建器自动写入 [`MessageAttribute`] 列出的字段，
//!   并合并调用方附加的自定义属性（同名时内置字段优先）；
//! - 缺失的迁移字段不会被校验，以空字符串保留，由上游负责数据质量。

use std::collections::BTreeMap;

/// 状态迁移消息的类型标签。
pub const STATE_TRANSITION_TAG: &str = "STATE_TRANSITION";

/// 新建消息的默认生命周期状态。
pub const DEFAULT_LIFECYCLE_STATE: &str = "new";

/// 状态迁移载荷。
///
/// # 教案式说明
/// - **意图 (Why)**：迁移总是作用于某个分区/副本组，并描述源状态与目标状态；
/// - **契约 (What)**：三个字段均按原样保存，空字符串合法。
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct StateTransition {
    partition_group_key: String,
    from_state: String,
    to_state: String,
}

impl StateTransition {
    pub fn new(
        partition_group_key: impl Into<String>,
        from_state: impl Into<String>,
        to_state: impl Into<String>,
    ) -> Self {
        Self {
            partition_group_key: partition_group_key.into(),
            from_state: from_state.into(),
            to_state: to_state.into(),
        }
    }

    /// 迁移作用的分区/副本组键。
    pub fn partition_group_key(&self) -> &str {
        &self.partition_group_key
    }

    pub fn from_state(&self) -> &str {
        &self.from_state
    }

    pub fn to_state(&self) -> &str {
        &self.to_state
    }
}

/// 消息类型。
///
/// # 教案式说明
/// - **意图 (Why)**：状态迁移需要携带额外载荷，其余类型（调度命令、任务回执等）只需一个标签；
/// - **契约 (What)**：[`MessageKind::tag`] 对迁移返回 [`STATE_TRANSITION_TAG`]，其余返回所携带的标签；
/// - **风险 (Trade-offs)**：`Other` 的标签不做去重或校验，命名规范由消息生产方约定。
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum MessageKind {
    StateTransition(StateTransition),
    Other(String),
}

impl MessageKind {
    /// 构造状态迁移类型。
    pub fn state_transition(
        partition_group_key: impl Into<String>,
        from_state: impl Into<String>,
        to_state: impl Into<String>,
    ) -> Self {
        MessageKind::StateTransition(StateTransition::new(
            partition_group_key,
            from_state,
            to_state,
        ))
    }

    /// 构造其他类型。
    pub fn other(tag: impl Into<String>) -> Self {
        MessageKind::Other(tag.into())
    }

    /// 类型标签。
    pub fn tag(&self) -> &str {
        match self {
            MessageKind::StateTransition(_) => STATE_TRANSITION_TAG,
            MessageKind::Other(tag) => tag,
        }
    }

    /// 若为状态迁移，返回其载荷。
    pub fn as_state_transition(&self) -> Option<&StateTransition> {
        match self {
            MessageKind::StateTransition(transition) => Some(transition),
            MessageKind::Other(_) => None,
        }
    }

    pub fn is_state_transition(&self) -> bool {
        matches!(self, MessageKind::StateTransition(_))
    }
}

/// 构建器自动写入 `simple_attributes` 的字段名。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MessageAttribute {
    MsgId,
    MsgType,
    SrcName,
    SrcSessionId,
    TgtName,
    TgtSessionId,
    MsgState,
    PartitionGroupKey,
    FromState,
    ToState,
}

impl MessageAttribute {
    /// 字段在快照中的名称。
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageAttribute::MsgId => "MSG_ID",
            MessageAttribute::MsgType => "MSG_TYPE",
            MessageAttribute::SrcName => "SRC_NAME",
            MessageAttribute::SrcSessionId => "SRC_SESSION_ID",
            MessageAttribute::TgtName => "TGT_NAME",
            MessageAttribute::TgtSessionId => "TGT_SESSION_ID",
            MessageAttribute::MsgState => "MSG_STATE",
            MessageAttribute::PartitionGroupKey => "PARTITION_GROUP_KEY",
            MessageAttribute::FromState => "FROM_STATE",
            MessageAttribute::ToState => "TO_STATE",
        }
    }
}

/// 一次协议事件的不可变描述。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    id: String,
    kind: MessageKind,
    source_name: Option<String>,
    source_session_id: Option<String>,
    target_name: String,
    target_session_id: String,
    lifecycle_state: String,
    simple_attributes: BTreeMap<String, String>,
    result_attributes: Option<BTreeMap<String, String>>,
}

impl Message {
    /// 以消息 ID 与类型开始构造。
    pub fn builder(id: impl Into<String>, kind: MessageKind) -> MessageBuilder {
        MessageBuilder::new(id, kind)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn source_session_id(&self) -> Option<&str> {
        self.source_session_id.as_deref()
    }

    /// 目标实例名；字面量 `controller`（忽略大小写）表示集群控制器。
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// 目标实例当前的存储会话 ID，重连后会变化。
    pub fn target_session_id(&self) -> &str {
        &self.target_session_id
    }

    /// 消息自身的处理状态，例如 `new`、`read`、`completed`。
    pub fn lifecycle_state(&self) -> &str {
        &self.lifecycle_state
    }

    pub fn simple_attributes(&self) -> &BTreeMap<String, String> {
        &self.simple_attributes
    }

    /// 迁移完成后的结果属性；未完成时为 `None`。
    pub fn result_attributes(&self) -> Option<&BTreeMap<String, String>> {
        self.result_attributes.as_ref()
    }
}

/// [`Message`] 构建器。
///
/// # 教案式说明
/// - **意图 (Why)**：消息字段较多且部分可选，构建器避免长参数列表，同时在 `build` 时一次性生成属性快照；
/// - **契约 (What)**：未设置的目标名与会话为空字符串，生命周期默认 [`DEFAULT_LIFECYCLE_STATE`]；
/// - **执行 (How)**：`build` 先写入自定义属性，再写入内置字段，保证内置字段不被覆盖。
#[derive(Clone, Debug)]
pub struct MessageBuilder {
    id: String,
    kind: MessageKind,
    source_name: Option<String>,
    source_session_id: Option<String>,
    target_name: String,
    target_session_id: String,
    lifecycle_state: String,
    extra_attributes: BTreeMap<String, String>,
    result_attributes: Option<BTreeMap<String, String>>,
}

impl MessageBuilder {
    pub fn new(id: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            id: id.into(),
            kind,
            source_name: None,
            source_session_id: None,
            target_name: String::new(),
            target_session_id: String::new(),
            lifecycle_state: DEFAULT_LIFECYCLE_STATE.to_owned(),
            extra_attributes: BTreeMap::new(),
            result_attributes: None,
        }
    }

    /// 设置消息来源实例及其会话。
    pub fn source(mut self, name: impl Into<String>, session_id: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self.source_session_id = Some(session_id.into());
        self
    }

    /// 设置目标实例及其会话。
    pub fn target(mut self, name: impl Into<String>, session_id: impl Into<String>) -> Self {
        self.target_name = name.into();
        self.target_session_id = session_id.into();
        self
    }

    pub fn lifecycle_state(mut self, state: impl Into<String>) -> Self {
        self.lifecycle_state = state.into();
        self
    }

    /// 追加一个自定义标量属性。
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_attributes.insert(key.into(), value.into());
        self
    }

    /// 追加一个结果属性。
    pub fn result_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.result_attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Message {
        let mut simple = self.extra_attributes;
        let mut put = |attr: MessageAttribute, value: &str| {
            simple.insert(attr.as_str().to_owned(), value.to_owned());
        };

        put(MessageAttribute::MsgId, &self.id);
        put(MessageAttribute::MsgType, self.kind.tag());
        if let Some(name) = &self.source_name {
            put(MessageAttribute::SrcName, name);
        }
        if let Some(session) = &self.source_session_id {
            put(MessageAttribute::SrcSessionId, session);
        }
        put(MessageAttribute::TgtName, &self.target_name);
        put(MessageAttribute::TgtSessionId, &self.target_session_id);
        put(MessageAttribute::MsgState, &self.lifecycle_state);
        if let MessageKind::StateTransition(transition) = &self.kind {
            put(
                MessageAttribute::PartitionGroupKey,
                transition.partition_group_key(),
            );
            put(MessageAttribute::FromState, transition.from_state());
            put(MessageAttribute::ToState, transition.to_state());
        }

        Message {
            id: self.id,
            kind: self.kind,
            source_name: self.source_name,
            source_session_id: self.source_session_id,
            target_name: self.target_name,
            target_session_id: self.target_session_id,
            lifecycle_state: self.lifecycle_state,
            simple_attributes: simple,
            result_attributes: self.result_attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_snapshots_scalar_fields() {
        let msg = Message::builder("m-1", MessageKind::state_transition("P1", "OFFLINE", "SLAVE"))
            .source("controller_0", "s-ctrl")
            .target("node1", "s-42")
            .attribute("STATE_MODEL_DEF", "MasterSlave")
            .attribute("MSG_ID", "spoofed")
            .build();

        assert!(msg.kind().is_state_transition());
        let attrs = msg.simple_attributes();
        assert_eq!(attrs["MSG_ID"], "m-1", "内置字段优先于自定义属性");
        assert_eq!(attrs["MSG_TYPE"], STATE_TRANSITION_TAG);
        assert_eq!(attrs["SRC_NAME"], "controller_0");
        assert_eq!(attrs["TGT_SESSION_ID"], "s-42");
        assert_eq!(attrs["PARTITION_GROUP_KEY"], "P1");
        assert_eq!(attrs["FROM_STATE"], "OFFLINE");
        assert_eq!(attrs["TO_STATE"], "SLAVE");
        assert_eq!(attrs["MSG_STATE"], DEFAULT_LIFECYCLE_STATE);
        assert_eq!(attrs["STATE_MODEL_DEF"], "MasterSlave");
        assert!(msg.result_attributes().is_none());
    }

    #[test]
    fn other_kind_has_no_transition_fields() {
        let msg = Message::builder("m-2", MessageKind::other("SCHEDULER_MSG"))
            .target("controller", "")
            .result_attribute("exit", "0")
            .build();

        assert_eq!(msg.kind().tag(), "SCHEDULER_MSG");
        assert!(msg.kind().as_state_transition().is_none());
        assert!(!msg.kind().is_state_transition());
        assert!(!msg.simple_attributes().contains_key("FROM_STATE"));
        assert!(!msg.simple_attributes().contains_key("SRC_NAME"));
        assert_eq!(msg.result_attributes().map(|r| r["exit"].as_str()), Some("0"));
    }
}
