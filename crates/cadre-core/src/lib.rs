#![deny(unsafe_code)]
#![doc = "cadre-core: 集群协调框架中协调存储、协议消息与可合并记录的核心契约。"]
#![doc = ""]
#![doc = "== 定位 =="]
#![doc = "控制器与参与者通过分层协调存储交换消息、记录集群状态；本 crate 只描述上层组件消费的契约："]
#![doc = "消息数据模型、可合并记录容器、属性命名空间以及存储写入接口。存储本身（连接、会话、监听）由宿主提供。"]

/// 存储写入失败的错误域。
///
/// - **意图说明 (Why)**：审计、状态同步等旁路组件需要区分连接中断、超时与序列化失败，以决定是否记录或放弃；
/// - **契约定位 (What)**：使用 `thiserror::Error` 派生，所有变体携带可读上下文并暴露稳定错误码。
pub mod error;

/// 协议消息数据模型。
///
/// - **意图说明 (Why)**：状态迁移执行器、消息分发器与审计层共享同一份只读消息视图；
/// - **契约定位 (What)**：[`Message`] 构造后不可变，消息类型以带标签的枚举 [`MessageKind`] 表达。
pub mod message;

/// 协调存储的属性命名空间与路径布局。
pub mod property;

/// 可合并的记录容器。
///
/// - **意图说明 (Why)**：协调存储中的节点以 “id + 简单字段 + 映射字段 + 列表字段” 的形态保存，
///   合并写入只追加、不删除；
/// - **契约定位 (What)**：[`Record::merge`] 定义了与存储端一致的合并语义，便于参考实现与测试复用。
pub mod record;

/// 协调存储写入契约及进程内参考实现。
pub mod store;

pub use error::StoreError;
pub use message::{Message, MessageAttribute, MessageBuilder, MessageKind, StateTransition};
pub use property::{PropertyScope, PropertyType};
pub use record::Record;
pub use store::{CoordinationStore, InMemoryCoordinationStore, StoreWrite};
