//! 协调存储写入契约。
//!
//! # 设计目标（Why）
//! - 上层诊断组件只需要两种合并写入：控制器作用域与成员作用域；连接、会话与序列化都由宿主实现负责。
//! - 契约以同步方法表达：审计等旁路组件在执行器线程内直接调用，阻塞点只有存储本身。
//!
//! # 契约概览（What）
//! - [`CoordinationStore::merge_controller_property`]：在控制器命名空间的 `sub_path` 下合并记录；
//! - [`CoordinationStore::merge_member_property`]：在成员 `member` 的命名空间下，以 `(sub_path, entry_key)` 定位记录并合并；
//! - 两者都必须在条目级做加法合并（见 [`Record::merge`]），并允许对同一路径下不同条目并发调用。
//!
//! # 风险与注意事项（Trade-offs）
//! - 契约不规定重试；实现返回 [`StoreError`] 后由调用方决定是否放弃。

mod in_memory;

pub use in_memory::{InMemoryCoordinationStore, StoreWrite};

use crate::error::StoreError;
use crate::property::PropertyType;
use crate::record::Record;

/// 协调存储的合并写入接口。
pub trait CoordinationStore: Send + Sync {
    fn merge_controller_property(
        &self,
        property: PropertyType,
        sub_path: &str,
        record: &Record,
    ) -> Result<(), StoreError>;

    fn merge_member_property(
        &self,
        member: &str,
        property: PropertyType,
        sub_path: &str,
        entry_key: &str,
        record: &Record,
    ) -> Result<(), StoreError>;
}
