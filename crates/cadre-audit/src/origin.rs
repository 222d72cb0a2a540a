use std::sync::Arc;

use core::fmt;
use core::ops::Deref;

/// 上报审计条目的组件标识，写入条目的 `Class` 字段。
///
/// # 教案式说明
/// - **意图 (Why)**：审计轨迹需要回答 “哪个组件记录了这条状态”；状态迁移执行器、消息分发器等
///   以类型名或自定义名称标识自己；
/// - **逻辑 (How)**：内部以 `Arc<str>` 保存，克隆只增加引用计数；
/// - **契约 (What)**：[`OriginTag::of`] 使用 `core::any::type_name` 生成完整路径名，
///   [`OriginTag::new`] 接受任意文本。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OriginTag(Arc<str>);

impl OriginTag {
    pub fn new(tag: impl Into<Arc<str>>) -> Self {
        Self(tag.into())
    }

    /// 以类型 `T` 的完整路径名作为标识。
    pub fn of<T: ?Sized>() -> Self {
        Self::new(core::any::type_name::<T>())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for OriginTag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for OriginTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OriginTag {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for OriginTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TransitionExecutor;

    #[test]
    fn type_based_tag_uses_full_path() {
        let tag = OriginTag::of::<TransitionExecutor>();
        assert!(tag.ends_with("origin::tests::TransitionExecutor"));
        assert_eq!(OriginTag::from("dispatcher").as_str(), "dispatcher");
    }
}
