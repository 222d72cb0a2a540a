//! 协调存储中的属性类型与路径布局。
//!
//! 集群命名空间布局：
//! - 控制器：`/<cluster>/CONTROLLER/<PROPERTY>/<sub_path>`
//! - 成员实例：`/<cluster>/INSTANCES/<member>/<PROPERTY>/<sub_path>/<entry_key>`

use core::fmt;

/// 诊断相关的属性类型。
///
/// # 教案式说明
/// - **意图 (Why)**：状态更新与错误分别落在并列的命名空间，错误可独立浏览而无需扫描完整状态轨迹；
/// - **契约 (What)**：[`PropertyType::as_str`] 返回存储路径中使用的段名。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PropertyType {
    StatusUpdates,
    Errors,
}

impl PropertyType {
    pub const fn as_str(self) -> &'static str {
        match self {
            PropertyType::StatusUpdates => "STATUSUPDATES",
            PropertyType::Errors => "ERRORS",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 写入作用域：控制器或某个成员实例。
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum PropertyScope {
    Controller,
    Member(String),
}

impl PropertyScope {
    /// 渲染作用域下某属性节点的完整路径。
    ///
    /// - 控制器作用域忽略 `entry_key`；
    /// - 成员作用域在 `sub_path` 之下再以 `entry_key` 区分记录。
    pub fn path(
        &self,
        cluster: &str,
        property: PropertyType,
        sub_path: &str,
        entry_key: &str,
    ) -> String {
        match self {
            PropertyScope::Controller => {
                format!("/{cluster}/CONTROLLER/{property}/{sub_path}")
            }
            PropertyScope::Member(member) => {
                format!("/{cluster}/INSTANCES/{member}/{property}/{sub_path}/{entry_key}")
            }
        }
    }
}
