use core::fmt;

/// 审计条目的严重级别。
///
/// # 教案式说明
/// - **意图 (Why)**：级别决定条目 ID 前缀，并触发 “错误升级”：`Error` 条目额外写入错误命名空间；
/// - **契约 (What)**：封闭枚举，升级规则由发布器中的显式分支实现，见 [`AuditLevel::is_error`]。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AuditLevel {
    Error,
    Warning,
    Info,
}

impl AuditLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            AuditLevel::Error => "ERROR",
            AuditLevel::Warning => "WARNING",
            AuditLevel::Info => "INFO",
        }
    }

    pub const fn is_error(self) -> bool {
        matches!(self, AuditLevel::Error)
    }
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` 保留调用方的宽度与对齐参数，条目 ID 依赖 `{:>4}`。
        f.pad(self.as_str())
    }
}
