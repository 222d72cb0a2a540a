//! # error 模块说明
//!
//! 审计发布本身没有对外的错误路径（见 [`AuditPublisher`](crate::AuditPublisher)）；这里只归档
//! 启动期可能失败的两类操作：解析审计设置与安装日志订阅器。

use thiserror::Error;

/// 解析 [`AuditSettings`](crate::AuditSettings) 失败。
#[derive(Debug, Error)]
pub enum SettingsError {
    /// TOML 文本无法解析，或包含未知键。
    #[error("invalid audit settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// 控制器名称为空时无法区分控制器与成员。
    #[error("controller name must not be empty")]
    EmptyControllerName,
}

/// 安装 `tracing` 订阅器失败。
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// [`install`](crate::telemetry::install) 已成功执行过。
    #[error("audit telemetry is already installed")]
    AlreadyInstalled,

    /// 外部已设置全局 `tracing` 订阅器。
    #[error("a global tracing subscriber is already set")]
    SubscriberAlreadySet,

    /// 过滤指令无法解析。
    #[error("invalid log filter `{directive}`: {reason}")]
    InvalidFilter { directive: String, reason: String },
}
