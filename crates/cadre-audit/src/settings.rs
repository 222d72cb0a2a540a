//! 审计发布器的设置。
//!
//! ### 设计目的（Why）
//! - 控制器名称、错误升级与错误链回溯捕获在部署之间可能不同，集中到一个值类型中；
//! - 允许从 TOML 片段加载，缺省键回落到默认值；
//! - TOML 加载与 `with_controller_name` 共用同一空白名称校验。
//!
//! ### 契约说明（What）
//! - `controller_name`：与消息目标名忽略大小写比较，命中即走控制器作用域写入；默认 `controller`；
//! - `escalate_errors`：`Error` 级条目是否额外写入错误命名空间；默认开启；
//! - `capture_backtrace`：`log_error_with` 是否在错误链之后附加回溯；默认开启，
//!   实际是否捕获仍受 `RUST_BACKTRACE` 控制。

use serde::Deserialize;

use crate::error::SettingsError;

/// 默认的控制器名称。
pub const DEFAULT_CONTROLLER_NAME: &str = "controller";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditSettings {
    controller_name: String,
    escalate_errors: bool,
    capture_backtrace: bool,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            controller_name: DEFAULT_CONTROLLER_NAME.to_owned(),
            escalate_errors: true,
            capture_backtrace: true,
        }
    }
}

impl AuditSettings {
    pub fn controller_name(&self) -> &str {
        &self.controller_name
    }

    pub const fn escalate_errors(&self) -> bool {
        self.escalate_errors
    }

    pub const fn capture_backtrace(&self) -> bool {
        self.capture_backtrace
    }

    /// 替换控制器名称；空白名称返回 [`SettingsError::EmptyControllerName`]。
    pub fn with_controller_name(
        mut self,
        name: impl Into<String>,
    ) -> Result<Self, SettingsError> {
        let name = name.into();
        validate_controller_name(&name)?;
        self.controller_name = name;
        Ok(self)
    }

    pub fn with_error_escalation(mut self, enabled: bool) -> Self {
        self.escalate_errors = enabled;
        self
    }

    pub fn with_backtrace_capture(mut self, enabled: bool) -> Self {
        self.capture_backtrace = enabled;
        self
    }

    /// 目标名是否指向控制器（忽略大小写）。
    pub fn is_controller(&self, target_name: &str) -> bool {
        target_name.eq_ignore_ascii_case(&self.controller_name)
    }

    /// 从 TOML 片段解析设置。
    ///
    /// ```toml
    /// controller_name = "controller"
    /// escalate_errors = true
    /// capture_backtrace = false
    /// ```
    pub fn from_toml_str(raw: &str) -> Result<Self, SettingsError> {
        let repr: AuditSettingsRepr = toml::from_str(raw)?;
        let defaults = Self::default();
        let settings = Self {
            controller_name: repr.controller_name.unwrap_or(defaults.controller_name),
            escalate_errors: repr.escalate_errors.unwrap_or(defaults.escalate_errors),
            capture_backtrace: repr.capture_backtrace.unwrap_or(defaults.capture_backtrace),
        };
        validate_controller_name(&settings.controller_name)?;
        Ok(settings)
    }
}

/// 空白名称会让目标名为空的消息全部落到控制器作用域。
fn validate_controller_name(name: &str) -> Result<(), SettingsError> {
    if name.trim().is_empty() {
        return Err(SettingsError::EmptyControllerName);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AuditSettingsRepr {
    controller_name: Option<String>,
    escalate_errors: Option<bool>,
    capture_backtrace: Option<bool>,
}
