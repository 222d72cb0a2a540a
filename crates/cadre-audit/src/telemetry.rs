//! 进程本地日志的安装入口。
//!
//! 审计写入失败时，本地日志是唯一的可观测痕迹；宿主进程若尚未配置 `tracing` 订阅器，可调用
//! [`install`] 获得 `fmt + EnvFilter` 输出。`RUST_LOG` 优先于传入的默认指令。

use std::sync::OnceLock;

use tracing::dispatcher;
use tracing_subscriber::EnvFilter;

use crate::error::TelemetryError;

static INSTALLED: OnceLock<()> = OnceLock::new();

/// 安装全局 `fmt` 订阅器。
///
/// # 教案式说明
/// - **逻辑 (How)**：
///   1. 检查是否已安装，或外部已设置全局订阅器；
///   2. 先读取 `RUST_LOG`，缺失时使用 `default_directive` 构造 `EnvFilter`；
///   3. 注册订阅器并记录安装状态。
/// - **契约 (What)**：重复调用返回 [`TelemetryError::AlreadyInstalled`]；外部订阅器存在时返回
///   [`TelemetryError::SubscriberAlreadySet`]。
pub fn install(default_directive: &str) -> Result<(), TelemetryError> {
    if INSTALLED.get().is_some() {
        return Err(TelemetryError::AlreadyInstalled);
    }
    if dispatcher::has_been_set() {
        return Err(TelemetryError::SubscriberAlreadySet);
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive).map_err(|err| {
            TelemetryError::InvalidFilter {
                directive: default_directive.to_owned(),
                reason: err.to_string(),
            }
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|_| TelemetryError::SubscriberAlreadySet)?;

    INSTALLED
        .set(())
        .map_err(|_| TelemetryError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let first = install("cadre_audit=debug");
        assert!(
            matches!(first, Ok(()) | Err(TelemetryError::SubscriberAlreadySet)),
            "首次安装应成功，或因外部订阅器而拒绝: {first:?}"
        );
        assert!(install("info").is_err(), "重复安装必须返回错误");
    }
}
