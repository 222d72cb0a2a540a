#![deny(unsafe_code)]
#![doc = "cadre-audit: 控制器与参与者消息处理过程的诊断审计轨迹。"]
#![doc = ""]
#![doc = "== 定位 =="]
#![doc = "状态迁移执行器、消息分发器在消息生命周期的各个阶段调用 [`AuditPublisher`]，"]
#![doc = "把事件写入协调存储的状态更新命名空间；`Error` 级条目同时写入并列的错误命名空间。"]
#![doc = "同一消息的完整内容只在首次出现时快照一次，之后只追加带级别的增量条目。"]
#![doc = ""]
#![doc = "== 失败语义 =="]
#![doc = "审计是旁路：存储写入的错误与 panic 只在本地以 `tracing` 记录，从不传播给调用方。"]

/// 审计记录构建：内容快照与带级别的状态条目。
pub mod builder;

/// 墙上时钟抽象，供条目 ID 的时间前缀使用。
pub mod clock;

/// 首见登记：保证每条消息的内容快照只写一次。
pub mod dedup;

/// 启动期错误：设置解析与日志订阅器安装。
pub mod error;

/// 记录路径、成员条目键与条目 ID 的派生规则。
///
/// - **意图说明 (Why)**：把高频瞬时消息聚合为少量可浏览的记录；
/// - **契约定位 (What)**：全部为纯函数，缺失字段产生空片段而非失败。
pub mod keys;

pub mod level;
pub mod origin;

/// 审计写入编排：去重、路由、错误升级与失败隔离。
pub mod publisher;

/// 控制器名称、错误升级与回溯捕获的设置。
pub mod settings;

/// 进程本地 `fmt` 日志订阅器的安装入口。
pub mod telemetry;

pub use builder::{AuditRecordBuilder, StatusEntry};
pub use clock::{FixedWallClock, SystemWallClock, WallClock};
pub use dedup::DedupTracker;
pub use error::{SettingsError, TelemetryError};
pub use level::AuditLevel;
pub use origin::OriginTag;
pub use publisher::AuditPublisher;
pub use settings::AuditSettings;
