//! # AuditPublisher：审计写入的编排入口
//!
//! ## 核心意图（Why）
//! - 状态迁移执行器、消息分发器在处理消息的各个阶段调用发布器，把事件沉淀为可合并、可浏览的历史；
//! - 审计是诊断旁路，无论存储写入如何失败，都不能影响调用方的协调协议逻辑。
//!
//! ## 发布流程（How）
//! 1. 构建状态条目；
//! 2. 若该消息 ID 首次出现，状态命名空间这一次写入的是内容快照，代替状态条目；之后的调用只写状态条目；
//! 3. 目标名（忽略大小写）等于控制器名称时走控制器作用域写入，否则以 `(成员, 子路径, 条目键)` 走成员作用域；
//! 4. `Error` 级别额外把状态条目（不是快照）按相同路由写入错误命名空间；
//! 5. 每次存储调用都经过 “捕获并记录” 包装：返回的错误与存储实现中的 panic 都被转换为一行本地错误日志。
//!
//! ## 行为契约（What）
//! - 所有公开方法无返回值，不向调用方传播任何错误或 panic；
//! - 同一消息 ID 的并发首见竞争只会产生一次快照写入，竞争失败方照常写入自己的状态条目；
//! - 失败的写入不会在本次调用内重试；快照写入失败时撤销首见登记，由下一次调用补写快照。

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use cadre_core::{CoordinationStore, Message, PropertyType, Record, StoreError};
use tracing::{debug, error};

use crate::builder::{AuditRecordBuilder, StatusEntry};
use crate::clock::WallClock;
use crate::dedup::DedupTracker;
use crate::level::AuditLevel;
use crate::origin::OriginTag;
use crate::settings::AuditSettings;

/// 附加在错误链之后的审计调用处回溯的标题行。
pub const CALL_SITE_BACKTRACE_HEADER: &str = "Audit call-site backtrace:";

/// 写入目的地。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Destination<'a> {
    Controller,
    Member(&'a str),
}

/// 审计发布器。
///
/// # 教案式说明
/// - **意图 (Why)**：集中路由、去重与错误升级，调用方只需给出消息、级别、来源与附加信息；
/// - **逻辑 (How)**：发布器持有构建器与去重登记，存储句柄在每次调用时借入，发布器不持有存储连接；
/// - **契约 (What)**：`Send + Sync`，通常以 `Arc<AuditPublisher>` 在执行器线程间共享；
/// - **风险 (Trade-offs)**：去重登记随进程生命周期增长，见 [`DedupTracker`]。
#[derive(Debug, Default)]
pub struct AuditPublisher {
    settings: AuditSettings,
    builder: AuditRecordBuilder,
    tracker: DedupTracker,
}

impl AuditPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AuditSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// 替换构建条目 ID 时使用的时钟。
    pub fn with_clock(mut self, clock: Arc<dyn WallClock>) -> Self {
        self.builder = AuditRecordBuilder::with_clock(clock);
        self
    }

    pub fn settings(&self) -> &AuditSettings {
        &self.settings
    }

    pub fn builder(&self) -> &AuditRecordBuilder {
        &self.builder
    }

    pub fn tracker(&self) -> &DedupTracker {
        &self.tracker
    }

    pub fn log_info(
        &self,
        msg: &Message,
        origin: &OriginTag,
        additional_info: &str,
        store: &dyn CoordinationStore,
    ) {
        self.publish(msg, AuditLevel::Info, origin, additional_info, store);
    }

    pub fn log_warning(
        &self,
        msg: &Message,
        origin: &OriginTag,
        additional_info: &str,
        store: &dyn CoordinationStore,
    ) {
        self.publish(msg, AuditLevel::Warning, origin, additional_info, store);
    }

    pub fn log_error(
        &self,
        msg: &Message,
        origin: &OriginTag,
        additional_info: &str,
        store: &dyn CoordinationStore,
    ) {
        self.publish(msg, AuditLevel::Error, origin, additional_info, store);
    }

    /// 记录一条 `Error` 条目，并把 `failure` 的完整错误链附加到附加信息之后。
    ///
    /// 错误链依次为 `Display`、每一层 `source()`（`Caused by:` 行）以及可用时捕获的回溯。
    pub fn log_error_with(
        &self,
        msg: &Message,
        origin: &OriginTag,
        failure: &(dyn StdError + 'static),
        additional_info: &str,
        store: &dyn CoordinationStore,
    ) {
        let call_site = self
            .settings
            .capture_backtrace()
            .then(Backtrace::capture);
        let trace = render_failure_trace(failure, call_site.as_ref());
        let info = if additional_info.is_empty() {
            trace
        } else {
            format!("{additional_info}\n{trace}")
        };
        self.publish(msg, AuditLevel::Error, origin, &info, store);
    }

    /// 发布一条审计条目。见模块文档中的发布流程。
    ///
    /// # 教案式说明
    /// - **契约 (What)**：
    ///   - 快照写入失败（错误或 panic）时撤销首见登记，同一消息的下一次调用会再次写入快照；
    ///     因此快照可能重复写入，但不会丢失；
    ///   - 首次调用即为 `Error` 级别时，状态命名空间只收到快照，状态条目仍写入错误命名空间。
    ///     早期的集群管理实现在写完快照后直接返回，不写错误命名空间；这里保留错误轨迹的完整性。
    pub fn publish(
        &self,
        msg: &Message,
        level: AuditLevel,
        origin: &OriginTag,
        additional_info: &str,
        store: &dyn CoordinationStore,
    ) {
        let entry = self
            .builder
            .build_status_entry(msg, level, origin, additional_info);
        let destination = self.destination(msg);

        if self.tracker.mark_if_absent(msg.id()) {
            let snapshot = self.builder.build_content_snapshot(msg);
            debug!(
                message_id = msg.id(),
                path = entry.path(),
                "first sighting, writing content snapshot"
            );
            let written = self.guarded_write(
                store,
                destination,
                PropertyType::StatusUpdates,
                &entry,
                &snapshot,
                msg,
            );
            if !written {
                // 快照未落盘时撤销登记，下一次调用重新写入快照。
                self.tracker.unmark(msg.id());
            }
        } else {
            self.guarded_write(
                store,
                destination,
                PropertyType::StatusUpdates,
                &entry,
                entry.record(),
                msg,
            );
        }

        if level.is_error() && self.settings.escalate_errors() {
            debug!(
                message_id = msg.id(),
                entry_id = entry.entry_id(),
                "escalating entry to error trail"
            );
            self.guarded_write(
                store,
                destination,
                PropertyType::Errors,
                &entry,
                entry.record(),
                msg,
            );
        }
    }

    fn destination<'m>(&self, msg: &'m Message) -> Destination<'m> {
        if self.settings.is_controller(msg.target_name()) {
            Destination::Controller
        } else {
            Destination::Member(msg.target_name())
        }
    }

    /// 执行一次存储写入，把错误与 panic 转换为本地日志。返回写入是否成功。
    fn guarded_write(
        &self,
        store: &dyn CoordinationStore,
        destination: Destination<'_>,
        property: PropertyType,
        entry: &StatusEntry,
        record: &Record,
        msg: &Message,
    ) -> bool {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            write_record(store, destination, property, entry, record)
        }));

        match outcome {
            Ok(Ok(())) => true,
            Ok(Err(failure)) => {
                log_store_failure(msg, destination, property, entry, &failure);
                false
            }
            Err(payload) => {
                error!(
                    message_id = msg.id(),
                    target_name = msg.target_name(),
                    %property,
                    path = entry.path(),
                    panic = panic_message(payload.as_ref()),
                    "coordination store panicked while writing audit record; entry dropped"
                );
                false
            }
        }
    }
}

fn write_record(
    store: &dyn CoordinationStore,
    destination: Destination<'_>,
    property: PropertyType,
    entry: &StatusEntry,
    record: &Record,
) -> Result<(), StoreError> {
    match destination {
        Destination::Controller => store.merge_controller_property(property, entry.path(), record),
        Destination::Member(member) => store.merge_member_property(
            member,
            property,
            entry.path(),
            entry.entry_key(),
            record,
        ),
    }
}

fn log_store_failure(
    msg: &Message,
    destination: Destination<'_>,
    property: PropertyType,
    entry: &StatusEntry,
    failure: &StoreError,
) {
    let scope = match destination {
        Destination::Controller => "controller",
        Destination::Member(_) => "member",
    };
    error!(
        message_id = msg.id(),
        target_name = msg.target_name(),
        scope,
        %property,
        path = entry.path(),
        code = failure.code(),
        error = %failure,
        "failed to write audit record; entry dropped"
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "non-string panic payload"
    }
}

/// 渲染错误链：`Display`、逐层 `Caused by:`，以及可用时审计调用处的回溯。
///
/// 回溯在此处捕获，记录的是调用审计日志的栈而不是错误产生处，因此以单独的标题行区分。
fn render_failure_trace(
    failure: &(dyn StdError + 'static),
    call_site: Option<&Backtrace>,
) -> String {
    let mut trace = failure.to_string();
    let mut source = failure.source();
    while let Some(cause) = source {
        let _ = write!(trace, "\nCaused by: {cause}");
        source = cause.source();
    }
    if let Some(backtrace) = call_site
        && backtrace.status() == BacktraceStatus::Captured
    {
        let _ = write!(trace, "\n{CALL_SITE_BACKTRACE_HEADER}\n{backtrace}");
    }
    trace
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Leaf;

    impl fmt::Display for Leaf {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("socket closed")
        }
    }

    impl StdError for Leaf {}

    #[derive(Debug)]
    struct Wrapper(Leaf);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("transition OFFLINE->SLAVE failed")
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn failure_trace_walks_source_chain() {
        let trace = render_failure_trace(&Wrapper(Leaf), None);
        assert_eq!(trace, "transition OFFLINE->SLAVE failed\nCaused by: socket closed");
    }

    #[test]
    fn call_site_backtrace_is_labelled_after_chain() {
        let backtrace = Backtrace::force_capture();
        let trace = render_failure_trace(&Wrapper(Leaf), Some(&backtrace));
        let chain = "transition OFFLINE->SLAVE failed\nCaused by: socket closed";
        let expected_head = format!("{chain}\n{CALL_SITE_BACKTRACE_HEADER}\n");
        if backtrace.status() == BacktraceStatus::Captured {
            assert!(
                trace.starts_with(&expected_head),
                "回溯必须以调用处标题与错误链分隔: {trace}"
            );
        } else {
            assert!(!trace.contains(CALL_SITE_BACKTRACE_HEADER), "未捕获回溯时不输出标题");
        }
    }

    #[test]
    fn exposes_builder_with_injected_clock() {
        let start = chrono::DateTime::from_timestamp(1_700_000_000, 42_000).expect("合法时刻");
        let publisher =
            AuditPublisher::new().with_clock(Arc::new(crate::clock::FixedWallClock::new(start)));
        let msg = Message::builder("m-3", cadre_core::MessageKind::other("X")).build();
        let entry = publisher.builder().build_status_entry(
            &msg,
            AuditLevel::Info,
            &OriginTag::new("t"),
            "",
        );
        assert!(entry.entry_id().starts_with("INFO     20231114-221320.000042 X"));
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[test]
    fn controller_routing_uses_settings() {
        let settings = AuditSettings::default()
            .with_controller_name("leader")
            .expect("valid name");
        let publisher = AuditPublisher::with_settings(settings);
        let msg = Message::builder("m-1", cadre_core::MessageKind::other("X"))
            .target("LEADER", "")
            .build();
        assert_eq!(publisher.destination(&msg), Destination::Controller);

        let member = Message::builder("m-2", cadre_core::MessageKind::other("X"))
            .target("controller", "")
            .build();
        assert_eq!(
            publisher.destination(&member),
            Destination::Member("controller")
        );
    }
}
