//! 首见登记与并发发布的竞争测试。
//!
//! # 教案级导览
//!
//! - **Why**：任何处理消息生命周期的线程都可能针对同一消息 ID 调用发布器，首见登记必须只有一个赢家，
//!   同一路径上的合并写入也不能互相覆盖；
//! - **How**：以 `Barrier` 让所有线程尽量同时进入临界路径，结束后检查登记与记录内容；
//! - **What**：断言恰好一次快照、每个竞争失败方的状态条目都在最终记录中。

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::DateTime;

use cadre_audit::{AuditPublisher, DedupTracker, FixedWallClock, OriginTag};
use cadre_core::{InMemoryCoordinationStore, Message, MessageKind, PropertyType};

const THREADS: usize = 8;

/// ## 测试一：并发 `mark_if_absent` 只有一个赢家
#[test]
fn concurrent_mark_has_single_winner() {
    for round in 0..16 {
        let tracker = Arc::new(DedupTracker::new());
        let barrier = Arc::new(Barrier::new(THREADS));
        let message_id = format!("m-{round}");

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                let barrier = Arc::clone(&barrier);
                let message_id = message_id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    tracker.mark_if_absent(&message_id)
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().expect("登记线程不应 panic"))
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1, "第 {round} 轮必须恰好一个线程赢得首见登记");
        assert_eq!(tracker.len(), 1);
    }
}

/// ## 测试二：同一消息的并发发布
///
/// - **意图 (Why)**：复现执行器与分发器同时处理新消息的竞争；
/// - **契约 (What)**：最终记录中恰好一个快照条目，另外 `THREADS - 1` 个状态条目全部保留。
#[test]
fn concurrent_publish_snapshots_once_and_keeps_every_entry() {
    let start = DateTime::from_timestamp(1_700_000_000, 0).expect("合法时刻");
    let publisher =
        Arc::new(AuditPublisher::new().with_clock(Arc::new(FixedWallClock::new(start))));
    let store = Arc::new(InMemoryCoordinationStore::new("orders"));
    let barrier = Arc::new(Barrier::new(THREADS));
    let msg = Arc::new(
        Message::builder("m-race", MessageKind::state_transition("P7", "OFFLINE", "SLAVE"))
            .target("node3", "s-9")
            .build(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let publisher = Arc::clone(&publisher);
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let msg = Arc::clone(&msg);
            thread::spawn(move || {
                let origin = OriginTag::new(format!("worker-{worker}"));
                barrier.wait();
                publisher.log_info(&msg, &origin, "racing", store.as_ref());
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("发布线程不应 panic");
    }

    let record = store
        .member_record("node3", PropertyType::StatusUpdates, "s-9__P7", "P7")
        .expect("记录已写入");
    let snapshots = record
        .map_fields()
        .keys()
        .filter(|id| id.starts_with("MESSAGE "))
        .count();
    let entries = record
        .map_fields()
        .keys()
        .filter(|id| id.starts_with("INFO "))
        .count();

    assert_eq!(snapshots, 1, "并发首见只产生一次快照");
    assert_eq!(entries, THREADS - 1, "所有竞争失败方的状态条目都保留");
    assert_eq!(store.writes().len(), THREADS);
}

/// ## 测试三：不同消息在同一路径上的并发合并
#[test]
fn concurrent_messages_merge_into_shared_record() {
    let publisher = Arc::new(AuditPublisher::new());
    let store = Arc::new(InMemoryCoordinationStore::new("orders"));

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let publisher = Arc::clone(&publisher);
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let origin = OriginTag::new("dispatcher");
                for seq in 0..10 {
                    let msg = Message::builder(
                        format!("m-{worker}-{seq}"),
                        MessageKind::state_transition("P1", "SLAVE", "MASTER"),
                    )
                    .target("node1", "s-1")
                    .build();
                    publisher.log_info(&msg, &origin, "", store.as_ref());
                    publisher.log_info(&msg, &origin, "", store.as_ref());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("发布线程不应 panic");
    }

    let record = store
        .member_record("node1", PropertyType::StatusUpdates, "s-1__P1", "P1")
        .expect("记录已写入");
    assert_eq!(
        record.map_fields().len(),
        THREADS * 10 * 2,
        "每条消息一个快照加一个状态条目，合并写入不丢条目"
    );
    assert_eq!(publisher.tracker().len(), THREADS * 10);
}
