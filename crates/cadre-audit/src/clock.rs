//! 墙上时钟抽象。
//!
//! 条目 ID 以时间戳开头，测试需要固定的时间轴，因此时钟以 trait 注入：
//! 生产使用 [`SystemWallClock`]，测试使用可手动推进的 [`FixedWallClock`]。

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// 提供当前 UTC 时间。
pub trait WallClock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// 读取系统时间。
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定在某一时刻、只随 [`advance`](Self::advance) 前进的时钟。
///
/// # 教案式说明
/// - **意图 (Why)**：让条目 ID 的时间前缀在测试中可预测，同时能构造 “同一微秒内的多条目”；
/// - **逻辑 (How)**：以微秒精度保存在 `AtomicI64` 中，跨线程共享无需加锁；
/// - **契约 (What)**：`now` 永不回退，除非调用方显式 [`set`](Self::set)。
#[derive(Debug)]
pub struct FixedWallClock {
    micros: AtomicI64,
}

impl FixedWallClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            micros: AtomicI64::new(at.timestamp_micros()),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.micros.store(at.timestamp_micros(), Ordering::Release);
    }

    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_micros()).unwrap_or(i64::MAX);
        self.micros.fetch_add(delta, Ordering::AcqRel);
    }
}

impl WallClock for FixedWallClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.micros.load(Ordering::Acquire)).unwrap_or_default()
    }
}
