use chrono::{DateTime, Utc};

/// # Summary
/// 时间供给器接口，隔离物理系统时钟。
/// 历史 K 线窗口的截止时间通过此接口获取，便于测试中固定"今天"。
pub trait TimeProvider: Send + Sync {
    /// 获取当前时间
    fn now(&self) -> DateTime<Utc>;
}

/// # Summary
/// 真实时钟，直接返回操作系统当前时间。
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// 固定时刻的虚拟时钟，测试中用来钉住"今天"。
pub struct FakeClockProvider {
    current_time: DateTime<Utc>,
}

impl FakeClockProvider {
    /// 使用指定的时间创建虚拟时钟
    pub fn new(current_time: DateTime<Utc>) -> Self {
        Self { current_time }
    }
}

impl TimeProvider for FakeClockProvider {
    fn now(&self) -> DateTime<Utc> {
        self.current_time
    }
}
