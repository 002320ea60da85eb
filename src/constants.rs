/// 事件中的设备 ID 字段
pub const EVENT_DEVICE_ID: &str = "deviceId";

/// 事件中的时间戳字段
pub const EVENT_TIMESTAMP: &str = "timestamp";

/// 表分区键
pub const ATTR_DEVICE_ID: &str = "deviceId";

/// 表排序键，区间开始时间
pub const ATTR_START_TIMESTAMP: &str = "startTimestamp";

/// 区间结束时间，缺失表示区间仍处于打开状态
pub const ATTR_END_TIMESTAMP: &str = "endTimestamp";

/// 默认 sled 数据目录
pub const DEFAULT_SLED_PATH: &str = "./data/intervals.sled";

/// 日志文件名前缀
pub const LOG_FILE_PREFIX: &str = "device-intervals";

/// CAS（Compare-And-Swap）操作最大重试次数
pub const MAX_CAS_RETRIES: u32 = 20;
