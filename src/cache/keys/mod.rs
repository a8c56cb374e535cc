/// 缓存键模块
/// 提供缓存键生成函数与过期策略

// 用户缓存键模块
pub mod user_keys;

pub use user_keys::{ALL_USERS_KEY, user_key};

/// 所有缓存条目的默认过期时间（10分钟）
pub const DEFAULT_TTL_SECS: u64 = 600;
