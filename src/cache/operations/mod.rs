/// 缓存操作
/// 在缓存层之上提供带类型的读写

// 用户缓存操作
pub mod user;

pub use user::UserCacheOperations;
