// 用户模块
// 用户数据类型与缓存旁路协调器

pub mod service;
pub mod types;

pub use service::UserService;
pub use types::{DataSource, Sourced, User, UserInput};
