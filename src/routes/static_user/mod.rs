// 静态用户：进程内固定数据，不经过数据库和缓存

mod handler;
mod model;

pub use handler::{get_static_user, list_static_users};
pub use model::static_users;
