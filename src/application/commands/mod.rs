//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：生成、改写、文章存储

mod article_commands;
mod generation_commands;
mod mutation_commands;

pub mod handlers;

pub use article_commands::*;
pub use generation_commands::*;
pub use mutation_commands::*;
