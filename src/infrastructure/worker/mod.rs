//! Worker Layer - 后台任务
//!
//! 实现 AutosaveWorker，合并短时间内的多次保存

mod autosave_worker;

pub use autosave_worker::AutosaveWorker;
