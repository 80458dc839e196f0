//! 核心模块 - 配置、状态和错误定义
//!
//! # 模块结构
//!
//! - [`Config`] - 监控配置
//! - [`AppState`] - 应用状态 (唯一的协调者)
//! - [`LoungeError`] - 领域错误

pub mod config;
pub mod error;
pub mod state;

pub use config::Config;
pub use error::{LoungeError, LoungeResult};
pub use state::{AppState, CommandOutcome, LoungeStats};
