//! Game Lab Monitor - 游戏室设备与计时监控
//!
//! # 架构概述
//!
//! - **倒计时引擎** (`lounge`): 会话开始/结束、每秒递减、两分钟提醒与到期通知
//! - **设备注册表** (`lounge::registry`): 有序的 PC / 主机列表
//! - **本地存储** (`storage`): redb 键值存储，JSON 值
//! - **通知** (`notify`): 日志、广播订阅、提示音
//! - **控制台** (`console`): 操作员命令行
//!
//! # 模块结构
//!
//! ```text
//! lab-monitor/src/
//! ├── core/          # 配置、状态、错误
//! ├── lounge/        # 注册表、计数器、引擎、定时器
//! ├── notify/        # 通知输出与提示音
//! ├── storage/       # redb 持久化
//! ├── utils/         # 日志
//! └── console.rs     # 操作员命令行
//! ```

pub mod console;
pub mod core;
pub mod lounge;
pub mod notify;
pub mod storage;
pub mod utils;

// Re-export 公共类型
pub use core::{AppState, CommandOutcome, Config, LoungeError, LoungeResult, LoungeStats};
pub use lounge::{LoungeCommand, SessionEngine, SessionEvent, SessionTicker, StartMode};
pub use notify::{NotificationSink, Notifier};
pub use storage::{LocalStore, StorageError};

// Re-export logger functions
pub use utils::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 .env，读取配置，创建工作目录，初始化日志
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();
    let config = Config::from_env();

    let log_dir = config.log_dir.as_deref().filter(|dir| {
        std::fs::create_dir_all(dir)
            .inspect_err(|e| eprintln!("Failed to create log directory {dir}: {e}"))
            .is_ok()
    });
    init_logger_with_file(Some(&config.log_level), log_dir);

    config
}

pub fn print_banner() {
    println!(
        r#"
   ______                        __          __
  / ____/___ _____ ___  ___     / /   ____ _/ /_
 / / __/ __ `/ __ `__ \/ _ \   / /   / __ `/ __ \
/ /_/ / /_/ / / / / / /  __/  / /___/ /_/ / /_/ /
\____/\__,_/_/ /_/ /_/\___/  /_____/\__,_/_.___/
    "#
    );
}
