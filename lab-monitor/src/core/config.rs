use std::path::PathBuf;

/// Store file name inside the work directory
const DB_FILE_NAME: &str = "lounge.redb";

/// 监控配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (支持 `.env` 文件)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./gamelab-data | 工作目录 (数据库、日志) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志文件目录 (可选) |
/// | TICK_INTERVAL_MS | 1000 | 倒计时周期(毫秒) |
/// | WARNING_THRESHOLD_SECS | 120 | 剩余时间提醒阈值(秒) |
/// | MAX_SESSION_MINUTES | 240 | 单次会话最长分钟数 |
/// | DEFAULT_SESSION_MINUTES | 30 | 控制台默认会话分钟数 |
/// | EXPIRY_NOTICE_MS | 10000 | 到时通知显示时长(毫秒) |
/// | ENABLE_SOUND | true | 到时响铃 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/gamelab WARNING_THRESHOLD_SECS=300 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub tick_interval_ms: u64,
    pub warning_threshold_secs: u32,
    pub max_session_minutes: u32,
    pub default_session_minutes: u32,
    pub expiry_notice_ms: u64,
    pub enable_sound: bool,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or(defaults.work_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            tick_interval_ms: env_parse("TICK_INTERVAL_MS", defaults.tick_interval_ms).max(1),
            warning_threshold_secs: env_parse("WARNING_THRESHOLD_SECS", defaults.warning_threshold_secs),
            max_session_minutes: env_parse("MAX_SESSION_MINUTES", defaults.max_session_minutes).max(1),
            default_session_minutes: env_parse("DEFAULT_SESSION_MINUTES", defaults.default_session_minutes)
                .max(1),
            expiry_notice_ms: env_parse("EXPIRY_NOTICE_MS", defaults.expiry_notice_ms),
            enable_sound: env_parse("ENABLE_SOUND", defaults.enable_sound),
        }
    }

    /// 使用自定义工作目录，其余为内置默认值 (不读取环境变量)
    ///
    /// 常用于测试场景
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.work_dir = work_dir.into();
        config
    }

    /// Path of the lounge store file
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(DB_FILE_NAME)
    }
}

/// 内置默认值
impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "./gamelab-data".into(),
            log_level: "info".into(),
            log_dir: None,
            tick_interval_ms: 1000,
            warning_threshold_secs: 120,
            max_session_minutes: 240,
            default_session_minutes: 30,
            expiry_notice_ms: 10_000,
            enable_sound: true,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_under_work_dir() {
        let config = Config::with_work_dir("/tmp/lounge");
        assert_eq!(config.db_path(), PathBuf::from("/tmp/lounge/lounge.redb"));
    }

    #[test]
    fn test_with_work_dir_ignores_environment() {
        // Only test in this crate that touches these variables
        unsafe { std::env::set_var("WARNING_THRESHOLD_SECS", "5") };
        unsafe { std::env::set_var("ENABLE_SOUND", "false") };

        let config = Config::with_work_dir("/tmp/lounge");
        assert_eq!(config.warning_threshold_secs, 120);
        assert!(config.enable_sound);
        assert_eq!(config.max_session_minutes, 240);

        let from_env = Config::from_env();
        assert_eq!(from_env.warning_threshold_secs, 5);
        assert!(!from_env.enable_sound);

        unsafe { std::env::remove_var("WARNING_THRESHOLD_SECS") };
        unsafe { std::env::remove_var("ENABLE_SOUND") };
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        // Variable names unique to this test so parallel tests don't race
        unsafe { std::env::set_var("LAB_MONITOR_TEST_PARSE", "not-a-number") };
        assert_eq!(env_parse("LAB_MONITOR_TEST_PARSE", 42u32), 42);
        unsafe { std::env::set_var("LAB_MONITOR_TEST_PARSE", " 7 ") };
        assert_eq!(env_parse("LAB_MONITOR_TEST_PARSE", 42u32), 7);
        assert!(env_parse("LAB_MONITOR_TEST_MISSING", true));
    }
}
