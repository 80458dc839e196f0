/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a random resource ID (UUID v4).
///
/// Unique even for back-to-back calls within the same millisecond, unlike
/// IDs derived from the wall clock.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Format remaining seconds as `m:ss` (minutes are not wrapped into hours).
pub fn format_remaining(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "0:00");
        assert_eq!(format_remaining(59), "0:59");
        assert_eq!(format_remaining(120), "2:00");
        assert_eq!(format_remaining(3605), "60:05");
    }

    #[test]
    fn test_new_id_unique_in_tight_loop() {
        let ids: std::collections::HashSet<String> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
