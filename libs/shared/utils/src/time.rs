use chrono::Local;

/// Wire format for timestamps: `YYYY-MM-DD HH:MM:SS`, local clock.
pub fn local_datetime() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Wire format for dates: `YYYY-MM-DD`, local clock.
pub fn local_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

pub fn now_millis() -> i64 {
    Local::now().timestamp_millis()
}

/// Mint a backend-compatible entity id: a prefix plus the current epoch
/// milliseconds (`APT…`, `R…`). Prescription detail ids additionally carry
/// a line index suffix, composed at the call site.
pub fn time_based_id(prefix: &str) -> String {
    format!("{prefix}{}", now_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_based_id_carries_prefix() {
        let id = time_based_id("APT");
        assert!(id.starts_with("APT"));
        assert!(id.len() > 3);
        assert!(id[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_local_date_is_prefix_of_datetime() {
        let date = local_date();
        let datetime = local_datetime();
        assert!(datetime.starts_with(&date));
        assert_eq!(date.len(), 10);
        assert_eq!(datetime.len(), 19);
    }
}
