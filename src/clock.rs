use chrono::{DateTime, FixedOffset, Utc};

const IST_SECONDS: i32 = 5 * 3600 + 1800;

/// Indian Standard Time (UTC+05:30). The exchange, the alert times, and the
/// log timestamps all live in this offset.
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_SECONDS).expect("IST offset is in range")
}

/// Current wall-clock time in IST.
pub fn ist_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&ist())
}
