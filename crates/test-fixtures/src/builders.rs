use chrono::{DateTime, TimeZone, Utc};
use credence_core::models::{Assertion, MethodologyChecklist, Payload};

/// Fixed reference instant: 2024-01-01T00:00:00Z.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A text assertion with an empty methodology checklist, created at [`base_time`].
pub fn text_assertion(id: &str, text: &str) -> Assertion {
    Assertion::new(id, Payload::Text(text.to_string()), MethodologyChecklist::default(), base_time())
}

/// A checklist with every required step done.
pub fn verified_methodology() -> MethodologyChecklist {
    MethodologyChecklist::new(5, 5)
}
