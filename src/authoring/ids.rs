// src/authoring/ids.rs

/// Source of synthetic ids for questions, items, blanks and sub-questions.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> String,
{
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Ids taken from the millisecond clock.
///
/// Two ids minted within the same millisecond would collide, so the
/// generator bumps past the last value it handed out.
#[derive(Debug, Default)]
pub struct TimestampIds {
    last: i64,
}

impl IdGenerator for TimestampIds {
    fn next_id(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = if now > self.last { now } else { self.last + 1 };
        self.last.to_string()
    }
}
