use std::rc::Rc;

/// Source of "now" in epoch milliseconds.
pub type Clock = Rc<dyn Fn() -> i64>;

pub fn system_clock() -> Clock {
    Rc::new(|| chrono::Utc::now().timestamp_millis())
}

pub fn fixed_clock(now_ms: i64) -> Clock {
    Rc::new(move || now_ms)
}
