#[derive(Clone, Debug)]
pub struct Throttle {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Self {
        Throttle {
            interval_ms: interval_ms.max(0.0),
            last_ms: None,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// True on the first call and whenever `interval_ms` has passed since the
    /// last accepted call. A clock that jumps backwards is accepted.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms - last >= self.interval_ms || now_ms < last,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
