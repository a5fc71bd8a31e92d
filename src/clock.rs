use std::time::{Duration, Instant};

/// Play time of one game, excluding the time spent paused.
#[derive(Copy, Clone, Debug)]
pub struct GameClock {
    started: Instant,
    paused_total: Duration,
    paused_since: Option<Instant>,
}

impl GameClock {
    pub fn start(now: Instant) -> Self {
        GameClock { started: now, paused_total: Duration::ZERO, paused_since: None }
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused_since.is_none() {
            self.paused_since = Some(now);
        }
    }

    /// Folds the span since [`GameClock::pause`] into the paused total and
    /// returns it.
    pub fn resume(&mut self, now: Instant) -> Duration {
        match self.paused_since.take() {
            Some(since) => {
                let span = now.saturating_duration_since(since);
                self.paused_total += span;
                span
            }
            None => Duration::ZERO,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    pub fn paused_total(&self) -> Duration {
        self.paused_total
    }

    /// `now - start - paused`, frozen at the pause instant while paused.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let now = self.paused_since.unwrap_or(now);
        now.saturating_duration_since(self.started).saturating_sub(self.paused_total)
    }
}

/// `MM:SS`, minutes keep growing past 99.
pub fn format_runtime(runtime: Duration) -> String {
    let secs = runtime.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn elapsed_excludes_pauses() {
        let t0 = Instant::now();
        let mut clock = GameClock::start(t0);

        clock.pause(t0 + ms(1_000));
        assert_eq!(clock.elapsed(t0 + ms(5_000)), ms(1_000));

        assert_eq!(clock.resume(t0 + ms(4_000)), ms(3_000));
        assert_eq!(clock.elapsed(t0 + ms(6_000)), ms(3_000));

        clock.pause(t0 + ms(7_000));
        clock.resume(t0 + ms(7_500));
        assert_eq!(clock.paused_total(), ms(3_500));
        assert_eq!(clock.elapsed(t0 + ms(10_000)), ms(6_500));
    }

    #[test]
    fn double_pause_keeps_the_first_instant() {
        let t0 = Instant::now();
        let mut clock = GameClock::start(t0);
        clock.pause(t0 + ms(100));
        clock.pause(t0 + ms(900));
        assert_eq!(clock.resume(t0 + ms(1_100)), ms(1_000));
        assert_eq!(clock.resume(t0 + ms(2_000)), Duration::ZERO);
    }

    #[test]
    fn runtime_is_minutes_and_seconds() {
        assert_eq!(format_runtime(Duration::ZERO), "00:00");
        assert_eq!(format_runtime(ms(61_999)), "01:01");
        assert_eq!(format_runtime(Duration::from_secs(100 * 60 + 5)), "100:05");
    }
}
