//! Interval-gated automatic reloads.

use std::time::Duration;

pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_millis(1000);

/// Timestamps are offsets from the harness start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadPolicy {
    pub enabled: bool,
    pub interval: Duration,
    pub last_fire: Duration,
}

impl Default for ReloadPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: DEFAULT_RELOAD_INTERVAL,
            last_fire: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AutoReloadScheduler {
    policy: ReloadPolicy,
}

impl AutoReloadScheduler {
    pub fn new(enabled: bool, interval: Duration) -> Self {
        Self {
            policy: ReloadPolicy {
                enabled,
                interval,
                last_fire: Duration::ZERO,
            },
        }
    }

    /// Flips `enabled` and returns the new value. The timestamp is kept.
    pub fn toggle(&mut self) -> bool {
        self.policy.enabled = !self.policy.enabled;
        self.policy.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.policy.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.policy.enabled
    }

    pub fn policy(&self) -> &ReloadPolicy {
        &self.policy
    }

    /// Whether a reload is due at `now`. When it is, `now` becomes the new
    /// `last_fire`, whatever the outcome of the reload the caller runs.
    pub fn tick(&mut self, now: Duration) -> bool {
        if !self.policy.enabled {
            return false;
        }
        if now.saturating_sub(self.policy.last_fire) < self.policy.interval {
            return false;
        }
        self.policy.last_fire = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn disabled_never_fires() {
        let mut scheduler = AutoReloadScheduler::new(false, ms(1000));
        assert!((0..50).all(|i| !scheduler.tick(ms(i * 100))));
    }

    #[test]
    fn fires_once_per_interval_crossing() {
        let mut scheduler = AutoReloadScheduler::new(true, ms(1000));
        let fired: Vec<u64> = (1..=20)
            .map(|i| i * 100)
            .filter(|t| scheduler.tick(ms(*t)))
            .collect();

        assert_eq!(fired, vec![1000, 2000]);
    }

    #[test]
    fn below_interval_after_fire_does_not_fire() {
        let mut scheduler = AutoReloadScheduler::new(true, ms(1000));
        assert!(scheduler.tick(ms(1500)));
        assert!(!scheduler.tick(ms(2499)));
        assert!(scheduler.tick(ms(2500)));
        assert_eq!(scheduler.policy().last_fire, ms(2500));
    }

    #[test]
    fn toggle_only_flips_enabled() {
        let mut scheduler = AutoReloadScheduler::new(true, ms(1000));
        assert!(scheduler.tick(ms(1000)));

        assert!(!scheduler.toggle());
        assert_eq!(scheduler.policy().last_fire, ms(1000));
        assert!(!scheduler.tick(ms(5000)));

        assert!(scheduler.toggle());
        assert!(scheduler.tick(ms(5000)));
    }
}
