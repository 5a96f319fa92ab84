//! One-shot scheduling — compute a fire time, then arm an independent timer.
//!
//! Each accepted task gets its own spawned timer task. Pending timers never
//! share a tick loop, so a slow delivery cannot delay another task's fire.
//! There is no cancellation: once armed, a timer always eventually fires
//! (barring process termination, which abandons all pending tasks).

use std::future::Future;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use pigeonpost_core::config::ScheduleConfig;

/// How a task's fire time is derived from the schedule request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayStrategy {
    /// Fire a fixed duration after the request arrives.
    Fixed { delay: Duration },
    /// Fire at the caller-supplied appointment time plus a fixed offset.
    Offset { offset: Duration },
}

impl DelayStrategy {
    /// Build the strategy from configuration. Unknown modes are rejected at
    /// startup rather than surfacing per-request.
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, String> {
        match config.mode.as_str() {
            "fixed" => Ok(Self::Fixed {
                delay: Duration::seconds(config.delay_secs as i64),
            }),
            "offset" => Ok(Self::Offset {
                offset: Duration::hours(config.offset_hours)
                    + Duration::minutes(config.offset_minutes)
                    + Duration::seconds(config.offset_seconds),
            }),
            other => Err(format!(
                "Unknown schedule mode '{other}' (expected 'fixed' or 'offset')"
            )),
        }
    }

    /// Whether schedule requests must carry an `appointment_time`.
    pub fn requires_appointment_time(&self) -> bool {
        matches!(self, Self::Offset { .. })
    }

    /// Compute the absolute fire time for one request. Computed exactly once
    /// at creation; the result is never re-derived.
    pub fn fire_time(
        &self,
        now: DateTime<Utc>,
        requested: Option<DateTime<Utc>>,
    ) -> Result<DateTime<Utc>, String> {
        match self {
            Self::Fixed { delay } => Ok(now + *delay),
            Self::Offset { offset } => {
                let requested =
                    requested.ok_or_else(|| "appointment_time is required".to_string())?;
                Ok(requested + *offset)
            }
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::Offset { .. } => "offset",
        }
    }
}

/// Arm a one-shot timer: sleep until `fire_time`, then run the job on its
/// own tokio task. A fire time already in the past fires immediately.
pub fn schedule_once<F>(fire_time: DateTime<Utc>, job: F) -> tokio::task::JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let delay = (fire_time - Utc::now())
        .to_std()
        .unwrap_or(StdDuration::ZERO);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        job.await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn fixed_30s() -> DelayStrategy {
        DelayStrategy::Fixed {
            delay: Duration::seconds(30),
        }
    }

    #[test]
    fn test_fixed_fire_time_is_now_plus_delay() {
        let now = Utc::now();
        let fire = fixed_30s().fire_time(now, None).unwrap();
        assert_eq!(fire, now + Duration::seconds(30));
    }

    #[test]
    fn test_offset_fire_time_adds_configured_offset() {
        let strategy = DelayStrategy::Offset {
            offset: Duration::hours(1) + Duration::minutes(5),
        };
        let requested = DateTime::parse_from_rfc3339("2024-01-01T10:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        let fire = strategy.fire_time(Utc::now(), Some(requested)).unwrap();
        assert_eq!(
            fire,
            DateTime::parse_from_rfc3339("2024-01-01T11:05:00+00:00").unwrap()
        );
    }

    #[test]
    fn test_offset_requires_appointment_time() {
        let strategy = DelayStrategy::Offset {
            offset: Duration::minutes(5),
        };
        let err = strategy.fire_time(Utc::now(), None).unwrap_err();
        assert!(err.contains("appointment_time"));
    }

    #[test]
    fn test_from_config_modes() {
        let mut config = ScheduleConfig::default();
        assert_eq!(
            DelayStrategy::from_config(&config).unwrap().mode_name(),
            "fixed"
        );

        config.mode = "offset".into();
        let strategy = DelayStrategy::from_config(&config).unwrap();
        assert!(strategy.requires_appointment_time());

        config.mode = "daily".into();
        assert!(DelayStrategy::from_config(&config).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_once_fires_after_delay_not_before() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let handle = schedule_once(Utc::now() + Duration::seconds(30), async move {
            flag.store(true, Ordering::SeqCst);
        });

        // Let the timer task start sleeping; the paused clock has not
        // advanced, so it must not have fired yet.
        tokio::task::yield_now().await;
        assert!(!fired.load(Ordering::SeqCst));

        // Awaiting the handle idles the runtime, which advances the paused
        // clock to the sleep deadline.
        handle.await.unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_once_past_due_fires_immediately() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let handle = schedule_once(Utc::now() - Duration::seconds(5), async move {
            flag.store(true, Ordering::SeqCst);
        });
        handle.await.unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }
}
