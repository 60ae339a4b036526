//! Device geolocation.
//!
//! The device position is whatever the host platform can provide: a GPS fix,
//! an OS location service, or a fixed position from configuration. Access may
//! be refused or slow, so callers always bound the wait.

use crate::domain::Coordinates;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// How long a position request may take before it counts as a timeout.
pub const POSITION_TIMEOUT: Duration = Duration::from_millis(8_000);

/// How old a cached position may be and still be reused.
pub const POSITION_MAXIMUM_AGE: Duration = Duration::from_millis(60_000);

/// Options for one position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: false,
            timeout: POSITION_TIMEOUT,
            maximum_age: POSITION_MAXIMUM_AGE,
        }
    }
}

/// Why no position was obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("timed out waiting for a position")]
    Timeout,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// A source of the device's current position.
#[async_trait]
pub trait DeviceGeolocation: Send + Sync {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, GeolocationError>;
}

/// Always reports the same position.
///
/// Backs the command line's `device_position` setting.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocation(pub Coordinates);

#[async_trait]
impl DeviceGeolocation for FixedGeolocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// A platform without any location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl DeviceGeolocation for NoGeolocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unavailable("no location provider".to_string()))
    }
}

/// Reuses the last fix while it is younger than `maximum_age`.
///
/// Failed requests are not cached, so a denial is asked again next time.
#[derive(Debug)]
pub struct CachingGeolocation<G> {
    inner: G,
    last_fix: Mutex<Option<(Instant, Coordinates)>>,
}

impl<G: DeviceGeolocation> CachingGeolocation<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            last_fix: Mutex::new(None),
        }
    }

    fn cached(&self, maximum_age: Duration) -> Option<Coordinates> {
        let guard = self.last_fix.lock().ok()?;
        let (taken_at, position) = (*guard)?;
        (taken_at.elapsed() <= maximum_age).then_some(position)
    }
}

#[async_trait]
impl<G: DeviceGeolocation> DeviceGeolocation for CachingGeolocation<G> {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, GeolocationError> {
        if let Some(position) = self.cached(options.maximum_age) {
            tracing::debug!(%position, "reusing cached device position");
            return Ok(position);
        }

        let position = self.inner.current_position(options).await?;
        if let Ok(mut guard) = self.last_fix.lock() {
            *guard = Some((Instant::now(), position));
        }
        Ok(position)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted device: answers, refuses, or hangs for a while first.
    #[derive(Debug)]
    pub struct ScriptedGeolocation {
        pub answer: Result<Coordinates, GeolocationError>,
        pub delay: Duration,
        pub calls: AtomicUsize,
    }

    impl ScriptedGeolocation {
        pub fn at(latitude: f64, longitude: f64) -> Self {
            Self {
                answer: Ok(Coordinates::new(latitude, longitude)),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn denied() -> Self {
            Self {
                answer: Err(GeolocationError::PermissionDenied),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DeviceGeolocation for ScriptedGeolocation {
        async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, GeolocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedGeolocation;
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn cache_honours_maximum_age() {
        let device = CachingGeolocation::new(ScriptedGeolocation::at(41.88, -87.63));
        let options = PositionOptions::default();

        device.current_position(&options).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        device.current_position(&options).await.unwrap();
        assert_eq!(device.inner.call_count(), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        device.current_position(&options).await.unwrap();
        assert_eq!(device.inner.call_count(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let device = CachingGeolocation::new(ScriptedGeolocation::denied());
        let options = PositionOptions::default();
        assert_eq!(
            device.current_position(&options).await,
            Err(GeolocationError::PermissionDenied)
        );
        assert!(device.current_position(&options).await.is_err());
        assert_eq!(device.inner.call_count(), 2);
    }
}
