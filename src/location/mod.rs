//! Location detection.
//!
//! # Modules
//!
//! - `resolver`: The fallback chain from IP lookup to raw coordinates
//! - `ipinfo`: IP lookup client and the lenient response decoder
//! - `geolocation`: Device position sources and their cache

pub mod geolocation;
pub mod ipinfo;
pub mod resolver;

pub use geolocation::{
    CachingGeolocation, DeviceGeolocation, FixedGeolocation, GeolocationError, NoGeolocation, PositionOptions,
};
pub use ipinfo::{HttpIpLookup, IpInfo, IpLookup};
pub use resolver::{LocationResolver, Resolution, TokenLookup, LOCATION_UNAVAILABLE};
