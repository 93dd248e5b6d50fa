//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Command kinds and similar enums travel as short lowercase tokens (in logs,
//! config files, and the inbound command object). This macro keeps the
//! mapping in one place.
//!
//! # Example
//!
//! ```rust
//! use carrierlink_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum RelayOutcome {
//!     Delivered,
//!     Failed,
//! }
//!
//! impl_domain_status_conversions!(RelayOutcome {
//!     Delivered => "delivered",
//!     Failed => "failed",
//! });
//! ```

/// Implements Display and FromStr traits for token enums
///
/// Parsing is case-insensitive; the mapped strings must be lowercase.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
