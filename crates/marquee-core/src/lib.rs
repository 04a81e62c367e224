//! marquee-core — configuration and the session signature primitive.
//! All other marquee crates depend on this one.

pub mod config;
pub mod sig;

pub use config::MarqueeConfig;
pub use sig::SigningKey;
