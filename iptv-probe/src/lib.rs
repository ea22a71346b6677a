pub mod channels;
mod commands;
#[cfg(feature = "browser")]
pub mod cookie;
pub mod logger;
pub mod mime;
pub mod playlist;
#[cfg(feature = "browser")]
pub mod sniffer;

#[doc(hidden)]
pub use commands::{Args, Commands};
