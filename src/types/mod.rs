//! Plain data types shared with the protocol layers.

mod disposition;

pub use disposition::{ContentDispositionHeader, Disposition, ParameterMetadata};
