//! Bundesbank statistics API adapter.
//!
//! The Bundesbank publishes the ECB euro reference rates as SDMX-JSON. A
//! response for one currency encodes time positionally: observation keys are
//! string indices into the `TIME_PERIOD` dimension's value list. This crate
//! turns that into plain `date -> rate` maps.
//!
//! - [`sdmx`] - wire types for the SDMX-JSON payload
//! - [`decode`] - pure payload decoder
//! - [`client`] - HTTP client implementing the `RateSource` port
//!
//! # Example
//! ```
//! use bundesbank_sdmx::{SdmxResponse, decode};
//!
//! let body = r#"{
//!   "data": {
//!     "structure": { "dimensions": { "observation": [
//!       { "id": "TIME_PERIOD", "values": [ { "id": "2024-01-02" } ] }
//!     ] } },
//!     "dataSets": [ { "series": { "0:0:0:0:0:0": {
//!       "observations": { "0": [ "1.0956" ] }
//!     } } } ]
//!   }
//! }"#;
//!
//! let response: SdmxResponse = serde_json::from_str(body).unwrap();
//! let outcome = decode(&response);
//! assert_eq!(outcome.rates.len(), 1);
//! ```

pub mod client;
pub mod decode;
pub mod sdmx;

pub use client::{BundesbankClient, DEFAULT_BASE_URL, SeriesKey};
pub use decode::{DecodeOutcome, Observation, SkipReason, decode, decode_observation};
pub use sdmx::SdmxResponse;
