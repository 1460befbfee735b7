//! Fuzzer corpus artifacts.
//!
//! Reads the `.metadata` files a fuzzer writes next to its testcases and
//! turns them into something a packet analyzer can open: decoded pcaps,
//! deduplicated corpus trees. Also maps unstable coverage offsets back to
//! source locations.

pub mod dedup;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod pool;
pub mod stability;

pub use dedup::{dedup, DedupKey, DedupOptions, DedupReport};
pub use error::{ArtifactError, Result};
pub use extract::{extract_flat_pcaps, ExtractReport};
pub use metadata::TestcaseMetadata;
pub use stability::{Addr2Line, StabilityReport, Symbolizer};
