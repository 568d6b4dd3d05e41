//! Scanning client
//!
//! [`BoundedScanner`] fans files out to the detect endpoint through a
//! [`DetectTransport`], normally a [`RetryingHttpClient`]. The results are
//! tallied into a [`BatchSummary`] and failures go to an `errors.csv` side
//! file instead of aborting the batch.

pub mod bench;
pub mod discovery;
pub mod http;
pub mod organize;
pub mod report;
pub mod scanner;
pub mod types;

pub use bench::{BenchReport, run_bench};
pub use discovery::{IMAGE_EXTENSIONS, discover, is_image};
pub use http::{DetectTransport, RetryPolicy, RetryingHttpClient};
pub use organize::{Placement, organize};
pub use report::{BatchSummary, ERROR_REPORT_FILE, report_dir, write_error_report};
pub use scanner::{BoundedScanner, ScanProgress};
pub use types::{HttpReply, Outcome, RetryState, ScanResult, SendError};
