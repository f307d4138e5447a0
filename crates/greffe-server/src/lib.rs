//! # greffe-server
//!
//! Admin HTTP service around the greffe-core pipeline.
//!
//! Two surfaces, both bearer-token authenticated and admin-only:
//! - batch auto-fix of template markup and metadata;
//! - the certification workflow (test, approve, reject, publish).
//!
//! Persistence is abstracted behind [`store::TemplateStore`] and
//! [`store::ActivityLog`]; the bundled [`store::MemoryStore`] backs the
//! default binary and the test suite. The real object store is an external
//! collaborator reached by id.

pub mod auth;
pub mod certify;
pub mod error;
pub mod http;
pub mod remediation;
pub mod store;

pub use auth::AdminAuth;
pub use certify::{CertificationDetail, CertificationService, CertifyError};
pub use error::AppError;
pub use http::build_router;
pub use remediation::{BatchOutcome, BatchSummary, FixReport, RemediationService};
pub use store::{ActivityEntry, ActivityLog, MemoryStore, StoreError, TemplateStore};
