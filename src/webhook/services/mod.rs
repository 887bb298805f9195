//! Service layer for the webhook lifecycle.

mod error;
mod lifecycle;

pub use error::{StateConsistencyError, WebhookLifecycleError, WebhookLifecycleResult};
pub use lifecycle::{IngestOutcome, InstallOutcome, WebhookLifecycleService};
