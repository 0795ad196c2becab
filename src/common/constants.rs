//! Status constants so defaults stay consistent across handlers and storage.

/// Lifecycle status assigned to a readiness project when none is supplied.
pub const DEFAULT_PROJECT_STATUS: &str = "planning";

/// Status assigned to a remediation task when none is supplied.
pub const DEFAULT_TASK_STATUS: &str = "open";
