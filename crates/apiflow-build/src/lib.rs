//! apiflow build context packaging
//!
//! This crate turns a project directory into the gzip-compressed tar
//! archive that is uploaded to the remote build service, applying the
//! exclusion rules of the active backend protocol.

pub mod context;
pub mod error;
pub mod exclude;
pub mod progress;

pub use context::{BuildContext, ContextBuilder};
pub use error::{BuildError, BuildResult};
pub use exclude::ExclusionRules;
pub use progress::BuildProgress;
