//! Export orchestration and delivery
//!
//! The coordinator that drives one export attempt, the file-delivery
//! boundary, and the session that embeds the whole tool into a page.

pub mod coordinator;
pub mod emitter;
pub mod session;

pub use coordinator::{ExportCoordinator, ExportOutcome, LogNotifier, Notifier, PageNotifier};
pub use emitter::{DirEmitter, FileEmitter};
pub use session::ExportSession;
