//! Domain model
//!
//! Source dashboard snapshots on one side, the notebook output document on
//! the other, and the identity tokens stamped onto everything the export
//! produces.

pub mod dashboard;
pub mod id;
pub mod notebook;

pub use dashboard::{Dashboard, Query, Visualization, Widget};
pub use id::ObjectId;
pub use notebook::{BodyNode, NotebookDocument, NotebookPage, PageBody};
