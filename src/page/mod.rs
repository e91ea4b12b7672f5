//! Host-page modeling and control injection
//!
//! The page context of the system: the element tree the host application
//! renders into, the mutation observer that keeps the export control
//! attached across re-renders, and the transient notices an export leaves
//! behind.

pub mod dom;
pub mod inject;
pub mod notice;
pub mod observer;

pub use dom::{NodeId, Page};
pub use inject::{
    control_state, ensure_control, remove_control, set_control_state, ControlState,
    EXPORT_CONTROL_ID,
};
pub use notice::{clear_notice, current_notice, show_notice, NoticeLevel};
pub use observer::DomObserver;
