//! Transient page notices
//!
//! The toast element a finished export leaves on the page. At most one
//! notice is attached at a time; showing a new one replaces the previous.
//! Styling is out of scope; the element only carries its level modifier
//! class, message text and time-to-live.

use std::time::Duration;

use super::dom::{NodeId, Page};

/// Base class of the notice element
pub const NOTICE_CLASS: &str = "dashbook-export-notice";

/// How long a success notice stays up
pub const SUCCESS_NOTICE_TTL: Duration = Duration::from_secs(3);

/// How long an error notice stays up
pub const ERROR_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Outcome level of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

impl NoticeLevel {
    fn modifier(&self) -> &'static str {
        match self {
            Self::Success => "dashbook-export-notice--success",
            Self::Error => "dashbook-export-notice--error",
        }
    }

    pub fn ttl(&self) -> Duration {
        match self {
            Self::Success => SUCCESS_NOTICE_TTL,
            Self::Error => ERROR_NOTICE_TTL,
        }
    }
}

/// Shows a notice, replacing any existing one
pub fn show_notice(page: &Page, level: NoticeLevel, text: &str) -> NodeId {
    clear_notice(page);

    let node = page.create_element("div");
    page.add_class(node, NOTICE_CLASS);
    page.add_class(node, level.modifier());
    page.set_text(node, text);
    page.set_attribute(node, "data-ttl-ms", &level.ttl().as_millis().to_string());
    page.append_child(page.root(), node);
    node
}

/// Removes the current notice, if any
pub fn clear_notice(page: &Page) -> bool {
    match find_notice(page) {
        Some(node) => page.remove(node),
        None => false,
    }
}

/// The current notice's level and text, if one is attached
pub fn current_notice(page: &Page) -> Option<(NoticeLevel, String)> {
    let node = find_notice(page)?;
    let level = if page.has_class(node, NoticeLevel::Error.modifier()) {
        NoticeLevel::Error
    } else {
        NoticeLevel::Success
    };
    Some((level, page.text(node).unwrap_or_default()))
}

fn find_notice(page: &Page) -> Option<NodeId> {
    page.descendants()
        .into_iter()
        .find(|&node| page.has_class(node, NOTICE_CLASS))
}
