//! Export control injection
//!
//! Keeps exactly one export control attached to the page. Injection is
//! idempotent (check-before-insert) and degrades to "control absent" when no
//! insertion point exists; a later mutation retries on the next observation
//! cycle. The insertion point is chosen by an ordered fallback policy:
//! a button-group container, then the refresh control, then the
//! dashboard-controls region.

use tracing::{debug, trace};

use super::dom::{NodeId, Page};

/// Fixed identity of the injected control
pub const EXPORT_CONTROL_ID: &str = "dashbook-export-control";

/// Label and icon of the enabled control
pub const IDLE_LABEL: &str = "Export YAML";
const IDLE_ICON_CLASSES: [&str; 2] = ["zmdi", "zmdi-download"];

/// Label and icon while an export is in flight
pub const BUSY_LABEL: &str = "Exporting...";
const BUSY_ICON_CLASSES: [&str; 3] = ["zmdi", "zmdi-refresh", "zmdi-hc-spin"];

const CONTROL_CLASSES: [&str; 2] = ["ant-btn", "ant-btn-default"];

const BUTTON_GROUP_CLASSES: [&str; 3] = ["ant-btn-group", "btn-group", "button-group"];
const CONTROLS_REGION_CLASS: &str = "dashboard-control";
const PRINT_HIDDEN_CLASS: &str = "hidden-print";

const REFRESH_CLASSES: [&str; 2] = ["btn-refresh", "refresh-btn"];
const REFRESH_ICON_CLASS: &str = "zmdi-refresh";

/// Where and how the control gets inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPoint {
    /// As first child of a button-group container
    PrependInto(NodeId),
    /// Immediately before the refresh control
    Before(NodeId),
    /// As last child of the dashboard-controls region
    AppendInto(NodeId),
}

/// UI state of the control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Idle,
    Busy,
}

/// Ensures the export control is present, inserting it if possible.
///
/// Returns the control's node when present afterwards; `None` means no
/// insertion point exists yet. Never raises.
pub fn ensure_control(page: &Page) -> Option<NodeId> {
    if let Some(existing) = page.element_by_dom_id(EXPORT_CONTROL_ID) {
        return Some(existing);
    }

    let point = match find_insertion_point(page) {
        Some(point) => point,
        None => {
            trace!("no insertion target for export control");
            return None;
        }
    };

    let control = build_control(page);
    let inserted = match point {
        InsertionPoint::PrependInto(parent) => page.prepend_child(parent, control),
        InsertionPoint::Before(reference) => page.insert_before(reference, control),
        InsertionPoint::AppendInto(parent) => page.append_child(parent, control),
    };
    if !inserted {
        return None;
    }
    debug!(?point, "export control injected");
    Some(control)
}

/// Selects the insertion point using the ordered fallback policy
pub fn find_insertion_point(page: &Page) -> Option<InsertionPoint> {
    if let Some(group) = find_button_group(page) {
        return Some(InsertionPoint::PrependInto(group));
    }
    if let Some(refresh) = find_refresh_control(page) {
        return Some(InsertionPoint::Before(refresh));
    }
    find_controls_region(page).map(InsertionPoint::AppendInto)
}

fn find_button_group(page: &Page) -> Option<NodeId> {
    page.descendants().into_iter().find(|&node| {
        BUTTON_GROUP_CLASSES
            .iter()
            .any(|class| page.has_class(node, class))
            || (page.has_class(node, PRINT_HIDDEN_CLASS)
                && has_ancestor_with_class(page, node, CONTROLS_REGION_CLASS))
    })
}

/// Finds the host page's refresh control with layered heuristics: a refresh
/// icon inside a button, explicit title/aria labels, refresh classes, then a
/// case-insensitive button-text search.
pub fn find_refresh_control(page: &Page) -> Option<NodeId> {
    let descendants = page.descendants();

    if let Some(button) = descendants
        .iter()
        .copied()
        .filter(|&node| page.has_class(node, REFRESH_ICON_CLASS))
        .find_map(|icon| closest_tag(page, icon, "button"))
    {
        return Some(button);
    }

    if let Some(button) = descendants.iter().copied().find(|&node| {
        page.tag(node) == "button"
            && ["title", "aria-label"].iter().any(|attr| {
                page.attribute(node, attr)
                    .is_some_and(|value| value.contains("Refresh"))
            })
    }) {
        return Some(button);
    }

    if let Some(node) = descendants.iter().copied().find(|&node| {
        REFRESH_CLASSES
            .iter()
            .any(|class| page.has_class(node, class))
    }) {
        return Some(node);
    }

    descendants.into_iter().find(|&node| {
        page.tag(node) == "button" && page.text_content(node).to_lowercase().contains("refresh")
    })
}

fn find_controls_region(page: &Page) -> Option<NodeId> {
    page.descendants()
        .into_iter()
        .find(|&node| page.has_class(node, CONTROLS_REGION_CLASS))
}

fn has_ancestor_with_class(page: &Page, node: NodeId, class: &str) -> bool {
    let mut current = page.parent(node);
    while let Some(ancestor) = current {
        if page.has_class(ancestor, class) {
            return true;
        }
        current = page.parent(ancestor);
    }
    false
}

/// Nearest ancestor (including the node itself) with the given tag
fn closest_tag(page: &Page, node: NodeId, tag: &str) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(candidate) = current {
        if page.tag(candidate) == tag {
            return Some(candidate);
        }
        current = page.parent(candidate);
    }
    None
}

/// Assembles the control subtree, detached
fn build_control(page: &Page) -> NodeId {
    let button = page.create_element("button");
    page.set_dom_id(button, EXPORT_CONTROL_ID);
    for class in CONTROL_CLASSES {
        page.add_class(button, class);
    }

    let icon = page.create_element("i");
    page.set_classes(icon, &IDLE_ICON_CLASSES);
    page.append_child(button, icon);

    let label = page.create_element("span");
    page.set_text(label, IDLE_LABEL);
    page.append_child(button, label);

    button
}

/// Drives the control's Idle/Busy affordances. A no-op when the control is
/// absent.
pub fn set_control_state(page: &Page, state: ControlState) {
    let Some(button) = page.element_by_dom_id(EXPORT_CONTROL_ID) else {
        return;
    };

    let (icon_classes, label): (&[&str], &str) = match state {
        ControlState::Idle => (IDLE_ICON_CLASSES.as_slice(), IDLE_LABEL),
        ControlState::Busy => (BUSY_ICON_CLASSES.as_slice(), BUSY_LABEL),
    };

    match state {
        ControlState::Idle => page.remove_attribute(button, "disabled"),
        ControlState::Busy => page.set_attribute(button, "disabled", "true"),
    }

    for child in page.children(button) {
        match page.tag(child).as_str() {
            "i" => page.set_classes(child, icon_classes),
            "span" => page.set_text(child, label),
            _ => {}
        }
    }
}

/// Current state of the control, or `None` when it is absent
pub fn control_state(page: &Page) -> Option<ControlState> {
    let button = page.element_by_dom_id(EXPORT_CONTROL_ID)?;
    if page.attribute(button, "disabled").is_some() {
        Some(ControlState::Busy)
    } else {
        Some(ControlState::Idle)
    }
}

/// Removes the control from the page
pub fn remove_control(page: &Page) -> bool {
    match page.element_by_dom_id(EXPORT_CONTROL_ID) {
        Some(button) => page.remove(button),
        None => false,
    }
}
