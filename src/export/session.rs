//! Page-embedded export session
//!
//! Ties the pieces together for the embedded mode: observation keeps the
//! control injected across host re-renders, activation runs the coordinator,
//! and detaching cleans everything up. One export at a time: activation is
//! ignored while the control is disabled or absent.

use std::rc::Rc;

use tracing::debug;

use crate::error::ExportResult;
use crate::page::{
    clear_notice, control_state, ensure_control, remove_control, ControlState, DomObserver, Page,
};

use super::coordinator::{ExportCoordinator, ExportOutcome};

/// A live embedding of the export tool into a page
pub struct ExportSession {
    page: Rc<Page>,
    observer: DomObserver,
    coordinator: ExportCoordinator,
}

impl ExportSession {
    /// Attaches to a page: starts observation and attempts the initial
    /// injection immediately.
    pub fn attach(page: Rc<Page>, coordinator: ExportCoordinator) -> Self {
        let observer = DomObserver::new();
        observer.add_callback(|page| {
            ensure_control(page);
        });
        observer.start(&page);
        ensure_control(&page);

        Self {
            page,
            observer,
            coordinator,
        }
    }

    /// Handles an activation of the control.
    ///
    /// Returns `None` when the activation is unreachable: the control is
    /// absent, or disabled because an export is already in flight.
    pub fn activate(&self) -> Option<ExportResult<ExportOutcome>> {
        match control_state(&self.page) {
            Some(ControlState::Idle) => Some(self.coordinator.export_current(&self.page)),
            Some(ControlState::Busy) => {
                debug!("activation ignored: export in flight");
                None
            }
            None => {
                debug!("activation ignored: control not attached");
                None
            }
        }
    }

    pub fn page(&self) -> &Rc<Page> {
        &self.page
    }

    /// Whether the control is currently attached to the page
    pub fn control_attached(&self) -> bool {
        control_state(&self.page).is_some()
    }

    /// Stops observation and removes everything the session added to the
    /// page.
    pub fn detach(&self) {
        self.observer.stop();
        remove_control(&self.page);
        clear_notice(&self.page);
    }
}

impl Drop for ExportSession {
    fn drop(&mut self) {
        self.detach();
    }
}
