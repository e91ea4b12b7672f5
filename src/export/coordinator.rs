//! Export orchestration
//!
//! Drives one export attempt: derive the dashboard identity from the page
//! address, fetch the snapshot, hand it to the transform worker through the
//! broker, then deliver the rendered document. The control is Busy for the
//! duration and always returns to Idle, whatever the outcome; failures
//! surface as a single transient notice and are never retried.

use std::path::PathBuf;
use std::rc::Rc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::{dashboard_id_from_url, DashboardFetcher, DashboardId};
use crate::broker::{Broker, BrokerRequest};
use crate::convert::export_filename;
use crate::error::{ExportError, ExportResult};
use crate::page::{set_control_state, show_notice, ControlState, NoticeLevel, Page};

use super::emitter::FileEmitter;

/// Sink for the transient outcome notices
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Renders notices as toast elements on the page
pub struct PageNotifier {
    page: Rc<Page>,
}

impl PageNotifier {
    pub fn new(page: Rc<Page>) -> Self {
        Self { page }
    }
}

impl Notifier for PageNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        show_notice(&self.page, level, message);
    }
}

/// Routes notices to the log (headless runs)
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => info!("{message}"),
            NoticeLevel::Error => warn!("{message}"),
        }
    }
}

/// What a successful export produced
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Display name of the exported dashboard
    pub dashboard: String,
    /// Derived output filename
    pub filename: String,
    /// Where the file was delivered
    pub path: PathBuf,
}

/// Restores the Idle affordance on every exit path
struct BusyGuard<'a> {
    page: &'a Page,
}

impl<'a> BusyGuard<'a> {
    fn engage(page: &'a Page) -> Self {
        set_control_state(page, ControlState::Busy);
        Self { page }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        set_control_state(self.page, ControlState::Idle);
    }
}

/// Orchestrates fetch → transform → deliver
pub struct ExportCoordinator {
    fetcher: DashboardFetcher,
    broker: Broker,
    emitter: Box<dyn FileEmitter>,
    notifier: Box<dyn Notifier>,
}

impl ExportCoordinator {
    pub fn new(
        fetcher: DashboardFetcher,
        broker: Broker,
        emitter: Box<dyn FileEmitter>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            fetcher,
            broker,
            emitter,
            notifier,
        }
    }

    /// Runs one export for the dashboard the page currently displays,
    /// driving the control's Busy/Idle affordances and surfacing the outcome
    /// as a transient notice.
    pub fn export_current(&self, page: &Page) -> ExportResult<ExportOutcome> {
        let _busy = BusyGuard::engage(page);

        let result = self.export_for_location(&page.location());
        match &result {
            Ok(outcome) => self.notifier.notify(
                NoticeLevel::Success,
                &format!("Export completed: {}", outcome.filename),
            ),
            Err(err) => self
                .notifier
                .notify(NoticeLevel::Error, &format!("Export failed: {err}")),
        }
        result
    }

    fn export_for_location(&self, location: &str) -> ExportResult<ExportOutcome> {
        let id = dashboard_id_from_url(location).ok_or_else(|| {
            ExportError::Validation(format!("no dashboard id in page address '{location}'"))
        })?;
        self.export_dashboard(id)
    }

    /// The headless pipeline: fetch the snapshot, round-trip it through the
    /// transform worker, deliver the rendered document.
    pub fn export_dashboard(&self, id: DashboardId) -> ExportResult<ExportOutcome> {
        debug!(%id, "export started");
        let dashboard = self.fetcher.fetch(id)?;
        let name = dashboard.name.clone();

        let response = self.broker.send(&BrokerRequest::export(dashboard))?;
        let yaml = response.into_result()?;

        let filename = export_filename(&name, Utc::now());
        let path = self.emitter.save(&yaml, &filename)?;
        info!(dashboard = %name, path = %path.display(), "export delivered");

        Ok(ExportOutcome {
            dashboard: name,
            filename,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HostSession;
    use crate::broker::TransformWorker;
    use crate::export::emitter::MemoryEmitter;
    use crate::page::{control_state, current_notice, ensure_control};
    use std::cell::RefCell;
    use std::net::TcpListener;

    /// Records notices together with the control state seen at notify time
    struct RecordingNotifier {
        page: Rc<Page>,
        seen: Rc<RefCell<Vec<(NoticeLevel, String, Option<ControlState>)>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NoticeLevel, message: &str) {
            self.seen
                .borrow_mut()
                .push((level, message.to_string(), control_state(&self.page)));
        }
    }

    /// A base URL nothing listens on
    fn dead_host() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn page_with_control(location: &str) -> Rc<Page> {
        let page = Page::new(location);
        let region = page.create_element("div");
        page.add_class(region, "dashboard-control");
        page.append_child(page.root(), region);
        ensure_control(&page).unwrap();
        page
    }

    fn coordinator_against(
        base_url: String,
        page: &Rc<Page>,
    ) -> (
        ExportCoordinator,
        TransformWorker,
        Rc<RefCell<Vec<(NoticeLevel, String, Option<ControlState>)>>>,
    ) {
        let fetcher = DashboardFetcher::new(HostSession::new(base_url)).unwrap();
        let (broker, worker) = TransformWorker::spawn().unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let notifier = RecordingNotifier {
            page: Rc::clone(page),
            seen: Rc::clone(&seen),
        };
        let coordinator = ExportCoordinator::new(
            fetcher,
            broker,
            Box::new(MemoryEmitter::default()),
            Box::new(notifier),
        );
        (coordinator, worker, seen)
    }

    #[test]
    fn underivable_dashboard_id_fails_fast_with_validation() {
        let page = page_with_control("/queries/7");
        let (coordinator, worker, seen) = coordinator_against(dead_host(), &page);

        let err = coordinator.export_current(&page).unwrap_err();
        assert!(err.is_validation());

        let notices = seen.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].0, NoticeLevel::Error);
        assert!(notices[0].1.starts_with("Export failed:"));

        drop(coordinator);
        worker.join();
    }

    #[test]
    fn control_is_busy_during_the_attempt_and_idle_after() {
        let page = page_with_control("/dashboards/7");
        let (coordinator, worker, seen) = coordinator_against(dead_host(), &page);

        let err = coordinator.export_current(&page).unwrap_err();
        assert!(matches!(err, ExportError::Transport(_)), "got {err:?}");

        // the notice fired while the control was still disabled
        assert_eq!(seen.borrow()[0].2, Some(ControlState::Busy));
        // and the guard re-enabled it afterwards
        assert_eq!(control_state(&page), Some(ControlState::Idle));

        drop(coordinator);
        worker.join();
    }

    #[test]
    fn page_notifier_renders_a_toast() {
        let page = page_with_control("/dashboards/7");
        let fetcher = DashboardFetcher::new(HostSession::new(dead_host())).unwrap();
        let (broker, worker) = TransformWorker::spawn().unwrap();
        let coordinator = ExportCoordinator::new(
            fetcher,
            broker,
            Box::new(MemoryEmitter::default()),
            Box::new(PageNotifier::new(Rc::clone(&page))),
        );

        let _ = coordinator.export_current(&page).unwrap_err();

        let (level, text) = current_notice(&page).unwrap();
        assert_eq!(level, NoticeLevel::Error);
        assert!(text.starts_with("Export failed:"));

        drop(coordinator);
        worker.join();
    }
}
