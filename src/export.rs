//! Export control: one job at a time from the live preview to a delivered PDF
//!
//! ```text
//! Idle -> Capturing -> Assembling -> Delivered -> (after a delay) Idle
//!            \______________\______-> Failed -> Idle
//! ```
//!
//! The [`JobSlot`] holds the single current [`ExportState`]; UI code
//! subscribes to it for the button [`Indicator`] and to the [`NoticeBoard`]
//! for user-visible messages.

use crate::Result;
use crate::assemble::{DocumentAssembler, FitPolicy};
use crate::constants::{
    DEFAULT_FILE_PREFIX, DEFAULT_NOTICE_DISPLAY, DEFAULT_OVERSAMPLING, DEFAULT_SETTLE_DELAY,
    DEFAULT_SUCCESS_DISPLAY, MESSAGE_DELIVERED, MESSAGE_NOT_READY,
};
use crate::delivery::{Delivery, DeliveryReceipt};
use crate::error::ExportError;
use crate::metrics::PageMetrics;
use crate::preview::PreviewHandle;
use crate::raster::Rasterizer;
use crate::snapshot::{OffscreenHost, SnapshotIsolator};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, trace, warn};

/// Identifies one export request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State of the export job slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    Capturing(JobId),
    Assembling(JobId),
    Delivered(JobId),
    Failed(JobId),
}

impl ExportState {
    pub fn job(&self) -> Option<JobId> {
        match self {
            ExportState::Idle => None,
            ExportState::Capturing(job)
            | ExportState::Assembling(job)
            | ExportState::Delivered(job)
            | ExportState::Failed(job) => Some(*job),
        }
    }

    /// Whether a job is running and new requests are refused
    pub fn is_busy(&self) -> bool {
        matches!(self, ExportState::Capturing(_) | ExportState::Assembling(_))
    }

    pub fn indicator(&self) -> Indicator {
        match self {
            ExportState::Idle | ExportState::Failed(_) => Indicator::Idle,
            ExportState::Capturing(_) | ExportState::Assembling(_) => Indicator::InProgress,
            ExportState::Delivered(_) => Indicator::Success,
        }
    }
}

/// Three-state feedback of the export trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Idle,
    InProgress,
    Success,
}

impl Indicator {
    pub fn label(&self) -> &'static str {
        match self {
            Indicator::Idle => "Download PDF",
            Indicator::InProgress => "Memproses...",
            Indicator::Success => "Berhasil!",
        }
    }

    /// Whether the trigger accepts a new request
    pub fn trigger_enabled(&self) -> bool {
        *self != Indicator::InProgress
    }
}

/// Single-slot registry of the current export job
#[derive(Debug, Clone)]
pub struct JobSlot {
    state: Arc<watch::Sender<ExportState>>,
    next_id: Arc<AtomicU64>,
}

impl Default for JobSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl JobSlot {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ExportState::Idle);
        Self {
            state: Arc::new(state),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn state(&self) -> ExportState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExportState> {
        self.state.subscribe()
    }

    /// Claim the slot for a new job, or `None` while another job runs
    pub fn begin(&self) -> Option<JobId> {
        let mut started = None;
        self.state.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }
            let job = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
            *state = ExportState::Capturing(job);
            started = Some(job);
            true
        });
        started
    }

    /// Move `job` to `next`; ignored once the slot belongs to another job
    pub fn advance(&self, job: JobId, next: ExportState) -> bool {
        self.state.send_if_modified(|state| {
            if state.job() != Some(job) {
                return false;
            }
            trace!("Job {} {:?} -> {:?}", job, state, next);
            *state = next;
            true
        })
    }

    /// Record the failure of `job` and free the slot right away
    pub fn fail(&self, job: JobId) {
        self.advance(job, ExportState::Failed(job));
        self.advance(job, ExportState::Idle);
    }

    /// Return to idle if `job` is still showing its success
    pub fn clear_delivered(&self, job: JobId) -> bool {
        self.state.send_if_modified(|state| {
            if *state != ExportState::Delivered(job) {
                return false;
            }
            *state = ExportState::Idle;
            true
        })
    }
}

/// What a notice reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Delivered,
    Failed,
    NotReady,
}

/// A user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: &'static str,
}

/// The one notice currently shown to the user.
///
/// Success notices dismiss themselves after the display interval; the others
/// stay until dismissed or replaced.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    current: Arc<watch::Sender<Option<Notice>>>,
    next_id: Arc<AtomicU64>,
    display: Duration,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_DISPLAY)
    }
}

impl NoticeBoard {
    pub fn new(display: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            next_id: Arc::new(AtomicU64::new(1)),
            display,
        }
    }

    pub fn current(&self) -> Option<Notice> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.current.subscribe()
    }

    /// Show a notice, replacing the previous one.
    ///
    /// Must be called from within a tokio runtime when `kind` is
    /// [`NoticeKind::Delivered`], which schedules the auto-dismiss.
    pub fn post(&self, kind: NoticeKind, message: &'static str) -> Notice {
        let notice = Notice {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            message,
        };
        debug!("Notice {:?}: {}", kind, message);
        self.current.send_replace(Some(notice.clone()));

        if kind == NoticeKind::Delivered {
            let board = self.clone();
            let id = notice.id;
            tokio::spawn(async move {
                tokio::time::sleep(board.display).await;
                board.dismiss_id(id);
            });
        }
        notice
    }

    /// Hide whatever is shown
    pub fn dismiss(&self) {
        self.current.send_replace(None);
    }

    fn dismiss_id(&self, id: u64) {
        self.current.send_if_modified(|current| {
            if current.as_ref().is_some_and(|n| n.id == id) {
                *current = None;
                return true;
            }
            false
        });
    }
}

/// Knobs of the export pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Wait before capture so pending UI transitions settle
    pub settle_delay: Duration,
    /// How long the success indicator stays before returning to idle
    pub success_display: Duration,
    /// How long a success notice stays visible
    pub notice_display: Duration,
    pub oversampling: f32,
    pub fit: FitPolicy,
    pub file_prefix: String,
    pub allow_remote_assets: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            success_display: DEFAULT_SUCCESS_DISPLAY,
            notice_display: DEFAULT_NOTICE_DISPLAY,
            oversampling: DEFAULT_OVERSAMPLING,
            fit: FitPolicy::default(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            allow_remote_assets: true,
        }
    }
}

impl ExportOptions {
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_success_display(mut self, display: Duration) -> Self {
        self.success_display = display;
        self
    }

    pub fn with_notice_display(mut self, display: Duration) -> Self {
        self.notice_display = display;
        self
    }

    pub fn with_oversampling(mut self, oversampling: f32) -> Self {
        self.oversampling = oversampling;
        self
    }

    pub fn with_fit(mut self, fit: FitPolicy) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_file_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn with_remote_assets(mut self, allow: bool) -> Self {
        self.allow_remote_assets = allow;
        self
    }
}

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub job: JobId,
    pub receipt: DeliveryReceipt,
}

/// Runs exports from a [`PreviewHandle`] to a [`Delivery`]
pub struct Exporter {
    options: ExportOptions,
    metrics: PageMetrics,
    slot: JobSlot,
    notices: NoticeBoard,
    host: OffscreenHost,
    delivery: Arc<dyn Delivery>,
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("options", &self.options)
            .field("state", &self.slot.state())
            .finish()
    }
}

impl Exporter {
    pub fn new(delivery: Arc<dyn Delivery>) -> Self {
        let options = ExportOptions::default();
        Self {
            notices: NoticeBoard::new(options.notice_display),
            options,
            metrics: PageMetrics::default(),
            slot: JobSlot::new(),
            host: OffscreenHost::new(),
            delivery,
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.notices = NoticeBoard::new(options.notice_display);
        self.options = options;
        self
    }

    pub fn with_metrics(mut self, metrics: PageMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn slot(&self) -> &JobSlot {
        &self.slot
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn host(&self) -> &OffscreenHost {
        &self.host
    }

    pub fn state(&self) -> ExportState {
        self.slot.state()
    }

    pub fn indicator(&self) -> Indicator {
        self.slot.state().indicator()
    }

    pub fn trigger_enabled(&self) -> bool {
        self.indicator().trigger_enabled()
    }

    /// Export the preview's page as a PDF and deliver it.
    ///
    /// Refused with [`ExportError::SourceNotReady`] while the preview is not
    /// mounted and with [`ExportError::Busy`] while another export runs.
    /// Capture and assembly failures post the generic failure notice and
    /// leave the slot idle.
    #[instrument(skip_all)]
    pub async fn export(&self, preview: &PreviewHandle) -> Result<ExportOutcome> {
        if !preview.read().is_mounted() {
            warn!("Export requested before the preview is mounted");
            self.notices.post(NoticeKind::NotReady, MESSAGE_NOT_READY);
            return Err(ExportError::SourceNotReady);
        }

        let Some(job) = self.slot.begin() else {
            debug!("Export already running, request ignored");
            return Err(ExportError::Busy);
        };
        info!("Export {} started", job);

        match self.run(job, preview).await {
            Ok(receipt) => {
                self.slot.advance(job, ExportState::Delivered(job));
                self.notices.post(NoticeKind::Delivered, MESSAGE_DELIVERED);
                info!("Export {} delivered {}", job, receipt.file_name);

                let slot = self.slot.clone();
                let display = self.options.success_display;
                tokio::spawn(async move {
                    tokio::time::sleep(display).await;
                    slot.clear_delivered(job);
                });
                Ok(ExportOutcome { job, receipt })
            }
            Err(e) => {
                error!("Export {} failed: {}", job, e);
                self.slot.fail(job);
                let kind = match e {
                    ExportError::SourceNotReady => NoticeKind::NotReady,
                    _ => NoticeKind::Failed,
                };
                self.notices.post(kind, e.user_message());
                Err(e)
            }
        }
    }

    async fn run(&self, job: JobId, preview: &PreviewHandle) -> Result<DeliveryReceipt> {
        tokio::time::sleep(self.options.settle_delay).await;

        let (page, file_name) = {
            let preview = preview.read();
            (
                preview.render_for_export(),
                preview.document().export_file_name(&self.options.file_prefix),
            )
        };
        let page = page.ok_or(ExportError::SourceNotReady)?;

        let rasterizer = Rasterizer::new()
            .with_oversampling(self.options.oversampling)
            .with_remote_assets(self.options.allow_remote_assets);
        let bitmap = {
            let snapshot = SnapshotIsolator::new(self.metrics)
                .isolate(&self.host, &page)
                .map_err(as_capture_error)?;
            rasterizer.capture(&snapshot).map_err(as_capture_error)?
        };
        tokio::task::yield_now().await;

        self.slot.advance(job, ExportState::Assembling(job));
        let assembled = DocumentAssembler::new(self.metrics)
            .with_fit(self.options.fit)
            .assemble(&bitmap)
            .map_err(as_assembly_error)?;
        self.delivery
            .deliver(&file_name, &assembled.bytes)
            .map_err(as_assembly_error)
    }
}

fn as_capture_error(e: ExportError) -> ExportError {
    match e {
        ExportError::CaptureError(_) => e,
        other => ExportError::CaptureError(other.to_string()),
    }
}

fn as_assembly_error(e: ExportError) -> ExportError {
    match e {
        ExportError::AssemblyError(_) => e,
        other => ExportError::AssemblyError(other.to_string()),
    }
}
