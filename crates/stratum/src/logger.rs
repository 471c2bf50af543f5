//! Render logging and profiling.
//!
//! [`LoggableView`](crate::LoggableView) calls a [`RenderLogger`] around every
//! render. The bundled [`ViewLogger`] keeps one [`RenderRecord`] per render,
//! optionally timed with a [`Stopwatch`], and emits a `tracing` info line:
//!
//! ```text
//! View "article.j2" rendered with minijinja in 0.412ms
//! ```
//!
//! [`ViewLogger::profile`] turns the records into a serializable
//! [`RenderProfile`] for debug toolbars and diagnostics endpoints.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::Serialize;

use crate::bag::DataBag;
use crate::view::{Slot, ViewId, ViewInterface};

/// Receives render start and stop notifications.
pub trait RenderLogger {
    fn start_render(&mut self, view: &dyn ViewInterface);
    fn stop_render(&mut self, view: &dyn ViewInterface);
}

/// Logger handle shared by every loggable view of a factory.
pub type SharedLogger = Rc<RefCell<dyn RenderLogger>>;

/// Wall-clock timers keyed by view.
#[derive(Debug, Default)]
pub struct Stopwatch {
    running: HashMap<ViewId, Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the timer for `id`.
    pub fn start(&mut self, id: ViewId) {
        self.running.insert(id, Instant::now());
    }

    /// Stops the timer for `id`, returning the elapsed time if it was running.
    pub fn stop(&mut self, id: ViewId) -> Option<Duration> {
        self.running.remove(&id).map(|started| started.elapsed())
    }

    pub fn is_running(&self, id: ViewId) -> bool {
        self.running.contains_key(&id)
    }
}

/// One completed render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRecord {
    pub id: ViewId,
    pub kind: &'static str,
    pub template: Option<String>,
    pub engine: Option<String>,
    /// The view's expanded data when it finished rendering.
    pub data: serde_json::Value,
    /// Milliseconds, when a stopwatch is attached.
    pub time: Option<f64>,
}

impl RenderRecord {
    fn capture(view: &dyn ViewInterface, time: Option<f64>) -> Self {
        Self {
            id: view.id(),
            kind: view.kind(),
            template: view.template().map(str::to_string),
            engine: view.engine().map(|engine| engine.name().to_string()),
            data: view.to_array(),
            time,
        }
    }

    /// Human-readable summary, e.g. `View "page.html" rendered with string in 1.500ms`.
    pub fn summary(&self) -> String {
        let mut line = self.kind.to_string();
        if let Some(template) = &self.template {
            line.push_str(&format!(" \"{}\"", template));
        }
        line.push_str(" rendered");
        if let Some(engine) = &self.engine {
            line.push_str(&format!(" with {}", engine));
        }
        if let Some(time) = self.time {
            line.push_str(&format!(" in {:.3}ms", time));
        }
        line
    }
}

/// Aggregated render data for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderProfile {
    /// Records, most recent first.
    pub views: Vec<RenderRecord>,
    /// Shared data at collection time.
    pub globals: IndexMap<String, serde_json::Value>,
    /// Sum of the recorded render times in milliseconds.
    pub time: f64,
}

/// Default [`RenderLogger`]: records every render and logs it.
#[derive(Debug, Default)]
pub struct ViewLogger {
    stopwatch: Option<Stopwatch>,
    records: Vec<RenderRecord>,
}

impl ViewLogger {
    /// Creates a logger that records renders without timing them.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stopwatch(mut self, stopwatch: Stopwatch) -> Self {
        self.stopwatch = Some(stopwatch);
        self
    }

    /// Wraps the logger in the shared handle views expect.
    pub fn shared(self) -> Rc<RefCell<ViewLogger>> {
        Rc::new(RefCell::new(self))
    }

    /// All records in completion order.
    pub fn views(&self) -> &[RenderRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Builds a profile of the recorded renders and the given shared data.
    pub fn profile(&self, globals: &DataBag<Slot>) -> RenderProfile {
        let views: Vec<RenderRecord> = self.records.iter().rev().cloned().collect();
        let time = views.iter().filter_map(|record| record.time).sum();

        RenderProfile {
            views,
            globals: globals
                .iter()
                .map(|(key, slot)| (key.clone(), slot.to_json()))
                .collect(),
            time,
        }
    }
}

impl RenderLogger for ViewLogger {
    fn start_render(&mut self, view: &dyn ViewInterface) {
        if let Some(stopwatch) = &mut self.stopwatch {
            stopwatch.start(view.id());
        }
    }

    fn stop_render(&mut self, view: &dyn ViewInterface) {
        let time = self
            .stopwatch
            .as_mut()
            .and_then(|stopwatch| stopwatch.stop(view.id()))
            .map(|elapsed| elapsed.as_secs_f64() * 1000.0);

        let record = RenderRecord::capture(view, time);
        tracing::info!(view = %record.id, "{}", record.summary());
        self.records.push(record);
    }
}
