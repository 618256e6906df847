//! Page wiring: input, trigger, status, and the two-strategy fallback
//!
//! [`PageController`] binds a text input, a trigger control, a shared output
//! surface and a status indicator to a [`Renderer`]. Rendering tries vector
//! markup first and falls back to raster painting when the vector path
//! yields no output: markup is cheaper to inspect and degrades gracefully
//! when embedded, while raster painting needs a live drawable surface and is
//! strictly more expensive.

use std::sync::Arc;

use log::{debug, error, info};

use crate::{Renderer, Result, SharedSurface};

/// User-visible lifecycle phase of a page.
///
/// `Initializing` is the entry state; there is no terminal state. A
/// successful render returns the machine to `Ready`, and `Error` is
/// reachable from both `Initializing` and `Rendering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Ready,
    Rendering,
    Error,
}

/// The status/log region: current phase plus a human-readable message.
#[derive(Debug, Clone)]
pub struct StatusIndicator {
    pub phase: Phase,
    pub message: String,
}

impl StatusIndicator {
    fn new() -> Self {
        Self {
            phase: Phase::Initializing,
            message: String::new(),
        }
    }

    /// Whether the indicator currently shows a failure (for color coding).
    pub fn is_failure(&self) -> bool {
        self.phase == Phase::Error
    }
}

/// The source text input control.
#[derive(Debug, Default)]
pub struct TextInput {
    value: String,
}

impl TextInput {
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The render trigger control. Disabled until initialization succeeds.
#[derive(Debug, Default)]
pub struct TriggerControl {
    enabled: bool,
}

impl TriggerControl {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

type StatusHandler = Arc<dyn Fn(Phase, &str) + Send + Sync>;

/// Which rendering strategy produced the displayed output.
enum Strategy {
    Vector,
    Raster,
}

/// Binds page widgets to a renderer and manages user-visible status.
///
/// Lifecycle: [`bootstrap`](Self::bootstrap) brings up the capability,
/// enables the trigger and performs one automatic render;
/// [`activate_trigger`](Self::activate_trigger) re-renders the current
/// input. The page persists indefinitely; every failure leaves the machine
/// in `Error` until the next user-initiated render.
pub struct PageController {
    renderer: Renderer,
    surface: SharedSurface,
    input: TextInput,
    trigger: TriggerControl,
    status: StatusIndicator,
    on_status: Option<StatusHandler>,
}

impl PageController {
    /// Wire a controller to `renderer`, binding `surface` as the output
    /// region for both.
    pub fn new(mut renderer: Renderer, surface: SharedSurface) -> Self {
        renderer.set_surface(surface.clone());
        Self {
            renderer,
            surface,
            input: TextInput::default(),
            trigger: TriggerControl::default(),
            status: StatusIndicator::new(),
            on_status: None,
        }
    }

    /// Register a callback observing every status transition.
    pub fn on_status<F>(&mut self, cb: F)
    where
        F: Fn(Phase, &str) + Send + Sync + 'static,
    {
        self.on_status = Some(Arc::new(cb));
    }

    /// Remove a previously registered status callback if any.
    pub fn clear_on_status(&mut self) {
        self.on_status = None;
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input.set_value(value);
    }

    pub fn input(&self) -> &str {
        self.input.value()
    }

    pub fn status(&self) -> &StatusIndicator {
        &self.status
    }

    pub fn trigger_enabled(&self) -> bool {
        self.trigger.is_enabled()
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    fn set_status(&mut self, phase: Phase, message: &str) {
        self.status.phase = phase;
        self.status.message = message.to_string();
        if let Some(cb) = &self.on_status {
            cb(phase, message);
        }
    }

    /// Bring up the capability and perform one automatic render.
    ///
    /// On success the trigger is enabled and the machine reaches `Ready`.
    /// On failure the failure message lands in both the status indicator and
    /// the output surface, the trigger stays disabled, and the error is
    /// re-raised. Already-bootstrapped pages are left untouched.
    pub fn bootstrap(&mut self) -> Result<()> {
        if self.renderer.is_initialized() {
            debug!("page already bootstrapped");
            return Ok(());
        }

        self.set_status(Phase::Initializing, "Initializing…");
        match self.renderer.initialize() {
            Ok(()) => {
                self.trigger.enable();
                self.set_status(Phase::Ready, "Ready");
                info!("page ready");
                self.activate_trigger()
            }
            Err(err) => {
                self.surface.lock().unwrap().show_error(&err);
                self.set_status(Phase::Error, &err.to_string());
                Err(err)
            }
        }
    }

    /// Render the current input, vector markup first, raster second.
    ///
    /// Activating a disabled trigger does nothing.
    pub fn activate_trigger(&mut self) -> Result<()> {
        if !self.trigger.is_enabled() {
            debug!("trigger activated while disabled; ignoring");
            return Ok(());
        }

        self.set_status(Phase::Rendering, "Rendering…");
        {
            let mut surface = self.surface.lock().unwrap();
            surface.clear();
            surface.show_placeholder("Rendering…");
        }

        let source = self.input.value().to_string();
        match self.render_with_fallback(&source) {
            Ok(Strategy::Vector) => {
                self.set_status(Phase::Ready, "Rendered as inline markup");
                Ok(())
            }
            Ok(Strategy::Raster) => {
                self.set_status(Phase::Ready, "Rendered to canvas");
                Ok(())
            }
            Err(err) => {
                error!("render failed: {err}");
                self.surface.lock().unwrap().show_error(&err);
                self.set_status(Phase::Error, &err.to_string());
                Err(err)
            }
        }
    }

    fn render_with_fallback(&mut self, source: &str) -> Result<Strategy> {
        let markup = self.renderer.vector(source)?;
        if !markup.is_empty() {
            self.surface.lock().unwrap().inject_markup(markup);
            return Ok(Strategy::Vector);
        }

        debug!("vector output empty; falling back to raster");
        self.renderer.raster(source)?;
        Ok(Strategy::Raster)
    }
}
