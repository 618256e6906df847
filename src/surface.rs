//! Output surface: the region that receives rendered content
//!
//! The surface is the in-memory analogue of a display container. Rendering
//! either injects vector markup into it or paints raster pixels; failures
//! replace the content with a formatted error block so the surface stays in
//! a failed but inspectable state.

use std::sync::{Arc, Mutex};

use crate::Error;

/// A painted raster artifact
///
/// Pixels are stored PNG-encoded; `pixel_per_pt` records the density the
/// paint was produced at.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterCanvas {
    pub width: u32,
    pub height: u32,
    pub pixel_per_pt: f32,
    pub png_data: Vec<u8>,
}

/// What an output surface currently displays
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceContent {
    /// Nothing rendered yet, or cleared
    Empty,
    /// A transient progress message shown while a render is in flight
    Placeholder(String),
    /// Injected vector markup, stored verbatim
    Markup(String),
    /// Painted raster pixels
    Raster(RasterCanvas),
    /// A formatted error block shown in place of output
    ErrorBlock(String),
}

/// The UI region that receives rendered output.
///
/// Mutated by the renderer handle's raster path and by the page controller's
/// fallback logic; under the documented single-trigger usage only one of
/// them writes at a time.
#[derive(Debug)]
pub struct OutputSurface {
    content: SurfaceContent,
}

impl OutputSurface {
    pub fn new() -> Self {
        Self {
            content: SurfaceContent::Empty,
        }
    }

    pub fn content(&self) -> &SurfaceContent {
        &self.content
    }

    /// Remove any displayed content.
    pub fn clear(&mut self) {
        self.content = SurfaceContent::Empty;
    }

    /// Show a transient progress message.
    pub fn show_placeholder(&mut self, message: impl Into<String>) {
        self.content = SurfaceContent::Placeholder(message.into());
    }

    /// Inject vector markup verbatim.
    pub fn inject_markup(&mut self, markup: impl Into<String>) {
        self.content = SurfaceContent::Markup(markup.into());
    }

    /// Paint a raster artifact.
    pub fn paint(&mut self, canvas: RasterCanvas) {
        self.content = SurfaceContent::Raster(canvas);
    }

    /// Replace the content with a formatted error block for `err`.
    ///
    /// The block text always contains the underlying failure message.
    pub fn show_error(&mut self, err: &Error) {
        self.content = SurfaceContent::ErrorBlock(format!("Error rendering document: {err}"));
    }

    /// The injected markup, if that is what the surface displays.
    pub fn markup(&self) -> Option<&str> {
        match &self.content {
            SurfaceContent::Markup(markup) => Some(markup),
            _ => None,
        }
    }

    /// The painted raster artifact, if that is what the surface displays.
    pub fn raster(&self) -> Option<&RasterCanvas> {
        match &self.content {
            SurfaceContent::Raster(canvas) => Some(canvas),
            _ => None,
        }
    }

    /// The error block text, if the last operation failed.
    pub fn error_text(&self) -> Option<&str> {
        match &self.content {
            SurfaceContent::ErrorBlock(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.content, SurfaceContent::Empty)
    }
}

impl Default for OutputSurface {
    fn default() -> Self {
        Self::new()
    }
}

/// An output surface shared between the renderer handle and a page
/// controller.
pub type SharedSurface = Arc<Mutex<OutputSurface>>;

/// Create a new empty shared surface.
pub fn shared_surface() -> SharedSurface {
    Arc::new(Mutex::new(OutputSurface::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_is_empty() {
        let surface = OutputSurface::new();
        assert!(surface.is_empty());
        assert_eq!(surface.markup(), None);
    }

    #[test]
    fn markup_is_stored_verbatim() {
        let mut surface = OutputSurface::new();
        surface.inject_markup("<svg class=\"page\"/>");
        assert_eq!(surface.markup(), Some("<svg class=\"page\"/>"));
    }

    #[test]
    fn clear_discards_previous_content() {
        let mut surface = OutputSurface::new();
        surface.inject_markup("<svg/>");
        surface.clear();
        assert!(surface.is_empty());
    }

    #[test]
    fn error_block_contains_the_failure_message() {
        let mut surface = OutputSurface::new();
        surface.show_error(&Error::RenderError("missing closing bracket".to_string()));
        let text = surface.error_text().unwrap();
        assert!(text.contains("missing closing bracket"));
    }

    #[test]
    fn paint_replaces_placeholder() {
        let mut surface = OutputSurface::new();
        surface.show_placeholder("Rendering…");
        surface.paint(RasterCanvas {
            width: 10,
            height: 20,
            pixel_per_pt: 3.0,
            png_data: vec![0x89],
        });
        let canvas = surface.raster().unwrap();
        assert_eq!((canvas.width, canvas.height), (10, 20));
    }
}
