//! typstview
//!
//! A small viewing-surface API over a Typst compiler/renderer capability.
//! Source text goes in, painted output comes out: either self-contained
//! vector markup or rasterized pixels, written into a bound output surface.
//!
//! # Features
//!
//! - **Native backend** (default): embeds the Typst compiler and renders
//!   entirely in-process
//! - **Swappable capability**: the typesetter sits behind a dyn trait, so
//!   alternative backends (or test doubles) plug in via a factory
//! - **Page wiring**: [`PageController`] binds input, trigger, surface and
//!   status widgets with a vector-first, raster-second fallback
//!
//! # Example
//!
//! ```no_run
//! use typstview::{shared_surface, Renderer, RendererConfig, SurfaceContent};
//!
//! # fn main() -> typstview::Result<()> {
//! let surface = shared_surface();
//! let mut renderer = Renderer::new(RendererConfig::default())?;
//! renderer.set_surface(surface.clone());
//! renderer.render("= Hello, world")?;
//!
//! match surface.lock().unwrap().content() {
//!     SurfaceContent::Raster(canvas) => println!("{}x{} px", canvas.width, canvas.height),
//!     other => println!("{:?}", other),
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod surface;
pub use surface::{shared_surface, OutputSurface, RasterCanvas, SharedSurface, SurfaceContent};

pub mod renderer;
pub use renderer::Renderer;

pub mod page;
pub use page::{PageController, Phase, StatusIndicator, TextInput, TriggerControl};

// Async-friendly viewer API (worker-backed abstraction)
pub mod async_api;
pub use async_api::Viewer;

// Embedded Typst backend
#[cfg(feature = "native")]
pub mod native;

#[cfg(test)]
pub(crate) mod testutil;

/// Where a typesetter module's resources are loaded from.
///
/// The consumed capability has two modules (a compiler and a renderer), each
/// brought up from a configurable location. Two deployment configurations of
/// the same contract exist: everything embedded in the binary, or resources
/// read from a fixed local directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleLocator {
    /// Resources embedded in the binary (the bundled configuration)
    Bundled,
    /// Resources read from a local directory (the fixed-paths configuration)
    Path(PathBuf),
}

/// Options handed to the capability when bringing up one of its modules.
///
/// The locator is produced by a callback rather than stored directly so that
/// embedders can defer resolution until the module actually loads.
pub struct InitOptions {
    /// Callback resolving the module's resource location
    pub get_module: Box<dyn Fn() -> ModuleLocator + Send + Sync>,
}

impl InitOptions {
    pub fn new<F>(get_module: F) -> Self
    where
        F: Fn() -> ModuleLocator + Send + Sync + 'static,
    {
        Self {
            get_module: Box::new(get_module),
        }
    }

    /// Resolve the module locator now.
    pub fn resolve(&self) -> ModuleLocator {
        (self.get_module)()
    }
}

impl From<ModuleLocator> for InitOptions {
    fn from(locator: ModuleLocator) -> Self {
        Self::new(move || locator.clone())
    }
}

impl fmt::Debug for InitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitOptions")
            .field("get_module", &self.resolve())
            .finish()
    }
}

/// An 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

/// A single render invocation's input.
///
/// Constructed per invocation and not retained anywhere.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// The main document source text
    pub main_content: String,
}

impl RenderRequest {
    pub fn new(main_content: impl Into<String>) -> Self {
        Self {
            main_content: main_content.into(),
        }
    }
}

/// Parameters for a raster paint into an output surface
#[derive(Debug, Clone)]
pub struct CanvasRequest {
    /// The main document source text
    pub main_content: String,
    /// Raster density in pixels per typographic point
    pub pixel_per_pt: f32,
    /// Background fill behind the document pages; `None` leaves it transparent
    pub background: Option<Rgba>,
}

/// Configuration for the renderer handle
///
/// The defaults match the bundled deployment configuration: both capability
/// modules load embedded resources, and raster output uses a 3.0 px/pt
/// density over a white background.
///
/// # Examples
///
/// ```
/// let cfg = typstview::RendererConfig::default();
/// assert_eq!(cfg.pixel_per_pt, 3.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Resource location for the capability's compiler module
    pub compiler_module: ModuleLocator,
    /// Resource location for the capability's renderer module
    pub renderer_module: ModuleLocator,
    /// Raster density in pixels per typographic point
    pub pixel_per_pt: f32,
    /// Background fill used by the handle's raster path
    pub background: Rgba,
    /// User agent string sent when fetching remote documents
    pub user_agent: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            compiler_module: ModuleLocator::Bundled,
            renderer_module: ModuleLocator::Bundled,
            pixel_per_pt: 3.0,
            background: Rgba::WHITE,
            user_agent: format!("typstview/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RendererConfig {
    /// Load a deployment configuration from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::ConfigError(e.to_string()))
    }
}

/// Contract of the consumed compiler/renderer capability.
///
/// The capability is opaque: it compiles markup source into a visual document
/// and exports it as vector markup or raster pixels. Any replacement backend
/// must expose these operations.
pub trait Typesetter: Send {
    /// Configure and bring up the compiler module.
    fn set_compiler_init_options(&mut self, options: InitOptions) -> Result<()>;

    /// Configure and bring up the renderer module.
    fn set_renderer_init_options(&mut self, options: InitOptions) -> Result<()>;

    /// Compile the request and export it as self-contained vector markup.
    ///
    /// Returns an empty string when the compiled document yields no output;
    /// compilation problems are reported as errors, never as empty markup.
    fn svg(&mut self, request: &RenderRequest) -> Result<String>;

    /// Compile the request and paint it into `surface`, returning the
    /// painted artifact.
    fn create_canvas(
        &mut self,
        surface: &mut OutputSurface,
        request: &CanvasRequest,
    ) -> Result<RasterCanvas>;

    /// Compile the request and paint it into `surface` with the requested
    /// background fill.
    fn canvas(&mut self, surface: &mut OutputSurface, request: &CanvasRequest) -> Result<()>;
}

/// Factory producing a typesetter capability.
///
/// This is the dependency-injection point: the renderer handle calls it once
/// on first use instead of reaching into ambient global state.
pub type TypesetterFactory = Box<dyn Fn() -> Result<Box<dyn Typesetter>> + Send>;

/// Create a typesetter backed by the embedded Typst compiler.
#[cfg(feature = "native")]
pub fn new_typesetter() -> Result<Box<dyn Typesetter>> {
    Ok(Box::new(native::NativeTypesetter::new()))
}
