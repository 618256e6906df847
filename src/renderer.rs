//! Renderer handle: owns the lifecycle of the typesetter capability
//!
//! The handle configures the capability's two module locations, brings it up
//! lazily on first use, and is the single entry point for turning source
//! text into painted output on the bound surface.

use log::{debug, error, info};
use reqwest::blocking::Client;
use url::Url;

use crate::{
    CanvasRequest, Error, InitOptions, RasterCanvas, RenderRequest, RendererConfig, Result,
    SharedSurface, Typesetter, TypesetterFactory,
};

/// Handle over a lazily initialized typesetter capability.
///
/// Render calls auto-initialize the capability on first use; repeat
/// initialization is a no-op. An output surface must be bound before any
/// render call.
///
/// Concurrent overlapping render calls are not guarded against; under the
/// documented single-trigger usage only one render is in flight at a time.
pub struct Renderer {
    config: RendererConfig,
    factory: TypesetterFactory,
    capability: Option<Box<dyn Typesetter>>,
    initialized: bool,
    surface: Option<SharedSurface>,
    pixel_per_pt: f32,
    http: Client,
}

impl Renderer {
    /// Create a renderer backed by the embedded Typst capability.
    #[cfg(feature = "native")]
    pub fn new(config: RendererConfig) -> Result<Self> {
        Self::with_factory(config, Box::new(crate::new_typesetter))
    }

    /// Create a renderer with an injected capability factory.
    ///
    /// The factory is invoked once, on first initialization, in place of any
    /// ambient global binding.
    pub fn with_factory(config: RendererConfig, factory: TypesetterFactory) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {e}")))?;

        let pixel_per_pt = config.pixel_per_pt;
        Ok(Self {
            config,
            factory,
            capability: None,
            initialized: false,
            surface: None,
            pixel_per_pt,
            http,
        })
    }

    /// Whether the capability has been brought up.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Bind the output surface that subsequent renders paint into.
    ///
    /// Overwrites any previous binding.
    pub fn set_surface(&mut self, surface: SharedSurface) {
        self.surface = Some(surface);
    }

    /// Set the raster density for subsequent raster renders.
    pub fn set_pixel_per_pt(&mut self, pixel_per_pt: f32) {
        self.pixel_per_pt = pixel_per_pt;
    }

    pub fn pixel_per_pt(&self) -> f32 {
        self.pixel_per_pt
    }

    /// Bring up the typesetter capability.
    ///
    /// Idempotent: repeat calls after success are no-ops. On failure the
    /// handle stays uninitialized and the error is re-raised after logging.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        match self.try_initialize() {
            Ok(()) => {
                info!("typesetter initialized");
                Ok(())
            }
            Err(err) => {
                error!("typesetter initialization failed: {err}");
                Err(err)
            }
        }
    }

    fn try_initialize(&mut self) -> Result<()> {
        let mut capability = (self.factory)()?;
        capability
            .set_compiler_init_options(InitOptions::from(self.config.compiler_module.clone()))?;
        capability
            .set_renderer_init_options(InitOptions::from(self.config.renderer_module.clone()))?;
        self.capability = Some(capability);
        self.initialized = true;
        Ok(())
    }

    fn capability_mut(&mut self) -> Result<&mut (dyn Typesetter + 'static)> {
        self.capability
            .as_deref_mut()
            .ok_or_else(|| Error::InitializationError("typesetter not loaded".to_string()))
    }

    /// Render source text as raster pixels into the bound surface.
    ///
    /// Clears the surface, then paints at the configured density over the
    /// configured (default white) background. On failure a formatted error
    /// block is written into the surface in place of output and the failure
    /// is re-raised.
    pub fn render(&mut self, source: &str) -> Result<()> {
        let surface = match &self.surface {
            Some(surface) => surface.clone(),
            None => return Err(Error::NoSurfaceBound),
        };
        self.initialize()?;

        let request = CanvasRequest {
            main_content: source.to_string(),
            pixel_per_pt: self.pixel_per_pt,
            background: Some(self.config.background),
        };

        surface.lock().unwrap().clear();
        let capability = self.capability_mut()?;
        let mut guard = surface.lock().unwrap();
        match capability.canvas(&mut guard, &request) {
            Ok(()) => {
                debug!("document rendered to surface");
                Ok(())
            }
            Err(err) => {
                error!("error rendering document: {err}");
                guard.show_error(&err);
                Err(err)
            }
        }
    }

    /// Render source text as self-contained vector markup.
    ///
    /// Returns the markup without touching the surface; an empty string
    /// means the document produced no output.
    pub fn vector(&mut self, source: &str) -> Result<String> {
        self.initialize()?;
        let request = RenderRequest::new(source);
        self.capability_mut()?.svg(&request)
    }

    /// Render source text as raster pixels into the bound surface, returning
    /// the painted artifact.
    ///
    /// Unlike [`render`](Self::render) this neither clears the surface nor
    /// writes an error block; callers orchestrating their own fallback
    /// handle both.
    pub fn raster(&mut self, source: &str) -> Result<RasterCanvas> {
        let surface = match &self.surface {
            Some(surface) => surface.clone(),
            None => return Err(Error::NoSurfaceBound),
        };
        self.initialize()?;

        let request = CanvasRequest {
            main_content: source.to_string(),
            pixel_per_pt: self.pixel_per_pt,
            background: None,
        };
        let capability = self.capability_mut()?;
        let mut guard = surface.lock().unwrap();
        capability.create_canvas(&mut guard, &request)
    }

    /// Fetch a document over HTTP and render it.
    ///
    /// A non-success response fails with [`Error::FetchError`] carrying the
    /// status text, without calling `render`; otherwise the body is decoded
    /// as text and forwarded to [`render`](Self::render).
    pub fn render_from_url(&mut self, url: &str) -> Result<()> {
        let url =
            Url::parse(url).map_err(|e| Error::FetchError(format!("invalid URL {url}: {e}")))?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|e| Error::FetchError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            error!("failed to fetch {url}: {} {reason}", status.as_u16());
            return Err(Error::FetchError(format!("{} {reason}", status.as_u16())));
        }

        let source = response
            .text()
            .map_err(|e| Error::FetchError(format!("response body was not text: {e}")))?;
        self.render(&source)
    }
}
