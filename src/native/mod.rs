//! Embedded Typst backend
//!
//! Implements the typesetter contract fully in-process: the compiler module
//! resolves the standard library and font resources behind the compile
//! world, and the renderer module drives the vector and raster export
//! stages (`typst-svg`, `typst-render`).

mod world;

use std::sync::Arc;

use ecow::EcoVec;
use log::{info, warn};
use typst::diag::SourceDiagnostic;
use typst::layout::{Abs, PagedDocument};

use world::{CompilerModule, DocWorld};

use crate::{
    CanvasRequest, Error, InitOptions, ModuleLocator, OutputSurface, RasterCanvas, RenderRequest,
    Result, Rgba, Typesetter,
};

/// Loaded export-stage resources.
struct RenderModule {
    /// Vertical gap between stacked pages in merged raster output
    page_gap: Abs,
}

impl RenderModule {
    fn load(locator: &ModuleLocator) -> Result<Self> {
        if let ModuleLocator::Path(dir) = locator {
            if !dir.is_dir() {
                return Err(Error::InitializationError(format!(
                    "renderer resources not found at {}",
                    dir.display()
                )));
            }
        }
        Ok(Self {
            page_gap: Abs::pt(8.0),
        })
    }
}

/// Typesetter backed by the embedded Typst compiler.
///
/// Both modules must be brought up before any render operation; the handle
/// layer does that during initialization.
pub struct NativeTypesetter {
    compiler: Option<Arc<CompilerModule>>,
    renderer: Option<RenderModule>,
}

impl NativeTypesetter {
    pub fn new() -> Self {
        Self {
            compiler: None,
            renderer: None,
        }
    }

    fn compiler(&self) -> Result<Arc<CompilerModule>> {
        self.compiler
            .clone()
            .ok_or_else(|| Error::InitializationError("compiler module not configured".to_string()))
    }

    fn renderer(&self) -> Result<&RenderModule> {
        self.renderer
            .as_ref()
            .ok_or_else(|| Error::InitializationError("renderer module not configured".to_string()))
    }

    fn compile(&self, main_content: &str) -> Result<PagedDocument> {
        let world = DocWorld::new(self.compiler()?, main_content);
        let warned = typst::compile::<PagedDocument>(&world);
        for warning in &warned.warnings {
            warn!("typst: {}", warning.message);
        }
        warned
            .output
            .map_err(|errors| Error::RenderError(format_diagnostics(&errors)))
    }

    fn rasterize(&self, request: &CanvasRequest) -> Result<RasterCanvas> {
        let renderer = self.renderer()?;
        let document = self.compile(&request.main_content)?;
        if document.pages.is_empty() {
            return Err(Error::RenderError("document produced no pages".to_string()));
        }

        let fill = request.background.map(to_typst_color);
        let pixmap = typst_render::render_merged(
            &document,
            request.pixel_per_pt,
            renderer.page_gap,
            fill,
        );
        let png_data = pixmap
            .encode_png()
            .map_err(|e| Error::RenderError(format!("PNG encoding failed: {e}")))?;

        Ok(RasterCanvas {
            width: pixmap.width(),
            height: pixmap.height(),
            pixel_per_pt: request.pixel_per_pt,
            png_data,
        })
    }
}

impl Default for NativeTypesetter {
    fn default() -> Self {
        Self::new()
    }
}

impl Typesetter for NativeTypesetter {
    fn set_compiler_init_options(&mut self, options: InitOptions) -> Result<()> {
        let locator = options.resolve();
        let module = CompilerModule::load(&locator)?;
        info!("compiler module loaded ({} fonts)", module.font_count());
        self.compiler = Some(Arc::new(module));
        Ok(())
    }

    fn set_renderer_init_options(&mut self, options: InitOptions) -> Result<()> {
        let locator = options.resolve();
        self.renderer = Some(RenderModule::load(&locator)?);
        info!("renderer module loaded");
        Ok(())
    }

    fn svg(&mut self, request: &RenderRequest) -> Result<String> {
        self.renderer()?;
        let document = self.compile(&request.main_content)?;
        if document.pages.is_empty() {
            return Ok(String::new());
        }
        Ok(typst_svg::svg_merged(&document, Abs::zero()))
    }

    fn create_canvas(
        &mut self,
        surface: &mut OutputSurface,
        request: &CanvasRequest,
    ) -> Result<RasterCanvas> {
        let canvas = self.rasterize(request)?;
        surface.paint(canvas.clone());
        Ok(canvas)
    }

    fn canvas(&mut self, surface: &mut OutputSurface, request: &CanvasRequest) -> Result<()> {
        let canvas = self.rasterize(request)?;
        surface.paint(canvas);
        Ok(())
    }
}

fn format_diagnostics(errors: &EcoVec<SourceDiagnostic>) -> String {
    errors
        .iter()
        .map(|diagnostic| diagnostic.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn to_typst_color(color: Rgba) -> typst::visualize::Color {
    typst::visualize::Color::from_u8(color.r, color.g, color.b, color.a)
}
