//! Scriptable typesetter double shared by the unit tests.
//!
//! The stub records every contract call and can be scripted to fail at each
//! stage, so tests can pin down call ordering and error propagation without
//! the embedded compiler.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    CanvasRequest, Error, InitOptions, OutputSurface, RasterCanvas, RenderRequest, Result,
    Typesetter, TypesetterFactory,
};

/// PNG signature bytes used for fake raster artifacts.
pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Call record and scripted behavior of a [`StubTypesetter`].
#[derive(Debug, Default)]
pub struct StubInner {
    pub factory_calls: usize,
    pub compiler_configs: usize,
    pub renderer_configs: usize,
    pub svg_calls: usize,
    pub create_canvas_calls: usize,
    pub canvas_calls: usize,
    pub last_svg_request: Option<RenderRequest>,
    pub last_canvas_request: Option<CanvasRequest>,

    /// Markup returned by `svg`; empty by default, which exercises the
    /// raster fallback.
    pub svg_markup: String,
    /// When set, `svg` fails with a `RenderError` carrying this message.
    pub svg_error: Option<String>,
    /// When set, `create_canvas` and `canvas` fail with a `RenderError`.
    pub canvas_error: Option<String>,
    /// When set, both module configuration calls fail.
    pub configure_error: Option<String>,
    /// When set, the factory itself fails.
    pub factory_error: Option<String>,
}

/// Shared handle over a stub's state; clone it into the factory and keep one
/// in the test for assertions.
#[derive(Clone, Default)]
pub struct StubState(Arc<Mutex<StubInner>>);

impl StubState {
    pub fn lock(&self) -> MutexGuard<'_, StubInner> {
        self.0.lock().unwrap()
    }

    /// A capability factory producing stubs bound to this state.
    pub fn factory(&self) -> TypesetterFactory {
        let state = self.clone();
        Box::new(move || {
            let mut inner = state.lock();
            if let Some(msg) = &inner.factory_error {
                return Err(Error::InitializationError(msg.clone()));
            }
            inner.factory_calls += 1;
            drop(inner);
            Ok(Box::new(StubTypesetter {
                state: state.clone(),
            }) as Box<dyn Typesetter>)
        })
    }
}

pub struct StubTypesetter {
    state: StubState,
}

impl Typesetter for StubTypesetter {
    fn set_compiler_init_options(&mut self, _options: InitOptions) -> Result<()> {
        let mut inner = self.state.lock();
        if let Some(msg) = &inner.configure_error {
            return Err(Error::InitializationError(msg.clone()));
        }
        inner.compiler_configs += 1;
        Ok(())
    }

    fn set_renderer_init_options(&mut self, _options: InitOptions) -> Result<()> {
        let mut inner = self.state.lock();
        if let Some(msg) = &inner.configure_error {
            return Err(Error::InitializationError(msg.clone()));
        }
        inner.renderer_configs += 1;
        Ok(())
    }

    fn svg(&mut self, request: &RenderRequest) -> Result<String> {
        let mut inner = self.state.lock();
        inner.svg_calls += 1;
        inner.last_svg_request = Some(request.clone());
        if let Some(msg) = &inner.svg_error {
            return Err(Error::RenderError(msg.clone()));
        }
        Ok(inner.svg_markup.clone())
    }

    fn create_canvas(
        &mut self,
        surface: &mut OutputSurface,
        request: &CanvasRequest,
    ) -> Result<RasterCanvas> {
        let mut inner = self.state.lock();
        inner.create_canvas_calls += 1;
        inner.last_canvas_request = Some(request.clone());
        if let Some(msg) = &inner.canvas_error {
            return Err(Error::RenderError(msg.clone()));
        }
        drop(inner);

        let canvas = RasterCanvas {
            width: 120,
            height: 60,
            pixel_per_pt: request.pixel_per_pt,
            png_data: PNG_MAGIC.to_vec(),
        };
        surface.paint(canvas.clone());
        Ok(canvas)
    }

    fn canvas(&mut self, surface: &mut OutputSurface, request: &CanvasRequest) -> Result<()> {
        let mut inner = self.state.lock();
        inner.canvas_calls += 1;
        inner.last_canvas_request = Some(request.clone());
        if let Some(msg) = &inner.canvas_error {
            return Err(Error::RenderError(msg.clone()));
        }
        drop(inner);

        surface.paint(RasterCanvas {
            width: 120,
            height: 60,
            pixel_per_pt: request.pixel_per_pt,
            png_data: PNG_MAGIC.to_vec(),
        });
        Ok(())
    }
}
