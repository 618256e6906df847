//! Async-friendly viewer API (worker-backed abstraction)

use std::sync::mpsc::{self, Sender};
use std::thread;

use tokio::sync::oneshot;

use crate::surface::shared_surface;
use crate::{Error, RasterCanvas, Renderer, RendererConfig, Result, SurfaceContent, TypesetterFactory};

enum Command {
    Initialize(oneshot::Sender<Result<()>>),
    SetPixelPerPt(f32, oneshot::Sender<Result<()>>),
    Render(String, oneshot::Sender<Result<()>>),
    Vector(String, oneshot::Sender<Result<String>>),
    Raster(String, oneshot::Sender<Result<RasterCanvas>>),
    RenderFromUrl(String, oneshot::Sender<Result<()>>),
    Snapshot(oneshot::Sender<Result<SurfaceContent>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly viewer backed by a dedicated worker thread.
///
/// The worker thread owns a synchronous [`Renderer`] bound to its own
/// surface and executes commands sent from async tasks, so callers get an
/// async interface without the renderer being shared across threads. The
/// serial command loop also provides the documented ordering guarantee:
/// initialization always completes before a queued render proceeds, and at
/// most one render is in flight at a time.
#[derive(Clone)]
pub struct Viewer {
    cmd_tx: Sender<Command>,
}

impl Viewer {
    /// Create a viewer over the embedded Typst capability (spawns a
    /// background thread that owns the renderer).
    #[cfg(feature = "native")]
    pub async fn new(config: Option<RendererConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();
        Self::spawn(config, Box::new(crate::new_typesetter)).await
    }

    /// Create a viewer with an injected capability factory.
    pub async fn with_factory(config: RendererConfig, factory: TypesetterFactory) -> Result<Self> {
        Self::spawn(config, factory).await
    }

    async fn spawn(config: RendererConfig, factory: TypesetterFactory) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            // Construct the renderer on the worker thread
            let surface = shared_surface();
            let mut renderer = match Renderer::with_factory(config, factory) {
                Ok(mut r) => {
                    r.set_surface(surface.clone());
                    r
                }
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            // Signal successful creation
            let _ = init_tx.send(Ok(()));

            // Command loop
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Initialize(resp) => {
                        let _ = resp.send(renderer.initialize());
                    }
                    Command::SetPixelPerPt(value, resp) => {
                        renderer.set_pixel_per_pt(value);
                        let _ = resp.send(Ok(()));
                    }
                    Command::Render(source, resp) => {
                        let _ = resp.send(renderer.render(&source));
                    }
                    Command::Vector(source, resp) => {
                        let _ = resp.send(renderer.vector(&source));
                    }
                    Command::Raster(source, resp) => {
                        let _ = resp.send(renderer.raster(&source));
                    }
                    Command::RenderFromUrl(url, resp) => {
                        let _ = resp.send(renderer.render_from_url(&url));
                    }
                    Command::Snapshot(resp) => {
                        let content = surface.lock().unwrap().content().clone();
                        let _ = resp.send(Ok(content));
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(Ok(()));
                        break;
                    }
                }
            }
        });

        // Wait for the worker to report construction success or failure
        let init_res = init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {e}")))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    /// Bring up the typesetter capability now instead of on first render.
    pub async fn initialize(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Initialize(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Initialize canceled: {e}")))?
    }

    /// Set the raster density for subsequent raster renders.
    pub async fn set_pixel_per_pt(&self, value: f32) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::SetPixelPerPt(value, tx));
        rx.await
            .map_err(|e| Error::Other(format!("SetPixelPerPt canceled: {e}")))?
    }

    /// Render source text as raster pixels into the viewer's surface.
    pub async fn render(&self, source: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Render(source.to_string(), tx));
        rx.await
            .map_err(|e| Error::Other(format!("Render canceled: {e}")))?
    }

    /// Render source text as self-contained vector markup.
    pub async fn vector(&self, source: &str) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Vector(source.to_string(), tx));
        rx.await
            .map_err(|e| Error::Other(format!("Vector canceled: {e}")))?
    }

    /// Render source text as raster pixels, returning the painted artifact.
    pub async fn raster(&self, source: &str) -> Result<RasterCanvas> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Raster(source.to_string(), tx));
        rx.await
            .map_err(|e| Error::Other(format!("Raster canceled: {e}")))?
    }

    /// Fetch a document over HTTP and render it.
    pub async fn render_from_url(&self, url: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self
            .cmd_tx
            .send(Command::RenderFromUrl(url.to_string(), tx));
        rx.await
            .map_err(|e| Error::Other(format!("RenderFromUrl canceled: {e}")))?
    }

    /// What the viewer's surface currently displays.
    pub async fn snapshot(&self) -> Result<SurfaceContent> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Snapshot(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Snapshot canceled: {e}")))?
    }

    /// Shut down the background worker.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {e}")))?
    }
}
