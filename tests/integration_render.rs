//! End-to-end rendering through the embedded Typst capability
#![cfg(feature = "native")]

use sha2::{Digest, Sha256};
use typstview::{shared_surface, PageController, Renderer, RendererConfig};

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[test]
fn raster_render_paints_png_at_the_default_density() {
    let surface = shared_surface();
    let mut renderer = Renderer::new(RendererConfig::default()).expect("failed to create renderer");
    renderer.set_surface(surface.clone());

    renderer.render("= Hello, Typst").expect("render failed");

    let guard = surface.lock().unwrap();
    let canvas = guard.raster().expect("expected raster output");
    assert_eq!(canvas.pixel_per_pt, 3.0);
    assert!(canvas.width > 0 && canvas.height > 0);
    // PNG files start with these magic bytes
    assert_eq!(&canvas.png_data[0..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn page_controller_prefers_the_vector_path() {
    let surface = shared_surface();
    let renderer = Renderer::new(RendererConfig::default()).expect("failed to create renderer");
    let mut controller = PageController::new(renderer, surface.clone());

    controller.bootstrap().expect("bootstrap failed");
    controller.set_input("= Hello");
    controller.activate_trigger().expect("render failed");

    let guard = surface.lock().unwrap();
    let markup = guard.markup().expect("expected injected markup");
    assert!(markup.contains("<svg"));
}

#[test]
fn injected_markup_matches_the_vector_output_exactly() {
    let surface = shared_surface();
    let renderer = Renderer::new(RendererConfig::default()).expect("failed to create renderer");
    let mut controller = PageController::new(renderer, surface.clone());

    controller.bootstrap().expect("bootstrap failed");
    controller.set_input("= Hello");
    controller.activate_trigger().expect("render failed");

    let expected = controller.renderer_mut().vector("= Hello").unwrap();
    let guard = surface.lock().unwrap();
    assert_eq!(guard.markup(), Some(expected.as_str()));
}

#[test]
fn rendering_the_same_source_twice_is_deterministic() {
    let surface = shared_surface();
    let mut renderer = Renderer::new(RendererConfig::default()).expect("failed to create renderer");
    renderer.set_surface(surface.clone());

    let first = renderer.vector("= Stable output").unwrap();
    let second = renderer.vector("= Stable output").unwrap();
    assert_eq!(digest(first.as_bytes()), digest(second.as_bytes()));

    let first = renderer.raster("= Stable output").unwrap();
    let second = renderer.raster("= Stable output").unwrap();
    assert_eq!(digest(&first.png_data), digest(&second.png_data));
}
