//! Set Dressing - place, arrange and export catalog assets in a shared scene.

mod app;
mod assets;
mod config;
mod editor;
mod export;
mod render;
mod scene;
mod ui;

fn main() {
    app::run();
}
