use crate::render::surface::PaintJobs;
use crate::render::Framebuffer;
use egui_winit::winit::event::WindowEvent;
use winit::window::Window;

pub struct EguiHost {
    context: egui::Context,
    winit_state: egui_winit::State,
    /// Last rendered viewport, stretched over the whole window.
    viewport: Option<egui::TextureHandle>,
}

impl EguiHost {
    pub fn new(window: &Window) -> Self {
        let context = egui::Context::default();
        let viewport_id = egui::ViewportId::ROOT;
        let winit_state = egui_winit::State::new(
            context.clone(),
            viewport_id,
            window,
            Some(window.scale_factor() as f32),
            window.theme(),
            None,
        );

        Self {
            context,
            winit_state,
            viewport: None,
        }
    }

    /// Whether egui used the event, e.g. a press on one of its panels.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    pub fn set_viewport_image(&mut self, frame: &Framebuffer) {
        let image = viewport_image(frame);
        match &mut self.viewport {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.viewport = Some(self.context.load_texture(
                    "viewport",
                    image,
                    egui::TextureOptions::LINEAR,
                ));
            }
        }
    }

    pub fn run_ui<F>(&mut self, window: &Window, mut run_ui: F) -> PaintJobs
    where
        F: FnMut(&egui::Context),
    {
        let raw_input = self.winit_state.take_egui_input(window);
        let viewport = self.viewport.as_ref().map(egui::TextureHandle::id);
        let full_output = self.context.run(raw_input, |ctx| {
            if let Some(texture) = viewport {
                ctx.layer_painter(egui::LayerId::background()).image(
                    texture,
                    ctx.screen_rect(),
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            run_ui(ctx);
        });
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);
        let pixels_per_point = full_output.pixels_per_point;
        let primitives = self
            .context
            .tessellate(full_output.shapes, pixels_per_point);

        PaintJobs {
            primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point,
        }
    }
}

fn viewport_image(frame: &Framebuffer) -> egui::ColorImage {
    let size = [frame.width as usize, frame.height as usize];
    let rgba: Vec<u8> = frame.pixels.iter().flatten().copied().collect();
    egui::ColorImage::from_rgba_unmultiplied(size, &rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_image_keeps_size_and_pixel_order() {
        let mut frame = Framebuffer::new(3, 2, [0x80, 0x80, 0x80, 0xff]);
        frame.set(2, 1, [0xff, 0x00, 0x00, 0xff]);
        let image = viewport_image(&frame);
        assert_eq!(image.size, [3, 2]);
        assert_eq!(image.pixels.len(), 6);
        assert_eq!(image.pixels[5], egui::Color32::from_rgb(0xff, 0x00, 0x00));
        assert_eq!(image.pixels[0], egui::Color32::from_gray(0x80));
    }
}
