use eframe::egui::{self, Color32, RichText, TextureHandle, TextureOptions};
use image::RgbaImage;

use super::style;

/// Width used for every displayed image.
pub(super) const IMAGE_WIDTH: f32 = 300.0;

struct CachedTexture {
    revision: u64,
    handle: TextureHandle,
}

/// GPU textures for the preview and the two prediction overlays.
#[derive(Default)]
pub(super) struct TextureCache {
    preview: Option<CachedTexture>,
    inference: Option<CachedTexture>,
    boundaries: Option<CachedTexture>,
}

#[derive(Clone, Copy)]
pub(super) enum Slot {
    Preview,
    Inference,
    Boundaries,
}

impl Slot {
    fn name(self) -> &'static str {
        match self {
            Self::Preview => "upload_preview",
            Self::Inference => "prediction_inference",
            Self::Boundaries => "prediction_boundaries",
        }
    }
}

impl TextureCache {
    /// Return the texture for `slot`, uploading a new one when `revision` changed.
    pub(super) fn get_or_upload(
        &mut self,
        ctx: &egui::Context,
        slot: Slot,
        revision: u64,
        image: impl FnOnce() -> RgbaImage,
    ) -> TextureHandle {
        let entry = match slot {
            Slot::Preview => &mut self.preview,
            Slot::Inference => &mut self.inference,
            Slot::Boundaries => &mut self.boundaries,
        };
        if let Some(cached) = entry.as_ref()
            && cached.revision == revision
        {
            return cached.handle.clone();
        }
        let image = image();
        let size = [image.width() as usize, image.height() as usize];
        let color = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        let handle = ctx.load_texture(slot.name(), color, TextureOptions::LINEAR);
        *entry = Some(CachedTexture {
            revision,
            handle: handle.clone(),
        });
        handle
    }
}

/// Draw `texture` scaled to [`IMAGE_WIDTH`] with a caption underneath.
pub(super) fn show_captioned(ui: &mut egui::Ui, texture: &TextureHandle, caption: &str) {
    let size = texture.size_vec2();
    let scale = IMAGE_WIDTH / size.x.max(1.0);
    let desired = egui::vec2(IMAGE_WIDTH, size.y * scale);
    let (rect, _) = ui.allocate_exact_size(desired, egui::Sense::hover());
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    ui.painter().image(texture.id(), rect, uv, Color32::WHITE);
    ui.label(
        RichText::new(caption)
            .small()
            .color(style::palette().caption),
    );
}
