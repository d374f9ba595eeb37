use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::domain::content::Mode;

use super::{
    blocks::segment,
    classify,
    sanitize::sanitize_or_raw,
    types::{RenderService, RenderedContent},
};

/// Line-oriented renderer: markdown goes through the block segmenter, HTML
/// through the sanitiser. Holds no state, so one instance serves every caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineRenderService;

impl LineRenderService {
    pub fn new() -> Self {
        Self
    }
}

impl RenderService for LineRenderService {
    fn render(&self, raw: &str) -> RenderedContent {
        let document = classify(raw);
        match document.mode() {
            Mode::Markdown => RenderedContent::Markdown {
                blocks: segment(document.raw()),
            },
            Mode::Html => RenderedContent::Html {
                html: sanitize_or_raw(document.raw()),
            },
        }
    }
}

static RENDER_SERVICE: Lazy<Arc<LineRenderService>> =
    Lazy::new(|| Arc::new(LineRenderService::new()));

/// Access the shared render service instance.
pub fn render_service() -> Arc<LineRenderService> {
    Arc::clone(&RENDER_SERVICE)
}
