use crate::dom;
use crate::hud;
use vj_core::controls::Logo;
use vj_core::{FramePlan, Notice};
use web_sys as web;

/// Optional page overlay: `#vj-status`, `#vj-logo`, `#vj-bpm`, `#vj-beat`.
/// Missing elements are skipped. Writes happen only when a value changes.
#[derive(Default)]
pub struct Overlay {
    logo_text: String,
    logo_style: String,
    bpm_label: String,
    beat_on: bool,
}

impl Overlay {
    pub fn show_notices(&self, document: &web::Document, notices: &[Notice]) {
        for n in notices {
            log::info!("[notice] {}", n);
        }
        if let Some(last) = notices.last() {
            dom::set_text(document, "vj-status", &last.to_string());
        }
    }

    pub fn update(&mut self, document: &web::Document, plan: &FramePlan, logo: &Logo) {
        if self.logo_text != logo.text {
            self.logo_text = logo.text.clone();
            dom::set_text(document, "vj-logo", &self.logo_text);
        }
        let style = hud::logo_style(
            logo.visible,
            &logo.text,
            logo.size,
            plan.hud.glow,
            plan.hud.scale,
        );
        if style != self.logo_style {
            if let Some(el) = document.get_element_by_id("vj-logo") {
                _ = el.set_attribute("style", &style);
            }
            self.logo_style = style;
        }

        let label = hud::bpm_label(plan.bpm);
        if label != self.bpm_label {
            dom::set_text(document, "vj-bpm", &label);
            self.bpm_label = label;
        }

        if plan.beat_edge != self.beat_on {
            self.beat_on = plan.beat_edge;
            if let Some(el) = document.get_element_by_id("vj-beat") {
                _ = el.class_list().toggle_with_force("on", plan.beat_edge);
            }
        }
    }
}
