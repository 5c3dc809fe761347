use crate::dom;
use std::cell::RefCell;
use std::rc::Rc;
use vj_core::{
    band_energies_from_bytes, AudioBridge, BandEnergies, ANALYSER_MAX_DB, ANALYSER_MIN_DB,
    ANALYSER_SMOOTHING, FFT_SIZE,
};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Analyser configured for the three-band reduction: 1024-point FFT, 512 bins.
pub fn create_analyser(audio_ctx: &web::AudioContext) -> Option<web::AnalyserNode> {
    let analyser = web::AnalyserNode::new(audio_ctx).ok()?;
    analyser.set_fft_size(FFT_SIZE as u32);
    analyser.set_max_decibels(ANALYSER_MAX_DB as f64);
    analyser.set_min_decibels(ANALYSER_MIN_DB as f64);
    analyser.set_smoothing_time_constant(ANALYSER_SMOOTHING as f64);
    Some(analyser)
}

/// The page's `<audio>` element routed through an analyser to the speakers.
pub struct AudioPlayer {
    ctx: web::AudioContext,
    element: web::HtmlAudioElement,
    analyser: Option<web::AnalyserNode>,
    object_url: RefCell<Option<String>>,
}

impl AudioPlayer {
    pub fn new(document: &web::Document) -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let element = match document
            .get_element_by_id("audio-player")
            .and_then(|el| el.dyn_into::<web::HtmlAudioElement>().ok())
        {
            Some(el) => el,
            None => web::HtmlAudioElement::new().map_err(|e| anyhow::anyhow!("{:?}", e))?,
        };
        let analyser = create_analyser(&ctx);
        match &analyser {
            Some(a) => match ctx.create_media_element_source(&element) {
                Ok(src) => {
                    _ = src.connect_with_audio_node(a);
                    _ = a.connect_with_audio_node(&ctx.destination());
                }
                Err(e) => log::warn!("[audio] media source unavailable: {:?}", e),
            },
            None => log::warn!("[audio] analyser unavailable; visuals run without audio"),
        }
        Ok(Self {
            ctx,
            element,
            analyser,
            object_url: RefCell::new(None),
        })
    }

    pub fn toggle_play(&self) {
        // Browsers start the context suspended until a user gesture.
        _ = self.ctx.resume();
        if self.element.paused() {
            if self.element.src().is_empty() {
                log::info!("[audio] no track loaded");
                return;
            }
            _ = self.element.play();
        } else {
            _ = self.element.pause();
        }
    }

    pub fn load_file(&self, file: &web::File) {
        let url = match web::Url::create_object_url_with_blob(file) {
            Ok(u) => u,
            Err(e) => {
                log::warn!("[audio] could not open {}: {:?}", file.name(), e);
                return;
            }
        };
        if let Some(old) = self.object_url.borrow_mut().replace(url.clone()) {
            _ = web::Url::revoke_object_url(&old);
        }
        self.element.set_src(&url);
        _ = self.ctx.resume();
        _ = self.element.play();
        log::info!("[audio] playing {}", file.name());
    }
}

/// Wire the optional `#audio-file` picker and `#play-pause` button.
pub fn wire_controls(document: &web::Document, player: &Rc<AudioPlayer>) {
    let p = player.clone();
    dom::add_listener(document, "audio-file", "change", move |ev| {
        let file = ev
            .target()
            .and_then(|t| t.dyn_into::<web::HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        if let Some(f) = file {
            p.load_file(&f);
        }
    });
    let p = player.clone();
    dom::add_listener(document, "play-pause", "click", move |_| p.toggle_play());
}

/// Per-frame spectrum source backed by the analyser node.
pub struct AnalyserBridge {
    analyser: Option<web::AnalyserNode>,
    buf: Vec<u8>,
}

impl AnalyserBridge {
    pub fn new(player: &AudioPlayer) -> Self {
        let bins = player
            .analyser
            .as_ref()
            .map(|a| a.frequency_bin_count() as usize)
            .unwrap_or(0);
        Self {
            analyser: player.analyser.clone(),
            buf: vec![0; bins],
        }
    }
}

impl AudioBridge for AnalyserBridge {
    fn sample(&mut self) -> BandEnergies {
        match &self.analyser {
            Some(a) => {
                a.get_byte_frequency_data(&mut self.buf);
                band_energies_from_bytes(&self.buf)
            }
            None => BandEnergies::SILENCE,
        }
    }
}
