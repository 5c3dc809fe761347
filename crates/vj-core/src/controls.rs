use crate::constants::*;

/// Macro sliders shared by every layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Macros {
    pub energy: f32,
    pub motion: f32,
    pub detail: f32,
}

impl Default for Macros {
    fn default() -> Self {
        Self {
            energy: DEFAULT_MACRO,
            motion: DEFAULT_MACRO,
            detail: DEFAULT_MACRO,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Logo {
    pub text: String,
    pub visible: bool,
    pub size: f32,
}

impl Default for Logo {
    fn default() -> Self {
        Self {
            text: String::new(),
            visible: false,
            size: DEFAULT_LOGO_SIZE,
        }
    }
}

/// User-supplied A/B/C/D rows overriding the per-layer theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CustomPalette {
    pub active: bool,
    pub rows: [[f32; 3]; 4],
}

impl Default for CustomPalette {
    fn default() -> Self {
        Self {
            active: false,
            rows: DEFAULT_CUSTOM_PALETTE,
        }
    }
}

impl CustomPalette {
    pub fn from_hex(colors: [&str; 4]) -> Self {
        Self {
            active: true,
            rows: colors.map(hex_to_rgb01),
        }
    }
}

/// Global (non-layer) controls.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalControls {
    pub brightness: f32,
    pub camera_zoom: f32,
    pub camera_rotate_deg: f32,
    pub audio_react: f32,
    pub macros: Macros,
    pub beat_sync: bool,
    pub beat_sync_intensity: f32,
    pub beat_strobe: bool,
    pub logo: Logo,
    pub custom_palette: CustomPalette,
}

impl Default for GlobalControls {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            camera_zoom: DEFAULT_CAMERA_ZOOM,
            camera_rotate_deg: 0.0,
            audio_react: DEFAULT_AUDIO_REACT,
            macros: Macros::default(),
            beat_sync: false,
            beat_sync_intensity: DEFAULT_BEAT_SYNC_INTENSITY,
            beat_strobe: false,
            logo: Logo::default(),
            custom_palette: CustomPalette::default(),
        }
    }
}

impl GlobalControls {
    pub fn sanitize(&mut self) {
        self.brightness = finite_clamp(self.brightness, 0.0, 1.0, DEFAULT_BRIGHTNESS);
        self.camera_zoom = finite_clamp(
            self.camera_zoom,
            CAMERA_ZOOM_RANGE.0,
            CAMERA_ZOOM_RANGE.1,
            DEFAULT_CAMERA_ZOOM,
        );
        self.camera_rotate_deg = finite_clamp(
            self.camera_rotate_deg,
            CAMERA_ROTATE_RANGE.0,
            CAMERA_ROTATE_RANGE.1,
            0.0,
        );
        self.audio_react = finite_clamp(
            self.audio_react,
            AUDIO_REACT_RANGE.0,
            AUDIO_REACT_RANGE.1,
            DEFAULT_AUDIO_REACT,
        );
        self.beat_sync_intensity =
            finite_clamp(self.beat_sync_intensity, 0.0, 1.0, DEFAULT_BEAT_SYNC_INTENSITY);
        self.macros.energy = finite_clamp(self.macros.energy, 0.0, 1.0, DEFAULT_MACRO);
        self.macros.motion = finite_clamp(self.macros.motion, 0.0, 1.0, DEFAULT_MACRO);
        self.macros.detail = finite_clamp(self.macros.detail, 0.0, 1.0, DEFAULT_MACRO);
        if !self.logo.size.is_finite() || self.logo.size <= 0.0 {
            self.logo.size = DEFAULT_LOGO_SIZE;
        }
    }
}

pub(crate) fn finite_clamp(v: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v.clamp(lo, hi)
    } else {
        fallback
    }
}

/// Parse `#rrggbb` into 0..1 floats; malformed input yields mid grey.
pub fn hex_to_rgb01(hex: &str) -> [f32; 3] {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return FALLBACK_HEX_COLOR;
    }
    let mut out = [0.0; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        match u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16) {
            Ok(v) => *slot = v as f32 / 255.0,
            Err(_) => return FALLBACK_HEX_COLOR,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_and_falls_back() {
        let c = hex_to_rgb01("#ff8000");
        assert!((c[0] - 1.0).abs() < 1e-6);
        assert!((c[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c[2], 0.0);
        assert_eq!(hex_to_rgb01("#12"), FALLBACK_HEX_COLOR);
        assert_eq!(hex_to_rgb01("#zzzzzz"), FALLBACK_HEX_COLOR);
        assert_eq!(hex_to_rgb01("#+f+f+f"), FALLBACK_HEX_COLOR);
    }

    #[test]
    fn sanitize_restores_ranges() {
        let mut g = GlobalControls {
            brightness: 2.0,
            camera_zoom: f32::NAN,
            audio_react: -1.0,
            ..GlobalControls::default()
        };
        g.sanitize();
        assert_eq!(g.brightness, 1.0);
        assert_eq!(g.camera_zoom, DEFAULT_CAMERA_ZOOM);
        assert_eq!(g.audio_react, 0.0);
    }
}
