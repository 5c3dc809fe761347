use std::ops::Range;

// Shared tuning constants used by the engine and both frontends.

// Layers
pub const MAX_LAYERS: usize = 4;
pub const VISUAL_MODE_COUNT: u32 = 20;
pub const COLOR_THEME_COUNT: u32 = 8;

// Spectrum analysis (1024-point FFT -> 512 magnitude bins)
pub const FFT_SIZE: usize = 1024;
pub const SPECTRUM_BINS: usize = FFT_SIZE / 2;
pub const BASS_BINS: Range<usize> = 0..40;
pub const MID_BINS: Range<usize> = 40..200;
pub const HIGH_BINS: Range<usize> = 200..512;
pub const BYTE_MAGNITUDE_MAX: f32 = 255.0;
// Analyser byte scaling window, matches the WebAudio defaults
pub const ANALYSER_MIN_DB: f32 = -100.0;
pub const ANALYSER_MAX_DB: f32 = -30.0;
pub const ANALYSER_SMOOTHING: f32 = 0.8;

// Reactivity mapping
pub const REACT_BASE: f32 = 0.3;
pub const REACT_SLIDER_GAIN: f32 = 0.85;
pub const ENERGY_BASE: f32 = 0.7;
pub const ENERGY_GAIN: f32 = 0.7;
pub const REACT_COMPRESSION: f32 = 0.7;
pub const BEAT_BOOST_SCALE: f32 = 0.5;
pub const BEAT_BOOST_MID: f32 = 0.5;
pub const BEAT_BOOST_HIGH: f32 = 0.3;
pub const DETAIL_BASE: f32 = 0.8;
pub const DETAIL_GAIN: f32 = 1.4;

// Frame-level modulation
pub const BEAT_STROBE_BOOST: f32 = 0.3;
pub const BRIGHTNESS_ENERGY_BASE: f32 = 0.7;
pub const BRIGHTNESS_ENERGY_GAIN: f32 = 0.8;
pub const MOTION_SCALE: f32 = 0.25;
pub const ROTATE_WOBBLE_GAIN: f32 = 1.5;
pub const POSITION_REACT_GAIN: f32 = 0.5;
pub const STROBE_ENERGY_BASE: f32 = 0.5;
pub const STROBE_ENERGY_GAIN: f32 = 0.8;

// Beat clock
pub const DEFAULT_BPM: f32 = 120.0;
pub const MIN_BPM: f32 = 40.0; // exclusive
pub const MAX_BPM: f32 = 240.0; // exclusive
pub const TAP_RESET_MS: f64 = 2000.0;
pub const TAP_HISTORY: usize = 6; // five intervals

// Tempo detection
pub const DETECT_WINDOW_MS: f64 = 8000.0;
pub const DETECT_TRAILING_MS: f64 = 1000.0;
pub const DETECT_ONSET_RATIO: f32 = 1.3;
pub const DETECT_REFRACTORY_MS: f64 = 250.0;
pub const DETECT_MIN_ONSETS: usize = 4;
pub const DETECT_FLOOR_ENERGY: f32 = 0.01;
pub const DETECT_FOLD_LOW: f32 = 60.0;
pub const DETECT_FOLD_HIGH: f32 = 180.0;

// Transitions and scene switching
pub const DEFAULT_TRANSITION_SECS: f32 = 1.0;
pub const DEFAULT_AUTO_SWITCH_SECS: f32 = 20.0;

// Global control defaults
pub const DEFAULT_BRIGHTNESS: f32 = 0.5;
pub const DEFAULT_CAMERA_ZOOM: f32 = 1.0;
pub const DEFAULT_AUDIO_REACT: f32 = 1.0;
pub const DEFAULT_MACRO: f32 = 0.5;
pub const DEFAULT_BEAT_SYNC_INTENSITY: f32 = 0.5;
pub const DEFAULT_LOGO_SIZE: f32 = 18.0;
pub const CAMERA_ZOOM_RANGE: (f32, f32) = (0.25, 4.0);
pub const CAMERA_ROTATE_RANGE: (f32, f32) = (-180.0, 180.0);
pub const AUDIO_REACT_RANGE: (f32, f32) = (0.0, 2.0);
pub const TRANSITION_SECS_RANGE: (f32, f32) = (0.0, 5.0);

pub const DEFAULT_CUSTOM_PALETTE: [[f32; 3]; 4] = [
    [0.33, 0.53, 0.80],
    [0.53, 0.80, 0.33],
    [0.80, 0.33, 0.53],
    [0.80, 0.67, 0.20],
];
pub const FALLBACK_HEX_COLOR: [f32; 3] = [0.5, 0.5, 0.5];

// HUD modulation
pub const HUD_GLOW_BASE: f32 = 0.25;
pub const HUD_GLOW_GAIN: f32 = 0.6;
pub const HUD_SCALE_GAIN: f32 = 0.25;

// MIDI
pub const MIDI_DATA_MAX: u8 = 127;
pub const MIDI_VALUE_MAX: f32 = 127.0;
pub const MIDI_TOGGLE_THRESHOLD: f32 = 0.5;

// Persistence keys
pub const PRESET_STORAGE_KEY: &str = "vj_presets_v1";
pub const MIDI_STORAGE_KEY: &str = "vj_midi_mappings_v1";
pub const SHARE_QUERY_PARAM: &str = "preset";

// GPU
pub const UNIFORM_SLOT_SIZE: u64 = 256;
