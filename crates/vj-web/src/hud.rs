// Inline styles for the logo overlay and BPM readout. No web-sys types.

/// CSS for the logo element: hidden unless visible with non-empty text,
/// otherwise sized, scaled and glowing with the bass.
pub fn logo_style(visible: bool, text: &str, size_px: f32, glow: f32, scale: f32) -> String {
    if !visible || text.trim().is_empty() {
        return "display:none".to_string();
    }
    let blur = (glow * 40.0).round();
    let alpha = glow.clamp(0.0, 1.0);
    format!(
        "display:block;font-size:{:.0}px;transform:scale({:.3});text-shadow:0 0 {}px rgba(255,255,255,{:.2})",
        size_px, scale, blur, alpha
    )
}

#[inline]
pub fn bpm_label(bpm: f32) -> String {
    format!("{:.0} BPM", bpm)
}
