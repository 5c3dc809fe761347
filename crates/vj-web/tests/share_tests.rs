// Host-side tests for share-link and overlay helpers.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod share {
    include!("../src/share.rs");
}
mod hud {
    include!("../src/hud.rs");
}

use vj_core::{decode_share, encode_share, Preset};

#[test]
fn plus_signs_survive_query_decoding() {
    let preset = Preset {
        name: "Warehouse ~~~ ???".into(),
        brightness: 0.8,
        logo_text: ">>> ??? <<<".into(),
        ..Preset::default()
    };
    let encoded = encode_share(&preset).unwrap();
    // What URLSearchParams hands back for an unescaped value.
    let mangled = encoded.replace('+', " ");
    let decoded = decode_share(&share::restore_plus(&mangled)).unwrap();
    assert_eq!(decoded, preset);
}

#[test]
fn restore_plus_trims_edges() {
    assert_eq!(share::restore_plus("  ab cd= "), "ab+cd=");
}

#[test]
fn share_url_joins_parts() {
    assert_eq!(
        share::share_url("https://vj.example", "/live/", "preset", "eyJ9"),
        "https://vj.example/live/?preset=eyJ9"
    );
    assert_eq!(
        share::share_url("http://localhost:8080", "", "preset", "x"),
        "http://localhost:8080/?preset=x"
    );
}

#[test]
fn hidden_or_empty_logo_is_not_displayed() {
    assert_eq!(hud::logo_style(false, "DJ", 18.0, 0.5, 1.0), "display:none");
    assert_eq!(hud::logo_style(true, "   ", 18.0, 0.5, 1.0), "display:none");
}

#[test]
fn logo_glow_and_scale_follow_hud() {
    let style = hud::logo_style(true, "DJ", 24.0, 0.85, 1.25);
    assert!(style.starts_with("display:block"));
    assert!(style.contains("font-size:24px"));
    assert!(style.contains("scale(1.250)"));
    assert!(style.contains("0 0 34px"));
    assert!(style.contains("rgba(255,255,255,0.85)"));
}

#[test]
fn bpm_label_rounds() {
    assert_eq!(hud::bpm_label(127.6), "128 BPM");
}
