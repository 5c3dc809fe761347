use glam::Vec2;
use vj_core::patterns::shade;
use vj_core::{ColorTheme, LayerUniforms, VisualMode};

fn uniforms(mode: VisualMode) -> LayerUniforms {
    LayerUniforms {
        resolution: [800.0, 600.0],
        time: 3.25,
        bass: 0.6,
        mid: 0.4,
        high: 0.2,
        brightness: 1.0,
        opacity: 1.0,
        zoom: 1.0,
        mode: mode.id(),
        theme: ColorTheme::Neon.id(),
        ..LayerUniforms::default()
    }
}

fn grid() -> impl Iterator<Item = Vec2> {
    (0..7).flat_map(|i| (0..7).map(move |j| Vec2::new(i as f32 / 6.0, j as f32 / 6.0)))
}

#[test]
fn every_mode_is_finite_everywhere() {
    for mode in VisualMode::ALL {
        for kind in [0, 1] {
            let u = LayerUniforms {
                kind,
                strobe: 0.7,
                beat_phase: 2.3,
                ..uniforms(mode)
            };
            for uv in grid() {
                let c = shade(&u, uv);
                assert!(c.is_finite(), "{:?} produced {:?} at {:?}", mode, c, uv);
            }
        }
    }
}

#[test]
fn background_alpha_is_layer_opacity() {
    let u = LayerUniforms {
        opacity: 0.35,
        ..uniforms(VisualMode::PlasmaGrid)
    };
    for uv in grid() {
        assert!((shade(&u, uv).w - 0.35).abs() < 1e-6);
    }
}

#[test]
fn object_alpha_follows_intensity() {
    let u = LayerUniforms {
        kind: 1,
        ..uniforms(VisualMode::OrbPulse)
    };
    for uv in grid() {
        let c = shade(&u, uv);
        assert!(c.w >= 0.0 && c.w <= 1.0);
    }
    let hidden = LayerUniforms { opacity: 0.0, ..u };
    assert_eq!(shade(&hidden, Vec2::splat(0.5)).w, 0.0);
}

#[test]
fn zero_brightness_is_black() {
    let u = LayerUniforms {
        brightness: 0.0,
        ..uniforms(VisualMode::RadialWaves)
    };
    let c = shade(&u, Vec2::new(0.3, 0.7));
    assert_eq!(c.truncate(), glam::Vec3::ZERO);
}

#[test]
fn custom_palette_overrides_theme() {
    let base = uniforms(VisualMode::SoftClouds);
    let custom = LayerUniforms {
        use_custom_palette: 1,
        custom_palette: [[1.0, 0.0, 0.0, 0.0]; 4],
        ..base
    };
    let uv = Vec2::new(0.4, 0.6);
    assert_ne!(shade(&base, uv), shade(&custom, uv));
}

#[test]
fn unknown_mode_ids_clamp_to_the_last_mode() {
    assert_eq!(VisualMode::from_id(20), None);
    assert_eq!(VisualMode::from_id_clamped(99), VisualMode::ElectricArcs);
    assert_eq!(ColorTheme::from_id_clamped(8), ColorTheme::Vaporwave);
    let a = shade(&LayerUniforms { mode: 99, ..uniforms(VisualMode::ElectricArcs) }, Vec2::splat(0.4));
    let b = shade(&uniforms(VisualMode::ElectricArcs), Vec2::splat(0.4));
    assert_eq!(a, b);
}
