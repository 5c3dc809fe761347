use vj_core::transition::ease_in_out;
use vj_core::TransitionEngine;

#[test]
fn ease_is_symmetric_and_pinned() {
    assert_eq!(ease_in_out(0.0), 0.0);
    assert_eq!(ease_in_out(1.0), 1.0);
    assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
    for i in 0..=50 {
        let p = i as f32 / 100.0;
        assert!((ease_in_out(p) + ease_in_out(1.0 - p) - 1.0).abs() < 1e-5);
    }
}

#[test]
fn fade_rises_and_action_fires_once() {
    let mut t = TransitionEngine::new(1.0);
    t.start("mood", 0.0, None);
    let mut fired = 0;
    let mut prev = -1.0f32;
    let mut now = 0.0;
    while now <= 1500.0 {
        let step = t.tick(now);
        if t.is_active() {
            assert!(step.fade >= prev);
            prev = step.fade;
        }
        if step.completed.is_some() {
            fired += 1;
            assert_eq!(step.completed, Some("mood"));
            assert_eq!(step.fade, 1.0);
        }
        now += 16.0;
    }
    assert_eq!(fired, 1);
    assert!(t.is_idle());
    assert_eq!(t.tick(5000.0).fade, 1.0);
}

#[test]
fn restart_replaces_the_pending_change() {
    let mut t = TransitionEngine::new(1.0);
    t.start(1, 0.0, None);
    t.tick(400.0);
    t.start(2, 500.0, None);
    assert_eq!(t.tick(1200.0).completed, None);
    assert_eq!(t.tick(1500.0).completed, Some(2));
    assert_eq!(t.tick(3000.0).completed, None);
}

#[test]
fn gated_start_waits_for_the_beat() {
    let mut t = TransitionEngine::new(0.5);
    t.start('x', 100.0, Some(400.0));
    assert!(t.is_pending());
    assert_eq!(t.progress(300.0), 0.0);
    assert_eq!(t.tick(300.0).completed, None);
    let step = t.tick(500.0);
    assert!(t.is_active());
    assert_eq!(step.fade, 0.0);
    assert!((t.progress(750.0) - 0.5).abs() < 1e-6);
    assert_eq!(t.tick(1000.0).completed, Some('x'));
}

#[test]
fn zero_duration_completes_on_first_tick() {
    let mut t = TransitionEngine::new(0.0);
    t.start((), 10.0, None);
    let step = t.tick(10.0);
    assert_eq!(step.completed, Some(()));
    assert_eq!(step.fade, 1.0);
}

#[test]
fn mode_names_parse_leniently() {
    use vj_core::TransitionMode;
    assert_eq!(TransitionMode::from_name("Wipe"), TransitionMode::Wipe);
    assert_eq!(TransitionMode::from_name(" zoom "), TransitionMode::Zoom);
    assert_eq!(TransitionMode::from_name("dissolve"), TransitionMode::Fade);
}
