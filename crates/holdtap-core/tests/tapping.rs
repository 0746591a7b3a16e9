mod common;

use common::{TestDriver, TAPPING_TERM};
use holdtap_core::{Action, Binding, KeyCode, KeyPos, Keymap, Modifier, Report};

const KEY_7: KeyPos = KeyPos::new(0, 7);
const KEY_8: KeyPos = KeyPos::new(0, 8);

fn mod_tap(tap: KeyCode, hold: Modifier) -> Binding {
    Binding::TapHold {
        tap: Action::Key(tap),
        hold: Action::Modifier(hold),
    }
}

fn report(codes: &[KeyCode]) -> Report {
    Report::from_codes(codes)
}

#[test]
fn tap_reports_key_on_release() {
    let keymap = Keymap::new().with(0, KEY_7, mod_tap(KeyCode::P, Modifier::LShift));
    let mut driver = TestDriver::new(keymap);

    driver.press(KEY_7);
    driver.run_one_scan_loop();
    assert!(driver.take_reports().is_empty());

    driver.release(KEY_7);
    driver.run_one_scan_loop();
    assert_eq!(
        driver.take_reports(),
        vec![report(&[KeyCode::P]), Report::empty()]
    );
}

#[test]
fn hold_reports_modifier_at_tapping_term() {
    let keymap = Keymap::new().with(0, KEY_7, mod_tap(KeyCode::P, Modifier::LShift));
    let mut driver = TestDriver::new(keymap);

    driver.press(KEY_7);
    driver.idle_for(TAPPING_TERM);
    assert!(driver.take_reports().is_empty());

    driver.run_one_scan_loop();
    assert_eq!(driver.take_reports(), vec![report(&[KeyCode::LSHIFT])]);

    driver.release(KEY_7);
    driver.run_one_scan_loop();
    assert_eq!(driver.take_reports(), vec![Report::empty()]);
}

#[test]
fn silent_on_press_for_every_binding_kind() {
    let bindings = [
        mod_tap(KeyCode::P, Modifier::LCtrl),
        mod_tap(KeyCode::ENTER, Modifier::RGui),
        Binding::TapHold {
            tap: Action::Key(KeyCode::SPACE),
            hold: Action::Layer(1),
        },
        Binding::TapHold {
            tap: Action::Modifier(Modifier::LShift),
            hold: Action::Layer(2),
        },
    ];
    for binding in bindings {
        let mut driver = TestDriver::new(Keymap::new().with(0, KEY_8, binding));
        driver.press(KEY_8);
        driver.idle_for(TAPPING_TERM / 2);
        assert!(driver.take_reports().is_empty(), "{:?} reported on press", binding);
    }
}

#[test]
fn quick_retap_is_silent_until_release() {
    let keymap = Keymap::new().with(0, KEY_7, mod_tap(KeyCode::P, Modifier::LShift));
    let mut driver = TestDriver::new(keymap);

    driver.press(KEY_7);
    driver.run_one_scan_loop();
    driver.release(KEY_7);
    driver.run_one_scan_loop();
    assert_eq!(
        driver.take_reports(),
        vec![report(&[KeyCode::P]), Report::empty()]
    );

    // Pressing again right after a tap starts a fresh, undecided press.
    driver.press(KEY_7);
    driver.run_one_scan_loop();
    assert!(driver.take_reports().is_empty());

    driver.release(KEY_7);
    driver.run_one_scan_loop();
    assert_eq!(
        driver.take_reports(),
        vec![report(&[KeyCode::P]), Report::empty()]
    );
}

#[test]
fn hold_after_previous_cycle_resolves_exactly_at_term() {
    let keymap = Keymap::new().with(0, KEY_7, mod_tap(KeyCode::P, Modifier::LShift));

    for gap in [TAPPING_TERM, TAPPING_TERM + 1, TAPPING_TERM + 2] {
        let mut driver = TestDriver::new(keymap.clone());

        driver.press(KEY_7);
        driver.run_one_scan_loop();
        driver.release(KEY_7);
        driver.run_one_scan_loop();
        driver.idle_for(gap);
        assert_eq!(
            driver.take_reports(),
            vec![report(&[KeyCode::P]), Report::empty()]
        );

        driver.press(KEY_7);
        driver.idle_for(TAPPING_TERM);
        assert!(
            driver.take_reports().is_empty(),
            "hold registered early after a gap of {} ms",
            gap
        );

        driver.run_one_scan_loop();
        assert_eq!(driver.take_reports(), vec![report(&[KeyCode::LSHIFT])]);

        driver.release(KEY_7);
        driver.run_one_scan_loop();
        assert_eq!(driver.take_reports(), vec![Report::empty()]);
    }
}

#[test]
fn tap_while_releasing_shift() {
    let keymap = Keymap::new()
        .with(0, KEY_7, Binding::Press(Action::Modifier(Modifier::LShift)))
        .with(0, KEY_8, mod_tap(KeyCode::P, Modifier::LCtrl));
    let mut driver = TestDriver::new(keymap);

    driver.press(KEY_7);
    driver.run_one_scan_loop();
    assert_eq!(driver.take_reports(), vec![report(&[KeyCode::LSHIFT])]);

    driver.press(KEY_8);
    driver.run_one_scan_loop();
    assert!(driver.take_reports().is_empty());

    // Releasing shift is held back while the mod-tap key is undecided.
    driver.release(KEY_7);
    driver.run_one_scan_loop();
    assert!(driver.take_reports().is_empty());

    driver.release(KEY_8);
    driver.run_one_scan_loop();
    assert_eq!(
        driver.take_reports(),
        vec![
            report(&[KeyCode::LSHIFT, KeyCode::P]),
            report(&[KeyCode::P]),
            Report::empty(),
        ]
    );
}

#[test]
fn tap_while_releasing_layer() {
    let keymap = Keymap::new()
        .with(0, KEY_7, Binding::Press(Action::Layer(1)))
        .with(1, KEY_7, Binding::Transparent)
        .with(0, KEY_8, mod_tap(KeyCode::P, Modifier::LCtrl))
        .with(1, KEY_8, mod_tap(KeyCode::Q, Modifier::LCtrl));
    let mut driver = TestDriver::new(keymap);

    driver.press(KEY_7);
    driver.run_one_scan_loop();
    assert!(driver.take_reports().is_empty());
    assert!(driver.engine.layers().is_on(1));

    driver.press(KEY_8);
    driver.run_one_scan_loop();
    assert!(driver.take_reports().is_empty());

    driver.release(KEY_7);
    driver.run_one_scan_loop();
    assert!(driver.take_reports().is_empty());
    assert!(driver.engine.layers().is_on(1), "layer release should be deferred");

    // The tap comes from layer 1, where the key was pressed.
    driver.release(KEY_8);
    driver.run_one_scan_loop();
    assert_eq!(
        driver.take_reports(),
        vec![report(&[KeyCode::Q]), Report::empty()]
    );
    assert!(!driver.engine.layers().is_on(1));
    assert!(driver.engine.is_idle());
}

#[test]
fn hold_while_releasing_layer_uses_press_time_binding() {
    let keymap = Keymap::new()
        .with(0, KEY_7, Binding::Press(Action::Layer(1)))
        .with(0, KEY_8, mod_tap(KeyCode::P, Modifier::LCtrl))
        .with(1, KEY_8, mod_tap(KeyCode::Q, Modifier::RAlt));
    let mut driver = TestDriver::new(keymap);

    driver.press(KEY_7);
    driver.run_one_scan_loop();
    driver.press(KEY_8);
    driver.run_one_scan_loop();
    driver.release(KEY_7);
    driver.run_one_scan_loop();

    driver.idle_for(TAPPING_TERM);
    assert_eq!(driver.take_reports(), vec![report(&[KeyCode::RALT])]);
    assert!(!driver.engine.layers().is_on(1));

    driver.release(KEY_8);
    driver.run_one_scan_loop();
    assert_eq!(driver.take_reports(), vec![Report::empty()]);
}

#[test]
fn nested_layer_tap_and_mod_tap() {
    // LT(1, SPC) held past the term, then a layer-1 mod-tap tapped while the
    // outer key's hold release is deferred behind it.
    let keymap = Keymap::new()
        .with(
            0,
            KEY_7,
            Binding::TapHold {
                tap: Action::Key(KeyCode::SPACE),
                hold: Action::Layer(1),
            },
        )
        .with(0, KEY_8, mod_tap(KeyCode::P, Modifier::LCtrl))
        .with(1, KEY_8, mod_tap(KeyCode::Q, Modifier::LCtrl));
    let mut driver = TestDriver::new(keymap);

    driver.press(KEY_7);
    driver.idle_for(TAPPING_TERM + 1);
    assert!(driver.engine.layers().is_on(1));
    assert!(driver.take_reports().is_empty());

    driver.press(KEY_8);
    driver.run_one_scan_loop();
    driver.release(KEY_7);
    driver.run_one_scan_loop();
    assert!(driver.engine.layers().is_on(1));
    assert_eq!(driver.engine.deferred().len(), 1);

    driver.release(KEY_8);
    driver.run_one_scan_loop();
    assert_eq!(
        driver.take_reports(),
        vec![report(&[KeyCode::Q]), Report::empty()]
    );
    assert!(!driver.engine.layers().is_on(1));
}

#[test]
fn empty_ticks_emit_nothing() {
    let keymap = Keymap::new()
        .with(0, KEY_7, Binding::Press(Action::Key(KeyCode::A)))
        .with(0, KEY_8, mod_tap(KeyCode::P, Modifier::LCtrl));
    let mut driver = TestDriver::new(keymap);

    driver.idle_for(10);
    assert!(driver.take_reports().is_empty());

    driver.press(KEY_7);
    driver.run_one_scan_loop();
    assert_eq!(driver.take_reports(), vec![report(&[KeyCode::A])]);

    driver.idle_for(TAPPING_TERM * 2);
    assert!(driver.take_reports().is_empty());
}

#[test]
fn slow_taps_match_plain_keys() {
    let sequence = |driver: &mut TestDriver| {
        for pos in [KEY_7, KEY_8, KEY_7] {
            driver.press(pos);
            driver.idle_for(5);
            driver.release(pos);
            driver.idle_for(TAPPING_TERM + 10);
        }
        driver.take_reports()
    };

    let dual = Keymap::new()
        .with(0, KEY_7, mod_tap(KeyCode::P, Modifier::LCtrl))
        .with(0, KEY_8, mod_tap(KeyCode::Q, Modifier::LShift));
    let plain = Keymap::new()
        .with(0, KEY_7, Binding::Press(Action::Key(KeyCode::P)))
        .with(0, KEY_8, Binding::Press(Action::Key(KeyCode::Q)));

    let dual_reports = sequence(&mut TestDriver::new(dual));
    let plain_reports = sequence(&mut TestDriver::new(plain));
    assert_eq!(dual_reports.len(), 6);
    assert_eq!(dual_reports, plain_reports);
}
