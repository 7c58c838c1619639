//! End-to-end session tests: raw surface bytes in, LED sysex frames out,
//! through the public decode -> state machine -> encode pipeline.

use gridmock::codec::{self, SYSEX_HEADER};
use gridmock::color::palette;
use gridmock::device::DeviceState;
use gridmock::layout::{track_select_id, NAV_UP};

/// Run one raw inbound message through the full pipeline and return the
/// outbound frame, if the event produced one.
fn process(device: &mut DeviceState, raw: &[u8]) -> Option<Vec<u8>> {
    let event = codec::decode(raw).ok()?;
    let updates = device.apply(&event);
    codec::encode_led_frame(&updates)
}

#[test]
fn test_boot_sync_frame() {
    let device = DeviceState::new();
    let snapshot = device.snapshot();
    let frame = codec::encode_led_frame(&snapshot).unwrap();

    // 76 lit controls, 4 bytes each, behind the header and mode byte
    assert_eq!(frame.len(), 2 + SYSEX_HEADER.len() + 1 + 4 * 76);

    // Selector row in the boot picture: first cyan, the rest dim
    let quads: Vec<&[u8]> = frame[7..frame.len() - 1].chunks(4).collect();
    let selector = |id: u8| quads.iter().find(|q| q[0] == id).copied().unwrap();

    assert_eq!(selector(track_select_id(0)), &[91, 0, 63, 63]);
    for index in 1..8 {
        assert_eq!(
            selector(track_select_id(index)),
            &[track_select_id(index), 20, 20, 20]
        );
    }
}

#[test]
fn test_nav_press_release_frames_in_order() {
    let mut device = DeviceState::new();

    // Note-on then note-off on the nav-up key
    let pressed = process(&mut device, &[0x90, NAV_UP, 100]).unwrap();
    let released = process(&mut device, &[0x80, NAV_UP, 0]).unwrap();

    // Two sequential single-entry frames: bright blue, then dim blue
    assert_eq!(
        pressed,
        vec![0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x0B, NAV_UP, 0, 0, 63, 0xF7]
    );
    assert_eq!(
        released,
        vec![0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x0B, NAV_UP, 0, 0, 20, 0xF7]
    );
}

#[test]
fn test_track_select_frame_shape() {
    let mut device = DeviceState::new();

    let frame = process(&mut device, &[0x90, track_select_id(4), 127]).unwrap();

    // Whole selector row in one frame
    assert_eq!(frame.len(), 2 + SYSEX_HEADER.len() + 1 + 4 * 8);
    assert_eq!(device.context().track, 4);

    let quads: Vec<&[u8]> = frame[7..frame.len() - 1].chunks(4).collect();
    for (i, quad) in quads.iter().enumerate() {
        assert_eq!(quad[0], track_select_id(i as u8));
        let expected = if i == 4 {
            palette::CYAN
        } else {
            palette::DIM_WHITE
        };
        assert_eq!(&quad[1..], &[expected.r, expected.g, expected.b]);
    }
}

#[test]
fn test_pad_round_trip_over_the_wire() {
    let mut device = DeviceState::new();
    let before = device.snapshot();

    // Velocity-0 note-on is a release, like the surface sends it
    let pressed = process(&mut device, &[0x90, 55, 64]).unwrap();
    let released = process(&mut device, &[0x90, 55, 0]).unwrap();

    assert_eq!(&pressed[7..11], &[55, 63, 63, 63]);
    assert_eq!(&released[7..11], &[55, 20, 20, 20]);
    assert_eq!(device.snapshot(), before);
}

#[test]
fn test_unmapped_and_cc_traffic_sends_no_frames() {
    let mut device = DeviceState::new();
    let before = device.snapshot();

    // Press outside every range, an encoder move, and a vendor frame
    assert_eq!(process(&mut device, &[0x90, 99, 100]), None);
    assert_eq!(process(&mut device, &[0xB0, 20, 64]), None);
    assert_eq!(
        process(&mut device, &[0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x15, 0xF7]),
        None
    );

    assert_eq!(device.snapshot(), before);
}

#[test]
fn test_malformed_bytes_are_recoverable() {
    let mut device = DeviceState::new();

    assert!(codec::decode(&[0x90, 55]).is_err());

    // The device keeps working after a decode failure
    let frame = process(&mut device, &[0x90, 55, 64]);
    assert!(frame.is_some());
}
