//! Unit tests for reset handling and the initialization handshake

use crate::common::{product_id_entry, MockChannel, MockDelay, MockResetPin};
use bno08x::{Bno08x, Error, CHANNEL_COMMAND, CHANNEL_EXECUTABLE, CHANNEL_HUB_CONTROL};

/// A startup advertisement payload; large enough to force chunked reads
/// through the default 32-byte window
fn advertisement() -> Vec<u8> {
    let mut payload = vec![0u8; 272];
    // response id, then tag/length/value filler
    payload[0] = 0x00;
    for (i, byte) in payload.iter_mut().enumerate().skip(1) {
        *byte = (i % 7) as u8;
    }
    payload
}

#[test]
fn test_init_reports_product_ids() {
    let channel = MockChannel::new();
    channel.queue_frame(CHANNEL_COMMAND, &advertisement());

    let mut response = Vec::new();
    response.extend_from_slice(&product_id_entry(10003608, 3, 2, 7, 370));
    response.extend_from_slice(&product_id_entry(10003606, 1, 2, 4, 230));
    channel.set_product_id_response(&response);

    let mut driver = Bno08x::with_reset_pin(channel.clone(), MockResetPin::new());
    let ids = driver.init(&mut MockDelay).unwrap();

    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0].sw_part_number, 10003608);
    assert_eq!(ids[0].sw_version_major, 3);
    assert_eq!(ids[0].sw_version_minor, 2);
    assert_eq!(ids[0].sw_version_patch, 7);
    assert_eq!(ids[0].sw_build_number, 370);
    assert_eq!(ids[1].sw_part_number, 10003606);
}

#[test]
fn test_init_with_reset_pin_pulses_the_line() {
    let channel = MockChannel::new();
    channel.set_product_id_response(&product_id_entry(10003608, 3, 2, 7, 370));

    let pin = MockResetPin::new();
    let mut driver = Bno08x::with_reset_pin(channel.clone(), pin.clone());
    driver.init(&mut MockDelay).unwrap();

    assert_eq!(pin.transitions(), vec![true, false, true]);

    // no reset command goes over the wire when the line is used
    assert!(channel
        .written_frames()
        .iter()
        .all(|frame| frame[2] != CHANNEL_EXECUTABLE));
}

#[test]
fn test_init_without_pin_sends_reset_command() {
    let channel = MockChannel::new();
    channel.set_product_id_response(&product_id_entry(10003608, 3, 2, 7, 370));

    let mut driver = Bno08x::new(channel.clone());
    driver.init(&mut MockDelay).unwrap();

    let frames = channel.written_frames();
    assert_eq!(frames[0], vec![5, 0, CHANNEL_EXECUTABLE, 0, 1]);
}

#[test]
fn test_init_drains_startup_frames() {
    let channel = MockChannel::new();
    channel.queue_frame(CHANNEL_COMMAND, &advertisement());
    channel.queue_frame(CHANNEL_EXECUTABLE, &[1]); // reset complete
    channel.set_product_id_response(&product_id_entry(10003608, 3, 2, 7, 370));

    let mut driver = Bno08x::with_reset_pin(channel.clone(), MockResetPin::new());
    driver.init(&mut MockDelay).unwrap();

    assert_eq!(channel.pending_frames(), 0);
}

#[test]
fn test_init_times_out_without_response() {
    let channel = MockChannel::new();
    channel.queue_frame(CHANNEL_COMMAND, &advertisement());
    // no product ID response configured

    let mut driver = Bno08x::with_reset_pin(channel.clone(), MockResetPin::new());
    let result = driver.init(&mut MockDelay);

    assert!(matches!(result, Err(Error::InitializationTimeout)));
}

#[test]
fn test_product_id_request_frame_shape() {
    let channel = MockChannel::new();
    channel.set_product_id_response(&product_id_entry(10003608, 3, 2, 7, 370));

    let mut driver = Bno08x::with_reset_pin(channel.clone(), MockResetPin::new());
    driver.init(&mut MockDelay).unwrap();

    let frames = channel.written_frames();
    let request = frames
        .iter()
        .find(|frame| frame[2] == CHANNEL_HUB_CONTROL)
        .expect("no hub-control frame written");
    assert_eq!(request, &vec![6, 0, CHANNEL_HUB_CONTROL, 0, 0xF9, 0]);
}

#[test]
fn test_sequence_numbers_increment_per_channel() {
    let channel = MockChannel::new();
    let mut driver = Bno08x::new(channel.clone());

    driver.soft_reset().unwrap();
    driver.soft_reset().unwrap();

    let frames = channel.written_frames();
    assert_eq!(frames[0][3], 0);
    assert_eq!(frames[1][3], 1);
}

#[test]
fn test_receive_packet_returns_whole_frame() {
    let channel = MockChannel::new();
    channel.queue_frame(CHANNEL_HUB_CONTROL, &[0xF8, 1, 2, 3]);

    let mut driver = Bno08x::new(channel);
    let frame = driver.receive_packet().unwrap();

    assert_eq!(frame.len(), 8);
    assert_eq!(&frame[4..], &[0xF8, 1, 2, 3]);
}

#[test]
fn test_receive_packet_empty_when_idle() {
    let mut driver = Bno08x::new(MockChannel::new());
    assert!(driver.receive_packet().unwrap().is_empty());
}
