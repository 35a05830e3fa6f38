//! Fixed-layout frame codec.
//!
//! [`decode`] turns one transport delivery into a validated
//! [`ProcessFrame`]. Every range rule is checked so a rejection names all
//! offending fields, not just the first one found. Bytes past the fixed
//! layout are ignored.
//!
//! The encoders are used by the host simulator and the test suites to
//! produce byte-exact cloud traffic.

use super::{
    DoorStatus, ProcessFrame, StartFrame, UpdateFrame, MEAT_NAME_LEN, START_COMMAND,
    START_CURRENT_HUMIDITY, START_CURRENT_TEMPERATURE, START_DOOR_STATUS, START_FRAME_LEN,
    START_MEAT_NAME, START_TARGET_HUMIDITY, START_TARGET_TEMPERATURE, START_TIME_OF_SMOKING,
    START_TYPE, UPDATE_CURRENT_HUMIDITY, UPDATE_CURRENT_TEMPERATURE, UPDATE_DOOR_STATUS,
    UPDATE_FRAME_LEN, UPDATE_TYPE,
};
use crate::config::{HUMID_MAX, MAX_SMOKING_SECS, TEMP_MAX, TEMP_MIN};
use crate::error::{DecodeError, Field, FieldSet};

fn read_i16(buf: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([buf[at], buf[at + 1]])
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn temperature_ok(t: i16) -> bool {
    (TEMP_MIN..=TEMP_MAX).contains(&t)
}

fn humidity_ok(h: u8) -> bool {
    h <= HUMID_MAX
}

fn check(bad: &mut FieldSet, field: Field, ok: bool) {
    if !ok {
        bad.insert(field);
    }
}

fn require_len(buf: &[u8], expected: usize) -> Result<(), DecodeError> {
    if buf.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// Decode and validate one inbound frame.
pub fn decode(buf: &[u8]) -> Result<ProcessFrame, DecodeError> {
    let Some(&frame_type) = buf.first() else {
        return Err(DecodeError::Empty);
    };

    match frame_type {
        START_TYPE => decode_start(buf).map(ProcessFrame::Start),
        UPDATE_TYPE => decode_update(buf).map(ProcessFrame::Update),
        other => Err(DecodeError::UnknownType(other)),
    }
}

fn decode_start(buf: &[u8]) -> Result<StartFrame, DecodeError> {
    require_len(buf, START_FRAME_LEN)?;

    let target_humidity = buf[START_TARGET_HUMIDITY];
    let target_temperature = read_i16(buf, START_TARGET_TEMPERATURE);
    let current_humidity = buf[START_CURRENT_HUMIDITY];
    let current_temperature = read_i16(buf, START_CURRENT_TEMPERATURE);
    let door = DoorStatus::from_wire(buf[START_DOOR_STATUS]);
    let time_of_smoking_secs = read_u16(buf, START_TIME_OF_SMOKING);

    let mut bad = FieldSet::empty();
    check(&mut bad, Field::TargetHumidity, humidity_ok(target_humidity));
    check(&mut bad, Field::TargetTemperature, temperature_ok(target_temperature));
    check(&mut bad, Field::CurrentHumidity, humidity_ok(current_humidity));
    check(&mut bad, Field::CurrentTemperature, temperature_ok(current_temperature));
    check(&mut bad, Field::DoorStatus, door.is_some());
    let secs = u32::from(time_of_smoking_secs);
    check(
        &mut bad,
        Field::TimeOfSmoking,
        secs > 0 && secs <= MAX_SMOKING_SECS,
    );

    match door {
        Some(door_status) if bad.is_empty() => {
            let mut meat_name = [0u8; MEAT_NAME_LEN];
            meat_name.copy_from_slice(&buf[START_MEAT_NAME..START_MEAT_NAME + MEAT_NAME_LEN]);
            Ok(StartFrame {
                command: buf[START_COMMAND],
                meat_name,
                target_humidity,
                target_temperature,
                current_humidity,
                current_temperature,
                door_status,
                time_of_smoking_secs,
            })
        }
        _ => Err(DecodeError::OutOfRange(bad)),
    }
}

fn decode_update(buf: &[u8]) -> Result<UpdateFrame, DecodeError> {
    require_len(buf, UPDATE_FRAME_LEN)?;

    let current_humidity = buf[UPDATE_CURRENT_HUMIDITY];
    let current_temperature = read_i16(buf, UPDATE_CURRENT_TEMPERATURE);
    let door = DoorStatus::from_wire(buf[UPDATE_DOOR_STATUS]);

    let mut bad = FieldSet::empty();
    check(&mut bad, Field::CurrentHumidity, humidity_ok(current_humidity));
    check(&mut bad, Field::CurrentTemperature, temperature_ok(current_temperature));
    check(&mut bad, Field::DoorStatus, door.is_some());

    match door {
        Some(door_status) if bad.is_empty() => Ok(UpdateFrame {
            current_humidity,
            current_temperature,
            door_status,
        }),
        _ => Err(DecodeError::OutOfRange(bad)),
    }
}

/// Serialize a Start frame into its 41-byte wire form.
pub fn encode_start(frame: &StartFrame) -> [u8; START_FRAME_LEN] {
    let mut out = [0u8; START_FRAME_LEN];
    out[0] = START_TYPE;
    out[START_COMMAND] = frame.command;
    out[START_MEAT_NAME..START_MEAT_NAME + MEAT_NAME_LEN].copy_from_slice(&frame.meat_name);
    out[START_TARGET_HUMIDITY] = frame.target_humidity;
    out[START_TARGET_TEMPERATURE..START_TARGET_TEMPERATURE + 2]
        .copy_from_slice(&frame.target_temperature.to_le_bytes());
    out[START_CURRENT_HUMIDITY] = frame.current_humidity;
    out[START_CURRENT_TEMPERATURE..START_CURRENT_TEMPERATURE + 2]
        .copy_from_slice(&frame.current_temperature.to_le_bytes());
    out[START_DOOR_STATUS] = frame.door_status.to_wire();
    out[START_TIME_OF_SMOKING..START_TIME_OF_SMOKING + 2]
        .copy_from_slice(&frame.time_of_smoking_secs.to_le_bytes());
    out
}

/// Serialize an Update frame into its 5-byte wire form.
pub fn encode_update(frame: &UpdateFrame) -> [u8; UPDATE_FRAME_LEN] {
    let mut out = [0u8; UPDATE_FRAME_LEN];
    out[0] = UPDATE_TYPE;
    out[UPDATE_CURRENT_HUMIDITY] = frame.current_humidity;
    out[UPDATE_CURRENT_TEMPERATURE..UPDATE_CURRENT_TEMPERATURE + 2]
        .copy_from_slice(&frame.current_temperature.to_le_bytes());
    out[UPDATE_DOOR_STATUS] = frame.door_status.to_wire();
    out
}
