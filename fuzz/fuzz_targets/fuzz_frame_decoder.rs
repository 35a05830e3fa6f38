//! Fuzz target: `frame::decode`
//!
//! Drives arbitrary byte sequences into the frame decoder and asserts that
//! it never panics, that every accepted frame is in range, and that an
//! accepted frame re-encodes to the bytes it was decoded from.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use smokehouse::config::{HUMID_MAX, TEMP_MAX, TEMP_MIN};
use smokehouse::frame::{
    ProcessFrame, START_FRAME_LEN, UPDATE_FRAME_LEN, decode, encode_start, encode_update,
};

fuzz_target!(|data: &[u8]| {
    match decode(data) {
        Ok(ProcessFrame::Start(f)) => {
            assert!(f.target_humidity <= HUMID_MAX);
            assert!((TEMP_MIN..=TEMP_MAX).contains(&f.target_temperature));
            assert!(f.time_of_smoking_secs > 0);
            assert_eq!(&encode_start(&f)[..], &data[..START_FRAME_LEN]);
        }
        Ok(ProcessFrame::Update(f)) => {
            assert!(f.current_humidity <= HUMID_MAX);
            assert_eq!(&encode_update(&f)[..], &data[..UPDATE_FRAME_LEN]);
        }
        Err(e) => {
            // Display must not panic either.
            let _ = e.to_string();
        }
    }
});
