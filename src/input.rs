//! Newline-delimited JSON producer input.
//!
//! Each line holds one reading in the form accepted by [`Reading::from_json`].
//! Lines that are not UTF-8 or not a valid reading are logged and skipped;
//! only an I/O error from the reader ends the pump early.

use std::io::{self, BufRead};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::InputError;
use crate::printer::{ShutdownToken, Submitter};
use crate::reading::Reading;

/// Counters for one pump run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputStats {
    pub lines: u64,
    pub submitted: u64,
    pub skipped: u64,
}

/// Decode one raw line. `Ok(None)` for blank lines.
pub fn decode_line(raw: Vec<u8>) -> Result<Option<Reading>, InputError> {
    let line = String::from_utf8(raw)?;
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Reading::from_json(line).map(Some)
}

/// Read readings from `reader` and submit them until end of input or until
/// `shutdown` is cancelled.
pub fn pump<R: BufRead>(mut reader: R, submitter: &Submitter, shutdown: &ShutdownToken) -> io::Result<InputStats> {
    let mut stats = InputStats::default();
    let mut buf = Vec::new();

    while !shutdown.is_cancelled() {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines += 1;

        match decode_line(std::mem::take(&mut buf)) {
            Ok(Some(reading)) => {
                submitter.submit_reading(reading);
                stats.submitted += 1;
            }
            Ok(None) => {}
            Err(err) => {
                stats.skipped += 1;
                warn!(line = stats.lines, error = %err, "skipping reading");
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::sync::Arc;

    use crossbeam_channel::unbounded;

    use crate::printer::submitter::SubmitCounters;

    fn channel_submitter() -> (Submitter, crossbeam_channel::Receiver<Reading>) {
        let (tx, rx) = unbounded();
        let submitter = Submitter {
            tx,
            counters: Arc::new(SubmitCounters::default()),
        };
        (submitter, rx)
    }

    #[test]
    fn test_decode_line() {
        assert!(decode_line(b"   \n".to_vec()).unwrap().is_none());
        assert!(matches!(decode_line(vec![0xff, 0xfe, b'\n']), Err(InputError::Utf8(_))));
        assert!(matches!(decode_line(b"{}".to_vec()), Err(InputError::Json(_))));

        let reading = decode_line(br#"{"measurement": "units", "value": "degF"}"#.to_vec())
            .unwrap()
            .unwrap();
        assert_eq!(reading.measurement(), "units");
    }

    #[test]
    fn test_pump_skips_bad_lines() {
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"measurement\": \"units\", \"value\": \"degF\"}\n");
        input.extend_from_slice(b"\xff\xfe bad\n");
        input.extend_from_slice(b"not json\n\n");
        input.extend_from_slice(b"{\"measurement\": \"presentValue\", \"value\": 1}");

        let (submitter, rx) = channel_submitter();
        let stats = pump(Cursor::new(input), &submitter, &ShutdownToken::new()).unwrap();

        assert_eq!(stats.lines, 5);
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.skipped, 2);

        let names: Vec<String> = rx.try_iter().map(|r| r.measurement().to_string()).collect();
        assert_eq!(names, ["units", "presentValue"]);
    }

    #[test]
    fn test_pump_stops_when_cancelled() {
        let token = ShutdownToken::new();
        token.cancel();

        let (submitter, rx) = channel_submitter();
        let stats = pump(Cursor::new(b"{\"measurement\": \"units\", \"value\": 1}\n".to_vec()), &submitter, &token).unwrap();
        assert_eq!(stats, InputStats::default());
        assert!(rx.try_recv().is_err());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_pump_returns_io_errors() {
        let (submitter, _rx) = channel_submitter();
        let reader = io::BufReader::new(FailingReader);
        let err = pump(reader, &submitter, &ShutdownToken::new()).unwrap_err();
        assert_eq!(err.to_string(), "device gone");
    }
}
