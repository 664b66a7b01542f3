// src/pipeline.rs
//! Serial read loop wiring parser, encoder and uploader

use crate::config::UplinkConfig;
use crate::error::{Result, UplinkError};
use crate::geo;
use crate::gps::{self, SentenceOutcome};
use crate::uplink::FeatureSink;
use log::{debug, warn};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};

/// Counters for one pipeline run.
///
/// Skipped sentences are counted rather than silently lost so an operator
/// can tell a quiet receiver from a broken one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    pub uploaded: u64,
    pub ignored: u64,
    pub parse_errors: u64,
    pub upload_failures: u64,
    pub rejected: u64,
}

/// Open the receiver's serial port: 8 data bits, 1 stop bit, no parity.
pub fn open_serial(config: &UplinkConfig) -> Result<SerialStream> {
    tokio_serial::new(&config.serial_port, config.baudrate)
        .data_bits(DataBits::Eight)
        .stop_bits(StopBits::One)
        .parity(Parity::None)
        .timeout(Duration::from_millis(1000))
        .open_native_async()
        .map_err(|e| {
            UplinkError::Connection(format!(
                "Failed to open serial port {}: {}",
                config.serial_port, e
            ))
        })
}

/// Run the pipeline until the byte source ends or fails.
///
/// Each terminated line is parsed, filtered and, if it carries a real fix,
/// encoded and uploaded before the next line is read; delivery is strictly
/// in order, one upload at a time. Failure policy: losing the source is
/// fatal, as is an encoding failure (it means a filtered-out fix slipped
/// through); a sentence that fails to parse or upload is logged, counted
/// and skipped.
pub async fn run<R, S>(source: R, sink: &mut S) -> Result<PipelineStats>
where
    R: AsyncRead + Unpin,
    S: FeatureSink,
{
    let mut reader = BufReader::new(source);
    let mut buf = Vec::new();
    let mut stats = PipelineStats::default();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break, // EOF
            Ok(_) => {
                // Serial noise (startup garbage, wrong baud) shows up as
                // non-UTF-8 bytes mid-line; decode lossily and let checksum
                // validation reject the sentence instead of ending ingestion.
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim();
                if line.is_empty() {
                    continue;
                }
                debug!("{}", line);

                let fix = match gps::parse_sentence(line) {
                    Ok(SentenceOutcome::Fix(fix)) => fix,
                    Ok(SentenceOutcome::Ignored) => {
                        stats.ignored += 1;
                        continue;
                    }
                    Err(e) => {
                        warn!("skipping unparseable sentence: {}", e);
                        stats.parse_errors += 1;
                        continue;
                    }
                };

                let payload = geo::encode_fix(&fix)?;

                match sink.push(payload).await {
                    Ok(body) => {
                        stats.uploaded += 1;
                        debug!("PUT response: {}", body);
                    }
                    Err(e @ UplinkError::Rejected { .. }) => {
                        warn!("upload rejected, continuing: {}", e);
                        stats.rejected += 1;
                    }
                    Err(e) if e.is_recoverable() => {
                        warn!("upload failed, continuing: {}", e);
                        stats.upload_failures += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(UplinkError::Io(e)),
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::FeatureCollection;

    const VALID_RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const GSV: &str = "$GPGSV,3,1,12,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*7F";
    const ZERO_LAT_RMC: &str =
        "$GPRMC,123519,A,0000.000,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const BAD_CHECKSUM: &str =
        "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*00";

    #[derive(Default)]
    struct MockSink {
        payloads: Vec<Vec<u8>>,
        failures_remaining: usize,
        rejections_remaining: usize,
    }

    impl FeatureSink for MockSink {
        async fn push(&mut self, payload: Vec<u8>) -> Result<String> {
            if self.failures_remaining > 0 {
                self.failures_remaining -= 1;
                return Err(UplinkError::Connection("connection refused".to_string()));
            }
            if self.rejections_remaining > 0 {
                self.rejections_remaining -= 1;
                return Err(UplinkError::Rejected {
                    status: 401,
                    body: "{\"error\":\"unauthorized\"}".to_string(),
                });
            }
            self.payloads.push(payload);
            Ok("{}".to_string())
        }
    }

    fn coords(payload: &[u8]) -> [f64; 2] {
        let collection: FeatureCollection = serde_json::from_slice(payload).unwrap();
        collection.features[0].geometry.coordinates
    }

    #[tokio::test]
    async fn test_valid_fix_is_uploaded_lon_lat() {
        let input = format!("{}\r\n", VALID_RMC);
        let mut sink = MockSink::default();

        let stats = run(input.as_bytes(), &mut sink).await.unwrap();

        assert_eq!(stats.uploaded, 1);
        assert_eq!(sink.payloads.len(), 1);
        let [lon, lat] = coords(&sink.payloads[0]);
        assert!((lon - 11.5167).abs() < 1e-4);
        assert!((lat - 48.1173).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_non_fix_sentence_not_uploaded() {
        let input = format!("{}\r\n", GSV);
        let mut sink = MockSink::default();

        let stats = run(input.as_bytes(), &mut sink).await.unwrap();

        assert!(sink.payloads.is_empty());
        assert_eq!(stats.ignored, 1);
        assert_eq!(stats.uploaded, 0);
    }

    #[tokio::test]
    async fn test_zero_latitude_not_uploaded() {
        let input = format!("{}\r\n", ZERO_LAT_RMC);
        let mut sink = MockSink::default();

        let stats = run(input.as_bytes(), &mut sink).await.unwrap();

        assert!(sink.payloads.is_empty());
        assert_eq!(stats.ignored, 1);
    }

    #[tokio::test]
    async fn test_bad_checksum_skipped_and_loop_resumes() {
        let input = format!("{}\r\n{}\r\n", BAD_CHECKSUM, VALID_RMC);
        let mut sink = MockSink::default();

        let stats = run(input.as_bytes(), &mut sink).await.unwrap();

        assert_eq!(stats.parse_errors, 1);
        assert_eq!(stats.uploaded, 1);
        assert_eq!(sink.payloads.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_failure_skipped_and_loop_resumes() {
        let input = format!("{}\r\n{}\r\n", VALID_RMC, VALID_RMC);
        let mut sink = MockSink {
            failures_remaining: 1,
            ..Default::default()
        };

        let stats = run(input.as_bytes(), &mut sink).await.unwrap();

        assert_eq!(stats.upload_failures, 1);
        assert_eq!(stats.rejected, 0);
        assert_eq!(stats.uploaded, 1);
        assert_eq!(sink.payloads.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_upload_counted_separately_and_loop_resumes() {
        let input = format!("{}\r\n{}\r\n", VALID_RMC, VALID_RMC);
        let mut sink = MockSink {
            rejections_remaining: 1,
            ..Default::default()
        };

        let stats = run(input.as_bytes(), &mut sink).await.unwrap();

        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.upload_failures, 0);
        assert_eq!(stats.uploaded, 1);
        assert_eq!(sink.payloads.len(), 1);
    }

    #[tokio::test]
    async fn test_non_utf8_noise_counted_as_parse_error() {
        let mut input: Vec<u8> = b"$GPRMC,\xff\xfe\xfd\n".to_vec();
        input.extend_from_slice(VALID_RMC.as_bytes());
        input.extend_from_slice(b"\r\n");
        let mut sink = MockSink::default();

        let stats = run(input.as_slice(), &mut sink).await.unwrap();

        assert_eq!(stats.parse_errors, 1);
        assert_eq!(stats.uploaded, 1);
        assert_eq!(sink.payloads.len(), 1);
    }

    #[tokio::test]
    async fn test_mixed_stream_counts() {
        let input = format!(
            "{}\r\n{}\r\n\r\n{}\r\n{}\r\n",
            GSV, VALID_RMC, ZERO_LAT_RMC, VALID_RMC
        );
        let mut sink = MockSink::default();

        let stats = run(input.as_bytes(), &mut sink).await.unwrap();

        assert_eq!(stats.uploaded, 2);
        assert_eq!(stats.ignored, 2);
        assert_eq!(stats.parse_errors, 0);
        assert_eq!(stats.upload_failures, 0);
    }
}
