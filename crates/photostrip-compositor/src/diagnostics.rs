//! Composition diagnostics: per-stage timings and image metrics.
//!
//! Every call to [`compose_with_diagnostics`](crate::compose_with_diagnostics)
//! collects these alongside the encoded strip. Time is read through the
//! [`Clock`] trait so the library never touches a platform clock itself;
//! the CLI supplies one backed by [`std::time::Instant`].
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::FilterTag;

/// Source of monotonic time for diagnostics.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Clock that never advances. Used when the caller does not want timings.
pub struct NullClock;

impl Clock for NullClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _since: &()) -> Duration {
        Duration::ZERO
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from one composition call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripDiagnostics {
    /// Canvas allocation and white fill.
    #[serde(with = "duration_serde")]
    pub canvas: Duration,
    /// Font database construction.
    #[serde(with = "duration_serde")]
    pub fonts: Duration,
    /// Header text and separator rule.
    #[serde(with = "duration_serde")]
    pub header: Duration,
    /// One entry per image, in draw order.
    pub images: Vec<ImageDiagnostics>,
    /// Footer text.
    #[serde(with = "duration_serde")]
    pub footer: Duration,
    /// PNG encoding.
    #[serde(with = "duration_serde")]
    pub encode: Duration,
    /// Size of the encoded PNG in bytes.
    pub output_bytes: usize,
    /// Total wall-clock duration of the call.
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Metrics for a single image slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDiagnostics {
    /// Size of the source representation in bytes.
    pub input_bytes: usize,
    /// Native width of the decoded image.
    pub width: u32,
    /// Native height of the decoded image.
    pub height: u32,
    /// Filter applied at draw time.
    pub filter: FilterTag,
    /// Decoding time.
    #[serde(with = "duration_serde")]
    pub decode: Duration,
    /// Filter application plus drawing time.
    #[serde(with = "duration_serde")]
    pub draw: Duration,
}

impl StripDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Photo Strip Diagnostics\n{}", "=".repeat(60)));
        lines.push(format!(
            "Images: {}  |  Output: {} bytes",
            self.images.len(),
            self.output_bytes,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration)
        ));
        lines.push(String::new());
        lines.push(format!("{:<24} {:>10}  {}", "Stage", "Duration", "Details"));
        lines.push("-".repeat(72));

        lines.push(stage_line("Canvas", self.canvas, ""));
        lines.push(stage_line("Fonts", self.fonts, ""));
        lines.push(stage_line("Header", self.header, ""));
        for (i, image) in self.images.iter().enumerate() {
            let details = format!(
                "{} bytes -> {}x{}",
                image.input_bytes, image.width, image.height
            );
            lines.push(stage_line(&format!("Image {} decode", i + 1), image.decode, &details));
            lines.push(stage_line(
                &format!("Image {} draw", i + 1),
                image.draw,
                image.filter.as_str(),
            ));
        }
        lines.push(stage_line("Footer", self.footer, ""));
        lines.push(stage_line("Encode", self.encode, ""));

        lines.join("\n")
    }
}

fn stage_line(name: &str, duration: Duration, details: &str) -> String {
    format!("{name:<24} {:>8.3}ms  {details}", duration_ms(duration))
        .trim_end()
        .to_owned()
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> StripDiagnostics {
        StripDiagnostics {
            canvas: Duration::from_millis(1),
            fonts: Duration::from_millis(20),
            header: Duration::from_millis(3),
            images: vec![ImageDiagnostics {
                input_bytes: 2048,
                width: 640,
                height: 480,
                filter: FilterTag::Sepia,
                decode: Duration::from_millis(4),
                draw: Duration::from_millis(2),
            }],
            footer: Duration::from_millis(1),
            encode: Duration::from_millis(9),
            output_bytes: 4096,
            total_duration: Duration::from_millis(40),
        }
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let ms = duration_ms(Duration::from_millis(1234));
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn null_clock_reports_zero() {
        let clock = NullClock;
        let start = clock.now();
        assert_eq!(clock.elapsed(&start), Duration::ZERO);
    }

    #[test]
    fn report_lists_every_stage() {
        let report = sample().report();
        assert!(report.contains("Photo Strip Diagnostics"));
        assert!(report.contains("Image 1 decode"));
        assert!(report.contains("640x480"));
        assert!(report.contains("sepia"));
        assert!(report.contains("Encode"));
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!((json["total_duration"].as_f64().unwrap() - 0.04).abs() < 1e-9);
        assert_eq!(json["images"][0]["filter"], "sepia");

        let back: StripDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back.total_duration, Duration::from_millis(40));
    }
}
