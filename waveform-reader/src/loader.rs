use chrono::{DateTime, Utc};
use pulse_features::{AnalysisError, Real, WaveformSet};
use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    mem::size_of,
    path::Path,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("header string is not valid UTF-8: {0}")]
    BadString(#[from] std::string::FromUtf8Error),
    #[error("header timestamp is not RFC 3339: {0}")]
    BadTimestamp(#[from] chrono::ParseError),
    #[error("negative count {0} in header")]
    NegativeCount(i32),
    #[error("header declares a capture with no channels or no samples")]
    EmptyHeader,
    #[error("count {0} exceeds the header field width")]
    CountTooLarge(usize),
    #[error("file ends part way through an event: {trailing} bytes after {events} events")]
    Truncated { events: usize, trailing: usize },
    #[error("channel {channel} not in capture of {channels} channels")]
    BadChannel { channel: usize, channels: usize },
    #[error("event has {found} channel records, capture declares {expected}")]
    EventChannelCount { found: usize, expected: usize },
    #[error("channel record has {found} samples, capture declares {expected}")]
    EventRecordLength { found: usize, expected: usize },
    #[error("{0}")]
    Analysis(#[from] AnalysisError),
}

/// Self-describing header of a capture container.
///
/// Scalars are little-endian; strings are i32-length-prefixed UTF-8. The
/// body that follows is a sequence of fixed-size events, each holding one
/// f64 sample record per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureHeader {
    pub prog_version: String,
    pub run_descript: String,
    pub timestamp: DateTime<Utc>,
    pub channels: usize,
    pub samples: usize,
    /// Uniform time-axis step, seconds.
    pub sample_interval: Real,
}

impl CaptureHeader {
    fn load(file: &mut File) -> Result<(Self, usize), LoaderError> {
        let mut total_bytes = usize::default();
        let prog_version = load_string(file, &mut total_bytes)?;
        let run_descript = load_string(file, &mut total_bytes)?;
        let timestamp = DateTime::parse_from_rfc3339(&load_string(file, &mut total_bytes)?)?
            .with_timezone(&Utc);
        let channels = load_count(file, &mut total_bytes)?;
        let samples = load_count(file, &mut total_bytes)?;
        let sample_interval = load_f64(file, &mut total_bytes)?;
        Ok((
            CaptureHeader {
                prog_version,
                run_descript,
                timestamp,
                channels,
                samples,
                sample_interval,
            },
            total_bytes,
        ))
    }

    fn save(&self, file: &mut File) -> Result<(), LoaderError> {
        save_string(file, &self.prog_version)?;
        save_string(file, &self.run_descript)?;
        save_string(file, &self.timestamp.to_rfc3339())?;
        save_count(file, self.channels)?;
        save_count(file, self.samples)?;
        file.write_all(&self.sample_interval.to_le_bytes())?;
        Ok(())
    }

    fn event_size(&self) -> usize {
        self.channels * self.samples * size_of::<Real>()
    }
}

/// A capture container opened for reading.
#[derive(Debug)]
pub struct CaptureFile {
    file: File,
    header: CaptureHeader,
    header_bytes: usize,
    num_events: usize,
}

impl CaptureFile {
    pub fn open(path: &Path) -> Result<Self, LoaderError> {
        let mut file = File::open(path)?;
        let (header, header_bytes) = CaptureHeader::load(&mut file)?;
        let file_size = file.metadata()?.len() as usize;
        let body = file_size - header_bytes;
        let event_size = header.event_size();
        if event_size == 0 {
            return Err(LoaderError::EmptyHeader);
        }
        if body % event_size != 0 {
            return Err(LoaderError::Truncated {
                events: body / event_size,
                trailing: body % event_size,
            });
        }
        Ok(CaptureFile {
            file,
            header,
            header_bytes,
            num_events: body / event_size,
        })
    }

    pub fn header(&self) -> &CaptureHeader {
        &self.header
    }

    pub fn num_events(&self) -> usize {
        self.num_events
    }

    /// Reads every event's record for one zero-based channel into a
    /// waveform set with a zero-referenced time axis.
    pub fn channel_waveforms(&mut self, channel: usize) -> Result<WaveformSet, LoaderError> {
        if channel >= self.header.channels {
            return Err(LoaderError::BadChannel {
                channel,
                channels: self.header.channels,
            });
        }
        let record_bytes = self.header.samples * size_of::<Real>();
        let mut pulses = Vec::with_capacity(self.num_events);
        for event in 0..self.num_events {
            let offset =
                self.header_bytes + event * self.header.event_size() + channel * record_bytes;
            self.file.seek(SeekFrom::Start(offset as u64))?;
            pulses.push(load_record(&mut self.file, self.header.samples)?);
        }
        Ok(WaveformSet::from_sample_interval(
            self.header.sample_interval,
            pulses,
        )?)
    }
}

/// A capture container opened for writing: header up front, then one
/// fixed-size event per [`write_event`](CaptureWriter::write_event) call.
#[derive(Debug)]
pub struct CaptureWriter {
    file: File,
    header: CaptureHeader,
}

impl CaptureWriter {
    pub fn create(path: &Path, header: CaptureHeader) -> Result<Self, LoaderError> {
        let mut file = File::create(path)?;
        header.save(&mut file)?;
        Ok(CaptureWriter { file, header })
    }

    /// Appends one trigger event, one sample record per channel in
    /// channel order.
    pub fn write_event(&mut self, records: &[&[Real]]) -> Result<(), LoaderError> {
        if records.len() != self.header.channels {
            return Err(LoaderError::EventChannelCount {
                found: records.len(),
                expected: self.header.channels,
            });
        }
        for record in records {
            if record.len() != self.header.samples {
                return Err(LoaderError::EventRecordLength {
                    found: record.len(),
                    expected: self.header.samples,
                });
            }
            for sample in *record {
                self.file.write_all(&sample.to_le_bytes())?;
            }
        }
        Ok(())
    }
}

fn load_i32(file: &mut File, total_bytes: &mut usize) -> Result<i32, LoaderError> {
    let mut bytes = [0u8; size_of::<i32>()];
    file.read_exact(&mut bytes)?;
    *total_bytes += bytes.len();
    Ok(i32::from_le_bytes(bytes))
}

fn load_f64(file: &mut File, total_bytes: &mut usize) -> Result<f64, LoaderError> {
    let mut bytes = [0u8; size_of::<f64>()];
    file.read_exact(&mut bytes)?;
    *total_bytes += bytes.len();
    Ok(f64::from_le_bytes(bytes))
}

fn load_count(file: &mut File, total_bytes: &mut usize) -> Result<usize, LoaderError> {
    let value = load_i32(file, total_bytes)?;
    usize::try_from(value).map_err(|_| LoaderError::NegativeCount(value))
}

fn load_string(file: &mut File, total_bytes: &mut usize) -> Result<String, LoaderError> {
    let size = load_count(file, total_bytes)?;
    let mut string_bytes = vec![0; size];
    file.read_exact(&mut string_bytes)?;
    *total_bytes += size;
    Ok(String::from_utf8(string_bytes)?)
}

fn load_record(file: &mut File, samples: usize) -> Result<Vec<Real>, LoaderError> {
    let mut bytes = vec![0u8; samples * size_of::<Real>()];
    file.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(size_of::<Real>())
        .map(|chunk| {
            let mut raw = [0u8; size_of::<Real>()];
            raw.copy_from_slice(chunk);
            Real::from_le_bytes(raw)
        })
        .collect())
}

fn save_count(file: &mut File, value: usize) -> Result<(), LoaderError> {
    let value = i32::try_from(value).map_err(|_| LoaderError::CountTooLarge(value))?;
    file.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn save_string(file: &mut File, value: &str) -> Result<(), LoaderError> {
    save_count(file, value.len())?;
    file.write_all(value.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use std::path::PathBuf;

    fn header(channels: usize, samples: usize) -> CaptureHeader {
        CaptureHeader {
            prog_version: "waveform-reader tests".to_string(),
            run_descript: "round trip".to_string(),
            timestamp: Utc.with_ymd_and_hms(2015, 3, 17, 12, 0, 0).single()
                .expect("timestamp should be valid"),
            channels,
            samples,
            sample_interval: 4e-10,
        }
    }

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("waveform-reader-{name}"))
    }

    #[test]
    fn round_trip() {
        let path = scratch_file("round-trip.capture");
        let mut writer =
            CaptureWriter::create(&path, header(2, 4)).expect("writer should create");
        let trigger = [vec![0.0, 1.0, 0.5, 0.0], vec![0.0, 2.0, 1.0, 0.0]];
        let signal = [vec![0.0, -0.5, -0.2, 0.0], vec![0.0, -1.0, -0.4, 0.0]];
        for (a, b) in trigger.iter().zip(&signal) {
            writer
                .write_event(&[a.as_slice(), b.as_slice()])
                .expect("event should write");
        }
        drop(writer);

        let mut capture = CaptureFile::open(&path).expect("capture should open");
        assert_eq!(capture.header(), &header(2, 4));
        assert_eq!(capture.num_events(), 2);

        let loaded = capture.channel_waveforms(0).expect("channel should load");
        assert_eq!(loaded.pulses(), &trigger);
        assert_eq!(loaded.num_samples(), 4);
        assert_eq!(loaded.sample_interval(), 4e-10);
        let loaded = capture.channel_waveforms(1).expect("channel should load");
        assert_eq!(loaded.pulses(), &signal);

        fs::remove_file(&path).expect("scratch file should remove");
    }

    #[test]
    fn channel_out_of_range() {
        let path = scratch_file("bad-channel.capture");
        let mut writer =
            CaptureWriter::create(&path, header(1, 2)).expect("writer should create");
        writer
            .write_event(&[&[0.0, 1.0]])
            .expect("event should write");
        drop(writer);

        let mut capture = CaptureFile::open(&path).expect("capture should open");
        assert!(matches!(
            capture.channel_waveforms(1),
            Err(LoaderError::BadChannel {
                channel: 1,
                channels: 1,
            })
        ));

        fs::remove_file(&path).expect("scratch file should remove");
    }

    #[test]
    fn truncated_body_rejected() {
        let path = scratch_file("truncated.capture");
        let mut writer =
            CaptureWriter::create(&path, header(1, 2)).expect("writer should create");
        writer
            .write_event(&[&[0.0, 1.0]])
            .expect("event should write");
        drop(writer);

        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .expect("scratch file should reopen");
        file.write_all(&[0u8; 3]).expect("padding should write");
        drop(file);

        assert!(matches!(
            CaptureFile::open(&path),
            Err(LoaderError::Truncated {
                events: 1,
                trailing: 3,
            })
        ));

        fs::remove_file(&path).expect("scratch file should remove");
    }

    #[test]
    fn malformed_events_rejected_on_write() {
        let path = scratch_file("bad-event.capture");
        let mut writer =
            CaptureWriter::create(&path, header(2, 3)).expect("writer should create");

        assert!(matches!(
            writer.write_event(&[&[0.0, 1.0, 0.0]]),
            Err(LoaderError::EventChannelCount {
                found: 1,
                expected: 2,
            })
        ));
        assert!(matches!(
            writer.write_event(&[&[0.0, 1.0, 0.0], &[0.0, 1.0]]),
            Err(LoaderError::EventRecordLength {
                found: 2,
                expected: 3,
            })
        ));

        drop(writer);
        fs::remove_file(&path).expect("scratch file should remove");
    }
}
