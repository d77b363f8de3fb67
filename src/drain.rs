//! Drain: serialize the buffer once at teardown, then release it.
//!
//! The order is fixed: open, write every row, close, release. The buffer is
//! released on every path, including a failed open or a failed write.

use crate::buffer::SampleBuffer;
use crate::error::{LogResult, LoggerError};
use crate::format::ValueFormat;
use crate::invariant_ppt::{assert_invariant, DRAIN_ROW_COUNT};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// What a successful drain wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Lines written, one per slot.
    pub rows: usize,
    /// Tokens per line.
    pub channels: usize,
    /// Bytes written, newlines included.
    pub bytes: u64,
}

/// Write the buffer to `path` (created or truncated) and release it.
///
/// An open or write failure is reported as [`LoggerError::Io`]; the logged
/// data is lost but the buffer is still released.
pub fn drain(buffer: SampleBuffer, path: &Path, format: &ValueFormat) -> LogResult<DrainReport> {
    let file = match File::create(path) {
        Ok(file) => file,
        Err(source) => {
            tracing::warn!(
                path = %path.display(),
                error = %source,
                "could not open the data file, logged data is lost"
            );
            buffer.release();
            return Err(LoggerError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    tracing::debug!(path = %path.display(), format = %format, "draining sample buffer");

    let mut writer = BufWriter::new(file);
    let written = write_rows(&buffer, &mut writer, format);
    // Close before release, whatever the write outcome.
    let closed = writer.flush();
    drop(writer);
    buffer.release();

    match written.and_then(|report| closed.map(|()| report)) {
        Ok(report) => {
            tracing::info!(
                path = %path.display(),
                rows = report.rows,
                channels = report.channels,
                bytes = report.bytes,
                "data file written"
            );
            Ok(report)
        }
        Err(source) => {
            tracing::warn!(
                path = %path.display(),
                error = %source,
                "writing the data file failed, logged data is incomplete"
            );
            Err(LoggerError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Write the buffer to an arbitrary writer, flush it and release the buffer.
pub fn drain_to<W: Write>(
    buffer: SampleBuffer,
    mut writer: W,
    format: &ValueFormat,
) -> LogResult<DrainReport> {
    let written = write_rows(&buffer, &mut writer, format);
    let flushed = writer.flush();
    buffer.release();
    written
        .and_then(|report| flushed.map(|()| report))
        .map_err(|source| LoggerError::Io {
            path: PathBuf::from("<writer>"),
            source,
        })
}

fn write_rows<W: Write>(
    buffer: &SampleBuffer,
    writer: &mut W,
    format: &ValueFormat,
) -> io::Result<DrainReport> {
    let mut line = Vec::new();
    let mut rows = 0;
    let mut bytes = 0u64;

    for row in buffer.rows() {
        line.clear();
        for value in row.scalars() {
            format.render(value, &mut line);
        }
        line.push(b'\n');
        writer.write_all(&line)?;
        bytes += line.len() as u64;
        rows += 1;
    }

    assert_invariant(
        DRAIN_ROW_COUNT,
        rows == buffer.slot_count(),
        "Drain writes one line per slot",
        Some("write_rows"),
    );
    Ok(DrainReport {
        rows,
        channels: buffer.channels(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ElementKind;

    struct FailingWriter {
        accepted: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.accepted > 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.accepted += buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn rows_in_slot_order() {
        let mut buffer = SampleBuffer::allocate(2, 2, ElementKind::Uint8).unwrap();
        buffer.row_mut::<u8>(0).unwrap().copy_from_slice(&[1, 2]);
        buffer.row_mut::<u8>(1).unwrap().copy_from_slice(&[3, 255]);
        let format = ValueFormat::parse("%d,").unwrap();
        let mut out = Vec::new();
        let report = drain_to(buffer, &mut out, &format).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1,2,\n3,255,\n");
        assert_eq!(
            report,
            DrainReport {
                rows: 2,
                channels: 2,
                bytes: 12
            }
        );
    }

    #[test]
    fn char_rows_are_raw_bytes() {
        let mut buffer = SampleBuffer::allocate(1, 2, ElementKind::Uint8).unwrap();
        buffer.row_mut::<u8>(0).unwrap().copy_from_slice(&[65, 200]);
        let format = ValueFormat::parse("%c").unwrap();
        let mut out = Vec::new();
        let report = drain_to(buffer, &mut out, &format).unwrap();
        assert_eq!(out, vec![65, 200, b'\n']);
        assert_eq!(report.bytes, 3);
    }

    #[test]
    fn write_failure_is_io() {
        let buffer = SampleBuffer::allocate(3, 1, ElementKind::Double).unwrap();
        let format = ValueFormat::parse("%f").unwrap();
        let err = drain_to(buffer, FailingWriter { accepted: 0 }, &format).unwrap_err();
        assert!(matches!(err, LoggerError::Io { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn unopenable_path_is_io() {
        let buffer = SampleBuffer::allocate(1, 1, ElementKind::Double).unwrap();
        let format = ValueFormat::parse("%f").unwrap();
        let path = Path::new("/nonexistent-dir-for-slotlog/out.dat");
        let err = drain(buffer, path, &format).unwrap_err();
        match err {
            LoggerError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected {:?}", other),
        }
    }
}
