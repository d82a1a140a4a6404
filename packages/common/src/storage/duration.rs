use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use mp4::Mp4Reader;

use super::error::StorageError;

/// Read the playback duration, in seconds, from an ISO base media file
/// (MP4, MOV, M4V) via its `moov/mvhd` movie header.
///
/// Returns `Ok(None)` for anything that is not a well-formed ISO-BMFF file or
/// whose movie header does not declare a duration. Only I/O failures opening
/// the file are errors.
pub async fn video_duration(path: &Path) -> Result<Option<f64>, StorageError> {
    let path: PathBuf = path.to_owned();
    match tokio::task::spawn_blocking(move || read_movie_header(&path)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "MP4 header parsing aborted");
            Ok(None)
        }
    }
}

fn read_movie_header(path: &Path) -> Result<Option<f64>, StorageError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();

    let mp4 = match Mp4Reader::read_header(BufReader::new(file), size) {
        Ok(mp4) => mp4,
        Err(e) => {
            tracing::debug!(error = %e, "Not a readable MP4 file");
            return Ok(None);
        }
    };

    let mvhd = &mp4.moov.mvhd;
    let unknown = match mvhd.version {
        0 => mvhd.duration == u64::from(u32::MAX),
        _ => mvhd.duration == u64::MAX,
    };
    if mvhd.timescale == 0 || unknown {
        return Ok(None);
    }

    Ok(Some(mvhd.duration as f64 / f64::from(mvhd.timescale)))
}
