//! Recording download to a local file

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use crate::api::{ApiRequest, StreamingMediaRequest};
use crate::client::ChinachuClient;
use crate::error::ApiError;
use crate::models::Download;

const CHUNK_SIZE: usize = 64 * 1024;

/// Download progress callback: (downloaded_bytes, total_bytes)
pub type ProgressCallback = Box<dyn Fn(u64, Option<u64>) + Send>;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Write to {} failed: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub fn message(&self) -> String {
        match self {
            DownloadError::Api(err) => err.message(),
            DownloadError::Io { .. } => self.to_string(),
        }
    }
}

/// Stream a recording's media to `output_path`
///
/// The file is created only once the server accepted the request.
pub fn download_recording(
    client: &ChinachuClient,
    id: &str,
    output_path: &Path,
    progress: Option<ProgressCallback>,
) -> Result<Download, DownloadError> {
    let spec = StreamingMediaRequest::new(id).build(client.config())?;
    let response = client.open(&spec)?;
    let total = response.content_length;

    let io_err = |source| DownloadError::Io { path: output_path.to_path_buf(), source };
    let file = File::create(output_path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let mut reader = response.body;
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                writer.write_all(&buffer[..n]).map_err(io_err)?;
                downloaded += n as u64;

                if let Some(ref cb) = progress {
                    cb(downloaded, total);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ApiError::from(e).into()),
        }
    }
    writer.flush().map_err(io_err)?;

    tracing::info!("Downloaded recording {} ({} bytes) to {}", id, downloaded, output_path.display());

    Ok(Download {
        recording_id: id.to_string(),
        local_path: output_path.to_path_buf(),
        size: downloaded,
        last_position: 0.0,
        downloaded_at: Utc::now(),
    })
}
