use thiserror::Error;

/// Typed download errors.
///
/// Remote-side failures (`HttpStatus`, `Http`) are ordinary per-item
/// failures; `Disk` is a local fault the caller may want to surface.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error {status} downloading {path}")]
    HttpStatus { status: u16, path: String },

    #[error("HTTP error downloading {path} (bytes_so_far={bytes_written}): {source}")]
    Http {
        source: reqwest::Error,
        path: String,
        bytes_written: u64,
    },

    #[error("Disk error: {0}")]
    Disk(#[from] std::io::Error),
}

impl DownloadError {
    /// Whether the failure happened on the remote side of the transfer.
    pub fn is_remote(&self) -> bool {
        match self {
            DownloadError::HttpStatus { .. } | DownloadError::Http { .. } => true,
            DownloadError::Disk(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_is_remote() {
        let e = DownloadError::HttpStatus {
            status: 404,
            path: "x".into(),
        };
        assert!(e.is_remote());
        assert_eq!(e.to_string(), "HTTP error 404 downloading x");
    }

    #[test]
    fn test_disk_is_not_remote() {
        let e = DownloadError::Disk(std::io::Error::other("disk full"));
        assert!(!e.is_remote());
    }

    #[test]
    fn test_http_connection_error_is_remote() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let err = rt
            .block_on(reqwest::Client::new().get("http://127.0.0.1:1").send())
            .unwrap_err();
        let e = DownloadError::Http {
            source: err,
            path: "x".into(),
            bytes_written: 0,
        };
        assert!(e.is_remote());
    }
}
