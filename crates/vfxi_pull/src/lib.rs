//! VFXI Pull - fetch sample assets over HTTP.
//!
//! Downloads are a single blocking GET; the body is written to disk
//! unchanged.
//!
//! # Example
//!
//! ```ignore
//! let saved = vfxi_pull::teapot(".")?;
//! println!("{}", saved.display());
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Utah teapot from the USD working group asset repository.
pub const TEAPOT_URL: &str =
    "https://raw.githubusercontent.com/usd-wg/assets/refs/heads/main/full_assets/Teapot/geo/UtahTeapot.usd";

/// Directory under the project root that receives downloads.
pub const ASSETS_DIR: &str = "assets";

/// Errors that can occur while downloading.
#[derive(Error, Debug)]
pub enum PullError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status} for {url}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for download operations.
pub type PullResult<T> = Result<T, PullError>;

/// Blocking HTTP downloader.
pub struct Downloader {
    client: reqwest::blocking::Client,
}

impl Downloader {
    pub fn new() -> PullResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("vfxi/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Reuse an existing client (custom proxies, timeouts).
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// GET `url` and write the body verbatim to `dest`, creating parent
    /// directories. Returns the number of bytes written.
    pub fn download(&self, url: &str, dest: &Path) -> PullResult<u64> {
        log::debug!("GET {url}");
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PullError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes()?;
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, &bytes)?;

        log::info!("Saved {} ({} bytes)", dest.display(), bytes.len());
        Ok(bytes.len() as u64)
    }

    /// Fetch `url` into `<root>/assets/UtahTeapot.usd`.
    pub fn teapot_from(&self, url: &str, root: &Path) -> PullResult<PathBuf> {
        let dest = teapot_path(root);
        log::info!("{}", dest.display());
        self.download(url, &dest)?;
        Ok(dest)
    }
}

/// Where [`teapot`] saves under `root`.
pub fn teapot_path(root: &Path) -> PathBuf {
    root.join(ASSETS_DIR).join("UtahTeapot.usd")
}

/// Download `url` to `dest` with a default client.
pub fn download<P: AsRef<Path>>(url: &str, dest: P) -> PullResult<u64> {
    Downloader::new()?.download(url, dest.as_ref())
}

/// Download the Utah teapot into `<root>/assets/UtahTeapot.usd`.
pub fn teapot<P: AsRef<Path>>(root: P) -> PullResult<PathBuf> {
    Downloader::new()?.teapot_from(TEAPOT_URL, root.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned response on a loopback port.
    fn serve_once(status_line: &'static str, body: &'static [u8]) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }

            write!(
                stream,
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .unwrap();
            stream.write_all(body).unwrap();
            stream.flush().unwrap();
            request_line
        });

        (format!("http://{addr}"), handle)
    }

    fn downloader() -> Downloader {
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .unwrap();
        Downloader::with_client(client)
    }

    #[test]
    fn test_download_saves_bytes_verbatim() {
        let _ = env_logger::builder().is_test(true).try_init();
        let body: &'static [u8] = b"#usda 1.0\n\x00\xffbinary tail";
        let (base, server) = serve_once("200 OK", body);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("file.usd");

        let written = downloader()
            .download(&format!("{base}/geo/file.usd"), &dest)
            .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
        assert!(server.join().unwrap().starts_with("GET /geo/file.usd "));
    }

    #[test]
    fn test_teapot_destination() {
        let (base, server) = serve_once("200 OK", b"teapot");
        let dir = tempfile::tempdir().unwrap();

        let saved = downloader()
            .teapot_from(&format!("{base}/UtahTeapot.usd"), dir.path())
            .unwrap();

        assert_eq!(saved, dir.path().join("assets").join("UtahTeapot.usd"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"teapot");
        server.join().unwrap();
    }

    #[test]
    fn test_error_status_reported() {
        let (base, server) = serve_once("404 Not Found", b"missing");
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.usd");

        let err = downloader()
            .download(&format!("{base}/nope"), &dest)
            .unwrap_err();

        match err {
            PullError::Status { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dest.exists());
        server.join().unwrap();
    }

    #[test]
    fn test_teapot_path() {
        assert_eq!(
            teapot_path(Path::new("/project")),
            PathBuf::from("/project/assets/UtahTeapot.usd")
        );
    }
}
