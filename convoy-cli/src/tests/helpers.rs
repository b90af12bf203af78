//! Test helpers for writing request files into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use convoy_core::{Location, SolveRequest, Stop, Vehicle};
use tempfile::TempDir;

/// A temporary directory addressed with UTF-8 paths.
#[derive(Debug)]
pub(super) struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self { _tmp: tmp, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    convoy_fs::write_utf8(path, contents).expect("write test file");
}

pub(super) fn write_request(path: &Utf8Path, request: &SolveRequest) {
    let payload = serde_json::to_string_pretty(request).expect("serialise request");
    write_utf8(path, payload.as_bytes());
}

/// Two round-trip vans and three nearby stops.
pub(super) fn sample_request() -> SolveRequest {
    let depot = Location::new(51.5, -0.1);
    SolveRequest {
        vehicles: vec![
            Vehicle::new("van-1", depot).with_capacity(2),
            Vehicle::new("van-2", depot).with_capacity(2),
        ],
        stops: vec![
            Stop::new("a", Location::new(51.501, -0.1)),
            Stop::new("b", Location::new(51.5, -0.099)),
            Stop::new("c", Location::new(51.499, -0.1)).with_window(0, 3_600),
        ],
    }
}
