//! Test utilities for bridgecraft unit tests.
//!
//! The pipeline is driven by external tools, so most tests run it against
//! small shell scripts standing in for `xcodebuild`, `clang` and
//! `sourcekitten`, plus a recording [`InterfaceService`].
//!
//! # Example
//!
//! ```rust,ignore
//! use bridgecraft::test_support::{create_sample_project, fake_clang, StubInterfaceService};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let project = create_sample_project(tmp.path(), "Sample");
//!     let clang = fake_clang(tmp.path(), "int f(void);");
//!     let service = StubInterfaceService::returning("func f() -> Int32\n");
//!     // Build a Pipeline from these...
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use serde_json::{Map, Value};

use crate::ops::interface::{InterfaceRequest, InterfaceService, SOURCE_TEXT_KEY};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Write an executable `#!/bin/sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A fake `xcodebuild`.
///
/// `-showBuildSettings` prints a settings dump, including the bridging
/// header setting when `bridging_header` is set. `clean build -dry-run`
/// prints a build log containing `compile_line`.
#[cfg(unix)]
pub fn fake_xcodebuild(dir: &Path, bridging_header: Option<&str>, compile_line: &str) -> PathBuf {
    let setting = bridging_header
        .map(|h| format!("    echo '    SWIFT_OBJC_BRIDGING_HEADER = {h}'\n"))
        .unwrap_or_default();
    let body = format!(
        "case \"$1\" in\n  -showBuildSettings)\n    echo 'Build settings for action build and target App:'\n    echo '    PRODUCT_NAME = App'\n{setting}    echo '    SDKROOT = macosx'\n    ;;\n  clean)\n    echo '=== BUILD TARGET App OF PROJECT Sample WITH THE DEFAULT CONFIGURATION (Debug) ==='\n    echo 'CompileC /tmp/Bridging.o Bridging.m normal arm64 objective-c com.apple.compilers.llvm.clang.1_0.compiler'\n    echo '    {compile_line}'\n    echo '** BUILD SUCCEEDED **'\n    ;;\n  *)\n    exit 64\n    ;;\nesac\n"
    );
    fake_tool(dir, "xcodebuild", &body)
}

/// A fake `clang` that writes `output` (plus a newline) to the file named by `-o`.
#[cfg(unix)]
pub fn fake_clang(dir: &Path, output: &str) -> PathBuf {
    let body = format!(
        "out=\"\"\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = -o ]; then out=\"$2\"; fi\n  shift\ndone\n[ -n \"$out\" ] || exit 1\nprintf '%s\\n' '{output}' > \"$out\"\n"
    );
    fake_tool(dir, "clang", &body)
}

/// Interface service that answers every request the same way and records
/// each request with the contents of its file at the time of the call.
#[derive(Debug, Clone)]
pub struct StubInterfaceService {
    response: std::result::Result<String, String>,
    requests: Arc<Mutex<Vec<(InterfaceRequest, Option<String>)>>>,
}

impl StubInterfaceService {
    /// Answer with `text` as the generated interface.
    pub fn returning(text: impl Into<String>) -> Self {
        StubInterfaceService {
            response: Ok(text.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail every request with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        StubInterfaceService {
            response: Err(message.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Requests received so far, with the file contents seen at the time.
    pub fn requests(&self) -> Vec<(InterfaceRequest, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

impl InterfaceService for StubInterfaceService {
    fn send(&self, request: &InterfaceRequest) -> Result<Map<String, Value>> {
        let contents = std::fs::read_to_string(&request.file).ok();
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), contents));

        match self.response {
            Ok(ref text) => {
                let mut map = Map::new();
                map.insert(SOURCE_TEXT_KEY.to_string(), Value::String(text.clone()));
                Ok(map)
            }
            Err(ref message) => bail!("{}", message),
        }
    }
}
