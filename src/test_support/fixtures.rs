//! Test fixtures for common test scenarios.

use std::path::{Path, PathBuf};

use crate::core::pbxproj::PBXPROJ_FILE_NAME;

/// Descriptor of the sample project.
///
/// Targets: `App` (frameworks phase, then a sources phase holding
/// `AppDelegate.swift`) and `Lint` (a script-only aggregate target with no sources
/// phase). `App` sets `SWIFT_OBJC_BRIDGING_HEADER`.
pub const SAMPLE_PBXPROJ: &str =
    include_str!("../../tests/fixtures/Sample.xcodeproj/project.pbxproj");

/// Write the sample project to `<dir>/<name>.xcodeproj` and return the bundle path.
pub fn create_sample_project(dir: &Path, name: &str) -> PathBuf {
    let bundle = dir.join(format!("{name}.xcodeproj"));
    std::fs::create_dir_all(&bundle).unwrap();
    std::fs::write(bundle.join(PBXPROJ_FILE_NAME), SAMPLE_PBXPROJ).unwrap();
    bundle
}

/// A compiler invocation line as a dry-run build prints it for `unit`.
pub fn compile_line(unit: &Path, flags: &[&str]) -> String {
    format!(
        "/usr/bin/clang -x objective-c -c {} {} -o /tmp/Bridging.o",
        unit.display(),
        flags.join(" ")
    )
}
