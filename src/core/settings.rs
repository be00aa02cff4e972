//! Scanning of build-settings dumps.

use crate::core::errors::BridgeError;

/// Setting that names the bridging header of a target.
pub const BRIDGING_HEADER_KEY: &str = "SWIFT_OBJC_BRIDGING_HEADER";

/// Find the value of `key` in the output of a build-settings dump.
///
/// Lines look like `    KEY = value`. The first matching line wins and
/// the value is everything after the first `=`, trimmed.
pub fn find_setting(output: &str, key: &str) -> Result<String, BridgeError> {
    let prefix = format!("{key} = ");

    output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(&prefix))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| value.trim().to_string())
        .ok_or_else(|| BridgeError::SettingNotFound {
            key: key.to_string(),
        })
}
