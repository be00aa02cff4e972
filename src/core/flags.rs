//! Compiler flag extraction from dry-run build logs.
//!
//! A dry-run build prints every compiler invocation it would run. The line
//! that compiles our synthesized translation unit carries exactly the
//! include paths, defines, SDK root and architecture we need to replay the
//! same compilation through the preprocessor.

use std::fmt;
use std::path::Path;

use crate::core::errors::BridgeError;
use crate::util::fs::normalize_path;

/// How a flag carries its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// Value appended to the flag itself, e.g. `-Ipath`.
    Glued,
    /// Value in the following token, e.g. `-arch arm64`.
    Split,
}

/// Flag prefixes we forward, checked in order. Glued entries come first.
pub const FLAG_PREFIXES: &[(&str, FlagKind)] = &[
    ("-I", FlagKind::Glued),
    ("-D", FlagKind::Glued),
    ("-F", FlagKind::Glued),
    ("-mmacosx-version-min", FlagKind::Glued),
    ("-iquote", FlagKind::Split),
    ("-arch", FlagKind::Split),
    ("-isysroot", FlagKind::Split),
];

// Stands in for an escaped space while the line is tokenized.
const SPACE_SENTINEL: &str = "\u{0}";

/// Classify a token by prefix.
pub fn classify(token: &str) -> Option<FlagKind> {
    FLAG_PREFIXES
        .iter()
        .find(|(prefix, _)| token.starts_with(prefix))
        .map(|&(_, kind)| kind)
}

/// Ordered compiler flags relevant to one translation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerFlags(Vec<String>);

impl CompilerFlags {
    pub fn new(flags: Vec<String>) -> Self {
        CompilerFlags(flags)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for CompilerFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl<'a> IntoIterator for &'a CompilerFlags {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Extract the flags used to compile `unit` from a dry-run build log.
///
/// Only the first line containing `-c <unit>` is considered. The unit path
/// is resolved through symlinks before matching, since the build tool logs
/// resolved paths.
pub fn extract_flags(log: &str, unit: &Path) -> Result<CompilerFlags, BridgeError> {
    let resolved = normalize_path(unit);
    let pattern = format!("-c {}", resolved.display());

    let line = log
        .lines()
        .find(|line| line.contains(&pattern))
        .ok_or_else(|| BridgeError::CompileLineNotFound {
            unit: resolved.clone(),
        })?;

    Ok(flags_from_line(line))
}

/// Pick the forwarded flags out of a single compiler invocation line.
pub fn flags_from_line(line: &str) -> CompilerFlags {
    let tokens = tokenize(line);

    // Every token is inspected as a key, including one already emitted as
    // the value of a split flag.
    let flags = tokens
        .windows(2)
        .flat_map(|pair| match classify(&pair[0]) {
            Some(FlagKind::Glued) => vec![pair[0].clone()],
            Some(FlagKind::Split) => vec![pair[0].clone(), pair[1].clone()],
            None => Vec::new(),
        })
        .collect();

    CompilerFlags(flags)
}

/// Split a shell command line on unescaped spaces.
///
/// `\ ` is kept inside its token as a literal space.
pub fn tokenize(line: &str) -> Vec<String> {
    line.replace("\\ ", SPACE_SENTINEL)
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(|token| token.replace(SPACE_SENTINEL, " "))
        .collect()
}
