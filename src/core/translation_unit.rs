//! Synthesized translation units and header rewriting.

/// Umbrella header imported before nullability brackets by default.
pub const DEFAULT_UMBRELLA_HEADER: &str = "Foundation/Foundation.h";

pub const ASSUME_NONNULL_BEGIN: &str = "NS_ASSUME_NONNULL_BEGIN";
pub const ASSUME_NONNULL_END: &str = "NS_ASSUME_NONNULL_END";

/// Source of a one-line unit importing `header_path` verbatim.
///
/// The header is not checked for existence here; a bad path fails later in
/// the build or the preprocessor.
pub fn synthesize(header_path: &str) -> String {
    format!("#import \"{header_path}\"\n")
}

/// Wrap preprocessed header text in assume-nonnull brackets.
///
/// The umbrella header is imported first so the bracket macros are defined.
/// `source` is kept byte for byte between the markers.
pub fn wrap_assume_nonnull(source: &str, umbrella_header: &str) -> String {
    format!(
        "#import <{umbrella_header}>\n{ASSUME_NONNULL_BEGIN}\n{source}\n{ASSUME_NONNULL_END}\n"
    )
}
