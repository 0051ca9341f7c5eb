//! Client filename handling: extension checks and sanitization for on-disk names.

use unicode_normalization::UnicodeNormalization;

/// Lower-cased text after the last `.` of `filename`, if any.
///
/// A bare leading dot counts, so `.png` has extension `png`.
pub fn extension(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Whether `filename` carries one of the `allowed` extensions (case-insensitive).
pub fn is_allowed(filename: &str, allowed: &[String]) -> bool {
    extension(filename).is_some_and(|ext| allowed.iter().any(|a| *a == ext))
}

/// Reduce a client-supplied filename to something safe to embed in a storage name.
///
/// Directory components are dropped, accented letters are folded to ASCII (NFKD), whitespace
/// runs become `_`, characters outside `[A-Za-z0-9._-]` are removed and leading/trailing
/// `.`/`_` are trimmed. The result may be empty when nothing usable survives.
pub fn sanitize(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let folded: String = base.nfkd().filter(char::is_ascii).collect();
    let joined = folded.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}
