/// Content type used when a filename has no recognised extension.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

const SUFFIXES: &[(&str, &str)] = &[
    (".json", "application/json"),
    (".js", "application/javascript"),
    (".css", "text/css"),
    (".html", "text/html"),
    (".htm", "text/html"),
    (".xml", "application/xml"),
];

/// Infers the MIME type of a text mapping from its filename suffix.
///
/// Matching is case-sensitive. Every text creation path goes through this
/// function so stored records agree on the table.
pub fn infer_content_type(filename: &str) -> &'static str {
    SUFFIXES
        .iter()
        .find(|(suffix, _)| filename.ends_with(suffix))
        .map(|(_, content_type)| *content_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
