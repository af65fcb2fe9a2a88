//! Media type inference from file names.

/// Media type for files whose extension is unknown.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Charset reported for textual media types.
pub const UTF_8: &str = "UTF-8";

/// Infer a media type from a path's extension (case-insensitive).
pub fn lookup(path: &str) -> &'static str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let extension = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        // Dotless names like "Makefile" carry no extension.
        None => return DEFAULT_MEDIA_TYPE,
    };

    match extension.as_str() {
        "html" | "htm" | "shtml" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "txt" | "text" | "conf" | "log" | "ini" | "list" | "def" | "in" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "xml" | "xsl" | "xsd" => "application/xml",
        "yaml" | "yml" => "text/yaml",
        "ics" => "text/calendar",
        "vtt" => "text/vtt",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "jsonld" => "application/ld+json",
        "webmanifest" => "application/manifest+json",
        "svg" | "svgz" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => DEFAULT_MEDIA_TYPE,
    }
}

/// Charset declared by a media type, if any.
///
/// Text types and the JavaScript / JSON application types are UTF-8;
/// everything else is treated as binary.
pub fn charset(media_type: &str) -> Option<&'static str> {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase();

    if essence.starts_with("text/")
        || essence == "application/javascript"
        || essence == "application/json"
    {
        Some(UTF_8)
    } else {
        None
    }
}

/// Returns true if content of this media type should be handled as text.
pub fn is_textual(media_type: &str) -> bool {
    charset(media_type) == Some(UTF_8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_common_types() {
        assert_eq!(lookup("a.txt"), "text/plain");
        assert_eq!(lookup("site/index.html"), "text/html");
        assert_eq!(lookup("new/b.js"), "application/javascript");
        assert_eq!(lookup("c.png"), "image/png");
        assert_eq!(lookup("data/config.json"), "application/json");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("PHOTO.JPG"), "image/jpeg");
        assert_eq!(lookup("Styles.Css"), "text/css");
    }

    #[test]
    fn test_lookup_unknown_and_missing_extensions() {
        assert_eq!(lookup("Makefile"), DEFAULT_MEDIA_TYPE);
        assert_eq!(lookup("archive.xyz"), DEFAULT_MEDIA_TYPE);
        assert_eq!(lookup("dir.d/README"), DEFAULT_MEDIA_TYPE);
        assert_eq!(lookup(".gitignore"), DEFAULT_MEDIA_TYPE);
    }

    #[test]
    fn test_charset() {
        assert_eq!(charset("text/html"), Some(UTF_8));
        assert_eq!(charset("text/plain; charset=us-ascii"), Some(UTF_8));
        assert_eq!(charset("application/javascript"), Some(UTF_8));
        assert_eq!(charset("application/json"), Some(UTF_8));
        assert_eq!(charset("image/png"), None);
        assert_eq!(charset("image/svg+xml"), None);
        assert_eq!(charset(DEFAULT_MEDIA_TYPE), None);
    }

    #[test]
    fn test_is_textual() {
        assert!(is_textual(lookup("a.txt")));
        assert!(is_textual(lookup("b.js")));
        assert!(!is_textual(lookup("c.png")));
    }
}
