use regex::Regex;

/// Maximum number of files processed per batch.
pub const BATCH_SIZE: usize = 10;

// Media types the classification service can extract text from.
const ACCEPTED_MEDIA_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "application/msword",
    "application/rtf",
];

const EXTENSION_ALLOW_LIST: &str = r"(?i)\.(pdf|docx|txt|doc|rtf|odt)$";

/// One accepted document: raw payload, original name and the media type it
/// was declared with (absent when the source could not tell).
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub name: String,
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, media_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.map(|m| m.to_string()),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Ordered set of accepted input files. Insertion order drives both the
/// displayed list and the batch order of a run.
#[derive(Debug, Default)]
pub struct DocumentStore {
    files: Vec<InputFile>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every candidate that passes the intake filter, preserving
    /// arrival order. Unsupported candidates are dropped without error.
    /// Returns how many were accepted.
    pub fn add(&mut self, candidates: Vec<InputFile>) -> usize {
        let before = self.files.len();
        for candidate in candidates {
            if is_supported(&candidate.name, candidate.media_type.as_deref()) {
                self.files.push(candidate);
            }
        }
        self.files.len() - before
    }

    /// Remove the file at the given position. Out-of-range indices are a
    /// no-op: the index may be stale after other UI events.
    pub fn remove(&mut self, index: usize) {
        if index < self.files.len() {
            self.files.remove(index);
        }
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn get(&self, index: usize) -> Option<&InputFile> {
        self.files.get(index)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of batches a run over the current contents would take.
    pub fn total_batches(&self) -> usize {
        self.files.len().div_ceil(BATCH_SIZE)
    }
}

/// Intake filter: accept when the declared media type is on the allow-list,
/// or when the name carries an allow-listed extension. The extension check
/// covers sources that declare no type (or an unreliable one).
pub fn is_supported(name: &str, media_type: Option<&str>) -> bool {
    if let Some(media_type) = media_type {
        if ACCEPTED_MEDIA_TYPES.contains(&media_type) {
            return true;
        }
    }
    let extension_pattern = Regex::new(EXTENSION_ALLOW_LIST).unwrap();
    extension_pattern.is_match(name)
}

/// Declared media type for a filename, judged by extension. Returns None for
/// anything outside the supported set.
pub fn media_type_for(name: &str) -> Option<&'static str> {
    let extension = name.rsplit('.').next()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "docx" => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        "txt" => Some("text/plain"),
        "doc" => Some("application/msword"),
        "rtf" => Some("application/rtf"),
        "odt" => Some("application/vnd.oasis.opendocument.text"),
        _ => None,
    }
}

/// Human-readable size for the file list: 1024-based, two decimals at most.
pub fn format_file_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    if unit >= UNITS.len() {
        unit = UNITS.len() - 1;
    }

    let value = bytes as f64 / 1024_f64.powi(unit as i32);
    let mut formatted = format!("{value:.2}");
    while formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.pop();
    }

    format!("{} {}", formatted, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_by_media_type() {
        assert!(is_supported("anything.bin", Some("application/pdf")));
        assert!(is_supported("notes", Some("text/plain")));
        assert!(!is_supported("photo.png", Some("image/png")));
    }

    #[test]
    fn test_is_supported_by_extension_fallback() {
        assert!(is_supported("report.PDF", None));
        assert!(is_supported("letter.docx", None));
        assert!(is_supported("old.Doc", Some("application/octet-stream")));
        assert!(!is_supported("archive.zip", None));
    }

    #[test]
    fn test_media_type_for() {
        assert_eq!(media_type_for("a.pdf"), Some("application/pdf"));
        assert_eq!(media_type_for("a.TXT"), Some("text/plain"));
        assert_eq!(media_type_for("a.png"), None);
        assert_eq!(media_type_for("no_extension"), None);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1 MB");
    }
}
