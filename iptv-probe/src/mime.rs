/// Mime types served for HLS playlists.
pub const HLS_MIME_TYPES: [&str; 2] = ["application/vnd.apple.mpegurl", "application/x-mpegURL"];

/// Allow-list of response mime types.
#[derive(Clone, Debug)]
pub struct MimeTypes {
    types: Vec<String>,
}

impl Default for MimeTypes {
    fn default() -> Self {
        Self::new(HLS_MIME_TYPES)
    }
}

impl MimeTypes {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            types: types
                .into_iter()
                .map(|x| essence(x.as_ref()).to_owned())
                .filter(|x| !x.is_empty())
                .collect(),
        }
    }

    /// Compares only the `type/subtype` part, ignoring case and parameters.
    pub fn matches(&self, mime_type: &str) -> bool {
        let mime_type = essence(mime_type);

        if mime_type.is_empty() {
            return false;
        }

        self.types.iter().any(|x| x.eq_ignore_ascii_case(mime_type))
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn essence(mime_type: &str) -> &str {
    mime_type.split(';').next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_hls() {
        let mime_types = MimeTypes::default();
        assert!(mime_types.matches("application/vnd.apple.mpegurl"));
        assert!(mime_types.matches("application/x-mpegURL"));
    }

    #[test]
    fn test_matches_ignores_case_and_parameters() {
        let mime_types = MimeTypes::default();
        assert!(mime_types.matches("application/x-mpegurl"));
        assert!(mime_types.matches("Application/VND.Apple.MpegURL; charset=UTF-8"));
    }

    #[test]
    fn test_rejects_other_types() {
        let mime_types = MimeTypes::default();
        assert!(!mime_types.matches("video/mp2t"));
        assert!(!mime_types.matches("application/dash+xml"));
        assert!(!mime_types.matches("text/html"));
        assert!(!mime_types.matches(""));
        assert!(!mime_types.matches(" ; charset=utf-8"));
    }

    #[test]
    fn test_custom_list() {
        let mime_types = MimeTypes::new(["application/dash+xml", ""]);
        assert!(mime_types.matches("application/dash+xml"));
        assert!(!mime_types.matches("application/x-mpegURL"));
        assert!(!mime_types.is_empty());
        assert!(MimeTypes::new(Vec::<String>::new()).is_empty());
    }
}
