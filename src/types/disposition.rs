//! Content-Disposition header container (RFC 2183).

use std::collections::HashMap;

/// The disposition type of a mail part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Displayed inline with the message body.
    #[default]
    Inline,
    /// Presented as a separate attachment.
    Attachment,
}

/// Character set and language data for one additional parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterMetadata {
    /// Character set of the parameter value.
    pub char_set: Option<String>,
    /// Language of the parameter value.
    pub language: Option<String>,
}

/// A container for a Content-Disposition header as described in RFC 2183.
///
/// Used on the content-disposition property of mail parts. This is a plain
/// record: it carries header values and has no behavior of its own.
///
/// Dates are RFC 822 section 5 formatted strings, for example
/// `Sun, 21 May 2006 16:00:50 +0400`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentDispositionHeader {
    /// The disposition type.
    pub disposition: Disposition,
    /// The filename of the attachment, without path information.
    pub file_name: Option<String>,
    /// The language of the filename.
    pub file_name_language: Option<String>,
    /// The character set of the filename.
    pub file_name_char_set: Option<String>,
    /// The creation date of the file attachment.
    pub creation_date: Option<String>,
    /// The last modification date of the file attachment.
    pub modification_date: Option<String>,
    /// The last date the file attachment was read.
    pub read_date: Option<String>,
    /// The size of the content in bytes.
    pub size: Option<u64>,
    /// Any additional parameters provided in the header, by name.
    pub additional_parameters: HashMap<String, String>,
    /// Character set and language data for the additional parameters.
    pub additional_parameters_metadata: HashMap<String, ParameterMetadata>,
}

impl ContentDispositionHeader {
    /// Creates a header with the given disposition and no other values set.
    #[must_use]
    pub fn new(disposition: Disposition) -> Self {
        Self {
            disposition,
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_inline() {
        let header = ContentDispositionHeader::default();
        assert_eq!(header.disposition, Disposition::Inline);
        assert!(header.file_name.is_none());
        assert!(header.additional_parameters.is_empty());
    }

    #[test]
    fn test_new_attachment() {
        let mut header = ContentDispositionHeader::new(Disposition::Attachment);
        header.file_name = Some("report.pdf".into());
        header.size = Some(1024);

        assert_eq!(header.disposition, Disposition::Attachment);
        assert_eq!(header.file_name.as_deref(), Some("report.pdf"));
    }
}
