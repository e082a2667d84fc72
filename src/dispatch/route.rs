//! Request topic routing
//!
//! Inbound topics are classified by literal prefix against the configured
//! request topic: `<base>Command`, `<base>Read`, `<base>Write`, first match
//! wins. A trailing wildcard marker on the base topic is stripped before
//! comparison. Matching is case-sensitive; there is no pattern language
//! beyond the prefix.

/// Classification of an inbound request topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicClass {
    Command,
    Read,
    Write,
    Unknown,
}

/// Classify `topic` against the configured base topic.
pub fn classify(topic: &str, base_topic: &str) -> TopicClass {
    let prefix = base_topic.trim_end_matches('#');
    let Some(rest) = topic.strip_prefix(prefix) else {
        return TopicClass::Unknown;
    };

    if rest.starts_with("Command") {
        TopicClass::Command
    } else if rest.starts_with("Read") {
        TopicClass::Read
    } else if rest.starts_with("Write") {
        TopicClass::Write
    } else {
        TopicClass::Unknown
    }
}

/// Correlation token appended to a request topic: the first `?` and
/// everything after it. The token matches a response to its caller; it is
/// not validated or interpreted beyond existing.
pub fn request_token(topic: &str) -> Option<&str> {
    topic.find('?').map(|index| &topic[index..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_strips_wildcard_marker() {
        let base = "Devices/Plant1/#";
        assert_eq!(classify("Devices/Plant1/Command?42", base), TopicClass::Command);
        assert_eq!(classify("Devices/Plant1/Read?7", base), TopicClass::Read);
        assert_eq!(classify("Devices/Plant1/Write?3", base), TopicClass::Write);
    }

    #[test]
    fn test_classify_without_wildcard_marker() {
        assert_eq!(classify("devices/ReadTemp", "devices/"), TopicClass::Read);
    }

    #[test]
    fn test_unmatched_topics_are_unknown() {
        let base = "Devices/Plant1/#";
        assert_eq!(classify("Devices/Plant1/Unsubscribe?1", base), TopicClass::Unknown);
        assert_eq!(classify("Devices/Plant2/Read?1", base), TopicClass::Unknown);
        assert_eq!(classify("Read?1", base), TopicClass::Unknown);
    }

    #[test]
    fn test_classification_is_case_sensitive() {
        assert_eq!(
            classify("Devices/Plant1/command?1", "Devices/Plant1/#"),
            TopicClass::Unknown
        );
    }

    #[test]
    fn test_prefix_match_ignores_trailing_text() {
        // Anything after the operation name is part of the caller's suffix.
        assert_eq!(
            classify("Devices/Plant1/CommandExtra?1", "Devices/Plant1/#"),
            TopicClass::Command
        );
    }

    #[test]
    fn test_request_token_is_inclusive_of_marker() {
        assert_eq!(request_token("Devices/Plant1/Command?42"), Some("?42"));
        assert_eq!(request_token("a?b?c"), Some("?b?c"));
        assert_eq!(request_token("Devices/Plant1/Command"), None);
    }
}
