//! Mapping from local severities to backend levels

use super::event::BackendLevel;
use crate::core::Severity;

/// Backend level for a local severity
pub fn map_severity(level: Severity) -> BackendLevel {
    match level {
        Severity::Debug => BackendLevel::Debug,
        Severity::Info => BackendLevel::Info,
        Severity::Warn => BackendLevel::Warning,
        Severity::Error => BackendLevel::Error,
        Severity::Fatal => BackendLevel::Fatal,
    }
}

/// Backend level for a raw severity code
///
/// Codes no severity carries map to the most severe backend level, so an
/// unexpected level is reported loudly rather than dropped.
pub fn map_severity_code(code: i32) -> BackendLevel {
    Severity::from_code(code).map_or(BackendLevel::MAX, map_severity)
}

impl From<Severity> for BackendLevel {
    fn from(level: Severity) -> Self {
        map_severity(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_levels() {
        assert_eq!(map_severity(Severity::Debug), BackendLevel::Debug);
        assert_eq!(map_severity(Severity::Info), BackendLevel::Info);
        assert_eq!(map_severity(Severity::Warn), BackendLevel::Warning);
        assert_eq!(map_severity(Severity::Error), BackendLevel::Error);
        assert_eq!(map_severity(Severity::Fatal), BackendLevel::Fatal);
    }

    #[test]
    fn test_unknown_codes_map_to_most_severe() {
        assert_eq!(map_severity_code(6), BackendLevel::Fatal);
        assert_eq!(map_severity_code(i32::MAX), BackendLevel::Fatal);
        assert_eq!(map_severity_code(-1), BackendLevel::Fatal);
        assert_eq!(map_severity_code(Severity::Warn.code()), BackendLevel::Warning);
    }

    #[test]
    fn test_mapping_is_monotonic() {
        let mapped: Vec<BackendLevel> = Severity::ALL.into_iter().map(map_severity).collect();
        assert!(mapped.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
