/// The template names shipped with the tool, in the order they are usually
/// assembled into a client binder.
pub const DEFAULT_PREFIXES: &[&str] = &[
    "Portfolio Inserts",
    "Fiduciary and Distribution Summary",
    "Trust Quick Reference Page",
    "Trust Summary",
    "RLT",
    "Pour-Over Will",
    "Funding Instructions",
    "Power of Attorney",
    "California Certification of Trust",
    "Assignment of Personal Property",
    "California Advance Health Care Directive",
    "California HIPAA Authorization",
    "California Nomination of Conservator",
    "Remembrance and Services Memorandum",
    "Personal Property Memo",
    "California Nomination of Guardian",
];

/// An ordered list of literal file name prefixes.
///
/// A document is eligible for processing only when its file name starts with
/// one of these prefixes. The order is informational; it does not affect the
/// order in which files are processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateWhitelist {
    prefixes: Vec<String>,
}

impl Default for TemplateWhitelist {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl TemplateWhitelist {
    /// Creates a whitelist from custom prefixes. Blank entries are dropped.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p| !p.trim().is_empty())
                .collect(),
        }
    }

    /// Returns `true` if `file_name` starts with any whitelisted prefix.
    ///
    /// Matching is literal and case-sensitive.
    pub fn matches(&self, file_name: &str) -> bool {
        self.prefixes.iter().any(|p| file_name.starts_with(p.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_whitelist_order() {
        let whitelist = TemplateWhitelist::default();
        assert_eq!(whitelist.prefixes().len(), 16);
        assert_eq!(whitelist.prefixes()[0], "Portfolio Inserts");
        assert_eq!(whitelist.prefixes()[15], "California Nomination of Guardian");
    }

    #[test]
    fn test_prefix_matching() {
        let whitelist = TemplateWhitelist::default();
        assert!(whitelist.matches("Trust Summary.docx"));
        assert!(whitelist.matches("RLT - Smith Family.docx"));
        assert!(whitelist.matches("Power of Attorney (Jane).docx"));
        assert!(!whitelist.matches("Random File.docx"));
        // Prefixes are case-sensitive and anchored at the start
        assert!(!whitelist.matches("trust summary.docx"));
        assert!(!whitelist.matches("Copy of Trust Summary.docx"));
    }

    #[test]
    fn test_custom_whitelist_drops_blank_entries() {
        let whitelist = TemplateWhitelist::new(["Letter", "  ", ""]);
        assert_eq!(whitelist.prefixes(), ["Letter".to_string()]);
        assert!(whitelist.matches("Letter to Client.docx"));
        assert!(!whitelist.matches("Trust Summary.docx"));
    }

    #[test]
    fn test_empty_whitelist_matches_nothing() {
        let whitelist = TemplateWhitelist::new(Vec::<String>::new());
        assert!(whitelist.is_empty());
        assert!(!whitelist.matches("Trust Summary.docx"));
    }
}
