//! Agent descriptor and language matching
//!
//! TVMaze reports languages by English name ("English", "Japanese", ...).
//! The host works with two-letter codes, so search results are translated
//! through a [`LanguageMatcher`].

use crate::host::LanguageMatcher;

/// Language codes the agent declares support for, with their English names.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ab", "Abkhazian"),
    ("sq", "Albanian"),
    ("ar", "Arabic"),
    ("hy", "Armenian"),
    ("az", "Azerbaijani"),
    ("bg", "Bulgarian"),
    ("zh", "Chinese"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("nl", "Dutch"),
    ("en", "English"),
    ("et", "Estonian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("ka", "Georgian"),
    ("de", "German"),
    ("ga", "Irish"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("no", "Norwegian"),
    ("fa", "Persian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sr", "Serbian"),
    ("es", "Spanish"),
    ("sv", "Swedish"),
    ("tl", "Tagalog"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("cy", "Welsh"),
];

/// Static description the host reads when registering the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentInfo {
    pub name: &'static str,
    pub primary_provider: bool,
    pub fallback_agent: bool,
    pub accepts_from: Option<&'static [&'static str]>,
    pub contributes_to: Option<&'static [&'static str]>,
}

impl AgentInfo {
    /// Language codes this agent can serve
    pub fn languages(&self) -> impl Iterator<Item = &'static str> {
        SUPPORTED_LANGUAGES.iter().map(|(code, _)| *code)
    }
}

/// Descriptor of the TVMaze agent
pub const AGENT_INFO: AgentInfo = AgentInfo {
    name: "TV Maze",
    primary_provider: true,
    fallback_agent: false,
    accepts_from: None,
    contributes_to: None,
};

/// Matches English language names or two-letter codes against
/// [`SUPPORTED_LANGUAGES`], ignoring case.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoLanguageMatcher;

impl LanguageMatcher for IsoLanguageMatcher {
    fn match_language(&self, name: &str) -> Option<String> {
        let name = name.trim();
        SUPPORTED_LANGUAGES
            .iter()
            .find(|(code, english)| {
                english.eq_ignore_ascii_case(name) || code.eq_ignore_ascii_case(name)
            })
            .map(|(code, _)| code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_by_english_name() {
        let matcher = IsoLanguageMatcher;
        assert_eq!(matcher.match_language("English").as_deref(), Some("en"));
        assert_eq!(matcher.match_language("japanese").as_deref(), Some("ja"));
        assert_eq!(matcher.match_language(" Welsh ").as_deref(), Some("cy"));
    }

    #[test]
    fn test_match_by_code() {
        assert_eq!(IsoLanguageMatcher.match_language("DE").as_deref(), Some("de"));
    }

    #[test]
    fn test_unknown_language() {
        assert_eq!(IsoLanguageMatcher.match_language("Klingon"), None);
        assert_eq!(IsoLanguageMatcher.match_language(""), None);
    }

    #[test]
    fn test_agent_info_languages() {
        let languages: Vec<_> = AGENT_INFO.languages().collect();
        assert_eq!(languages.len(), 40);
        assert!(languages.contains(&"en"));
        assert!(AGENT_INFO.primary_provider);
    }
}
