//! Lexical heuristics for low-quality English descriptions.

/// An item is reported when at least this many issues apply.
pub static ISSUE_THRESHOLD: usize = 4;

pub static MAX_DESC_LENGTH: usize = 140;

/// Leading words a good description should not start with.
pub static BAD_STARTS: &[&str] = &[
    "a ", "an ", "the ", "A ", "An ", "The ", "It ", "is ", "are ", "was ", "were ",
];

/// Items excluded from the longest-description scan (known long-but-fine
/// descriptions, accumulated over previous runs).
pub static LONGEST_SKIP: &[&str] = &[
    "Q31", "Q8", "Q75", "Q178", "Q1071", "Q5300", "Q61905", "Q15524964", "Q22669988",
    "Q30026965", "Q47012759", "Q273948", "Q420870", "Q58192", "Q41377", "Q148417", "Q7338",
    "Q425024", "Q180618", "Q552179", "Q37011394", "Q37110257", "Q46654", "Q47069", "Q559003",
    "Q613311", "Q620057", "Q658145", "Q671136", "Q742224", "Q190200", "Q903660", "Q94427",
    "Q915455", "Q970614", "Q1083391", "Q30023157", "Q1446169", "Q29644038", "Q1051110",
    "Q1535890", "Q1279431", "Q2079841", "Q1794963", "Q2264448", "Q798572", "Q2093727",
    "Q2540295", "Q42061229", "Q45736919", "Q31048074", "Q47012765", "Q55095102", "Q2310773",
    "Q3033305", "Q3123047", "Q3253731", "Q3798557",
];

/// Items excluded from the promotional-wording scan.
pub static PROMO_SKIP: &[&str] = &["Q749290"];

/// Names of all issues that apply to a description. The names appear in
/// reports, so keep them short.
pub fn description_issues(label: Option<&str>, desc: &str) -> Vec<&'static str> {
    let mut issues: Vec<&'static str> = vec![];
    if let Some(label) = label {
        if !label.is_empty() && desc.starts_with(label) {
            issues.push("starts with label");
        }
    }
    if desc.chars().count() > MAX_DESC_LENGTH {
        issues.push("too long");
    }
    if desc.chars().next().map_or(false, char::is_uppercase) {
        issues.push("capitalized");
    }
    if desc
        .chars()
        .last()
        .map_or(false, |c| c.is_ascii_punctuation())
    {
        issues.push("trailing punctuation");
    }
    if desc.contains('®') {
        issues.push("registered trademark sign");
    }
    if desc.contains('™') {
        issues.push("trademark sign");
    }
    if BAD_STARTS.iter().any(|start| desc.starts_with(start)) {
        issues.push("bad leading word");
    }
    if desc.contains("  ") {
        issues.push("double space");
    }
    if desc.contains("Obituary") {
        issues.push("obituary");
    }
    if desc.contains("&amp;") {
        issues.push("unescaped entity");
    }
    if desc.contains(" ,") {
        issues.push("space before comma");
    }
    issues
}

/// "the best X" without any award context reads like advertising copy.
pub fn is_promotional(desc: &str) -> bool {
    desc.contains("the best ") && !desc.contains("award")
}

/// Tracks the running maximum description length, reporting each new record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestTracker {
    longest: usize,
}

impl LongestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when this description sets a new length record.
    pub fn observe(&mut self, desc: &str) -> bool {
        let length = desc.chars().count();
        if length > self.longest {
            self.longest = length;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_description_has_no_issues() {
        assert!(description_issues(Some("Douglas Adams"), "writer and humorist").is_empty());
    }

    #[test]
    fn issue_list_accumulates() {
        // Starts with label, capitalized, trailing punctuation, bad leading
        // word would not apply (label is first), double space.
        let issues = description_issues(
            Some("Acme"),
            "Acme  is the  greatest company ever established.",
        );
        assert!(issues.contains(&"starts with label"));
        assert!(issues.contains(&"capitalized"));
        assert!(issues.contains(&"trailing punctuation"));
        assert!(issues.contains(&"double space"));
        assert!(issues.len() >= ISSUE_THRESHOLD);
    }

    #[test]
    fn bad_leading_words() {
        assert!(description_issues(None, "The capital of nowhere").contains(&"bad leading word"));
        assert!(description_issues(None, "was a thing").contains(&"bad leading word"));
        assert!(!description_issues(None, "capital of nowhere").contains(&"bad leading word"));
    }

    #[test]
    fn too_long_counts_characters_not_bytes() {
        let desc: String = "ä".repeat(MAX_DESC_LENGTH);
        assert!(!description_issues(None, &desc).contains(&"too long"));
        let desc: String = "ä".repeat(MAX_DESC_LENGTH + 1);
        assert!(description_issues(None, &desc).contains(&"too long"));
    }

    #[test]
    fn promotional_wording() {
        assert!(is_promotional("the best restaurant in town"));
        assert!(!is_promotional("won the best picture award"));
        assert!(!is_promotional("a pretty good restaurant"));
    }

    #[test]
    fn longest_tracker_reports_new_records_only() {
        let mut tracker = LongestTracker::new();
        assert!(tracker.observe("abc"));
        assert!(!tracker.observe("ab"));
        assert!(!tracker.observe("abc"));
        assert!(tracker.observe("abcd"));
    }
}
