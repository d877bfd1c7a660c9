/// Text filtering for chirp bodies

pub trait TextFilter: Send + Sync {
    fn filter_text(&self, text: &str) -> String;
}

const DEFAULT_BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const REPLACEMENT: &str = "****";

/// Replaces banned words with `****`
///
/// Matching is per space-separated word and case-insensitive. A word with
/// punctuation attached (`sharbert!`) is left alone.
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    banned: Vec<String>,
}

impl ProfanityFilter {
    pub fn new<I, S>(banned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            banned: banned
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl Default for ProfanityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BANNED_WORDS)
    }
}

impl TextFilter for ProfanityFilter {
    fn filter_text(&self, text: &str) -> String {
        text.split(' ')
            .map(|word| {
                let lowered = word.to_lowercase();
                if self.banned.iter().any(|b| *b == lowered) {
                    REPLACEMENT
                } else {
                    word
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_banned_words() {
        let filter = ProfanityFilter::default();
        assert_eq!(
            filter.filter_text("I had something interesting for breakfast kerfuffle"),
            "I had something interesting for breakfast ****"
        );
    }

    #[test]
    fn test_case_insensitive() {
        let filter = ProfanityFilter::default();
        assert_eq!(filter.filter_text("Sharbert FORNAX"), "**** ****");
    }

    #[test]
    fn test_punctuation_is_not_stripped() {
        let filter = ProfanityFilter::default();
        assert_eq!(filter.filter_text("Sharbert!"), "Sharbert!");
    }

    #[test]
    fn test_spacing_is_preserved() {
        let filter = ProfanityFilter::default();
        assert_eq!(filter.filter_text("a  fornax  b"), "a  ****  b");
    }

    #[test]
    fn test_custom_word_list() {
        let filter = ProfanityFilter::new(["Heck"]);
        assert_eq!(filter.filter_text("what the heck"), "what the ****");
    }
}
