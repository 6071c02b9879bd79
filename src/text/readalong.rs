use std::time::Duration;

/// Words longer than this many characters stay highlighted longer.
pub const LONG_WORD_THRESHOLD: usize = 6;
pub const SHORT_WORD_DELAY: Duration = Duration::from_millis(600);
pub const LONG_WORD_DELAY: Duration = Duration::from_millis(800);

/// Split story text into the words the read-along highlights, in order.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// How long `word` stays highlighted before moving on.
pub fn word_delay(word: &str) -> Duration {
    if word.chars().count() > LONG_WORD_THRESHOLD {
        LONG_WORD_DELAY
    } else {
        SHORT_WORD_DELAY
    }
}

/// Cursor over the read-along words. Each call to [`ReadAlong::advance`]
/// yields the next word index and how long to hold it.
#[derive(Debug, Clone)]
pub struct ReadAlong {
    words: Vec<String>,
    next: usize,
}

impl ReadAlong {
    pub fn new(text: &str) -> Self {
        Self {
            words: split_words(text),
            next: 0,
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn advance(&mut self) -> Option<(usize, Duration)> {
        let word = self.words.get(self.next)?;
        let step = (self.next, word_delay(word));
        self.next += 1;
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_any_whitespace() {
        let words = split_words("  Once upon\na\ttime  ");
        assert_eq!(words, vec!["Once", "upon", "a", "time"]);
    }

    #[test]
    fn delay_threshold_is_six_characters() {
        assert_eq!(word_delay("castle"), SHORT_WORD_DELAY);
        assert_eq!(word_delay("dragons"), LONG_WORD_DELAY);
        // counted in characters, not bytes
        assert_eq!(word_delay("कहानी"), SHORT_WORD_DELAY);
    }

    #[test]
    fn visits_every_word_once_in_order() {
        let mut reader = ReadAlong::new("The brave explorer sailed away");
        let mut steps = Vec::new();
        while let Some(step) = reader.advance() {
            steps.push(step);
        }
        assert_eq!(reader.advance(), None);
        assert_eq!(
            steps,
            vec![
                (0, SHORT_WORD_DELAY),
                (1, SHORT_WORD_DELAY),
                (2, LONG_WORD_DELAY),
                (3, SHORT_WORD_DELAY),
                (4, SHORT_WORD_DELAY),
            ]
        );
    }

    #[test]
    fn empty_text_finishes_immediately() {
        let mut reader = ReadAlong::new("   ");
        assert!(reader.words().is_empty());
        assert!(reader.advance().is_none());
    }
}
