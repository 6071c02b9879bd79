pub mod readalong;

use std::sync::OnceLock;

use regex::Regex;

/// Mixed-script names the story generator likes to emit in Hindi stories.
const HINDI_NAMES: &[(&str, &str)] = &[
    ("गOTHAM", "गोथम"),
    ("BATMAN", "बैटमैन"),
    ("JOKER", "जोकर"),
];

struct Patterns {
    markers: Regex,
    /// Runs of ASCII word characters. Boundaries are ASCII-only, so a caps
    /// run glued to Devanagari still counts as a word of its own.
    ascii_words: Regex,
    spaces: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            markers: Regex::new(r"\{[^}]*\}")?,
            ascii_words: Regex::new(r"[A-Za-z0-9_]+")?,
            spaces: Regex::new(r"\s+")?,
        })
    }
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| match Patterns::compile() {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::error!("Failed to compile speech cleaning patterns: {}", e);
                None
            }
        })
        .as_ref()
}

/// Prepare story text for a speech engine.
///
/// Removes `{...}` language markers. Hindi text additionally gets the name
/// transliterations, loses any leftover ALL-CAPS words and has its whitespace
/// collapsed. Never fails: if cleaning cannot run, the input comes back as is.
pub fn clean_for_speech(text: &str, language: &str) -> String {
    match try_clean(text, language) {
        Some(cleaned) => {
            tracing::debug!("Cleaned text for speech ({} -> {} bytes)", text.len(), cleaned.len());
            cleaned
        }
        None => {
            tracing::warn!("Speech text cleaning unavailable, using original text");
            text.to_string()
        }
    }
}

fn try_clean(text: &str, language: &str) -> Option<String> {
    let patterns = patterns()?;

    let mut cleaned = patterns.markers.replace_all(text, "").into_owned();

    if language == "hi" {
        for (mixed, native) in HINDI_NAMES {
            cleaned = cleaned.replace(mixed, native);
        }
        cleaned = patterns
            .ascii_words
            .replace_all(&cleaned, |caps: &regex::Captures| {
                let word = &caps[0];
                if is_shouting(word) {
                    String::new()
                } else {
                    word.to_string()
                }
            })
            .into_owned();
        cleaned = patterns.spaces.replace_all(&cleaned, " ").trim().to_string();
    }

    Some(cleaned)
}

fn is_shouting(word: &str) -> bool {
    word.len() >= 2 && word.bytes().all(|b| b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_language_markers() {
        let cleaned = clean_for_speech("Once {en} upon a {lang:fr}time", "en");
        assert_eq!(cleaned, "Once  upon a time");
    }

    #[test]
    fn hindi_names_are_transliterated() {
        let cleaned = clean_for_speech("BATMAN went to गOTHAM", "hi");
        assert_eq!(cleaned, "बैटमैन went to गोथम");
    }

    #[test]
    fn hindi_drops_leftover_capitals_and_collapses_spaces() {
        let cleaned = clean_for_speech("  JOKER और  ROBIN   {hi} मिले OK ", "hi");
        assert_eq!(cleaned, "जोकर और मिले");
    }

    #[test]
    fn hindi_drops_capitals_glued_to_devanagari() {
        let cleaned = clean_for_speech("रावणKING आया और जOKER भी", "hi");
        assert_eq!(cleaned, "रावण आया और ज भी");
    }

    #[test]
    fn hindi_keeps_mixed_case_and_digit_words() {
        let cleaned = clean_for_speech("Raju और R2D2 और ROBOT", "hi");
        assert_eq!(cleaned, "Raju और R2D2 और");
    }

    #[test]
    fn single_capital_letters_survive_in_hindi() {
        let cleaned = clean_for_speech("A राजा", "hi");
        assert_eq!(cleaned, "A राजा");
    }

    #[test]
    fn capitals_are_kept_outside_hindi() {
        let cleaned = clean_for_speech("The BIG bad wolf", "en");
        assert_eq!(cleaned, "The BIG bad wolf");
    }

    #[test]
    fn cleaning_is_idempotent_for_other_languages() {
        let inputs = [
            "A {x} story {y",
            "{{nested}} braces}",
            "plain text   with   gaps",
            "",
            "}{}{",
        ];
        for lang in ["en", "es", "fr", "ja"] {
            for input in inputs {
                let once = clean_for_speech(input, lang);
                let twice = clean_for_speech(&once, lang);
                assert_eq!(once, twice, "not idempotent for {:?} in {}", input, lang);
            }
        }
    }
}
