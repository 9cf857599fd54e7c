//! Text analysis for the TF-IDF vocabulary: lowercase, split on anything that
//! is not a word character, drop one-character tokens and English stop words.

use std::collections::HashSet;
use std::sync::OnceLock;

const STOP_WORDS: &[&str] = &[
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
	"i","me","my","we","our","you","your","she","her","him","his","were","been","being","am","into","about","over","under","again","all","any","both","each","few","more","most","other","some","such","no","nor","only","own","same","too","very","just","also",
];

fn stop_words() -> &'static HashSet<&'static str> {
	static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
	SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

pub fn is_stop_word(token: &str) -> bool {
	stop_words().contains(token)
}

/// Analyze `text` into vocabulary terms, in order of appearance.
pub fn analyze(text: &str) -> Vec<String> {
	text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
		.filter(|t| t.chars().nth(1).is_some())
		.map(str::to_lowercase)
		.filter(|t| !is_stop_word(t))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lowercases_and_drops_short_tokens() {
		assert_eq!(analyze("Fire-starting: a 2 step GUIDE"), vec!["fire", "starting", "step", "guide"]);
	}

	#[test]
	fn drops_stop_words() {
		assert!(analyze("The and of it").is_empty());
		assert!(is_stop_word("the"));
		assert!(!is_stop_word("flint"));
	}

	#[test]
	fn keeps_unicode_words() {
		assert_eq!(analyze("café Über"), vec!["café", "über"]);
	}
}
