//! Random insults from weighted context-free grammars, one grammar per
//! [`Mood`].

use rand::{
    Rng,
    distr::{Distribution, weighted::WeightedIndex},
    seq::IndexedRandom,
};
use serde::Deserialize;
use std::collections::HashMap;

use super::announcer::Mood;

const EMBEDDED_WORDS: &str = include_str!("insults.json");

/// Productions already used on a derivation branch are weighted by
/// `CONVERGENCE ^ uses`.
const CONVERGENCE: f64 = 0.25;

/// Past this depth only productions made purely of terminals are picked,
/// when there are any.
const MAX_DEPTH: usize = 12;

const START: &str = "S";

/// What every grammar falls back to if it can't produce anything.
const FALLBACK_INSULT: &str = "You!";

#[derive(Debug, Deserialize)]
struct WordLists {
    mild_adjectives: Vec<String>,
    mild_simple_nouns: Vec<String>,
    mild_nouns: Vec<String>,
    adjectives: Vec<String>,
    nouns: Vec<String>,
    old_adjectives_one: Vec<String>,
    old_adjectives_two: Vec<String>,
    old_nouns: Vec<String>,
    savage_adjectives: Vec<String>,
    savage_nouns: Vec<String>,
}

/// A symbol expanded by sampling distinct words instead of by a production.
#[derive(Debug)]
struct Binding {
    words: Vec<String>,
    count: usize,
    separator: &'static str,
}

/// A context-free grammar with random, convergent derivation.
#[derive(Debug, Default)]
pub struct Grammar {
    productions: HashMap<String, Vec<Vec<String>>>,
    bindings: HashMap<String, Binding>,
}

impl Grammar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds alternatives for `lhs`. `rhs` holds alternatives separated by
    /// `|`; each alternative is a whitespace separated sequence of symbols.
    pub fn add_prod(&mut self, lhs: &str, rhs: &str) {
        let alternatives = self.productions.entry(lhs.to_string()).or_default();
        for alternative in rhs.split('|') {
            alternatives.push(alternative.split_whitespace().map(str::to_string).collect());
        }
    }

    fn add_words(&mut self, lhs: &str, words: &[String]) {
        self.add_prod(lhs, &words.join(" | "));
    }

    /// Expands the `_name` symbol to `count` distinct words joined by
    /// `separator`.
    fn bind(&mut self, name: &str, words: &[String], count: usize, separator: &'static str) {
        self.bindings.insert(
            name.to_string(),
            Binding {
                words: words.to_vec(),
                count,
                separator,
            },
        );
    }

    /// Derives a sentence from `symbol` with punctuation attached to the
    /// preceding word.
    pub fn generate<R: Rng + ?Sized>(&self, symbol: &str, rng: &mut R) -> String {
        let mut tokens = Vec::new();
        let mut used = HashMap::new();
        self.expand(symbol, rng, &mut used, &mut tokens, 0);
        join_tokens(&tokens)
    }

    fn expand<R: Rng + ?Sized>(
        &self,
        symbol: &str,
        rng: &mut R,
        used: &mut HashMap<(String, usize), i32>,
        tokens: &mut Vec<String>,
        depth: usize,
    ) {
        let Some(alternatives) = self.productions.get(symbol) else {
            return;
        };
        let Some(choice) = self.choose(symbol, alternatives, rng, used, depth) else {
            return;
        };

        let key = (symbol.to_string(), choice);
        *used.entry(key.clone()).or_insert(0) += 1;

        for sym in &alternatives[choice] {
            if self.productions.contains_key(sym) {
                self.expand(sym, rng, used, tokens, depth + 1);
            } else if let Some(binding) = sym
                .strip_prefix('_')
                .and_then(|name| self.bindings.get(name))
            {
                let words: Vec<&str> = binding
                    .words
                    .choose_multiple(rng, binding.count)
                    .map(String::as_str)
                    .collect();
                tokens.push(words.join(binding.separator));
            } else {
                tokens.push(sym.clone());
            }
        }

        // Roll back so sibling branches start from the parent's counts.
        if let Some(count) = used.get_mut(&key) {
            *count -= 1;
        }
    }

    fn choose<R: Rng + ?Sized>(
        &self,
        symbol: &str,
        alternatives: &[Vec<String>],
        rng: &mut R,
        used: &HashMap<(String, usize), i32>,
        depth: usize,
    ) -> Option<usize> {
        let terminal_only = |alternative: &Vec<String>| {
            alternative
                .iter()
                .all(|sym| !self.productions.contains_key(sym))
        };
        let restrict = depth >= MAX_DEPTH && alternatives.iter().any(terminal_only);

        let weights: Vec<f64> = alternatives
            .iter()
            .enumerate()
            .map(|(idx, alternative)| {
                if restrict && !terminal_only(alternative) {
                    return 0.0;
                }
                let uses = used.get(&(symbol.to_string(), idx)).copied().unwrap_or(0);
                CONVERGENCE.powi(uses)
            })
            .collect();

        let distribution = WeightedIndex::new(&weights).ok()?;
        Some(distribution.sample(rng))
    }
}

fn join_tokens(tokens: &[String]) -> String {
    let mut sentence = String::new();
    for token in tokens.iter().filter(|token| !token.is_empty()) {
        let attaches = token.starts_with(['?', ',', '.', '!', '"']);
        if !sentence.is_empty() && !attaches {
            sentence.push(' ');
        }
        sentence.push_str(token);
    }
    sentence.trim().to_string()
}

/// Produces an insult fitting the announcer's mood.
#[derive(Debug)]
pub struct Insulter {
    grammars: HashMap<Mood, Grammar>,
}

impl Default for Insulter {
    fn default() -> Self {
        Self::from_json(EMBEDDED_WORDS).unwrap_or_else(|e| {
            log::error!("Failed to load embedded insult words: {e}");
            Self {
                grammars: HashMap::new(),
            }
        })
    }
}

impl Insulter {
    /// Builds every mood's grammar from a JSON document of word lists.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let words: WordLists = serde_json::from_str(json)?;
        let mut grammars = HashMap::new();

        let mut mild = Grammar::new();
        mild.add_prod(START, "INTRO INSULT END");
        mild.add_prod("INTRO", "Oh, you | You");
        mild.add_prod("INSULT", "ADJ SIMPLE_NOUN | NOUN");
        mild.add_prod("END", ". | !");
        mild.add_words("ADJ", &words.mild_adjectives);
        mild.add_words("SIMPLE_NOUN", &words.mild_simple_nouns);
        mild.add_words("NOUN", &words.mild_nouns);
        grammars.insert(Mood::Mild, mild);

        let mut normal = Grammar::new();
        normal.add_prod(START, "INTRO ADJ NOUN END | INTRO NOUN END");
        normal.add_prod("INTRO", "You | What a | You're such a");
        normal.add_prod("ADJ", &format!("ADJ , ADJ | {}", words.adjectives.join(" | ")));
        normal.add_prod("END", ". | !");
        normal.add_words("NOUN", &words.nouns);
        grammars.insert(Mood::Normal, normal);

        let mut harsh = Grammar::new();
        harsh.add_prod(START, "INTRO ADJ1 , ADJ2 NOUN END");
        harsh.add_prod("INTRO", "Oh, you | You");
        harsh.add_prod("END", ". | !");
        harsh.add_words("ADJ1", &words.old_adjectives_one);
        harsh.add_words("ADJ2", &words.old_adjectives_two);
        harsh.add_words("NOUN", &words.old_nouns);
        grammars.insert(Mood::Harsh, harsh);

        let mut savage = Grammar::new();
        savage.add_prod(START, "EXCLAMATION | INSULT END");
        savage.add_prod("INSULT", "INTRO _PAIR NOUN");
        savage.add_prod("INTRO", "Oh, you | You");
        savage.add_prod(
            "EXCLAMATION",
            "I ACTION , you ADJECTIVE NOUN END | ORDER , you ADJECTIVE NOUN END",
        );
        savage.add_prod(
            "ORDER",
            "Go and boil your bottoms | Cut your prancing or I shall taunt you a second time",
        );
        savage.add_prod(
            "ACTION",
            "blow my nose at you | wave my arms in your general direction | \
             throw a cow at you | taunt you a second time",
        );
        savage.add_prod("END", ". | !");
        savage.add_words("ADJECTIVE", &words.savage_adjectives);
        savage.add_words("NOUN", &words.savage_nouns);
        savage.bind("PAIR", &words.adjectives, 2, ", ");
        grammars.insert(Mood::Savage, savage);

        Ok(Self { grammars })
    }

    /// A random insult for `mood`.
    pub fn get_insult(&self, mood: Mood) -> String {
        self.get_insult_with(mood, &mut rand::rng())
    }

    pub fn get_insult_with<R: Rng + ?Sized>(&self, mood: Mood, rng: &mut R) -> String {
        let grammar = self
            .grammars
            .get(&mood)
            .or_else(|| self.grammars.get(&Mood::Normal));
        match grammar.map(|grammar| grammar.generate(START, rng)) {
            Some(insult) if !insult.is_empty() => insult,
            _ => FALLBACK_INSULT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_every_mood_produces_text() {
        let insulter = Insulter::default();
        let mut rng = StdRng::seed_from_u64(7);
        for mood in [Mood::Mild, Mood::Normal, Mood::Harsh, Mood::Savage] {
            for _ in 0..50 {
                let insult = insulter.get_insult_with(mood, &mut rng);
                assert!(!insult.is_empty());
                assert_ne!(insult, FALLBACK_INSULT);
                assert!(!insult.contains(" ,"), "{insult}");
                assert!(!insult.contains(" ."), "{insult}");
            }
        }
    }

    #[test]
    fn test_nonterminals_never_leak() {
        let insulter = Insulter::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let insult = insulter.get_insult_with(Mood::Normal, &mut rng);
            assert!(!insult.contains("ADJ"), "{insult}");
            assert!(!insult.contains("NOUN"), "{insult}");
        }
    }

    #[test]
    fn test_recursive_production_terminates() {
        let mut grammar = Grammar::new();
        grammar.add_prod("S", "A");
        grammar.add_prod("A", "A , A | x");
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let sentence = grammar.generate("S", &mut rng);
            assert!(sentence.starts_with('x'), "{sentence}");
        }
    }

    #[test]
    fn test_binding_samples_distinct_words() {
        let mut grammar = Grammar::new();
        grammar.add_prod("S", "_PAIR");
        let words = vec!["a".to_string(), "b".to_string()];
        grammar.bind("PAIR", &words, 2, ", ");
        let mut rng = StdRng::seed_from_u64(5);
        let sentence = grammar.generate("S", &mut rng);
        assert!(sentence == "a, b" || sentence == "b, a", "{sentence}");
    }

    #[test]
    fn test_punctuation_attaches() {
        let tokens: Vec<String> = ["You", "clown", "!"].iter().map(|s| s.to_string()).collect();
        assert_eq!(join_tokens(&tokens), "You clown!");
    }

    #[test]
    fn test_bad_word_lists_fail_to_load() {
        assert!(Insulter::from_json("{}").is_err());
    }

    #[test]
    fn test_empty_insulter_falls_back() {
        let insulter = Insulter {
            grammars: HashMap::new(),
        };
        assert_eq!(insulter.get_insult(Mood::Savage), FALLBACK_INSULT);
    }
}
