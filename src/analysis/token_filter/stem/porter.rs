//! Porter stemming algorithm implementation.
//!
//! This follows the Porter algorithm as extended by NLTK's default
//! `NLTK_EXTENSIONS` mode, so stems are identical to the ones produced by
//! `nltk.stem.PorterStemmer().stem(word)`:
//!
//! - a small table of irregular forms (`skies` → `sky`, `dying` → `die`, ...)
//! - words of one or two letters are returned untouched
//! - `ies`/`ied` on four letter words become `ie`
//! - step 1c turns `y` into `i` only after a consonant
//! - step 2 handles `alli` first and adds the `fulli` and `logi` rules
//!
//! # Examples
//!
//! ```
//! use tastebud::analysis::token_filter::stem::Stemmer;
//! use tastebud::analysis::token_filter::stem::porter::PorterStemmer;
//!
//! let stemmer = PorterStemmer::new();
//!
//! assert_eq!(stemmer.stem("running"), "run");
//! assert_eq!(stemmer.stem("flies"), "fli");
//! assert_eq!(stemmer.stem("generously"), "gener");
//! ```

use crate::analysis::token_filter::stem::Stemmer;

type Condition<'a> = &'a dyn Fn(&[char]) -> bool;

/// A suffix rule: `(suffix, replacement, condition on the remaining stem)`.
type Rule<'a> = (&'static str, &'static str, Option<Condition<'a>>);

/// Porter stemmer in NLTK extension mode.
///
/// The stemmer is stateless; one instance can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

fn irregular_form(word: &str) -> Option<&'static str> {
    let base = match word {
        "sky" | "skies" => "sky",
        "dying" => "die",
        "lying" => "lie",
        "tying" => "tie",
        "news" => "news",
        "innings" | "inning" => "inning",
        "outings" | "outing" => "outing",
        "cannings" | "canning" => "canning",
        "howe" => "howe",
        "proceed" => "proceed",
        "exceed" => "exceed",
        "succeed" => "succeed",
        _ => return None,
    };
    Some(base)
}

fn is_consonant(word: &[char], i: usize) -> bool {
    match word[i] {
        'a' | 'e' | 'i' | 'o' | 'u' => false,
        'y' => i == 0 || !is_consonant(word, i - 1),
        _ => true,
    }
}

/// The measure `m` of a stem: the number of vowel-consonant sequences.
fn measure(stem: &[char]) -> usize {
    (1..stem.len())
        .filter(|&i| !is_consonant(stem, i - 1) && is_consonant(stem, i))
        .count()
}

fn has_positive_measure(stem: &[char]) -> bool {
    measure(stem) > 0
}

fn measure_gt_1(stem: &[char]) -> bool {
    measure(stem) > 1
}

fn contains_vowel(stem: &[char]) -> bool {
    (0..stem.len()).any(|i| !is_consonant(stem, i))
}

fn ends_double_consonant(word: &[char]) -> bool {
    let n = word.len();
    n >= 2 && word[n - 1] == word[n - 2] && is_consonant(word, n - 1)
}

/// `*o`: the stem ends consonant-vowel-consonant and the last letter is not
/// w, x or y. A two letter vowel-consonant word also qualifies.
fn ends_cvc(word: &[char]) -> bool {
    let n = word.len();
    (n >= 3
        && is_consonant(word, n - 3)
        && !is_consonant(word, n - 2)
        && is_consonant(word, n - 1)
        && !matches!(word[n - 1], 'w' | 'x' | 'y'))
        || (n == 2 && !is_consonant(word, 0) && is_consonant(word, 1))
}

fn ends_with(word: &[char], suffix: &str) -> bool {
    let suffix_len = suffix.chars().count();
    word.len() >= suffix_len && word[word.len() - suffix_len..].iter().copied().eq(suffix.chars())
}

fn strip<'w>(word: &'w [char], suffix: &str) -> &'w [char] {
    &word[..word.len() - suffix.chars().count()]
}

fn join(stem: &[char], replacement: &str) -> Vec<char> {
    let mut out = stem.to_vec();
    out.extend(replacement.chars());
    out
}

/// Apply the first rule whose suffix matches. A matching suffix ends the
/// search even when its condition fails.
fn apply_rule_list(word: Vec<char>, rules: &[Rule<'_>]) -> Vec<char> {
    for (suffix, replacement, condition) in rules {
        if ends_with(&word, suffix) {
            let stem = strip(&word, suffix);
            let applies = condition.is_none_or(|condition| condition(stem));
            return if applies { join(stem, replacement) } else { word };
        }
    }
    word
}

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }

    fn step1a(&self, word: Vec<char>) -> Vec<char> {
        if word.len() == 4 && ends_with(&word, "ies") {
            return join(strip(&word, "ies"), "ie");
        }
        apply_rule_list(
            word,
            &[
                ("sses", "ss", None),
                ("ies", "i", None),
                ("ss", "ss", None),
                ("s", "", None),
            ],
        )
    }

    fn step1b(&self, word: Vec<char>) -> Vec<char> {
        if ends_with(&word, "ied") {
            let replacement = if word.len() == 4 { "ie" } else { "i" };
            return join(strip(&word, "ied"), replacement);
        }

        if ends_with(&word, "eed") {
            let stem = strip(&word, "eed");
            return if measure(stem) > 0 {
                join(stem, "ee")
            } else {
                word
            };
        }

        let stem = match ["ed", "ing"]
            .iter()
            .find(|suffix| ends_with(&word, suffix) && contains_vowel(strip(&word, suffix)))
        {
            Some(suffix) => strip(&word, suffix).to_vec(),
            None => return word,
        };

        if ends_with(&stem, "at") {
            join(strip(&stem, "at"), "ate")
        } else if ends_with(&stem, "bl") {
            join(strip(&stem, "bl"), "ble")
        } else if ends_with(&stem, "iz") {
            join(strip(&stem, "iz"), "ize")
        } else if ends_double_consonant(&stem) {
            if matches!(stem.last(), Some('l' | 's' | 'z')) {
                stem
            } else {
                stem[..stem.len() - 1].to_vec()
            }
        } else if measure(&stem) == 1 && ends_cvc(&stem) {
            join(&stem, "e")
        } else {
            stem
        }
    }

    fn step1c(&self, word: Vec<char>) -> Vec<char> {
        let after_consonant: Condition<'_> =
            &|stem: &[char]| stem.len() > 1 && is_consonant(stem, stem.len() - 1);
        apply_rule_list(word, &[("y", "i", Some(after_consonant))])
    }

    fn step2(&self, word: Vec<char>) -> Vec<char> {
        if ends_with(&word, "alli") && has_positive_measure(strip(&word, "alli")) {
            return self.step2(join(strip(&word, "alli"), "al"));
        }

        let pm: Condition<'_> = &has_positive_measure;
        // the "l" of "logi" stays with the stem so short stems like "geo" qualify
        let logi_stem = word[..word.len().saturating_sub(3)].to_vec();
        let logi: Condition<'_> = &move |_: &[char]| has_positive_measure(&logi_stem);

        apply_rule_list(
            word,
            &[
                ("ational", "ate", Some(pm)),
                ("tional", "tion", Some(pm)),
                ("enci", "ence", Some(pm)),
                ("anci", "ance", Some(pm)),
                ("izer", "ize", Some(pm)),
                ("bli", "ble", Some(pm)),
                ("alli", "al", Some(pm)),
                ("entli", "ent", Some(pm)),
                ("eli", "e", Some(pm)),
                ("ousli", "ous", Some(pm)),
                ("ization", "ize", Some(pm)),
                ("ation", "ate", Some(pm)),
                ("ator", "ate", Some(pm)),
                ("alism", "al", Some(pm)),
                ("iveness", "ive", Some(pm)),
                ("fulness", "ful", Some(pm)),
                ("ousness", "ous", Some(pm)),
                ("aliti", "al", Some(pm)),
                ("iviti", "ive", Some(pm)),
                ("biliti", "ble", Some(pm)),
                ("fulli", "ful", Some(pm)),
                ("logi", "log", Some(logi)),
            ],
        )
    }

    fn step3(&self, word: Vec<char>) -> Vec<char> {
        let pm: Condition<'_> = &has_positive_measure;
        apply_rule_list(
            word,
            &[
                ("icate", "ic", Some(pm)),
                ("ative", "", Some(pm)),
                ("alize", "al", Some(pm)),
                ("iciti", "ic", Some(pm)),
                ("ical", "ic", Some(pm)),
                ("ful", "", Some(pm)),
                ("ness", "", Some(pm)),
            ],
        )
    }

    fn step4(&self, word: Vec<char>) -> Vec<char> {
        let gt1: Condition<'_> = &measure_gt_1;
        let ion: Condition<'_> =
            &|stem: &[char]| measure(stem) > 1 && matches!(stem.last(), Some('s' | 't'));
        apply_rule_list(
            word,
            &[
                ("al", "", Some(gt1)),
                ("ance", "", Some(gt1)),
                ("ence", "", Some(gt1)),
                ("er", "", Some(gt1)),
                ("ic", "", Some(gt1)),
                ("able", "", Some(gt1)),
                ("ible", "", Some(gt1)),
                ("ant", "", Some(gt1)),
                ("ement", "", Some(gt1)),
                ("ment", "", Some(gt1)),
                ("ent", "", Some(gt1)),
                ("ion", "", Some(ion)),
                ("ou", "", Some(gt1)),
                ("ism", "", Some(gt1)),
                ("ate", "", Some(gt1)),
                ("iti", "", Some(gt1)),
                ("ous", "", Some(gt1)),
                ("ive", "", Some(gt1)),
                ("ize", "", Some(gt1)),
            ],
        )
    }

    fn step5a(&self, word: Vec<char>) -> Vec<char> {
        if ends_with(&word, "e") {
            let stem = strip(&word, "e");
            let m = measure(stem);
            if m > 1 || (m == 1 && !ends_cvc(stem)) {
                return stem.to_vec();
            }
        }
        word
    }

    fn step5b(&self, word: Vec<char>) -> Vec<char> {
        let m_without_last = measure(&word[..word.len().saturating_sub(1)]);
        let condition: Condition<'_> = &move |_: &[char]| m_without_last > 1;
        apply_rule_list(word, &[("ll", "l", Some(condition))])
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let lowered = word.to_lowercase();
        if let Some(base) = irregular_form(&lowered) {
            return base.to_string();
        }

        let chars: Vec<char> = lowered.chars().collect();
        if chars.len() <= 2 {
            return lowered;
        }

        let chars = self.step1a(chars);
        let chars = self.step1b(chars);
        let chars = self.step1c(chars);
        let chars = self.step2(chars);
        let chars = self.step3(chars);
        let chars = self.step4(chars);
        let chars = self.step5a(chars);
        let chars = self.step5b(chars);
        chars.into_iter().collect()
    }

    fn name(&self) -> &'static str {
        "porter_nltk"
    }
}
