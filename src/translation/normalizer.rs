/*!
 * Cleanup of raw model output.
 *
 * Two passes are applied in order:
 * - a line filter dropping blank lines and residual instruction text,
 *   keeping the remaining lines untouched
 * - a repetition collapse for stuck decoding loops
 *
 * Both are surface heuristics. A legitimate line starting with "Use " is
 * dropped, and a phrase the author really meant to repeat back to back is
 * collapsed.
 */

use log::debug;

/// Leading markers of list lines
pub const BULLET_MARKERS: [char; 4] = ['-', '\u{2013}', '\u{2022}', '*'];

/// Case-insensitive prefixes of instruction residue lines
pub const INSTRUCTION_PREFIXES: [&str; 2] = ["text:", "use "];

/// A single word repeated at least this many times in a row is collapsed
pub const MIN_WORD_RUN: usize = 3;

/// Shortest phrase (in words) considered by the phrase collapse
pub const MIN_PHRASE_WORDS: usize = 2;

/// Output normalizer
pub struct OutputNormalizer;

impl OutputNormalizer {
    /// Full normalization: line filter, then repetition collapse
    pub fn normalize(raw: &str) -> String {
        let filtered = Self::filter_lines(raw);
        Self::collapse_repetitions(&filtered)
    }

    /// Drop blank lines and instruction residue, keeping surviving lines as they are
    ///
    /// Lines are trimmed only to classify them. Falls back to the trimmed raw
    /// text when nothing survives.
    pub fn filter_lines(raw: &str) -> String {
        let kept: Vec<&str> = raw
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty() && !Self::is_residue(trimmed)
            })
            .collect();

        if kept.is_empty() {
            debug!("Line filter removed everything, keeping raw response");
            return raw.trim().to_string();
        }

        kept.join("\n").trim().to_string()
    }

    fn is_residue(line: &str) -> bool {
        if line.starts_with(BULLET_MARKERS) {
            return true;
        }
        let lowered = line.to_lowercase();
        INSTRUCTION_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix))
    }

    /// Collapse stuck repetitions, line by line
    ///
    /// "abc abc abc xyz" becomes "abc xyz" and "red fox red fox jumps" becomes
    /// "red fox jumps". A word repeated only twice is left alone. Lines without
    /// any collapse keep their exact spacing.
    pub fn collapse_repetitions(text: &str) -> String {
        text.trim()
            .lines()
            .map(Self::collapse_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn collapse_line(line: &str) -> String {
        let words: Vec<&str> = line.split_whitespace().collect();

        let (words, words_changed) = collapse_word_runs(&words);
        let (words, phrases_changed) = collapse_phrase_repeats(&words);

        if words_changed || phrases_changed {
            words.join(" ")
        } else {
            line.to_string()
        }
    }
}

fn collapse_word_runs<'a>(words: &[&'a str]) -> (Vec<&'a str>, bool) {
    let mut out = Vec::with_capacity(words.len());
    let mut changed = false;
    let mut i = 0;

    while i < words.len() {
        let mut run = 1;
        while i + run < words.len() && words[i + run] == words[i] {
            run += 1;
        }
        if run >= MIN_WORD_RUN {
            out.push(words[i]);
            changed = true;
        } else {
            out.extend_from_slice(&words[i..i + run]);
        }
        i += run;
    }

    (out, changed)
}

fn collapse_phrase_repeats<'a>(words: &[&'a str]) -> (Vec<&'a str>, bool) {
    let mut out = Vec::with_capacity(words.len());
    let mut changed = false;
    let mut i = 0;

    'walk: while i < words.len() {
        let remaining = words.len() - i;
        for n in MIN_PHRASE_WORDS..=remaining / 2 {
            let phrase = &words[i..i + n];
            if &words[i + n..i + 2 * n] != phrase {
                continue;
            }
            let mut end = i + 2 * n;
            while end + n <= words.len() && &words[end..end + n] == phrase {
                end += n;
            }
            out.extend_from_slice(phrase);
            changed = true;
            i = end;
            continue 'walk;
        }
        out.push(words[i]);
        i += 1;
    }

    (out, changed)
}
