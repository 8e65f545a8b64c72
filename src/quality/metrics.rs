/*!
 * Corpus-level overlap metrics.
 *
 * - BLEU: word n-gram precision (orders 1-4) over 13a-tokenized text, with
 *   exponential smoothing and a brevity penalty
 * - chrF: character n-gram F-score (orders 1-6, beta 2), whitespace ignored
 *
 * Both follow the sacreBLEU defaults so scores are comparable with numbers
 * produced by that tool. Candidates and references are paired by index; the
 * caller is responsible for alignment.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::hash::Hash;

/// Highest word n-gram order for BLEU
pub const BLEU_MAX_ORDER: usize = 4;

/// Highest character n-gram order for chrF
pub const CHRF_CHAR_ORDER: usize = 6;

/// Recall weight for chrF
pub const CHRF_BETA: f64 = 2.0;

static TOKENIZE_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // Punctuation and symbols
        (Regex::new(r"([\{-~\[-` -&\(-\+:-@/])").unwrap(), " ${1} "),
        // Period and comma unless preceded by a digit
        (Regex::new(r"([^0-9])([\.,])").unwrap(), "${1} ${2} "),
        // Period and comma unless followed by a digit
        (Regex::new(r"([\.,])([^0-9])").unwrap(), " ${1} ${2}"),
        // Dash preceded by a digit
        (Regex::new(r"([0-9])(-)").unwrap(), "${1} ${2} "),
    ]
});

/// Tokenize a line the way the mteval-v13a script does
pub fn tokenize_13a(line: &str) -> String {
    let mut text = line.replace("<skipped>", "").replace("-\n", "").replace('\n', " ");
    if text.contains('&') {
        text = text
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    let mut text = format!(" {} ", text);
    for (pattern, replacement) in TOKENIZE_RULES.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn count_ngrams<T: Eq + Hash + Clone>(units: &[T], n: usize) -> HashMap<Vec<T>, usize> {
    let mut counts = HashMap::new();
    if n == 0 || units.len() < n {
        return counts;
    }
    for window in units.windows(n) {
        *counts.entry(window.to_vec()).or_insert(0) += 1;
    }
    counts
}

/// Clipped matches between two n-gram count tables
fn clipped_matches<T: Eq + Hash>(hyp: &HashMap<T, usize>, reference: &HashMap<T, usize>) -> usize {
    hyp.iter()
        .filter_map(|(gram, count)| reference.get(gram).map(|r| (*count).min(*r)))
        .sum()
}

/// Sufficient statistics for corpus BLEU
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BleuStats {
    pub matches: [usize; BLEU_MAX_ORDER],
    pub totals: [usize; BLEU_MAX_ORDER],
    pub sys_len: usize,
    pub ref_len: usize,
}

impl BleuStats {
    /// Accumulate one candidate/reference pair
    pub fn add(&mut self, candidate: &str, reference: &str) {
        let hyp_tokenized = tokenize_13a(candidate);
        let ref_tokenized = tokenize_13a(reference);
        let hyp: Vec<&str> = hyp_tokenized.split_whitespace().collect();
        let refs: Vec<&str> = ref_tokenized.split_whitespace().collect();

        self.sys_len += hyp.len();
        self.ref_len += refs.len();

        for n in 1..=BLEU_MAX_ORDER {
            let hyp_counts = count_ngrams(&hyp, n);
            let ref_counts = count_ngrams(&refs, n);
            self.matches[n - 1] += clipped_matches(&hyp_counts, &ref_counts);
            self.totals[n - 1] += hyp.len().saturating_sub(n - 1);
        }
    }

    /// BLEU score in [0, 100]
    pub fn score(&self) -> f64 {
        if self.matches.iter().all(|m| *m == 0) {
            return 0.0;
        }

        let mut smooth = 1.0;
        let mut log_sum = 0.0;
        for n in 0..BLEU_MAX_ORDER {
            // No n-grams of this order at all: the geometric mean collapses to zero
            if self.totals[n] == 0 {
                return 0.0;
            }
            let precision = if self.matches[n] == 0 {
                smooth *= 2.0;
                100.0 / (smooth * self.totals[n] as f64)
            } else {
                100.0 * self.matches[n] as f64 / self.totals[n] as f64
            };
            log_sum += precision.ln();
        }

        self.brevity_penalty() * (log_sum / BLEU_MAX_ORDER as f64).exp()
    }

    fn brevity_penalty(&self) -> f64 {
        if self.sys_len >= self.ref_len {
            1.0
        } else if self.sys_len == 0 {
            0.0
        } else {
            (1.0 - self.ref_len as f64 / self.sys_len as f64).exp()
        }
    }
}

/// Corpus BLEU over index-aligned candidates and references
pub fn corpus_bleu<C: AsRef<str>, R: AsRef<str>>(candidates: &[C], references: &[R]) -> f64 {
    let mut stats = BleuStats::default();
    for (candidate, reference) in candidates.iter().zip(references) {
        stats.add(candidate.as_ref(), reference.as_ref());
    }
    stats.score()
}

/// Sufficient statistics for corpus chrF: (hyp n-grams, ref n-grams, matches) per order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChrfStats {
    pub orders: [(usize, usize, usize); CHRF_CHAR_ORDER],
}

impl ChrfStats {
    /// Accumulate one candidate/reference pair
    pub fn add(&mut self, candidate: &str, reference: &str) {
        let hyp: Vec<char> = candidate.chars().filter(|c| !c.is_whitespace()).collect();
        let refs: Vec<char> = reference.chars().filter(|c| !c.is_whitespace()).collect();

        for n in 1..=CHRF_CHAR_ORDER {
            let hyp_counts = count_ngrams(&hyp, n);
            let ref_counts = count_ngrams(&refs, n);
            let entry = &mut self.orders[n - 1];
            entry.0 += hyp_counts.values().sum::<usize>();
            entry.1 += ref_counts.values().sum::<usize>();
            entry.2 += clipped_matches(&hyp_counts, &ref_counts);
        }
    }

    /// chrF score in [0, 100]
    pub fn score(&self) -> f64 {
        const EPS: f64 = 1e-16;
        let factor = CHRF_BETA * CHRF_BETA;

        let mut effective_order = 0usize;
        let mut avg_prec = 0.0;
        let mut avg_rec = 0.0;

        for &(n_hyp, n_ref, n_match) in &self.orders {
            avg_prec += if n_hyp > 0 { n_match as f64 / n_hyp as f64 } else { EPS };
            avg_rec += if n_ref > 0 { n_match as f64 / n_ref as f64 } else { EPS };
            if n_hyp > 0 && n_ref > 0 {
                effective_order += 1;
            }
        }

        if effective_order == 0 {
            return 0.0;
        }
        avg_prec /= effective_order as f64;
        avg_rec /= effective_order as f64;

        if avg_prec + avg_rec == 0.0 {
            return 0.0;
        }
        100.0 * (1.0 + factor) * avg_prec * avg_rec / (factor * avg_prec + avg_rec)
    }
}

/// Corpus chrF over index-aligned candidates and references
pub fn corpus_chrf<C: AsRef<str>, R: AsRef<str>>(candidates: &[C], references: &[R]) -> f64 {
    let mut stats = ChrfStats::default();
    for (candidate, reference) in candidates.iter().zip(references) {
        stats.add(candidate.as_ref(), reference.as_ref());
    }
    stats.score()
}
