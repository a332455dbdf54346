use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::playlist::ChannelEntry;

/// Upper bound on candidates offered per repair round. Keeps the pick list
/// readable when the donor pool has thousands of channels.
pub const MAX_CANDIDATES: usize = 15;

/// Ratcliff/Obershelp similarity between two strings in [0.0, 1.0]:
/// twice the total size of the matching blocks over the combined length.
/// Case-sensitive; callers wanting looser matching normalize first.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let matched = matching_total(&a, &b, 0, a.len(), 0, b.len());
    2.0 * matched as f64 / (a.len() + b.len()) as f64
}

/// Total length of all matching blocks: take the longest common block,
/// then recurse on the pieces to its left and right.
fn matching_total(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> usize {
    let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
    if k == 0 {
        return 0;
    }
    k + matching_total(a, b, alo, i, blo, j) + matching_total(a, b, i + k, ahi, j + k, bhi)
}

/// Longest block of equal elements within a[alo..ahi] and b[blo..bhi],
/// earliest in `a` then earliest in `b` among equals. Row-by-row run
/// lengths keyed by position in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut besti, mut bestj, mut bestk) = (alo, blo, 0usize);
    let mut runs: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
        let mut new_runs: HashMap<usize, usize> = HashMap::new();
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let k = if j > blo {
                runs.get(&(j - 1)).copied().unwrap_or(0) + 1
            } else {
                1
            };
            new_runs.insert(j, k);
            if k > bestk {
                besti = i + 1 - k;
                bestj = j + 1 - k;
                bestk = k;
            }
        }
        runs = new_runs;
    }
    (besti, bestj, bestk)
}

// Noise commonly found in channel names: bracketed tags, quality suffixes,
// Spanish locale markers. Applied after lowercasing.
static NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[.*?\]|\(.*?\)|fhd|uhd|hd|4k|sd|\+|plus|españa|esp|es")
        .expect("noise regex is valid")
});
static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("spaces regex is valid"));

/// Strip resolution/locale noise from a channel name for looser matching.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = NOISE_RE.replace_all(&lowered, "");
    SPACES_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Ranks donor-pool candidates against a failed entry by name similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    /// Run names through `normalize_name` before scoring. Off by default;
    /// scoring is case-sensitive on the raw names unless enabled.
    pub normalize: bool,
}

impl Ranker {
    pub fn new(normalize: bool) -> Self {
        Self { normalize }
    }

    /// Pool indices of the best matches for `target`, most similar first,
    /// ties broken by pool order, capped to `MAX_CANDIDATES`. Indices in
    /// `excluded` are never returned.
    pub fn rank(
        &self,
        target: &ChannelEntry,
        pool: &[ChannelEntry],
        excluded: &HashSet<usize>,
    ) -> Vec<usize> {
        let wanted = self.key(&target.name);
        let mut scored: Vec<(usize, f64)> = pool
            .iter()
            .enumerate()
            .filter(|(i, _)| !excluded.contains(i))
            .map(|(i, candidate)| (i, similarity(&wanted, &self.key(&candidate.name))))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(MAX_CANDIDATES);
        scored.into_iter().map(|(i, _)| i).collect()
    }

    fn key(&self, name: &str) -> String {
        if self.normalize {
            normalize_name(name)
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::parse;

    fn entry(name: &str) -> ChannelEntry {
        let text = format!("#EXTINF:-1,{}\nhttp://example.com/x.ts\n", name);
        parse(&text).remove(0)
    }

    #[test]
    fn test_similarity_identical() {
        assert_eq!(similarity("Channel A", "Channel A"), 1.0);
    }

    #[test]
    fn test_similarity_disjoint() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_similarity_known_ratio() {
        // one matching block "bcd": 2 * 3 / 8
        let r = similarity("abcd", "bcde");
        assert!((r - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_case_sensitive() {
        assert!(similarity("CNN", "cnn") < 1.0);
    }

    #[test]
    fn test_normalize_strips_noise() {
        assert_eq!(normalize_name("Canal Sur HD [ES] (backup)"), "canal sur");
        // the "es" token is stripped wherever it occurs, "movies" included
        assert_eq!(normalize_name("Movies 4K FHD"), "movi");
    }

    #[test]
    fn test_rank_orders_by_similarity() {
        let target = entry("Channel A");
        let pool = vec![entry("Totally Different"), entry("Channel A HD"), entry("Channel A")];
        let ranked = Ranker::default().rank(&target, &pool, &HashSet::new());
        assert_eq!(ranked[0], 2);
        assert_eq!(ranked[1], 1);
        assert_eq!(ranked[2], 0);
    }

    #[test]
    fn test_rank_skips_excluded() {
        let target = entry("Channel A");
        let pool = vec![entry("Channel A"), entry("Channel A HD")];
        let excluded: HashSet<usize> = [0].into();
        let ranked = Ranker::default().rank(&target, &pool, &excluded);
        assert_eq!(ranked, vec![1]);
    }

    #[test]
    fn test_rank_caps_results() {
        let target = entry("News");
        let pool: Vec<ChannelEntry> = (0..40).map(|i| entry(&format!("News {}", i))).collect();
        let ranked = Ranker::default().rank(&target, &pool, &HashSet::new());
        assert_eq!(ranked.len(), MAX_CANDIDATES);
    }

    #[test]
    fn test_rank_tie_break_is_pool_order() {
        let target = entry("ABC");
        let pool = vec![entry("ABC 1"), entry("ABC 2"), entry("ABC 3")];
        let ranked = Ranker::default().rank(&target, &pool, &HashSet::new());
        assert_eq!(ranked, vec![0, 1, 2]);
    }

    #[test]
    fn test_rank_normalized_prefers_denoised_match() {
        let target = entry("TVE la 1");
        let pool = vec![entry("random sports feed"), entry("TVE LA 1 FHD [ESPAÑA]")];
        let raw = Ranker::new(false).rank(&target, &pool, &HashSet::new());
        let norm = Ranker::new(true).rank(&target, &pool, &HashSet::new());
        assert_eq!(norm[0], 1);
        // normalization is what makes the uppercase variant a near-exact match
        assert_eq!(raw.len(), 2);
    }
}
