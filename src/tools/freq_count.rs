use rustc_hash::FxHashMap;

/// How often one adjacent byte pair occurs in a block, and where it first appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCount {
    pub pair: (u8, u8),
    pub count: u32,
    /// Index of the first occurrence, used as the "count only" tie-break.
    pub first_seen: u32,
}

/// Returns a frequency count of every adjacent byte pair in the data, overlapping pairs
/// included ("aaa" holds two "aa"). Pairs are returned in order of first appearance.
pub fn pair_freqs(data: &[u8]) -> Vec<PairCount> {
    let mut index: FxHashMap<(u8, u8), usize> = FxHashMap::default();
    let mut counts: Vec<PairCount> = Vec::new();
    for (i, w) in data.windows(2).enumerate() {
        let pair = (w[0], w[1]);
        match index.get(&pair) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(pair, counts.len());
                counts.push(PairCount {
                    pair,
                    count: 1,
                    first_seen: i as u32,
                });
            }
        }
    }
    counts
}

/// Returns a frequency count of the single bytes in the data.
pub fn freqs(data: &[u8]) -> [u32; 256] {
    let mut freqs = [0_u32; 256];
    data.iter().for_each(|&el| freqs[el as usize] += 1);
    freqs
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pair_freqs_test() {
        let counts = pair_freqs(b"abaaab");
        let pairs: Vec<((u8, u8), u32, u32)> = counts
            .iter()
            .map(|c| (c.pair, c.count, c.first_seen))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ((b'a', b'b'), 2, 0),
                ((b'b', b'a'), 1, 1),
                ((b'a', b'a'), 2, 2),
            ]
        );
    }

    #[test]
    fn short_input_test() {
        assert!(pair_freqs(b"").is_empty());
        assert!(pair_freqs(b"x").is_empty());
    }

    #[test]
    fn freqs_test() {
        let f = freqs(b"hello");
        assert_eq!(f[b'l' as usize], 2);
        assert_eq!(f[b'h' as usize], 1);
        assert_eq!(f.iter().sum::<u32>(), 5);
    }
}
