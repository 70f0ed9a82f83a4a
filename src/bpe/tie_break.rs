use std::cmp::Ordering;
use std::fmt::Display;

use rand::Rng;

use crate::tools::freq_count::PairCount;

/// How to choose between byte pairs with the same count when building a block dictionary.
/// The discriminant is the value persisted in the metadata sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TieBreak {
    /// Earliest first occurrence wins.
    FirstSeen = 0,
    LeftAscRightAsc = 1,
    LeftDescRightAsc = 2,
    LeftAscRightDesc = 3,
    LeftDescRightDesc = 4,
}

impl TieBreak {
    pub const ALL: [TieBreak; 5] = [
        TieBreak::FirstSeen,
        TieBreak::LeftAscRightAsc,
        TieBreak::LeftDescRightAsc,
        TieBreak::LeftAscRightDesc,
        TieBreak::LeftDescRightDesc,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Orders two pair counts so that the better candidate compares as `Less`.
    pub fn compare(self, a: &PairCount, b: &PairCount) -> Ordering {
        let (al, ar) = a.pair;
        let (bl, br) = b.pair;
        b.count.cmp(&a.count).then_with(|| match self {
            TieBreak::FirstSeen => a.first_seen.cmp(&b.first_seen),
            TieBreak::LeftAscRightAsc => al.cmp(&bl).then(ar.cmp(&br)),
            TieBreak::LeftDescRightAsc => bl.cmp(&al).then(ar.cmp(&br)),
            TieBreak::LeftAscRightDesc => al.cmp(&bl).then(br.cmp(&ar)),
            TieBreak::LeftDescRightDesc => bl.cmp(&al).then(br.cmp(&ar)),
        })
    }

    /// The pair this ordering would replace next.
    pub fn best(self, counts: &[PairCount]) -> Option<PairCount> {
        counts.iter().min_by(|a, b| self.compare(a, b)).copied()
    }

    /// Pick the ordering for a compression attempt. The first five attempts walk through the
    /// orderings in turn; later ones draw at random from a range that widens as attempts pile up.
    pub fn choose<R: Rng>(attempt: u32, rng: &mut R) -> Self {
        let value = match attempt {
            0..=1 => 0,
            2..=5 => attempt - 1,
            6..=30 => rng.gen_range(0..=1),
            31..=50 => rng.gen_range(0..=2),
            51..=70 => rng.gen_range(0..=3),
            _ => rng.gen_range(0..=4),
        };
        Self::ALL[value as usize]
    }
}

impl Display for TieBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn pc(l: u8, r: u8, count: u32, first_seen: u32) -> PairCount {
        PairCount {
            pair: (l, r),
            count,
            first_seen,
        }
    }

    #[test]
    fn best_test() {
        let counts = vec![
            pc(5, 1, 3, 0),
            pc(2, 9, 7, 1),
            pc(7, 3, 7, 2),
            pc(2, 4, 7, 4),
            pc(7, 8, 7, 6),
        ];
        let pick = |t: TieBreak| t.best(&counts).unwrap().pair;
        assert_eq!(pick(TieBreak::FirstSeen), (2, 9));
        assert_eq!(pick(TieBreak::LeftAscRightAsc), (2, 4));
        assert_eq!(pick(TieBreak::LeftDescRightAsc), (7, 3));
        assert_eq!(pick(TieBreak::LeftAscRightDesc), (2, 9));
        assert_eq!(pick(TieBreak::LeftDescRightDesc), (7, 8));
        assert_eq!(TieBreak::FirstSeen.best(&[]), None);
    }

    #[test]
    fn choose_test() {
        let mut rng = StdRng::seed_from_u64(7);
        let fixed: Vec<u8> = (0..=5)
            .map(|a| TieBreak::choose(a, &mut rng).as_u8())
            .collect();
        assert_eq!(fixed, vec![0, 0, 1, 2, 3, 4]);
        for attempt in 6..=30 {
            assert!(TieBreak::choose(attempt, &mut rng).as_u8() <= 1);
        }
        for attempt in 31..=50 {
            assert!(TieBreak::choose(attempt, &mut rng).as_u8() <= 2);
        }
        for attempt in 51..=70 {
            assert!(TieBreak::choose(attempt, &mut rng).as_u8() <= 3);
        }
    }

    #[test]
    fn from_u8_test() {
        assert_eq!(TieBreak::from_u8(3), Some(TieBreak::LeftAscRightDesc));
        assert_eq!(TieBreak::from_u8(5), None);
    }
}
