use log::warn;

/// Turn user selections into a sorted list of subfile numbers.
///
/// Accepts `*` (every subfile, 1..=count), `n`, and inclusive ranges `a-b`. `^` marks a
/// reference to a parent file and is ignored, as is anything unparsable (with a warning).
/// Subfile 0 is the table itself and is only ever included explicitly. An empty selection
/// means `*`. Ranges stop at `count`; a single number past it is kept so the caller can
/// report it.
pub fn parse_selection<S: AsRef<str>>(items: &[S], count: usize) -> Vec<usize> {
    if items.is_empty() {
        return (1..=count).collect();
    }
    let mut nums: Vec<usize> = Vec::new();
    for item in items {
        let item = item.as_ref().trim();
        if item == "^" {
            continue;
        }
        if item == "*" {
            nums.extend(1..=count);
            continue;
        }
        match parse_range(item) {
            Some((start, end)) if start == end => nums.push(start),
            Some((start, end)) => {
                if end > count {
                    warn!(
                        "'{}' runs past the last subfile ({}). Stopping there.",
                        item, count
                    );
                }
                nums.extend(start..=end.min(count));
            }
            None => warn!(
                "'{}' not a positive int or range (e.g. 0-5). Skipping argument.",
                item
            ),
        }
    }
    nums.sort_unstable();
    nums.dedup();
    nums
}

/// True when the selection asks for everything.
pub fn selects_all<S: AsRef<str>>(items: &[S]) -> bool {
    items.is_empty() || items[0].as_ref().trim() == "*"
}

fn parse_range(item: &str) -> Option<(usize, usize)> {
    match item.split_once('-') {
        Some((start, end)) => Some((start.parse().ok()?, end.parse().ok()?)),
        None => item.parse().ok().map(|n| (n, n)),
    }
}

#[test]
fn selection_test() {
    assert_eq!(parse_selection(&["3", "1-2", "2"], 10), vec![1, 2, 3]);
    assert_eq!(parse_selection(&["*"], 3), vec![1, 2, 3]);
    assert_eq!(parse_selection(&["0", "^"], 3), vec![0]);
    assert_eq!(parse_selection(&["x", "4-b", "7"], 3), vec![7]);
    assert!(parse_selection(&["5-2"], 9).is_empty());
    assert_eq!(parse_selection::<&str>(&[], 2), vec![1, 2]);
}

#[test]
fn selection_range_clamp_test() {
    assert_eq!(parse_selection(&["1-4000000000"], 3), vec![1, 2, 3]);
    assert_eq!(parse_selection(&["2-9", "0"], 3), vec![0, 2, 3]);
    assert!(parse_selection(&["5-9"], 3).is_empty());
    assert_eq!(parse_selection(&["5"], 3), vec![5]);
}

#[test]
fn selects_all_test() {
    assert!(selects_all::<&str>(&[]));
    assert!(selects_all(&["*"]));
    assert!(!selects_all(&["1", "*"]));
}
