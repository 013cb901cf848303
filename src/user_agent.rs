//! Browser User-Agent pool for download requests.
//!
//! Each attempt presents one of a few common desktop browser strings so the
//! generated traffic looks like ordinary browsing.

use crate::random::RandomSource;

/// Desktop browser User-Agent strings.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/122.0.0.0 Safari/537.36",
];

/// Picks a User-Agent uniformly at random.
#[must_use]
pub fn pick(random: &mut dyn RandomSource) -> &'static str {
    USER_AGENTS[random.index(USER_AGENTS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn test_pick_uses_random_index() {
        let mut random = ScriptedRandom::new([2, 5]);
        assert_eq!(pick(&mut random), USER_AGENTS[2]);
        assert_eq!(pick(&mut random), USER_AGENTS[1]);
    }

    #[test]
    fn test_pool_entries_are_browser_strings() {
        assert!(USER_AGENTS.iter().all(|ua| ua.starts_with("Mozilla/5.0 (")));
    }
}
