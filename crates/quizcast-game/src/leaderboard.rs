//! Leaderboard projection: player set in, ranked standings out.
//!
//! A pure function. Ties are broken by display name (ascending,
//! case-insensitive) and then by identity, so the output is fully
//! deterministic — insertion order never leaks into rankings.

use quizcast_protocol::{Identity, LeaderboardEntry};

/// The projection's input: one row per player, in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contender {
    /// Persistent identity.
    pub identity: Identity,
    /// Display name.
    pub name: String,
    /// Avatar reference.
    pub avatar: Option<String>,
    /// Accumulated score.
    pub score: u32,
    /// Whether the player currently has a live connection.
    pub online: bool,
}

/// Projects a player set into ranked standings.
///
/// Sorted by score descending; equal scores order by name ascending
/// (case-insensitive), then identity. Ranks are positional, starting at 1.
pub fn project(contenders: &[Contender]) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<&Contender> = contenders.iter().collect();
    rows.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.identity.as_str().cmp(b.identity.as_str()))
    });

    rows.into_iter()
        .enumerate()
        .map(|(i, c)| LeaderboardEntry {
            rank: i + 1,
            identity: c.identity.clone(),
            name: c.name.clone(),
            avatar: c.avatar.clone(),
            score: c.score,
            online: c.online,
        })
        .collect()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn contender(identity: &str, name: &str, score: u32) -> Contender {
        Contender {
            identity: Identity::from(identity),
            name: name.to_string(),
            avatar: None,
            score,
            online: true,
        }
    }

    #[test]
    fn test_project_sorts_by_score_descending() {
        let standings = project(&[
            contender("p1", "Ana", 500),
            contender("p2", "Bruno", 1700),
            contender("p3", "Carla", 1000),
        ]);

        let scores: Vec<u32> = standings.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![1700, 1000, 500]);
        let ranks: Vec<usize> = standings.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_project_breaks_ties_by_name_case_insensitive() {
        let standings = project(&[
            contender("p1", "zeca", 1000),
            contender("p2", "Ana", 1000),
        ]);

        assert_eq!(standings[0].name, "Ana");
        assert_eq!(standings[1].name, "zeca");
    }

    #[test]
    fn test_project_equal_names_order_by_identity() {
        let standings = project(&[
            contender("p_b", "Ana", 1000),
            contender("p_a", "Ana", 1000),
        ]);

        assert_eq!(standings[0].identity, Identity::from("p_a"));
        assert_eq!(standings[1].identity, Identity::from("p_b"));
    }

    #[test]
    fn test_project_is_deterministic_regardless_of_input_order() {
        let a = vec![
            contender("p1", "Ana", 500),
            contender("p2", "Bruno", 500),
            contender("p3", "Carla", 1700),
        ];
        let mut b = a.clone();
        b.reverse();

        assert_eq!(project(&a), project(&b));
        // And calling twice on the same input gives the same answer.
        assert_eq!(project(&a), project(&a));
    }

    #[test]
    fn test_project_empty_input_is_empty() {
        assert!(project(&[]).is_empty());
    }

    #[test]
    fn test_project_preserves_offline_flag_and_avatar() {
        let mut c = contender("p1", "Ana", 0);
        c.online = false;
        c.avatar = Some("owl.svg".into());

        let standings = project(&[c]);
        assert!(!standings[0].online);
        assert_eq!(standings[0].avatar.as_deref(), Some("owl.svg"));
    }
}
