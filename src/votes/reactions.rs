use crate::models::ReactionHistory;

pub const REACTION_PALETTE: [&str; 5] = ["👍", "👎", "😋", "🤔", "😕"];

/// Occurrence counts in order of first appearance.
pub fn aggregate_reaction_counts<'a, I>(tokens: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for token in tokens {
        match counts.iter_mut().find(|(seen, _)| seen == token) {
            Some((_, count)) => *count += 1,
            None => counts.push((token.to_string(), 1)),
        }
    }
    counts
}

pub fn format_reaction_count(token: &str, count: usize) -> String {
    if count <= 1 {
        token.to_string()
    } else {
        format!("{token} {count}")
    }
}

/// One-line summary of a campus's recent reactions, e.g. "👍 2 😋".
pub fn reaction_summary(history: &ReactionHistory) -> String {
    aggregate_reaction_counts(history.iter().map(|r| r.reaction.as_str()))
        .iter()
        .map(|(token, count)| format_reaction_count(token, *count))
        .collect::<Vec<_>>()
        .join(" ")
}
