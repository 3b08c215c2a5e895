use relay_config::{ConversationLog, Turn};

/// Exchange pairs (user + assistant) kept in a log.
pub const CONTEXT_LIMIT: usize = 12;

/// Bound `log` to its system prompt plus the most recent
/// `2 * context_limit` non-system turns.
///
/// Only the first system turn survives and it is always moved to the front.
/// Applying the function to its own output returns the same log.
#[must_use]
pub fn trim_history(log: ConversationLog, context_limit: usize) -> ConversationLog {
    let max_turns = context_limit.saturating_mul(2);

    let mut system: Option<Turn> = None;
    let mut rest: Vec<Turn> = Vec::with_capacity(log.len());
    for turn in log {
        if turn.is_system() {
            if system.is_none() {
                system = Some(turn);
            }
        } else {
            rest.push(turn);
        }
    }

    let skip = rest.len().saturating_sub(max_turns);
    system.into_iter().chain(rest.into_iter().skip(skip)).collect()
}
