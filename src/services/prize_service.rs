use crate::{dto::prizes::PrizeSuggestion, state::SharedState};

/// Draw `count` distinct prize ideas from the configured catalogue.
pub fn suggest_prizes(state: &SharedState, count: u32) -> Vec<PrizeSuggestion> {
    let mut rng = rand::rng();
    state
        .config()
        .prize_suggestions(count as usize, &mut rng)
        .into_iter()
        .map(PrizeSuggestion::from)
        .collect()
}
