//! Milestone achievements: one notification per score update that crosses a milestone.

/// Messages cycle by milestone index.
const MESSAGES: [&str; 12] = [
    "Fresh out of the fryer!",
    "Glaze of glory!",
    "Sprinkle storm!",
    "Hole-in-one!",
    "Baker's dozen of combos!",
    "Proofed to perfection!",
    "Sugar rush unlocked!",
    "Crème de la crème!",
    "Rolling in dough!",
    "Golden crust master!",
    "Night-shift legend!",
    "The whole box!",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    /// Milestone index: floor(score / interval) after the update.
    pub milestone: u32,
    /// Level reached by this achievement.
    pub level: u32,
    pub message: &'static str,
}

pub fn message_for(milestone: u32) -> &'static str {
    let i = milestone.saturating_sub(1) as usize % MESSAGES.len();
    MESSAGES[i]
}

/// Milestone index reached when the score moves from `previous` to `current`, if any.
///
/// Jumping over several milestones in one update still yields one result: the
/// current index, not one per milestone skipped.
pub fn crossed_milestone(previous: u32, current: u32, interval: u32) -> Option<u32> {
    let reached = current / interval;
    (reached > previous / interval && current >= interval).then_some(reached)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_one_milestone() {
        assert_eq!(crossed_milestone(950, 1050, 1000), Some(1));
        assert_eq!(crossed_milestone(1050, 1900, 1000), None);
        assert_eq!(crossed_milestone(0, 999, 1000), None);
        assert_eq!(crossed_milestone(999, 1000, 1000), Some(1));
    }

    #[test]
    fn jump_over_several_milestones_reports_current_index_once() {
        assert_eq!(crossed_milestone(950, 3100, 1000), Some(3));
    }

    #[test]
    fn messages_cycle() {
        assert_eq!(message_for(1), MESSAGES[0]);
        assert_eq!(message_for(13), MESSAGES[0]);
        assert_eq!(message_for(2), MESSAGES[1]);
    }
}
