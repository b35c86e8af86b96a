//! Replaying recorded solutions against freshly built levels.
//!
//! A solution passes when the goal is reached on exactly its last action.
//! Finishing any other way, or finishing early, is a failure: a recorded
//! solution that wins before it ends hides moves that no longer matter.

use crate::level::Level;
use crate::levels;
use crate::state::Status;
use crate::world::WorldError;

/// Why a recorded solution did not verify.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("level has no recorded solution")]
    NotImplemented,

    #[error("level failed to build: {0}")]
    Build(#[from] WorldError),

    #[error("game ended ({status:?}) without reaching the goal after {taken} actions, {remain} left")]
    FinishedWithoutGoal {
        status: Status,
        taken: usize,
        remain: usize,
    },

    #[error("goal reached after {taken} actions but {remain} were left over")]
    ActionsRemaining { taken: usize, remain: usize },

    #[error("all {taken} actions played without reaching the goal")]
    GoalNotReached { taken: usize },
}

/// Build `level` and play its solution.
///
/// Returns the number of actions taken on success.
pub fn verify_solution(level: &dyn Level) -> Result<usize, VerifyError> {
    let actions = level.solve().ok_or(VerifyError::NotImplemented)?;
    let mut world = level.build()?;
    let total = actions.len();

    for (i, &action) in actions.iter().enumerate() {
        world.step(action);
        if !world.state().is_finished() {
            continue;
        }

        let taken = i + 1;
        let remain = total - taken;
        if !world.state().goal_reached() {
            return Err(VerifyError::FinishedWithoutGoal {
                status: world.status(),
                taken,
                remain,
            });
        }
        if remain > 0 {
            return Err(VerifyError::ActionsRemaining { taken, remain });
        }
        tracing::debug!(level = level.name(), taken, "solution verified");
        return Ok(taken);
    }

    Err(VerifyError::GoalNotReached { taken: total })
}

/// Verify every built-in level, in catalogue order.
pub fn verify_all() -> Vec<(&'static str, Result<usize, VerifyError>)> {
    levels::all()
        .iter()
        .map(|level| (level.name(), verify_solution(level.as_ref())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{parse_moves, Action};
    use crate::world::World;

    struct Scripted {
        layout: &'static str,
        moves: Option<&'static str>,
    }

    impl Level for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn build(&self) -> Result<World, WorldError> {
            World::from_layout(self.name(), self.layout)
        }

        fn solve(&self) -> Option<Vec<Action>> {
            self.moves.map(|m| parse_moves(m).unwrap())
        }
    }

    #[test]
    fn exact_solution_passes() {
        let level = Scripted {
            layout: "@.o",
            moves: Some("rr"),
        };
        assert_eq!(verify_solution(&level), Ok(2));
    }

    #[test]
    fn missing_solution_is_not_implemented() {
        let level = Scripted {
            layout: "@.o",
            moves: None,
        };
        assert_eq!(verify_solution(&level), Err(VerifyError::NotImplemented));
    }

    #[test]
    fn dying_is_reported_with_progress() {
        let level = Scripted {
            layout: "@^o",
            moves: Some("rr"),
        };
        assert_eq!(
            verify_solution(&level),
            Err(VerifyError::FinishedWithoutGoal {
                status: Status::PlayerDead,
                taken: 1,
                remain: 1
            })
        );
    }

    #[test]
    fn winning_early_leaves_actions_over() {
        let level = Scripted {
            layout: "@o.",
            moves: Some("rrl"),
        };
        assert_eq!(
            verify_solution(&level),
            Err(VerifyError::ActionsRemaining { taken: 1, remain: 2 })
        );
    }

    #[test]
    fn falling_short_is_reported() {
        let level = Scripted {
            layout: "@..o",
            moves: Some("rr"),
        };
        assert_eq!(verify_solution(&level), Err(VerifyError::GoalNotReached { taken: 2 }));
    }

    #[test]
    fn build_errors_propagate() {
        let level = Scripted {
            layout: "@?o",
            moves: Some("rr"),
        };
        assert!(matches!(
            verify_solution(&level),
            Err(VerifyError::Build(WorldError::UnknownSymbol { symbol: '?', .. }))
        ));
    }
}
