//! Single entry point for every session mutation
//!
//! Tilt events, timer ticks and user commands all arrive as `SessionInput`
//! and are applied one at a time, so the session has exactly one writer.

use super::session::{GameSession, SessionEvent};
use crate::persistence::HighscoreStore;

/// One queued mutation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionInput {
    /// Raw tilt vector from the sensor
    Tilt { dx: f32, dy: f32 },
    /// One unit of countdown
    TimerTick,
    Pause,
    Resume,
    Restart,
}

/// Apply one input to the session
pub fn tick<S: HighscoreStore>(session: &mut GameSession<S>, input: SessionInput) -> Vec<SessionEvent> {
    match input {
        SessionInput::Tilt { dx, dy } => session.on_tilt(dx, dy),
        SessionInput::TimerTick => session.timer_tick(),
        SessionInput::Pause => session.pause(),
        SessionInput::Resume => session.resume(),
        SessionInput::Restart => session.restart(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ROUND_DURATION;
    use crate::highscores::Roster;
    use crate::sim::{MazeParams, SessionConfig, SessionPhase};

    #[test]
    fn test_pause_resume_through_inputs() {
        let mut session = GameSession::new("Bob", Roster::new(), SessionConfig::default()).unwrap();
        tick(&mut session, SessionInput::TimerTick);
        assert_eq!(tick(&mut session, SessionInput::Pause), [SessionEvent::Paused]);
        assert_eq!(session.phase(), SessionPhase::Paused);

        tick(&mut session, SessionInput::TimerTick);
        assert_eq!(session.time_remaining(), ROUND_DURATION - 1);

        assert_eq!(tick(&mut session, SessionInput::Resume), [SessionEvent::Resumed]);
        tick(&mut session, SessionInput::TimerTick);
        assert_eq!(session.time_remaining(), ROUND_DURATION - 2);
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed and inputs end up identical
        let config = SessionConfig {
            seed: 99999,
            ..Default::default()
        };
        let mut a = GameSession::new("Bob", Roster::new(), config).unwrap();
        let mut b = GameSession::new("Bob", Roster::new(), config).unwrap();

        let inputs = [
            SessionInput::Tilt { dx: -1.0, dy: 0.5 },
            SessionInput::TimerTick,
            SessionInput::Tilt { dx: 0.3, dy: -2.0 },
            SessionInput::Restart,
            SessionInput::Tilt { dx: -4.0, dy: 4.0 },
        ];
        for input in inputs {
            assert_eq!(tick(&mut a, input), tick(&mut b, input));
        }

        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.ball(), b.ball());
        assert_eq!(a.time_remaining(), b.time_remaining());
    }

    #[test]
    fn test_restart_input_resets() {
        let mut session = GameSession::new("Bob", Roster::new(), SessionConfig::default()).unwrap();
        tick(&mut session, SessionInput::Pause);
        assert_eq!(tick(&mut session, SessionInput::Restart), [SessionEvent::Restarted]);
        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.grid().params(), MazeParams::new(20, 40, 7));
    }
}
