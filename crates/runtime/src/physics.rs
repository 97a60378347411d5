//! Dimension-neutral physics bookkeeping shared by the 2D and 3D
//! synchronization layers.

use tableau_common::BodyId;

/// Handle to a rigid body slot in a simulation world, independent of
/// the simulation dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub index: u32,
    pub generation: u32,
}

/// Handle to a collider slot in a simulation world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderKey {
    pub index: u32,
    pub generation: u32,
}

/// One simulation body owned by a scene object (or by one instance
/// slot of an instanced object).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    pub id: BodyId,
    pub rigid_body: BodyHandle,
    pub collider: ColliderKey,
    /// Tri-state sleep flag. `None` means the body has never been
    /// through a sleep/wake pass; the first pass resolves it and fires
    /// the matching edge exactly once.
    pub is_sleeping: Option<bool>,
}

/// The other side of a collision or contact dispatch, resolved back to
/// the registry through the body's `user_data`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactParticipant {
    pub id: BodyId,
    pub body: BodyHandle,
    pub collider: ColliderKey,
}

/// Which physics event dispatches an object asked for, captured once
/// when the object is registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventInterests {
    pub sleep_wake: bool,
    pub collisions: bool,
    pub contacts: bool,
}

/// A transition of the tri-state sleep flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SleepEdge {
    FellAsleep,
    WokeUp,
}

/// Updates `flag` from the simulation's current view and reports a
/// transition, if any. An unresolved flag always produces one edge, so
/// a body that starts awake fires a single initial wake.
pub(crate) fn sleep_edge(flag: &mut Option<bool>, sleeping_now: bool) -> Option<SleepEdge> {
    match (*flag, sleeping_now) {
        (Some(true), true) | (Some(false), false) => None,
        (_, true) => {
            *flag = Some(true);
            Some(SleepEdge::FellAsleep)
        }
        (_, false) => {
            *flag = Some(false);
            Some(SleepEdge::WokeUp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_flag_fires_initial_wake() {
        let mut flag = None;
        assert_eq!(sleep_edge(&mut flag, false), Some(SleepEdge::WokeUp));
        assert_eq!(flag, Some(false));
    }

    #[test]
    fn unresolved_flag_fires_initial_sleep_for_dormant_body() {
        let mut flag = None;
        assert_eq!(sleep_edge(&mut flag, true), Some(SleepEdge::FellAsleep));
    }

    #[test]
    fn steady_state_is_silent() {
        let mut flag = Some(false);
        assert_eq!(sleep_edge(&mut flag, false), None);
        let mut flag = Some(true);
        assert_eq!(sleep_edge(&mut flag, true), None);
    }

    #[test]
    fn each_transition_fires_once() {
        let mut flag = Some(false);
        assert_eq!(sleep_edge(&mut flag, true), Some(SleepEdge::FellAsleep));
        assert_eq!(sleep_edge(&mut flag, true), None);
        assert_eq!(sleep_edge(&mut flag, false), Some(SleepEdge::WokeUp));
        assert_eq!(sleep_edge(&mut flag, false), None);
    }
}
