//! Candidate action sequences and their genetic operators.

use rand::Rng;

use crate::action::{MoveAction, Turn};

/// One candidate plan: a fixed-length list of movement actions, each held for
/// `control_repeat` sub-steps during rollout.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionSequence {
    pub actions: Vec<MoveAction>,
    /// `None` until the rollout has scored it.
    pub score: Option<f64>,
}

impl ActionSequence {
    pub fn new(actions: Vec<MoveAction>) -> Self {
        Self {
            actions,
            score: None,
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// Uniform-ish exploration: thrust 60%, each turn 15%.
    pub fn random<R: Rng>(len: usize, rng: &mut R) -> Self {
        Self::new((0..len).map(|_| random_action(rng)).collect())
    }

    /// Mostly thrusting with occasional course corrections.
    pub fn attack<R: Rng>(len: usize, rng: &mut R) -> Self {
        let actions = (0..len)
            .map(|i| {
                let thrust = i % 8 < 6;
                let turn = coin_turn(rng, 0.1, 0.1);
                MoveAction::from_parts(thrust, turn)
            })
            .collect();
        Self::new(actions)
    }

    /// Turns toward a pickup for `turn_steps` actions, then flies straight.
    pub fn pursue<R: Rng>(len: usize, turn: Turn, turn_steps: usize, rng: &mut R) -> Self {
        let actions = (0..len)
            .map(|i| {
                if i < turn_steps {
                    MoveAction::from_parts(rng.gen_bool(0.3), turn)
                } else {
                    MoveAction::from_parts(true, coin_turn(rng, 0.05, 0.05))
                }
            })
            .collect();
        Self::new(actions)
    }

    /// Dodge pattern: alternating thrust phases with short bursts of turning
    /// to one side.
    pub fn dodge<R: Rng>(len: usize, rng: &mut R) -> Self {
        let side = if rng.gen_bool(0.5) {
            Turn::Left
        } else {
            Turn::Right
        };
        let actions = (0..len)
            .map(|i| {
                let thrust = (i / 10) % 2 == 0;
                let turn = if i % 5 < 2 { side } else { Turn::None };
                MoveAction::from_parts(thrust, turn)
            })
            .collect();
        Self::new(actions)
    }

    /// Drops the first `steps` actions and pads the tail with thrust, keeping
    /// `len` actions. The score is cleared.
    pub fn shifted(&self, steps: usize, len: usize) -> Self {
        let mut actions: Vec<_> = self.actions.iter().skip(steps).take(len).copied().collect();
        actions.resize(len, MoveAction::Thrust);
        Self::new(actions)
    }

    /// Copy with each action resampled with probability `rate`.
    pub fn mutate<R: Rng>(&self, rate: f64, rng: &mut R) -> Self {
        let actions = self
            .actions
            .iter()
            .map(|&a| {
                if rng.gen_bool(rate) {
                    random_action(rng)
                } else {
                    a
                }
            })
            .collect();
        Self::new(actions)
    }

    /// Single-point crossover: `a`'s prefix joined to `b`'s suffix.
    pub fn crossover<R: Rng>(a: &Self, b: &Self, rng: &mut R) -> Self {
        let len = a.len().min(b.len());
        if len == 0 {
            return Self::new(Vec::new());
        }
        let point = rng.gen_range(0..len);
        let actions = a.actions[..point]
            .iter()
            .chain(&b.actions[point..len])
            .copied()
            .collect();
        Self::new(actions)
    }
}

fn random_action<R: Rng>(rng: &mut R) -> MoveAction {
    MoveAction::from_parts(rng.gen_bool(0.6), coin_turn(rng, 0.15, 0.15))
}

/// Independent coins for left and right; left wins a double hit.
fn coin_turn<R: Rng>(rng: &mut R, left: f64, right: f64) -> Turn {
    let l = rng.gen_bool(left);
    let r = rng.gen_bool(right);
    match (l, r) {
        (true, _) => Turn::Left,
        (false, true) => Turn::Right,
        (false, false) => Turn::None,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn generators_respect_length() {
        let mut rng = rng();
        assert_eq!(ActionSequence::random(12, &mut rng).len(), 12);
        assert_eq!(ActionSequence::attack(12, &mut rng).len(), 12);
        assert_eq!(ActionSequence::dodge(12, &mut rng).len(), 12);
        assert_eq!(ActionSequence::pursue(12, Turn::Left, 3, &mut rng).len(), 12);
    }

    #[test]
    fn attack_thrusts_on_schedule() {
        let seq = ActionSequence::attack(16, &mut rng());
        for (i, a) in seq.actions.iter().enumerate() {
            assert_eq!(a.thrust(), i % 8 < 6);
        }
    }

    #[test]
    fn dodge_turns_one_way_only() {
        let seq = ActionSequence::dodge(30, &mut rng());
        let turns: Vec<_> = seq
            .actions
            .iter()
            .map(|a| a.turn())
            .filter(|t| *t != Turn::None)
            .collect();
        assert_eq!(turns.len(), 12);
        assert!(turns.windows(2).all(|w| w[0] == w[1]));
        assert!(seq.actions[0].thrust() && !seq.actions[10].thrust());
    }

    #[test]
    fn pursuit_turns_first() {
        let seq = ActionSequence::pursue(10, Turn::Right, 4, &mut rng());
        assert!(seq.actions[..4].iter().all(|a| a.turn() == Turn::Right));
        assert!(seq.actions[4..].iter().all(|a| a.thrust()));
    }

    #[test]
    fn shift_drops_consumed_prefix_and_pads_with_thrust() {
        let seq = ActionSequence {
            actions: vec![MoveAction::Coast, MoveAction::TurnLeft, MoveAction::TurnRight],
            score: Some(3.0),
        };
        let shifted = seq.shifted(1, 4);
        assert_eq!(
            shifted.actions,
            vec![
                MoveAction::TurnLeft,
                MoveAction::TurnRight,
                MoveAction::Thrust,
                MoveAction::Thrust
            ]
        );
        assert!(!shifted.is_scored());
        assert_eq!(seq.shifted(10, 2).actions, vec![MoveAction::Thrust; 2]);
    }

    #[test]
    fn crossover_splices_parents() {
        let a = ActionSequence::new(vec![MoveAction::Coast; 8]);
        let b = ActionSequence::new(vec![MoveAction::Thrust; 8]);
        let child = ActionSequence::crossover(&a, &b, &mut rng());

        assert_eq!(child.len(), 8);
        let split = child
            .actions
            .iter()
            .position(|&x| x == MoveAction::Thrust)
            .unwrap_or(8);
        assert!(child.actions[..split].iter().all(|&x| x == MoveAction::Coast));
        assert!(child.actions[split..].iter().all(|&x| x == MoveAction::Thrust));
    }

    #[test]
    fn zero_rate_mutation_is_identity() {
        let seq = ActionSequence::attack(20, &mut rng());
        assert_eq!(seq.mutate(0.0, &mut rng()).actions, seq.actions);
    }
}
