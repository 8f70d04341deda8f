/// Baddie AI: greedy pursuit with a coin-flip between axes.
///
/// Each tick the baddie looks at the sign of the offset to the player and
/// picks, uniformly at random, either the vertical or the horizontal
/// component. The chosen step goes through the same `Body::step` legality
/// as player movement, so a blocked choice simply wastes the tick.
///
/// No pathfinding and no memory. When the player shares a row or column,
/// one of the two candidates is `(0, 0)` and the baddie stands still half
/// the time.

use rand::Rng;

/// Frames between two AI ticks of the same baddie.
pub const BADDIE_DELAY: u32 = 25;

/// Reduce to -1 / 0 / +1.
pub fn sign(v: i32) -> i32 {
    v.signum()
}

/// Pick the next step from `from` toward `to`.
pub fn choose_step<R: Rng>(rng: &mut R, from: (usize, usize), to: (usize, usize)) -> (i32, i32) {
    let sx = sign(to.0 as i32 - from.0 as i32);
    let sy = sign(to.1 as i32 - from.1 as i32);
    let candidates = [(0, sy), (sx, 0)];
    candidates[rng.random_range(0..candidates.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn sign_reduces_to_unit() {
        assert_eq!(sign(-7), -1);
        assert_eq!(sign(0), 0);
        assert_eq!(sign(12), 1);
    }

    #[test]
    fn step_is_axis_aligned_toward_player() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            let step = choose_step(&mut rng, (5, 5), (1, 9));
            assert!(step == (0, 1) || step == (-1, 0), "unexpected step {step:?}");
        }
    }

    #[test]
    fn same_row_yields_horizontal_or_wait() {
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..50 {
            let step = choose_step(&mut rng, (2, 3), (8, 3));
            assert!(step == (0, 0) || step == (1, 0));
        }
    }

    #[test]
    fn both_branches_roughly_even() {
        let mut rng = Pcg32::seed_from_u64(0xC0FFEE);
        let trials = 10_000;
        let vertical = (0..trials)
            .filter(|_| choose_step(&mut rng, (10, 10), (0, 0)) == (0, -1))
            .count();
        let horizontal = trials - vertical;
        assert!((4_500..=5_500).contains(&vertical), "vertical = {vertical}");
        assert!((4_500..=5_500).contains(&horizontal), "horizontal = {horizontal}");
    }

    #[test]
    fn same_seed_same_choices() {
        let mut a = Pcg32::seed_from_u64(99);
        let mut b = Pcg32::seed_from_u64(99);
        let sa: Vec<_> = (0..32).map(|_| choose_step(&mut a, (0, 0), (4, 4))).collect();
        let sb: Vec<_> = (0..32).map(|_| choose_step(&mut b, (0, 0), (4, 4))).collect();
        assert_eq!(sa, sb);
    }
}
