use rand::Rng;
use rand::seq::IndexedRandom;

pub const EVENTS: [&str; 4] = [
    "🌩️ A sudden storm rolls in, and thunder shakes the ground beneath you.",
    "🧙 A hooded stranger steps out of the shadows and offers you a cryptic map.",
    "🐺 Wolves howl in the distance; something is hunting tonight.",
    "💰 You stumble upon a half-buried pouch of gold coins.",
];

/// Rolls a six-sided die and formats the result for the player.
pub fn roll_dice() -> String {
    roll_dice_with(&mut rand::rng())
}

pub fn roll_dice_with(rng: &mut impl Rng) -> String {
    format!("🎲 You rolled a {}!", roll_die(rng))
}

/// Picks one of the fixed random events.
pub fn generate_event() -> String {
    generate_event_with(&mut rand::rng())
}

pub fn generate_event_with(rng: &mut impl Rng) -> String {
    // EVENTS is a non-empty constant, the fallback is unreachable.
    EVENTS.choose(rng).copied().unwrap_or(EVENTS[0]).to_string()
}

// Helper function to roll a single die.
fn roll_die(rng: &mut impl Rng) -> u8 {
    rng.random_range(1..=6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn face(roll: &str) -> u8 {
        roll.strip_prefix("🎲 You rolled a ")
            .and_then(|rest| rest.strip_suffix('!'))
            .and_then(|n| n.parse().ok())
            .unwrap_or_else(|| panic!("unexpected roll format: {roll}"))
    }

    #[test]
    fn rolls_stay_on_the_die() {
        for _ in 0..1000 {
            let value = face(&roll_dice());
            assert!((1..=6).contains(&value), "rolled {value}");
        }
    }

    #[test]
    fn rolls_are_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 6];
        for _ in 0..1000 {
            counts[face(&roll_dice_with(&mut rng)) as usize - 1] += 1;
        }
        // Expected ~167 per face with a standard deviation near 12.
        for (i, count) in counts.iter().enumerate() {
            assert!(
                (100..=240).contains(count),
                "face {} came up {} times",
                i + 1,
                count
            );
        }
    }

    #[test]
    fn events_come_from_the_fixed_set() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let event = generate_event_with(&mut rng);
            assert!(EVENTS.contains(&event.as_str()));
            seen.insert(event);
        }
        assert_eq!(seen.len(), EVENTS.len());

        for _ in 0..50 {
            assert!(EVENTS.contains(&generate_event().as_str()));
        }
    }
}
