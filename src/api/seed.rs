//! Demo data for the mock collaborator.

use jiff::{SignedDuration, Timestamp};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::types::{Ticket, TicketId, TicketPriority, TicketStatus};

pub const DEFAULT_TICKET_COUNT: usize = 80;

const STATUSES: &[TicketStatus] = &[TicketStatus::Todo, TicketStatus::InProgress, TicketStatus::Done];
const PRIORITIES: &[TicketPriority] = &[TicketPriority::Low, TicketPriority::Medium, TicketPriority::High];
const TAGS: &[&str] = &[
    "frontend",
    "backend",
    "infra",
    "bug",
    "ux",
    "performance",
    "docs",
    "security",
];
const ASSIGNEES: &[Option<&str>] = &[
    Some("jarang"),
    Some("minho"),
    Some("yuna"),
    Some("jisoo"),
    Some("hyuk"),
    None,
];
const TITLES: &[&str] = &[
    "Fix login bug",
    "Improve dashboard",
    "API integration",
    "Optimize performance",
    "Update docs",
    "Refactor UI",
    "Add tests",
    "Security patch",
];
const URGENCY: &[&str] = &["urgent", "normal", "low priority"];

const MAX_SEED_TAGS: usize = 3;
/// Tickets are created within this window before the anchor.
const CREATED_WINDOW_MS: i64 = 90 * 24 * 60 * 60 * 1000;

fn pick<T: Copy, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> T {
    // Every table above is non-empty.
    items.choose(rng).copied().unwrap_or(items[0])
}

/// Generate `count` tickets created in the 90 days before `anchor`.
///
/// The same rng state always yields the same tickets, ids included.
pub fn generate_tickets<R: Rng + ?Sized>(count: usize, rng: &mut R, anchor: Timestamp) -> Vec<Ticket> {
    (1..=count)
        .map(|n| {
            let age = SignedDuration::from_millis(rng.random_range(0..CREATED_WINDOW_MS));
            let created_at = anchor.checked_sub(age).unwrap_or(anchor);

            let mut tags: Vec<&str> = TAGS.to_vec();
            tags.shuffle(rng);
            tags.truncate(rng.random_range(0..=MAX_SEED_TAGS));

            let id_bytes: [u8; 16] = rng.random();
            Ticket {
                id: TicketId::new(uuid::Builder::from_random_bytes(id_bytes).into_uuid().to_string()),
                title: format!("Ticket {n} - {}", pick(TITLES, rng)),
                description: format!("This is a {} task.", pick(URGENCY, rng)),
                status: pick(STATUSES, rng),
                priority: pick(PRIORITIES, rng),
                assignee: pick(ASSIGNEES, rng).map(str::to_string),
                tags: tags.into_iter().map(str::to_string).collect(),
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn anchor() -> Timestamp {
        "2024-06-30T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_generates_requested_count_with_valid_fields() {
        let tickets = generate_tickets(DEFAULT_TICKET_COUNT, &mut StdRng::seed_from_u64(1), anchor());
        assert_eq!(tickets.len(), 80);

        let window = SignedDuration::from_millis(CREATED_WINDOW_MS);
        for t in &tickets {
            assert_eq!(t.created_at, t.updated_at);
            assert!(t.created_at <= anchor());
            assert!(t.created_at >= anchor().checked_sub(window).unwrap());
            assert!(t.tags.len() <= MAX_SEED_TAGS);
            let unique: HashSet<_> = t.tags.iter().collect();
            assert_eq!(unique.len(), t.tags.len());
        }
        assert!(tickets[0].title.starts_with("Ticket 1 - "));
        assert!(tickets[79].title.starts_with("Ticket 80 - "));
    }

    #[test]
    fn test_same_seed_same_tickets() {
        let a = generate_tickets(10, &mut StdRng::seed_from_u64(7), anchor());
        let b = generate_tickets(10, &mut StdRng::seed_from_u64(7), anchor());
        assert_eq!(a, b);
        let ids: HashSet<_> = a.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids.len(), 10);
    }
}
