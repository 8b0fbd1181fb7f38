//! Sort order for ticket listings.
//!
//! The wire form is `"{field}_{direction}"`, e.g. `updatedAt_desc`.

use std::fmt;
use std::str::FromStr;

use crate::enum_display_fromstr;
use crate::error::DocketError;
use crate::types::Ticket;

/// Timestamp a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    CreatedAt,
    #[default]
    UpdatedAt,
}

enum_display_fromstr!(
    SortField,
    DocketError::InvalidSort,
    {
        CreatedAt => "createdAt",
        UpdatedAt => "updatedAt",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

enum_display_fromstr!(
    SortDirection,
    DocketError::InvalidSort,
    {
        Asc => "asc",
        Desc => "desc",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// All valid string representations.
    pub const ALL_STRINGS: &[&str] = &[
        "createdAt_asc",
        "createdAt_desc",
        "updatedAt_asc",
        "updatedAt_desc",
    ];
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.field, self.direction)
    }
}

impl FromStr for SortSpec {
    type Err = DocketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = s
            .split_once('_')
            .ok_or_else(|| DocketError::InvalidSort(s.to_string()))?;
        let field: SortField = field
            .parse()
            .map_err(|_| DocketError::InvalidSort(s.to_string()))?;
        let direction: SortDirection = direction
            .parse()
            .map_err(|_| DocketError::InvalidSort(s.to_string()))?;
        Ok(Self { field, direction })
    }
}

/// Sort tickets in place by the requested timestamp.
///
/// Tickets with equal timestamps keep their relative input order.
pub fn sort_tickets(tickets: &mut [Ticket], spec: SortSpec) {
    let key = |t: &Ticket| match spec.field {
        SortField::CreatedAt => t.created_at,
        SortField::UpdatedAt => t.updated_at,
    };
    match spec.direction {
        SortDirection::Asc => tickets.sort_by(|a, b| key(a).cmp(&key(b))),
        SortDirection::Desc => tickets.sort_by(|a, b| key(b).cmp(&key(a))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TicketId, TicketPriority, TicketStatus};

    fn ticket(id: &str, created: &str, updated: &str) -> Ticket {
        Ticket {
            id: TicketId::new(id),
            title: format!("Ticket {id}"),
            description: String::new(),
            status: TicketStatus::Todo,
            priority: TicketPriority::Medium,
            assignee: None,
            tags: vec![],
            created_at: created.parse().unwrap(),
            updated_at: updated.parse().unwrap(),
        }
    }

    fn ids(tickets: &[Ticket]) -> Vec<&str> {
        tickets.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_sort_spec_from_str() {
        assert_eq!(
            "createdAt_asc".parse::<SortSpec>().unwrap(),
            SortSpec::new(SortField::CreatedAt, SortDirection::Asc)
        );
        assert_eq!(
            "updatedAt_desc".parse::<SortSpec>().unwrap(),
            SortSpec::default()
        );
        for s in SortSpec::ALL_STRINGS {
            assert_eq!(s.parse::<SortSpec>().unwrap().to_string(), *s);
        }
    }

    #[test]
    fn test_sort_spec_from_str_invalid() {
        assert!("createdAt".parse::<SortSpec>().is_err());
        assert!("title_asc".parse::<SortSpec>().is_err());
        assert!("createdAt_up".parse::<SortSpec>().is_err());
        assert!("".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_sort_by_created_desc() {
        let mut tickets = vec![
            ticket("a", "2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z"),
            ticket("b", "2024-06-01T00:00:00Z", "2024-06-01T00:00:00Z"),
            ticket("c", "2024-03-01T00:00:00Z", "2024-03-01T00:00:00Z"),
        ];
        sort_tickets(
            &mut tickets,
            SortSpec::new(SortField::CreatedAt, SortDirection::Desc),
        );
        assert_eq!(ids(&tickets), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_updated_asc_uses_updated_field() {
        let mut tickets = vec![
            ticket("a", "2024-01-01T00:00:00Z", "2024-09-01T00:00:00Z"),
            ticket("b", "2024-06-01T00:00:00Z", "2024-06-02T00:00:00Z"),
        ];
        sort_tickets(
            &mut tickets,
            SortSpec::new(SortField::UpdatedAt, SortDirection::Asc),
        );
        assert_eq!(ids(&tickets), vec!["b", "a"]);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let mut tickets = vec![
            ticket("x", "2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z"),
            ticket("y", "2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z"),
        ];
        sort_tickets(&mut tickets, SortSpec::default());
        assert_eq!(ids(&tickets), vec!["x", "y"]);
    }
}
