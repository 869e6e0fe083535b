use shared::{Record, RecordId};
use tracing::warn;
use uuid::Uuid;

/// How `create` picks identifiers for new records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Monotonic counter continuing after the largest numeric id seen.
    #[default]
    Sequence,
    /// Random v4 UUID strings.
    Uuid,
}

impl std::str::FromStr for IdStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequence" | "seq" => Ok(Self::Sequence),
            "uuid" => Ok(Self::Uuid),
            other => Err(format!("unknown id strategy '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdAllocator {
    strategy: IdStrategy,
    /// `None` once the numeric sequence is used up; later ids are UUIDs.
    next: Option<u64>,
}

impl IdAllocator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            next: Some(1),
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Moves the counter past every numeric id in `records`. Never moves it back.
    pub fn observe<'a, T: Record>(&mut self, records: impl IntoIterator<Item = &'a T>) {
        for record in records {
            let Some(number) = record.id().as_number() else {
                continue;
            };
            self.next = match (self.next, number.checked_add(1)) {
                (Some(next), Some(after)) => Some(next.max(after)),
                _ => None,
            };
        }
    }

    pub fn next_id(&mut self) -> RecordId {
        match (self.strategy, self.next) {
            (IdStrategy::Sequence, Some(id)) => {
                self.next = id.checked_add(1);
                RecordId::from(id)
            }
            (IdStrategy::Sequence, None) => {
                warn!("numeric id sequence exhausted, falling back to uuid");
                RecordId::new(Uuid::new_v4().to_string())
            }
            (IdStrategy::Uuid, _) => RecordId::new(Uuid::new_v4().to_string()),
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}
