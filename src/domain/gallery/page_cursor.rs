use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifies the last record of a fetched page; the next page starts strictly after it.
///
/// On the wire the cursor is an opaque token. Clients must hand it back unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl PageCursor {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        PageCursor { created_at, id }
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.created_at.timestamp_micros(), self.id.simple())
    }
}

impl FromStr for PageCursor {
    type Err = anyhow::Error;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (micros, id) = token
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Malformed cursor token"))?;
        let micros: i64 = micros.parse()?;
        let created_at = DateTime::<Utc>::from_timestamp_micros(micros)
            .ok_or_else(|| anyhow::anyhow!("Cursor timestamp out of range"))?;
        let id = Uuid::parse_str(id)?;

        Ok(PageCursor { created_at, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    #[test]
    fn token_survives_display_and_parse() {
        let cursor = PageCursor::new(Utc::now().trunc_subsecs(6), Uuid::now_v7());
        let parsed: PageCursor = cursor.to_string().parse().unwrap();
        assert_eq!(parsed, cursor);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!("".parse::<PageCursor>().is_err());
        assert!("12345".parse::<PageCursor>().is_err());
        assert!("abc.0190c0de".parse::<PageCursor>().is_err());
    }
}
