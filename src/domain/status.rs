//! Status and priority enumerations
//!
//! Both carry a fixed numeric rank used by the ordering strategies and by
//! the derived values of a [`Project`](super::Project).

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::ModelError;

/// Lifecycle status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Todo,
        Status::InProgress,
        Status::Done,
        Status::Cancelled,
    ];

    /// Position in the fixed workflow order (TODO=1 .. CANCELLED=4)
    pub fn rank(&self) -> u8 {
        match self {
            Status::Todo => 1,
            Status::InProgress => 2,
            Status::Done => 3,
            Status::Cancelled => 4,
        }
    }

    /// Canonical name used on disk and in JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "IN_PROGRESS",
            Status::Done => "DONE",
            Status::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Status::Todo => "To do",
            Status::InProgress => "In progress",
            Status::Done => "Done",
            Status::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ModelError;

    /// Accepts canonical names, lowercase aliases and the 1-4 menu numbers
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "todo" | "1" => Ok(Status::Todo),
            "in_progress" | "progress" | "inprogress" | "2" => Ok(Status::InProgress),
            "done" | "3" => Ok(Status::Done),
            "cancelled" | "canceled" | "4" => Ok(Status::Cancelled),
            _ => Err(ModelError::InvalidArgument(format!("unknown status '{}'", s))),
        }
    }
}

/// Urgency of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// Numeric rank used for comparison (LOW=1 .. CRITICAL=4)
    pub fn level(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Critical => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "1" => Ok(Priority::Low),
            "medium" | "2" => Ok(Priority::Medium),
            "high" | "3" => Ok(Priority::High),
            "critical" | "4" => Ok(Priority::Critical),
            _ => Err(ModelError::InvalidArgument(format!(
                "unknown priority '{}'",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_todo_and_medium() {
        assert_eq!(Status::default(), Status::Todo);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn ranks_follow_declaration_order() {
        let ranks: Vec<u8> = Status::ALL.iter().map(Status::rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);

        let levels: Vec<u8> = Priority::ALL.iter().map(Priority::level).collect();
        assert_eq!(levels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn canonical_names_parse_back() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        for priority in Priority::ALL {
            assert_eq!(priority.as_str().parse::<Priority>().unwrap(), priority);
        }
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("canceled".parse::<Status>().unwrap(), Status::Cancelled);
        assert_eq!("3".parse::<Status>().unwrap(), Status::Done);
        assert_eq!("4".parse::<Priority>().unwrap(), Priority::Critical);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!("someday".parse::<Status>().is_err());
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            serde_json::to_string(&Priority::Critical).unwrap(),
            "\"CRITICAL\""
        );
    }
}
