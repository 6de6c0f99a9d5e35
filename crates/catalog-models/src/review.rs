use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A user review. Serialized as `{name, message, rating, date}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub name: String,
    pub message: String,
    pub rating: u8, // Stars, 1-5. Not enforced here
    pub date: DateTime<Utc>,
}

impl Review {
    pub fn new(name: impl Into<String>, message: impl Into<String>, rating: u8) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            rating,
            date: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_wire_format() {
        let review = Review {
            name: "Ana".to_string(),
            message: "great".to_string(),
            rating: 5,
            date: "2024-05-01T12:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["name"], "Ana");
        assert_eq!(json["rating"], 5);
        assert_eq!(json["date"], "2024-05-01T12:00:00Z");

        let parsed: Review = serde_json::from_str(
            r#"{"name":"B","message":"ok","rating":3,"date":"2024-05-02T08:30:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.rating, 3);
    }
}
