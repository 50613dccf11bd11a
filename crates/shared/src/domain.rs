use std::{fmt, hash::Hash};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(AffiliateId);
id_newtype!(UserId);

/// A row that list controllers can page over and select.
///
/// Controllers only ever look at the identifier; every other field belongs to the
/// presentation layer.
pub trait Record {
    type Id: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn record_id(&self) -> Self::Id;
}

/// Bare identifiers (e.g. the SteamIDs in an affiliate's use list) are their own key.
impl Record for String {
    type Id = String;

    fn record_id(&self) -> Self::Id {
        self.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affiliate {
    pub id: AffiliateId,
    pub code: String,
    #[serde(default)]
    pub total_deposited: f64,
    #[serde(default)]
    pub total_depositors: u64,
    #[serde(default)]
    pub people_used: Vec<String>,
}

impl Affiliate {
    pub fn uses(&self) -> usize {
        self.people_used.len()
    }

    pub fn total_deposited_display(&self) -> String {
        format!("{:.2}", self.total_deposited)
    }

    pub fn detail_path(&self) -> String {
        affiliate_path(&self.code)
    }
}

impl Record for Affiliate {
    type Id = AffiliateId;

    fn record_id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub role: i32,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl Record for UserSummary {
    type Id = UserId;

    fn record_id(&self) -> Self::Id {
        self.id
    }
}

pub fn affiliate_path(code: &str) -> String {
    format!("/affiliates/{code}")
}

pub fn customer_path(customer_id: &str) -> String {
    format!("/customers/{customer_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affiliate_decodes_with_missing_counters() {
        let affiliate: Affiliate =
            serde_json::from_str(r#"{"id":4,"code":"SUMMER"}"#).expect("decode");
        assert_eq!(affiliate.uses(), 0);
        assert_eq!(affiliate.total_deposited_display(), "0.00");
        assert_eq!(affiliate.detail_path(), "/affiliates/SUMMER");
        assert_eq!(affiliate.record_id(), AffiliateId(4));
    }

    #[test]
    fn total_deposited_shows_two_decimals() {
        let affiliate = Affiliate {
            id: AffiliateId(1),
            code: "X".into(),
            total_deposited: 12.5,
            total_depositors: 2,
            people_used: vec!["7656".into(), "7657".into()],
        };
        assert_eq!(affiliate.total_deposited_display(), "12.50");
        assert_eq!(affiliate.uses(), 2);
    }

    #[test]
    fn user_summary_parses_last_login() {
        let user: UserSummary = serde_json::from_str(
            r#"{"id":9,"name":"alice","role":2,"last_login":"2024-01-01T00:00:00Z"}"#,
        )
        .expect("decode");
        assert_eq!(user.record_id(), UserId(9));
        assert!(user.last_login.is_some());
    }
}
