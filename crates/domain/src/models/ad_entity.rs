//! Typed models for Marketing API objects.
//!
//! The Graph API returns most scalar values as strings (including budgets and
//! spend), so the fields here stay string-typed and formatting decisions are
//! left to the column mapper.

use serde::{Deserialize, Serialize};

/// Granularity of an insights query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLevel {
    Campaign,
    AdSet,
    Ad,
}

impl EntityLevel {
    /// The `level` parameter value the insights endpoint expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLevel::Campaign => "campaign",
            EntityLevel::AdSet => "adset",
            EntityLevel::Ad => "ad",
        }
    }
}

/// Looks up a named field on a record, for column mapping.
pub trait ReportFields {
    /// Raw string value of `name`, or `None` when the record has no such
    /// field or the field is unset.
    fn field(&self, name: &str) -> Option<String>;
}

/// An ad account visible to the user's access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdAccount {
    pub id: String,
    pub name: String,
    pub account_status: Option<String>,
    pub currency: Option<String>,
    pub timezone_name: Option<String>,
    pub amount_spent: Option<String>,
    pub spend_cap: Option<String>,
}

impl ReportFields for AdAccount {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "account_status" | "status" => self.account_status.clone(),
            "currency" => self.currency.clone(),
            "timezone_name" => self.timezone_name.clone(),
            "amount_spent" => self.amount_spent.clone(),
            "spend_cap" => self.spend_cap.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: Option<String>,
    pub objective: Option<String>,
    pub daily_budget: Option<String>,
    pub lifetime_budget: Option<String>,
    pub created_time: Option<String>,
}

impl ReportFields for Campaign {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "status" => self.status.clone(),
            "objective" => self.objective.clone(),
            "daily_budget" => self.daily_budget.clone(),
            "lifetime_budget" => self.lifetime_budget.clone(),
            "created_time" => self.created_time.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSet {
    pub id: String,
    pub name: String,
    pub status: Option<String>,
    pub campaign_id: Option<String>,
    pub daily_budget: Option<String>,
    pub lifetime_budget: Option<String>,
    pub optimization_goal: Option<String>,
    pub billing_event: Option<String>,
}

impl ReportFields for AdSet {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "status" => self.status.clone(),
            "campaign_id" => self.campaign_id.clone(),
            "daily_budget" => self.daily_budget.clone(),
            "lifetime_budget" => self.lifetime_budget.clone(),
            "optimization_goal" => self.optimization_goal.clone(),
            "billing_event" => self.billing_event.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: String,
    pub name: String,
    pub status: Option<String>,
    pub adset_id: Option<String>,
    pub campaign_id: Option<String>,
    pub created_time: Option<String>,
}

impl ReportFields for Ad {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "status" => self.status.clone(),
            "adset_id" => self.adset_id.clone(),
            "campaign_id" => self.campaign_id.clone(),
            "created_time" => self.created_time.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_level_strings() {
        assert_eq!(EntityLevel::Campaign.as_str(), "campaign");
        assert_eq!(EntityLevel::AdSet.as_str(), "adset");
        assert_eq!(EntityLevel::Ad.as_str(), "ad");
    }

    #[test]
    fn test_campaign_field_lookup() {
        let campaign = Campaign {
            id: "1".to_string(),
            name: "Spring sale".to_string(),
            status: Some("ACTIVE".to_string()),
            objective: None,
            daily_budget: Some("1500".to_string()),
            lifetime_budget: None,
            created_time: None,
        };

        assert_eq!(campaign.field("name").as_deref(), Some("Spring sale"));
        assert_eq!(campaign.field("daily_budget").as_deref(), Some("1500"));
        assert_eq!(campaign.field("objective"), None);
        assert_eq!(campaign.field("no_such_field"), None);
    }

    #[test]
    fn test_account_status_alias() {
        let account = AdAccount {
            id: "act_123".to_string(),
            name: "Main".to_string(),
            account_status: Some("1".to_string()),
            currency: None,
            timezone_name: None,
            amount_spent: None,
            spend_cap: None,
        };
        assert_eq!(account.field("status"), account.field("account_status"));
    }
}
