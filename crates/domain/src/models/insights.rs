//! Performance insight records.

use serde::{Deserialize, Serialize};

use super::ad_entity::ReportFields;

/// One row of the insights endpoint for a single entity and date range.
///
/// `id` carries the level-specific id (`campaign_id`, `adset_id` or `ad_id`)
/// normalized by the fetching client, so merging works the same at every
/// level. Metrics stay strings as the Graph API delivers them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRow {
    pub id: String,
    pub impressions: Option<String>,
    pub clicks: Option<String>,
    pub spend: Option<String>,
    pub reach: Option<String>,
    pub ctr: Option<String>,
    pub cpc: Option<String>,
    pub cpm: Option<String>,
    pub frequency: Option<String>,
    pub date_start: Option<String>,
    pub date_stop: Option<String>,
}

impl ReportFields for InsightRow {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "impressions" => self.impressions.clone(),
            "clicks" => self.clicks.clone(),
            "spend" => self.spend.clone(),
            "reach" => self.reach.clone(),
            "ctr" => self.ctr.clone(),
            "cpc" => self.cpc.clone(),
            "cpm" => self.cpm.clone(),
            "frequency" => self.frequency.clone(),
            "date_start" => self.date_start.clone(),
            "date_stop" => self.date_stop.clone(),
            _ => None,
        }
    }
}

impl InsightRow {
    /// An insight with only the entity id set; handy in tests.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            impressions: None,
            clicks: None,
            spend: None,
            reach: None,
            ctr: None,
            cpc: None,
            cpm: None,
            frequency: None,
            date_start: None,
            date_stop: None,
        }
    }
}
