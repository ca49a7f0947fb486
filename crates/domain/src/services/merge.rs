//! Merging insight rows onto entity lists.

use std::collections::HashMap;

use crate::models::{Ad, AdAccount, AdSet, Campaign, InsightRow, ReportFields};

/// Anything joinable by its entity id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for AdAccount {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Campaign {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for AdSet {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Ad {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for InsightRow {
    fn key(&self) -> &str {
        &self.id
    }
}

/// An entity with its matched insight, if any.
#[derive(Debug, Clone)]
pub struct Merged<E> {
    pub entity: E,
    pub insight: Option<InsightRow>,
}

impl<E: ReportFields> ReportFields for Merged<E> {
    /// Entity fields win; insight metrics fill in the rest.
    fn field(&self, name: &str) -> Option<String> {
        self.entity
            .field(name)
            .or_else(|| self.insight.as_ref().and_then(|i| i.field(name)))
    }
}

/// Left-merges insights onto entities by id.
///
/// Every entity appears exactly once in the output, with or without a
/// matching insight. Insights with no matching entity are dropped; they never
/// create rows of their own.
pub fn merge_insights<E: Keyed>(entities: Vec<E>, insights: Vec<InsightRow>) -> Vec<Merged<E>> {
    let mut by_id: HashMap<String, InsightRow> = insights
        .into_iter()
        .map(|row| (row.key().to_string(), row))
        .collect();

    entities
        .into_iter()
        .map(|entity| {
            let insight = by_id.remove(entity.key());
            Merged { entity, insight }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(id: &str, name: &str) -> Campaign {
        Campaign {
            id: id.to_string(),
            name: name.to_string(),
            status: None,
            objective: None,
            daily_budget: None,
            lifetime_budget: None,
            created_time: None,
        }
    }

    #[test]
    fn test_unmatched_insights_are_dropped() {
        let mut matched = InsightRow::empty("1");
        matched.spend = Some("5".to_string());
        let mut orphan = InsightRow::empty("2");
        orphan.spend = Some("9".to_string());

        let merged = merge_insights(vec![campaign("1", "x")], vec![matched, orphan]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].entity.id, "1");
        assert_eq!(merged[0].field("name").as_deref(), Some("x"));
        assert_eq!(merged[0].field("spend").as_deref(), Some("5"));
    }

    #[test]
    fn test_entity_without_insight_keeps_base_fields() {
        let merged = merge_insights(vec![campaign("1", "x")], Vec::new());
        assert_eq!(merged.len(), 1);
        assert!(merged[0].insight.is_none());
        assert_eq!(merged[0].field("name").as_deref(), Some("x"));
        assert_eq!(merged[0].field("spend"), None);
    }

    #[test]
    fn test_entity_field_wins_over_insight() {
        let mut insight = InsightRow::empty("1");
        insight.date_start = Some("2024-01-01".to_string());
        let mut entity = campaign("1", "x");
        entity.created_time = Some("2023-12-31".to_string());

        let merged = merge_insights(vec![entity], vec![insight]);
        // "created_time" only exists on the entity, "date_start" only on the
        // insight; both resolve.
        assert_eq!(merged[0].field("created_time").as_deref(), Some("2023-12-31"));
        assert_eq!(merged[0].field("date_start").as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_preserves_entity_order() {
        let entities = vec![campaign("3", "c"), campaign("1", "a"), campaign("2", "b")];
        let merged = merge_insights(entities, vec![InsightRow::empty("2")]);
        let ids: Vec<&str> = merged.iter().map(|m| m.entity.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert!(merged[2].insight.is_some());
    }
}
