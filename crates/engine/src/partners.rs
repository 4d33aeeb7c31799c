//! Partner roster.
//!
//! Partners are not ledger records: the roster comes from configuration and
//! decides how `(profit - costs)` is split. Partner transactions reference a
//! partner by [`PartnerId`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(String);

impl PartnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    /// Relative weight in the profit split.
    pub share: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartnerRoster {
    partners: Vec<Partner>,
}

impl PartnerRoster {
    /// Builds a roster, rejecting duplicates, empty ids and a zero total share.
    ///
    /// Ids end up inside command strings, so they may only contain ASCII
    /// letters, digits, `_` and `-`.
    pub fn new(partners: Vec<Partner>) -> ResultEngine<Self> {
        if partners.is_empty() {
            return Err(EngineError::Validation(
                "at least one partner is required".to_string(),
            ));
        }
        for (idx, partner) in partners.iter().enumerate() {
            let id = partner.id.as_str();
            if id.is_empty()
                || !id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(EngineError::Validation(format!(
                    "invalid partner id \"{id}\""
                )));
            }
            if partners[..idx].iter().any(|p| p.id == partner.id) {
                return Err(EngineError::Validation(format!(
                    "duplicate partner id \"{id}\""
                )));
            }
        }
        if partners.iter().all(|p| p.share == 0) {
            return Err(EngineError::Validation(
                "partner shares must not all be zero".to_string(),
            ));
        }
        Ok(Self { partners })
    }

    pub fn partners(&self) -> &[Partner] {
        &self.partners
    }

    pub fn get(&self, id: &PartnerId) -> Option<&Partner> {
        self.partners.iter().find(|p| &p.id == id)
    }

    pub fn require(&self, id: &PartnerId) -> ResultEngine<&Partner> {
        self.get(id)
            .ok_or_else(|| EngineError::NotFound(format!("partner \"{id}\"")))
    }

    /// Display name, falling back to the raw id for partners that were
    /// removed from the configuration but still appear in old records.
    pub fn display_name<'a>(&'a self, id: &'a PartnerId) -> &'a str {
        self.get(id).map_or(id.as_str(), |p| p.name.as_str())
    }

    pub fn total_share(&self) -> i64 {
        self.partners.iter().map(|p| i64::from(p.share)).sum()
    }
}

impl Default for PartnerRoster {
    /// Two partners with an equal split.
    fn default() -> Self {
        Self {
            partners: vec![
                Partner {
                    id: PartnerId::new("partner_a"),
                    name: "Partner A".to_string(),
                    share: 1,
                },
                Partner {
                    id: PartnerId::new("partner_b"),
                    name: "Partner B".to_string(),
                    share: 1,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner(id: &str, share: u32) -> Partner {
        Partner {
            id: PartnerId::new(id),
            name: id.to_uppercase(),
            share,
        }
    }

    #[test]
    fn default_roster_is_an_even_pair() {
        let roster = PartnerRoster::default();
        assert_eq!(roster.partners().len(), 2);
        assert_eq!(roster.total_share(), 2);
    }

    #[test]
    fn rejects_duplicates_and_bad_ids() {
        assert!(PartnerRoster::new(vec![partner("a", 1), partner("a", 1)]).is_err());
        assert!(PartnerRoster::new(vec![partner("a:b", 1)]).is_err());
        assert!(PartnerRoster::new(vec![partner("a", 0), partner("b", 0)]).is_err());
        assert!(PartnerRoster::new(Vec::new()).is_err());
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let roster = PartnerRoster::new(vec![partner("a", 1)]).unwrap();
        assert_eq!(roster.display_name(&PartnerId::new("a")), "A");
        assert_eq!(roster.display_name(&PartnerId::new("gone")), "gone");
    }
}
