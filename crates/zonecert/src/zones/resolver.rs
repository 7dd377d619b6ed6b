use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Coordinate, DesignationType, TemporalState, ZoneId};
use super::index::ZoneIndexCell;

/// Zone-designation verdict for a coordinate as of a given date.
///
/// The three outcomes matter downstream: an active zone and a grace-period
/// zone are both eligible, and callers must not read "no active zone" as an
/// immediate disqualification while a grace window is open. When every
/// containing zone has lapsed, the verdict still names the most specific
/// lapsed zone so audit output can say what the business used to rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub is_eligible: bool,
    pub zone_id: Option<ZoneId>,
    pub designation: Option<DesignationType>,
    pub in_grace_period: bool,
    pub grace_days_remaining: Option<i64>,
}

impl EligibilityVerdict {
    fn ineligible(zone_id: Option<ZoneId>, designation: Option<DesignationType>) -> Self {
        Self {
            is_eligible: false,
            zone_id,
            designation,
            in_grace_period: false,
            grace_days_remaining: None,
        }
    }
}

/// Resolves coordinates against the current zone index snapshot.
pub struct EligibilityResolver {
    zones: Arc<ZoneIndexCell>,
}

impl EligibilityResolver {
    pub fn new(zones: Arc<ZoneIndexCell>) -> Self {
        Self { zones }
    }

    pub fn resolve(&self, point: Coordinate, as_of: NaiveDate) -> EligibilityVerdict {
        let index = self.zones.snapshot();
        let overlaps = index.resolve(point);

        if overlaps.is_empty() {
            return EligibilityVerdict::ineligible(None, None);
        }

        // Overlap list is already ordered most specific first; prefer the
        // first active zone, then the first zone still in grace.
        for zone in &overlaps {
            if zone.temporal_state(as_of) == TemporalState::Active {
                return EligibilityVerdict {
                    is_eligible: true,
                    zone_id: Some(zone.id.clone()),
                    designation: Some(zone.designation),
                    in_grace_period: false,
                    grace_days_remaining: None,
                };
            }
        }
        for zone in &overlaps {
            if let TemporalState::Grace { days_remaining } = zone.temporal_state(as_of) {
                return EligibilityVerdict {
                    is_eligible: true,
                    zone_id: Some(zone.id.clone()),
                    designation: Some(zone.designation),
                    in_grace_period: true,
                    grace_days_remaining: Some(days_remaining),
                };
            }
        }

        let lapsed = overlaps[0];
        EligibilityVerdict::ineligible(Some(lapsed.id.clone()), Some(lapsed.designation))
    }
}
