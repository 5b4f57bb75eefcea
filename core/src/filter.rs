use crate::{
    tables::StoreGap,
    types::{GroupId, RegionId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Row filter over the cluster gap table. Criteria are AND-ed; an unset
/// criterion matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GapFilter {
    pub groups: Option<Vec<GroupId>>,
    pub regions: Option<Vec<RegionId>>,
    /// Inclusive `(min, max)` on the revenue gap.
    pub revenue_range: Option<(f64, f64)>,
}

impl GapFilter {
    pub fn groups(mut self, groups: impl IntoIterator<Item = impl Into<GroupId>>) -> Self {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    pub fn regions(mut self, regions: impl IntoIterator<Item = RegionId>) -> Self {
        self.regions = Some(regions.into_iter().collect());
        self
    }

    pub fn revenue_range(mut self, min: f64, max: f64) -> Self {
        self.revenue_range = Some((min, max));
        self
    }

    /// `regions` resolves a store's region when the row itself has none.
    pub fn matches(&self, gap: &StoreGap, regions: &HashMap<&str, RegionId>) -> bool {
        if let Some(groups) = &self.groups {
            if !groups.contains(&gap.group) {
                return false;
            }
        }
        if let Some(wanted) = &self.regions {
            let region = gap
                .region_id
                .or_else(|| regions.get(gap.store_name.as_str()).copied());
            match region {
                Some(r) if wanted.contains(&r) => {}
                _ => return false,
            }
        }
        if let Some((min, max)) = self.revenue_range {
            if gap.gap_revenue < min || gap.gap_revenue > max {
                return false;
            }
        }
        true
    }
}
