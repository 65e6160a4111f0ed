use serde::{Deserialize, Serialize};

use crate::inventory::InventoryItem;
use crate::CatalogError;

/// Category returned for ids that fall outside every declared range
pub const FALLBACK_CATEGORY: &str = "Miscellaneous";

/// A contiguous, inclusive band of item ids mapped to one category label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRange {
    pub lower: i64,
    pub upper: i64,
    pub category: String,
}

impl CategoryRange {
    pub fn new(lower: i64, upper: i64, category: impl Into<String>) -> Self {
        Self {
            lower,
            upper,
            category: category.into(),
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.lower <= id && id <= self.upper
    }
}

/// Map an item id to its category.
///
/// Ranges are scanned in declared order and the first match wins. Never fails:
/// ids outside every range map to [`FALLBACK_CATEGORY`].
pub fn category_for(id: i64, ranges: &[CategoryRange]) -> &str {
    ranges
        .iter()
        .find(|range| range.contains(id))
        .map(|range| range.category.as_str())
        .unwrap_or(FALLBACK_CATEGORY)
}

/// What is wrong with a declared range set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeIssue {
    Inverted { lower: i64, upper: i64 },
    EmptyLabel { lower: i64, upper: i64 },
    Overlap { first: (i64, i64), second: (i64, i64) },
    Gap { from: i64, to: i64 },
}

impl std::fmt::Display for RangeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeIssue::Inverted { lower, upper } => {
                write!(f, "range {}..={} has lower bound above upper bound", lower, upper)
            }
            RangeIssue::EmptyLabel { lower, upper } => {
                write!(f, "range {}..={} has an empty category label", lower, upper)
            }
            RangeIssue::Overlap { first, second } => write!(
                f,
                "range {}..={} overlaps range {}..={}",
                first.0, first.1, second.0, second.1
            ),
            RangeIssue::Gap { from, to } => {
                write!(f, "ids {}..={} are not covered by any range", from, to)
            }
        }
    }
}

/// How ids not covered by any range are treated when a catalog is declared
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CoveragePolicy {
    /// Any gap inside the inventory is a configuration error
    #[default]
    Strict,
    /// Uncovered ids map to the fallback category
    Fallback,
}

/// A validated, ordered set of category ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    ranges: Vec<CategoryRange>,
}

impl CategoryMap {
    /// Validate and wrap a range set, keeping the declared order
    pub fn new(ranges: Vec<CategoryRange>) -> Result<Self, CatalogError> {
        for range in &ranges {
            if range.lower > range.upper {
                return Err(CatalogError::InvalidRangeConfiguration(RangeIssue::Inverted {
                    lower: range.lower,
                    upper: range.upper,
                }));
            }
            if range.category.trim().is_empty() {
                return Err(CatalogError::InvalidRangeConfiguration(RangeIssue::EmptyLabel {
                    lower: range.lower,
                    upper: range.upper,
                }));
            }
        }

        let mut sorted: Vec<&CategoryRange> = ranges.iter().collect();
        sorted.sort_by_key(|r| (r.lower, r.upper));
        for pair in sorted.windows(2) {
            if pair[1].lower <= pair[0].upper {
                return Err(CatalogError::InvalidRangeConfiguration(RangeIssue::Overlap {
                    first: (pair[0].lower, pair[0].upper),
                    second: (pair[1].lower, pair[1].upper),
                }));
            }
        }

        Ok(Self { ranges })
    }

    /// The ten-category layout of the 487-template marketplace
    pub fn template_marketplace() -> Self {
        Self {
            ranges: default_template_ranges(),
        }
    }

    pub fn ranges(&self) -> &[CategoryRange] {
        &self.ranges
    }

    pub fn category_for(&self, id: i64) -> &str {
        category_for(id, &self.ranges)
    }

    pub fn item(&self, id: i64) -> InventoryItem {
        InventoryItem {
            id,
            category: self.category_for(id).to_string(),
        }
    }

    /// Distinct category labels in declaration order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for range in &self.ranges {
            if !seen.contains(&range.category.as_str()) {
                seen.push(range.category.as_str());
            }
        }
        seen
    }

    /// Ids a category owns within `[1, inventory_size]`
    pub fn span_of(&self, category: &str, inventory_size: u32) -> u64 {
        let max = i64::from(inventory_size);
        self.ranges
            .iter()
            .filter(|r| r.category == category)
            .map(|r| {
                let lower = r.lower.max(1);
                let upper = r.upper.min(max);
                if lower > upper {
                    0
                } else {
                    upper.abs_diff(lower) + 1
                }
            })
            .sum()
    }

    /// Report the first id band in `[1, inventory_size]` no range covers
    pub fn check_coverage(&self, inventory_size: u32) -> Result<(), CatalogError> {
        let max = i64::from(inventory_size);
        let mut sorted: Vec<&CategoryRange> = self.ranges.iter().collect();
        sorted.sort_by_key(|r| r.lower);

        let mut next = 1i64;
        for range in sorted {
            if next > max {
                break;
            }
            if range.upper < next {
                continue;
            }
            if range.lower > next {
                return Err(CatalogError::InvalidRangeConfiguration(RangeIssue::Gap {
                    from: next,
                    to: (range.lower - 1).min(max),
                }));
            }
            next = range.upper.saturating_add(1);
        }

        if next <= max {
            return Err(CatalogError::InvalidRangeConfiguration(RangeIssue::Gap {
                from: next,
                to: max,
            }));
        }
        Ok(())
    }
}

pub fn default_template_ranges() -> Vec<CategoryRange> {
    vec![
        CategoryRange::new(1, 60, "Corporate & Enterprise"),
        CategoryRange::new(61, 132, "Financial Services"),
        CategoryRange::new(133, 192, "E-commerce & Retail"),
        CategoryRange::new(193, 252, "Education & Training"),
        CategoryRange::new(253, 272, "Healthcare & Wellness"),
        CategoryRange::new(273, 312, "Community Impact"),
        CategoryRange::new(313, 372, "Creative & Media"),
        CategoryRange::new(373, 432, "Construction & Real Estate"),
        CategoryRange::new(433, 467, "Technology & SaaS"),
        CategoryRange::new(468, 487, "Research & Development"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bands() -> Vec<CategoryRange> {
        vec![CategoryRange::new(1, 60, "A"), CategoryRange::new(61, 132, "B")]
    }

    #[test]
    fn test_category_lookup() {
        let ranges = two_bands();
        assert_eq!(category_for(61, &ranges), "B");
        assert_eq!(category_for(5, &ranges), "A");
        assert_eq!(category_for(200, &ranges), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_boundaries_map_to_their_own_band() {
        let ranges = two_bands();
        assert_eq!(category_for(1, &ranges), "A");
        assert_eq!(category_for(60, &ranges), "A");
        assert_eq!(category_for(132, &ranges), "B");
        assert_eq!(category_for(133, &ranges), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_lookup_is_total() {
        let ranges = two_bands();
        for id in [i64::MIN, -1, 0, i64::MAX] {
            assert_eq!(category_for(id, &ranges), FALLBACK_CATEGORY);
        }
        assert_eq!(category_for(10, &[]), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_first_declared_match_wins() {
        // Unvalidated input; the raw lookup still answers deterministically.
        let ranges = vec![CategoryRange::new(1, 10, "first"), CategoryRange::new(5, 20, "second")];
        assert_eq!(category_for(7, &ranges), "first");
        assert_eq!(category_for(15, &ranges), "second");
    }

    #[test]
    fn test_every_default_id_maps_to_its_range() {
        let map = CategoryMap::template_marketplace();
        for range in map.ranges() {
            for id in range.lower..=range.upper {
                assert_eq!(map.category_for(id), range.category);
            }
        }
        assert!(map.check_coverage(487).is_ok());
        assert_eq!(map.categories().len(), 10);
    }

    #[test]
    fn test_rejects_overlap() {
        let err = CategoryMap::new(vec![
            CategoryRange::new(61, 132, "B"),
            CategoryRange::new(1, 61, "A"),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::InvalidRangeConfiguration(RangeIssue::Overlap { first: (1, 61), second: (61, 132) })
        ));
    }

    #[test]
    fn test_rejects_malformed_ranges() {
        assert!(matches!(
            CategoryMap::new(vec![CategoryRange::new(10, 1, "A")]),
            Err(CatalogError::InvalidRangeConfiguration(RangeIssue::Inverted { lower: 10, upper: 1 }))
        ));
        assert!(matches!(
            CategoryMap::new(vec![CategoryRange::new(1, 10, "  ")]),
            Err(CatalogError::InvalidRangeConfiguration(RangeIssue::EmptyLabel { .. }))
        ));
    }

    #[test]
    fn test_coverage_gaps() {
        let map = CategoryMap::new(vec![
            CategoryRange::new(1, 10, "A"),
            CategoryRange::new(15, 20, "B"),
        ])
        .unwrap();

        assert!(map.check_coverage(10).is_ok());
        assert!(matches!(
            map.check_coverage(20),
            Err(CatalogError::InvalidRangeConfiguration(RangeIssue::Gap { from: 11, to: 14 }))
        ));
        assert!(matches!(
            map.check_coverage(25),
            Err(CatalogError::InvalidRangeConfiguration(RangeIssue::Gap { from: 11, to: 14 }))
        ));

        let tail = CategoryMap::new(vec![CategoryRange::new(1, 10, "A")]).unwrap();
        assert!(matches!(
            tail.check_coverage(12),
            Err(CatalogError::InvalidRangeConfiguration(RangeIssue::Gap { from: 11, to: 12 }))
        ));

        let empty = CategoryMap::new(Vec::new()).unwrap();
        assert!(empty.check_coverage(0).is_ok());
        assert!(empty.check_coverage(3).is_err());
    }

    #[test]
    fn test_span_is_clipped_to_inventory() {
        let map = CategoryMap::template_marketplace();
        assert_eq!(map.span_of("Corporate & Enterprise", 487), 60);
        assert_eq!(map.span_of("Research & Development", 487), 20);
        assert_eq!(map.span_of("Research & Development", 470), 3);
        assert_eq!(map.span_of("Unknown", 487), 0);
    }

    #[test]
    fn test_full_i64_range_is_usable() {
        let map = CategoryMap::new(vec![CategoryRange::new(i64::MIN, i64::MAX, "All")]).unwrap();

        assert_eq!(map.category_for(i64::MIN), "All");
        assert_eq!(map.category_for(i64::MAX), "All");
        assert_eq!(map.span_of("All", u32::MAX), u64::from(u32::MAX));
        assert!(map.check_coverage(u32::MAX).is_ok());
    }
}
