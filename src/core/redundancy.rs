use crate::core::compound_name::{split_pair, AZURE_DELIMITER};
use crate::core::errors::Result;
use std::cmp::Ordering;

/*-------------------------------------------------------------------------------------------------
  Region Service Pair
-------------------------------------------------------------------------------------------------*/

/// The (region, service) key a CIDR is recorded under within one provider.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RegionServicePair {
    pub region: String,
    pub service: String,
}

impl RegionServicePair {
    pub fn new(region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Redundancy Policy
-------------------------------------------------------------------------------------------------*/

/// Strategy deciding when two (region, service) pairs holding the same CIDR describe the same
/// scope.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RedundancyPolicy {
    /// Pairs are redundant only when identical; repeated triples collapse into one entry.
    #[default]
    ExactMatch,

    /// Region and service are `outer/inner` compound names. A pair whose inner component is
    /// empty covers every inner value under the same outer component; the CIDR is kept only
    /// under the most specific pair.
    HierarchicalSubset,
}

/// Decide which of two pairs holding the same CIDR keeps it.
///
/// Returns the surviving pair when one subsumes the other, or `None` when both must be retained.
/// Identical pairs resolve to `a`, so the first-seen pair wins ties.
///
/// ```
/// use cloudipranges::redundancy::{resolve, RedundancyPolicy, RegionServicePair};
///
/// let broad = RegionServicePair::new("Public", "Azure");
/// let specific = RegionServicePair::new("Public/eastus", "Azure/AzureStorage");
///
/// let survivor = resolve(&broad, &specific, RedundancyPolicy::HierarchicalSubset).unwrap();
/// assert_eq!(survivor, Some(&specific));
/// assert_eq!(resolve(&broad, &specific, RedundancyPolicy::ExactMatch).unwrap(), None);
/// ```
pub fn resolve<'p>(
    a: &'p RegionServicePair,
    b: &'p RegionServicePair,
    policy: RedundancyPolicy,
) -> Result<Option<&'p RegionServicePair>> {
    match policy {
        RedundancyPolicy::ExactMatch => Ok((a == b).then_some(a)),
        RedundancyPolicy::HierarchicalSubset => resolve_hierarchical(a, b),
    }
}

fn resolve_hierarchical<'p>(
    a: &'p RegionServicePair,
    b: &'p RegionServicePair,
) -> Result<Option<&'p RegionServicePair>> {
    let region = compare_specificity(&a.region, &b.region)?;
    let service = compare_specificity(&a.service, &b.service)?;

    let survivor = match (region, service) {
        (Some(Ordering::Equal), Some(Ordering::Equal)) => Some(a),
        (Some(region), Some(service)) if region != Ordering::Less && service != Ordering::Less => {
            Some(a)
        }
        (Some(region), Some(service))
            if region != Ordering::Greater && service != Ordering::Greater =>
        {
            Some(b)
        }
        _ => None,
    };
    Ok(survivor)
}

/// Compare how specific two compound names are.
///
/// `Greater` means `a` is more specific than `b` (same outer component, only `a` has an inner
/// component), `Less` the opposite, `Equal` identical names. `None` means the names are unrelated.
fn compare_specificity(a: &str, b: &str) -> Result<Option<Ordering>> {
    let (a_outer, a_inner) = split_pair(AZURE_DELIMITER, a)?;
    let (b_outer, b_inner) = split_pair(AZURE_DELIMITER, b)?;

    if a_outer != b_outer {
        return Ok(None);
    }
    let ordering = match (a_inner.is_empty(), b_inner.is_empty()) {
        _ if a_inner == b_inner => Some(Ordering::Equal),
        (false, true) => Some(Ordering::Greater),
        (true, false) => Some(Ordering::Less),
        _ => None,
    };
    Ok(ordering)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::Error;

    fn pair(region: &str, service: &str) -> RegionServicePair {
        RegionServicePair::new(region, service)
    }

    /*----------------------------------------------------------------------------------
      Exact Match
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_exact_match_equal_pairs() {
        let a = pair("us-east-1", "EC2");
        let b = pair("us-east-1", "EC2");
        let survivor = resolve(&a, &b, RedundancyPolicy::ExactMatch).unwrap();
        assert!(std::ptr::eq(survivor.unwrap(), &a));
    }

    #[test]
    fn test_exact_match_different_service() {
        let a = pair("us-east-1", "EC2");
        let b = pair("us-east-1", "S3");
        assert_eq!(resolve(&a, &b, RedundancyPolicy::ExactMatch).unwrap(), None);
    }

    #[test]
    fn test_exact_match_ignores_delimiters() {
        // Oracle service names contain `|`; Exact match never splits them.
        let a = pair("us-phoenix-1", "OBJECT_STORAGE|OSN");
        let b = pair("us-phoenix-1", "OBJECT_STORAGE");
        assert_eq!(resolve(&a, &b, RedundancyPolicy::ExactMatch).unwrap(), None);
    }

    /*----------------------------------------------------------------------------------
      Hierarchical Subset
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_hierarchical_more_specific_service_wins() {
        let broad = pair("cloud", "platform");
        let specific = pair("cloud", "platform/service");
        let policy = RedundancyPolicy::HierarchicalSubset;
        assert_eq!(resolve(&broad, &specific, policy).unwrap(), Some(&specific));
        assert_eq!(resolve(&specific, &broad, policy).unwrap(), Some(&specific));
    }

    #[test]
    fn test_hierarchical_more_specific_in_both_dimensions_wins() {
        let broad = pair("cloud", "platform");
        let specific = pair("cloud/region", "platform/service");
        let policy = RedundancyPolicy::HierarchicalSubset;
        assert_eq!(resolve(&broad, &specific, policy).unwrap(), Some(&specific));
    }

    #[test]
    fn test_hierarchical_crossed_specificity_retains_both() {
        let regional = pair("cloud/region", "platform");
        let service = pair("cloud", "platform/service");
        let policy = RedundancyPolicy::HierarchicalSubset;
        assert_eq!(resolve(&regional, &service, policy).unwrap(), None);
        assert_eq!(resolve(&service, &regional, policy).unwrap(), None);
    }

    #[test]
    fn test_hierarchical_sibling_inner_values_retain_both() {
        let east = pair("cloud/eastus", "platform/service");
        let west = pair("cloud/westus", "platform/service");
        let policy = RedundancyPolicy::HierarchicalSubset;
        assert_eq!(resolve(&east, &west, policy).unwrap(), None);
    }

    #[test]
    fn test_hierarchical_different_outer_retains_both() {
        let public = pair("Public", "Azure");
        let government = pair("AzureGovernment/usgovcentral", "Azure/AzureStorage");
        let policy = RedundancyPolicy::HierarchicalSubset;
        assert_eq!(resolve(&public, &government, policy).unwrap(), None);

        let other_platform = pair("Public/eastus", "Other/AzureStorage");
        let azure = pair("Public", "Azure");
        assert_eq!(resolve(&azure, &other_platform, policy).unwrap(), None);
    }

    #[test]
    fn test_hierarchical_tie_prefers_first_seen() {
        let a = pair("cloud/region", "platform/service");
        let b = pair("cloud/region", "platform/service");
        let survivor = resolve(&a, &b, RedundancyPolicy::HierarchicalSubset).unwrap();
        assert!(std::ptr::eq(survivor.unwrap(), &a));
    }

    #[test]
    fn test_hierarchical_rejects_malformed_compound_names() {
        let malformed = pair("cloud/region/extra", "platform");
        let valid = pair("cloud", "platform");
        let result = resolve(&malformed, &valid, RedundancyPolicy::HierarchicalSubset);
        assert!(matches!(result, Err(Error::InvalidCompoundName { .. })));
    }
}
