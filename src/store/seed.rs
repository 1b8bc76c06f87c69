//! Demo dataset written to an empty local store on first read

use rust_embed::Embed;

use crate::core::hierarchy::sort_okrs;
use crate::entities::Okr;
use crate::store::StoreError;

#[derive(Embed)]
#[folder = "seed/"]
struct SeedAssets;

const SEED_FILE: &str = "okrs.json";

/// Parse the embedded seed hierarchy
pub fn seed_okrs() -> Result<Vec<Okr>, StoreError> {
    let file = SeedAssets::get(SEED_FILE)
        .ok_or_else(|| StoreError::Seed(format!("{} not embedded", SEED_FILE)))?;
    let mut okrs: Vec<Okr> =
        serde_json::from_slice(&file.data).map_err(|e| StoreError::Seed(e.to_string()))?;
    sort_okrs(&mut okrs);
    Ok(okrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hierarchy::HierarchyIndex;

    #[test]
    fn test_seed_is_valid_forest() {
        let okrs = seed_okrs().unwrap();
        assert!(!okrs.is_empty());
        for okr in &okrs {
            okr.validate().unwrap();
        }

        let index = HierarchyIndex::new(&okrs);
        assert!(index.find_cycle().is_none());
        assert!(index.orphans().is_empty());
        assert!(index.roots().iter().all(|root| root.display_id.is_some()));
    }

    #[test]
    fn test_seed_roots_come_first_in_display_order() {
        let okrs = seed_okrs().unwrap();
        let labels: Vec<&str> = okrs
            .iter()
            .filter_map(|okr| okr.display_id.as_deref())
            .collect();
        assert_eq!(labels, vec!["OKR-1", "OKR-2", "OKR-3"]);
        assert!(okrs[0].is_root() && okrs[1].is_root() && okrs[2].is_root());
        assert!(!okrs[3].is_root());
    }
}
