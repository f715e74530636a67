use crate::asset_group::AssetGroupId;
use crate::database::Table;

use super::Ad;

pub trait AdStore {
    fn fetch_ads_by_asset_group(&self, asset_group_id: AssetGroupId) -> Vec<&Ad>;
    fn count_ads_by_asset_group(&self, asset_group_id: AssetGroupId) -> usize;
}

impl AdStore for Table<Ad> {
    fn fetch_ads_by_asset_group(&self, asset_group_id: AssetGroupId) -> Vec<&Ad> {
        self.iter()
            .filter(|ad| ad.asset_group_id == asset_group_id)
            .collect()
    }

    /// Archived ads are counted too.
    fn count_ads_by_asset_group(&self, asset_group_id: AssetGroupId) -> usize {
        self.iter()
            .filter(|ad| ad.asset_group_id == asset_group_id)
            .count()
    }
}
