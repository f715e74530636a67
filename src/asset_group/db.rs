use crate::campaign::CampaignId;
use crate::database::Table;

use super::AssetGroup;

pub trait AssetGroupStore {
    fn fetch_asset_groups_by_campaign(&self, campaign_id: CampaignId) -> Vec<&AssetGroup>;
}

impl AssetGroupStore for Table<AssetGroup> {
    fn fetch_asset_groups_by_campaign(&self, campaign_id: CampaignId) -> Vec<&AssetGroup> {
        self.iter()
            .filter(|asset_group| asset_group.campaign_id == campaign_id)
            .collect()
    }
}
