use chrono::Utc;

use crate::campaign::CampaignId;
use crate::database::{EntityMeta, Store};
use crate::error::Error;
use crate::serving;
use crate::violations::validate_name;

use super::db::AssetGroupStore;
use super::{AssetGroup, AssetGroupId, Bid, CreateAssetGroupBody, UpdateAssetGroupBody};

fn assert_campaign_exists(store: &Store, campaign_id: CampaignId) -> Result<(), Error> {
    if !store.campaigns.contains(campaign_id) {
        return Err(Error::CampaignExpected { campaign_id });
    }

    Ok(())
}

#[tracing::instrument(skip(store))]
pub fn create_asset_group(
    store: &mut Store,
    body: CreateAssetGroupBody,
) -> Result<AssetGroup, Error> {
    assert_campaign_exists(store, body.campaign_id)?;
    Error::check("Asset group validation failed", validate_name(&body.name))?;

    let asset_group = AssetGroup {
        id: AssetGroupId::new(),
        campaign_id: body.campaign_id,
        name: body.name,
        default_bid: body.default_bid.map(Bid::normalize).unwrap_or_default(),
        targeting: body.targeting.unwrap_or_default(),
        delivery_settings: body.delivery_settings.unwrap_or_default(),
        meta: EntityMeta::new(Utc::now()),
    };
    let asset_group_id = asset_group.id;

    store.asset_groups.insert(asset_group);
    serving::recompute(store);

    get_asset_group_by_id(store, asset_group_id)
}

#[tracing::instrument(skip(store))]
pub fn get_asset_groups(store: &Store, campaign_id: Option<CampaignId>) -> Vec<AssetGroup> {
    match campaign_id {
        Some(campaign_id) => store
            .asset_groups
            .fetch_asset_groups_by_campaign(campaign_id)
            .into_iter()
            .cloned()
            .collect(),
        None => store.asset_groups.iter().cloned().collect(),
    }
}

#[tracing::instrument(skip(store))]
pub fn get_asset_group_by_id(
    store: &Store,
    asset_group_id: AssetGroupId,
) -> Result<AssetGroup, Error> {
    store
        .asset_groups
        .get(asset_group_id)
        .cloned()
        .ok_or(Error::AssetGroupDoesNotExist { asset_group_id })
}

#[tracing::instrument(skip(store))]
pub fn update_asset_group(
    store: &mut Store,
    asset_group_id: AssetGroupId,
    body: UpdateAssetGroupBody,
) -> Result<AssetGroup, Error> {
    if !store.asset_groups.contains(asset_group_id) {
        return Err(Error::AssetGroupDoesNotExist { asset_group_id });
    }
    if let Some(campaign_id) = body.campaign_id {
        assert_campaign_exists(store, campaign_id)?;
    }
    if let Some(name) = &body.name {
        Error::check("Asset group validation failed", validate_name(name))?;
    }

    let asset_group = store
        .asset_groups
        .get_mut(asset_group_id)
        .ok_or(Error::AssetGroupDoesNotExist { asset_group_id })?;

    if let Some(campaign_id) = body.campaign_id {
        asset_group.campaign_id = campaign_id;
    }
    if let Some(name) = body.name {
        asset_group.name = name;
    }
    if let Some(default_bid) = body.default_bid {
        asset_group.default_bid = Bid::normalize(default_bid);
    }
    if let Some(targeting) = body.targeting {
        asset_group.targeting = targeting;
    }
    if let Some(delivery_settings) = body.delivery_settings {
        asset_group.delivery_settings = delivery_settings;
    }
    asset_group.meta.touch();

    serving::recompute(store);

    get_asset_group_by_id(store, asset_group_id)
}

#[tracing::instrument(skip(store))]
pub fn archive_asset_group(
    store: &mut Store,
    asset_group_id: AssetGroupId,
) -> Result<AssetGroup, Error> {
    store
        .asset_groups
        .get_mut(asset_group_id)
        .ok_or(Error::AssetGroupDoesNotExist { asset_group_id })?
        .meta
        .archive();

    serving::recompute(store);

    get_asset_group_by_id(store, asset_group_id)
}
