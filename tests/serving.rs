use dvcm::ad::manager::{archive_ad, create_tag_ad, get_ad_by_id};
use dvcm::ad::AdId;
use dvcm::advertiser::manager::{archive_advertiser, create_advertiser};
use dvcm::asset_group::manager::{archive_asset_group, create_asset_group, get_asset_group_by_id};
use dvcm::asset_group::AssetGroupId;
use dvcm::campaign::manager::{archive_campaign, create_campaign, get_campaign_by_id, set_campaign_status};
use dvcm::campaign::{CampaignId, CampaignStatus};
use dvcm::creative::CreativeType;
use dvcm::partner::manager::create_partner;
use dvcm::serving::{compute_serving, recompute, ServingReason, ServingStatus};
use dvcm::{CreateAssetGroupBody, CreateCampaignBody, CreateTagAdBody, Store};

struct Hierarchy {
    store: Store,
    campaign_id: CampaignId,
    asset_group_id: AssetGroupId,
}

fn hierarchy() -> Hierarchy {
    let mut store = Store::new();
    let partner = create_partner(&mut store, "Partner".into()).unwrap();
    let advertiser = create_advertiser(&mut store, partner.id, "Acme".into()).unwrap();
    let campaign = create_campaign(
        &mut store,
        CreateCampaignBody {
            advertiser_id: advertiser.id,
            name: "Spring Sale".into(),
            start_date: None,
            end_date: None,
            targeting: None,
        },
    )
    .unwrap();
    let asset_group = create_asset_group(
        &mut store,
        CreateAssetGroupBody {
            campaign_id: campaign.id,
            name: "Banners".into(),
            default_bid: None,
            targeting: None,
            delivery_settings: None,
        },
    )
    .unwrap();

    Hierarchy {
        store,
        campaign_id: campaign.id,
        asset_group_id: asset_group.id,
    }
}

fn tag_ad(asset_group_id: AssetGroupId) -> CreateTagAdBody {
    CreateTagAdBody {
        asset_group_id,
        name: "Rectangle".into(),
        ad_type: None,
        input_type: CreativeType::DisplayThirdPartyTag,
        tag_text: "<ins class='dcmads' data-dcm-placement='N1'></ins>".into(),
        landing_url: None,
        brand_url: None,
        sponsored_by: None,
        cta_text: None,
        tracking_tags: None,
    }
}

fn snapshot(store: &Store) -> Vec<(ServingStatus, Vec<ServingReason>)> {
    let campaigns = store
        .campaigns
        .iter()
        .map(|c| (c.meta.serving_status, c.meta.serving_reasons.clone()));
    let asset_groups = store
        .asset_groups
        .iter()
        .map(|g| (g.meta.serving_status, g.meta.serving_reasons.clone()));
    let ads = store
        .ads
        .iter()
        .map(|a| (a.meta.serving_status, a.meta.serving_reasons.clone()));
    campaigns.chain(asset_groups).chain(ads).collect()
}

#[test]
fn draft_campaign_cascades_down_to_ads() {
    let Hierarchy {
        mut store,
        campaign_id,
        asset_group_id,
    } = hierarchy();
    let ad = create_tag_ad(&mut store, tag_ad(asset_group_id)).unwrap();

    let campaign = get_campaign_by_id(&store, campaign_id).unwrap();
    let asset_group = get_asset_group_by_id(&store, asset_group_id).unwrap();
    assert_eq!(campaign.meta.serving_reasons, vec![ServingReason::CampaignNotActive]);
    assert_eq!(asset_group.meta.serving_reasons, vec![ServingReason::CampaignNotActive]);
    assert_eq!(ad.meta.serving_reasons, vec![ServingReason::AssetGroupNotServing]);

    set_campaign_status(&mut store, campaign_id, CampaignStatus::Active).unwrap();
    let ad = get_ad_by_id(&store, ad.id).unwrap();
    assert_eq!(ad.meta.serving_status, ServingStatus::Serving);

    set_campaign_status(&mut store, campaign_id, CampaignStatus::Inactive).unwrap();
    let ad = get_ad_by_id(&store, ad.id).unwrap();
    assert_eq!(ad.meta.serving_reasons, vec![ServingReason::AssetGroupNotServing]);
}

#[test]
fn recompute_is_idempotent() {
    let Hierarchy {
        mut store,
        asset_group_id,
        ..
    } = hierarchy();
    create_tag_ad(&mut store, tag_ad(asset_group_id)).unwrap();

    let before = snapshot(&store);
    recompute(&mut store);
    recompute(&mut store);

    assert_eq!(snapshot(&store), before);
}

#[test]
fn archived_entities_report_only_archived() {
    let Hierarchy {
        mut store,
        campaign_id,
        asset_group_id,
    } = hierarchy();

    let asset_group = archive_asset_group(&mut store, asset_group_id).unwrap();
    let campaign = archive_campaign(&mut store, campaign_id).unwrap();

    assert_eq!(asset_group.meta.serving_reasons, vec![ServingReason::Archived]);
    assert_eq!(campaign.meta.serving_reasons, vec![ServingReason::Archived]);
    assert_eq!(
        compute_serving(&campaign, &store),
        (ServingStatus::NotServing, vec![ServingReason::Archived])
    );
}

#[test]
fn empty_asset_group_reports_no_ads() {
    let Hierarchy {
        mut store,
        campaign_id,
        asset_group_id,
    } = hierarchy();
    set_campaign_status(&mut store, campaign_id, CampaignStatus::Active).unwrap();

    let asset_group = get_asset_group_by_id(&store, asset_group_id).unwrap();
    assert_eq!(asset_group.meta.serving_reasons, vec![ServingReason::NoAds]);

    let ad = create_tag_ad(&mut store, tag_ad(asset_group_id)).unwrap();
    let asset_group = get_asset_group_by_id(&store, asset_group_id).unwrap();
    assert_eq!(asset_group.meta.serving_status, ServingStatus::Serving);

    archive_ad(&mut store, ad.id).unwrap();
    let asset_group = get_asset_group_by_id(&store, asset_group_id).unwrap();
    assert_eq!(asset_group.meta.serving_status, ServingStatus::Serving);
}

#[test]
fn missing_advertiser_is_a_reason_not_a_fault() {
    let Hierarchy {
        mut store,
        campaign_id,
        ..
    } = hierarchy();
    let mut orphan = get_campaign_by_id(&store, campaign_id).unwrap();
    orphan.id = CampaignId::new();
    orphan.advertiser_id = dvcm::advertiser::AdvertiserId::new();
    orphan.status = CampaignStatus::Active;
    store.campaigns.insert(orphan.clone());

    recompute(&mut store);

    let orphan = get_campaign_by_id(&store, orphan.id).unwrap();
    assert_eq!(orphan.meta.serving_status, ServingStatus::NotServing);
    assert_eq!(orphan.meta.serving_reasons, vec![ServingReason::AdvertiserNotFound]);
}

#[test]
fn archived_advertiser_is_reported_alongside_status() {
    let Hierarchy {
        mut store,
        campaign_id,
        ..
    } = hierarchy();
    let advertiser_id = get_campaign_by_id(&store, campaign_id).unwrap().advertiser_id;

    archive_advertiser(&mut store, advertiser_id).unwrap();

    let campaign = get_campaign_by_id(&store, campaign_id).unwrap();
    assert_eq!(
        campaign.meta.serving_reasons,
        vec![ServingReason::CampaignNotActive, ServingReason::AdvertiserArchived]
    );
}

#[test]
fn archived_campaign_is_reported_to_its_asset_groups() {
    let Hierarchy {
        mut store,
        campaign_id,
        asset_group_id,
    } = hierarchy();
    create_tag_ad(&mut store, tag_ad(asset_group_id)).unwrap();

    archive_campaign(&mut store, campaign_id).unwrap();

    let asset_group = get_asset_group_by_id(&store, asset_group_id).unwrap();
    assert_eq!(
        asset_group.meta.serving_reasons,
        vec![ServingReason::CampaignNotActive, ServingReason::CampaignArchived]
    );
}

#[test]
fn archived_asset_group_is_reported_to_its_ads() {
    let Hierarchy {
        mut store,
        campaign_id,
        asset_group_id,
    } = hierarchy();
    set_campaign_status(&mut store, campaign_id, CampaignStatus::Active).unwrap();
    let ad = create_tag_ad(&mut store, tag_ad(asset_group_id)).unwrap();
    assert_eq!(ad.meta.serving_status, ServingStatus::Serving);

    archive_asset_group(&mut store, asset_group_id).unwrap();

    let ad = get_ad_by_id(&store, ad.id).unwrap();
    assert_eq!(
        ad.meta.serving_reasons,
        vec![ServingReason::AssetGroupNotServing, ServingReason::AssetGroupArchived]
    );
}

#[test]
fn missing_campaign_is_reported_before_no_ads() {
    let Hierarchy {
        mut store,
        asset_group_id,
        ..
    } = hierarchy();
    let mut orphan = get_asset_group_by_id(&store, asset_group_id).unwrap();
    orphan.id = AssetGroupId::new();
    orphan.campaign_id = CampaignId::new();
    store.asset_groups.insert(orphan.clone());

    recompute(&mut store);

    let orphan = get_asset_group_by_id(&store, orphan.id).unwrap();
    assert_eq!(orphan.meta.serving_status, ServingStatus::NotServing);
    assert_eq!(
        orphan.meta.serving_reasons,
        vec![ServingReason::CampaignNotFound, ServingReason::NoAds]
    );
}

#[test]
fn missing_asset_group_is_a_reason_not_a_fault() {
    let Hierarchy {
        mut store,
        asset_group_id,
        ..
    } = hierarchy();
    let mut orphan = create_tag_ad(&mut store, tag_ad(asset_group_id)).unwrap();
    orphan.id = AdId::new();
    orphan.asset_group_id = AssetGroupId::new();
    store.ads.insert(orphan.clone());

    recompute(&mut store);

    let orphan = get_ad_by_id(&store, orphan.id).unwrap();
    assert_eq!(orphan.meta.serving_status, ServingStatus::NotServing);
    assert_eq!(orphan.meta.serving_reasons, vec![ServingReason::AssetGroupNotFound]);
}
