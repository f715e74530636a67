use chrono::Utc;

use crate::advertiser::AdvertiserId;
use crate::database::{EntityMeta, Store};
use crate::error::Error;
use crate::serving;
use crate::violations::validate_name;

use super::{Campaign, CampaignId, CampaignStatus, CreateCampaignBody, UpdateCampaignBody};

fn assert_advertiser_exists(store: &Store, advertiser_id: AdvertiserId) -> Result<(), Error> {
    if !store.advertisers.contains(advertiser_id) {
        return Err(Error::AdvertiserExpected { advertiser_id });
    }

    Ok(())
}

#[tracing::instrument(skip(store))]
pub fn create_campaign(store: &mut Store, body: CreateCampaignBody) -> Result<Campaign, Error> {
    assert_advertiser_exists(store, body.advertiser_id)?;
    Error::check("Campaign validation failed", validate_name(&body.name))?;

    let campaign = Campaign {
        id: CampaignId::new(),
        advertiser_id: body.advertiser_id,
        name: body.name,
        status: CampaignStatus::Draft,
        start_date: body.start_date,
        end_date: body.end_date,
        targeting: body.targeting.unwrap_or_default(),
        meta: EntityMeta::new(Utc::now()),
    };
    let campaign_id = campaign.id;

    store.campaigns.insert(campaign);
    serving::recompute(store);

    get_campaign_by_id(store, campaign_id)
}

#[tracing::instrument(skip(store))]
pub fn get_campaigns(store: &Store) -> Vec<Campaign> {
    store.campaigns.iter().cloned().collect()
}

#[tracing::instrument(skip(store))]
pub fn get_campaign_by_id(store: &Store, campaign_id: CampaignId) -> Result<Campaign, Error> {
    store
        .campaigns
        .get(campaign_id)
        .cloned()
        .ok_or(Error::CampaignDoesNotExist { campaign_id })
}

#[tracing::instrument(skip(store))]
pub fn update_campaign(
    store: &mut Store,
    campaign_id: CampaignId,
    body: UpdateCampaignBody,
) -> Result<Campaign, Error> {
    if !store.campaigns.contains(campaign_id) {
        return Err(Error::CampaignDoesNotExist { campaign_id });
    }
    if let Some(advertiser_id) = body.advertiser_id {
        assert_advertiser_exists(store, advertiser_id)?;
    }
    if let Some(name) = &body.name {
        Error::check("Campaign validation failed", validate_name(name))?;
    }

    let campaign = store
        .campaigns
        .get_mut(campaign_id)
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    if let Some(advertiser_id) = body.advertiser_id {
        campaign.advertiser_id = advertiser_id;
    }
    if let Some(name) = body.name {
        campaign.name = name;
    }
    if let Some(start_date) = body.start_date {
        campaign.start_date = Some(start_date);
    }
    if let Some(end_date) = body.end_date {
        campaign.end_date = Some(end_date);
    }
    if let Some(targeting) = body.targeting {
        campaign.targeting = targeting;
    }
    campaign.meta.touch();

    serving::recompute(store);

    get_campaign_by_id(store, campaign_id)
}

#[tracing::instrument(skip(store))]
pub fn set_campaign_status(
    store: &mut Store,
    campaign_id: CampaignId,
    status: CampaignStatus,
) -> Result<Campaign, Error> {
    let campaign = store
        .campaigns
        .get_mut(campaign_id)
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    campaign.status = status;
    campaign.meta.touch();

    serving::recompute(store);

    get_campaign_by_id(store, campaign_id)
}

#[tracing::instrument(skip(store))]
pub fn archive_campaign(store: &mut Store, campaign_id: CampaignId) -> Result<Campaign, Error> {
    store
        .campaigns
        .get_mut(campaign_id)
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?
        .meta
        .archive();

    serving::recompute(store);

    get_campaign_by_id(store, campaign_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advertiser::manager::create_advertiser;
    use crate::partner::manager::create_partner;
    use crate::serving::{ServingReason, ServingStatus};

    fn campaign_body(advertiser_id: AdvertiserId) -> CreateCampaignBody {
        CreateCampaignBody {
            advertiser_id,
            name: "Spring Sale".into(),
            start_date: None,
            end_date: None,
            targeting: None,
        }
    }

    fn seeded_store() -> (Store, AdvertiserId) {
        let mut store = Store::new();
        let partner = create_partner(&mut store, "Partner".into()).unwrap();
        let advertiser = create_advertiser(&mut store, partner.id, "Acme".into()).unwrap();
        (store, advertiser.id)
    }

    #[test]
    fn new_campaign_is_draft_and_not_serving() {
        let (mut store, advertiser_id) = seeded_store();

        let campaign = create_campaign(&mut store, campaign_body(advertiser_id)).unwrap();

        assert_eq!(campaign.status, CampaignStatus::Draft);
        assert!(campaign.targeting.is_empty());
        assert_eq!(campaign.meta.serving_status, ServingStatus::NotServing);
        assert_eq!(
            campaign.meta.serving_reasons,
            vec![ServingReason::CampaignNotActive]
        );
    }

    #[test]
    fn activating_campaign_makes_it_serve() {
        let (mut store, advertiser_id) = seeded_store();
        let campaign = create_campaign(&mut store, campaign_body(advertiser_id)).unwrap();

        let campaign = set_campaign_status(&mut store, campaign.id, CampaignStatus::Active).unwrap();

        assert_eq!(campaign.meta.serving_status, ServingStatus::Serving);
        assert!(campaign.meta.serving_reasons.is_empty());
    }

    #[test]
    fn create_campaign_requires_existing_advertiser() {
        let mut store = Store::new();
        let advertiser_id = AdvertiserId::new();

        let result = create_campaign(&mut store, campaign_body(advertiser_id));

        assert_eq!(
            result.unwrap_err(),
            Error::AdvertiserExpected { advertiser_id }
        );
    }

    #[test]
    fn archived_advertiser_is_reported_on_campaign() {
        let (mut store, advertiser_id) = seeded_store();
        let campaign = create_campaign(&mut store, campaign_body(advertiser_id)).unwrap();
        set_campaign_status(&mut store, campaign.id, CampaignStatus::Active).unwrap();

        crate::advertiser::manager::archive_advertiser(&mut store, advertiser_id).unwrap();

        let campaign = get_campaign_by_id(&store, campaign.id).unwrap();
        assert_eq!(
            campaign.meta.serving_reasons,
            vec![ServingReason::AdvertiserArchived]
        );
    }
}
