use std::str::FromStr;

use chrono::Utc;
use serde_json::Map;
use tracing::info;

use crate::ad::{Ad, AdType};
use crate::advertiser::Advertiser;
use crate::asset_group::{AssetGroup, Bid};
use crate::campaign::{Campaign, CampaignStatus};
use crate::creative::{self, CreativeType};
use crate::database::{EntityMeta, Store};
use crate::error::Error;
use crate::partner::Partner;
use crate::serving;
use crate::typedid::{TypedId, TypedIdMarker};

const DEMO_TAG: &str = "<ins class='dcmads' style='display:inline-block;width:300px;height:250px' data-dcm-placement='N1234.5678/B9012345.678901234' data-dcm-rendering-mode='iframe' data-dcm-click-tracker='%%CLICK_URL_UNESC%%'></ins>";

fn fixed_id<T: TypedIdMarker>(text: &str) -> Result<TypedId<T>, Error> {
    TypedId::from_str(text)
        .map_err(|err| Error::ExistentialState(format!("bad seed id {}: {}", text, err)))
}

/// Fills the store with a small, fully serving hierarchy under fixed IDs.
pub fn seed(store: &mut Store) -> Result<(), Error> {
    let partner_id = fixed_id("PTR-0B6D1F0E-8B0A-4C55-9D2E-6F1C2A7B3E10")?;
    let advertiser_id = fixed_id("ADV-5A1E7C43-2D9B-4F86-A0C3-1B7E9D4F2A61")?;
    let campaign_id = fixed_id("CPN-16E77539-8873-4C8A-BCA3-2036010474AD")?;
    let asset_group_id = fixed_id("AGP-3C9F2B71-6E4D-4A08-B5F2-8D1A7C6E0B93")?;
    let ad_id = fixed_id("ADS-7D2A4E95-1F3B-4C67-9A8E-2B5D6C1F0A84")?;

    let now = Utc::now();

    store.partners.insert(Partner {
        id: partner_id,
        name: "Demo Partner".to_string(),
        meta: EntityMeta::new(now),
    });
    store.advertisers.insert(Advertiser {
        id: advertiser_id,
        partner_id,
        name: "Acme Outdoor".to_string(),
        meta: EntityMeta::new(now),
    });
    store.campaigns.insert(Campaign {
        id: campaign_id,
        advertiser_id,
        name: "Spring Trail Launch".to_string(),
        status: CampaignStatus::Active,
        start_date: None,
        end_date: None,
        targeting: Map::new(),
        meta: EntityMeta::new(now),
    });
    store.asset_groups.insert(AssetGroup {
        id: asset_group_id,
        campaign_id,
        name: "Medium Rectangles".to_string(),
        default_bid: Bid {
            amount: 2.5,
            currency: "USD".to_string(),
        },
        targeting: Map::new(),
        delivery_settings: Map::new(),
        meta: EntityMeta::new(now),
    });

    let creative = creative::ingest_tag(CreativeType::DisplayThirdPartyTag, DEMO_TAG, vec![])?;
    store.ads.insert(Ad {
        id: ad_id,
        asset_group_id,
        name: "Trail Runner 300x250".to_string(),
        ad_type: AdType::Display,
        input_type: creative.creative_type,
        landing_url: Some("https://acme.example.com/trail".to_string()),
        brand_url: None,
        sponsored_by: Some("Acme Outdoor".to_string()),
        cta_text: Some("Shop now".to_string()),
        tag_text: Some(DEMO_TAG.to_string()),
        filename: None,
        metadata: creative.metadata,
        macro_tokens: creative.macro_tokens,
        tracking_tags: creative.tracking_tags,
        substituted_preview: creative.substituted_preview,
        generated_vast_wrapper: creative.generated_vast,
        content_url: None,
        meta: EntityMeta::new(now),
    });

    serving::recompute(store);

    info!(
        partners = store.partners.len(),
        ads = store.ads.len(),
        "seeded demo data"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serving::ServingStatus;

    #[test]
    fn seeded_hierarchy_serves() {
        let mut store = Store::new();

        seed(&mut store).unwrap();

        assert!(store
            .ads
            .iter()
            .all(|ad| ad.meta.serving_status == ServingStatus::Serving));
        assert!(store
            .campaigns
            .iter()
            .all(|campaign| campaign.meta.serving_status == ServingStatus::Serving));
    }
}
