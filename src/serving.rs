//! Serving-status propagation.
//!
//! Every entity's serving status is derived from the current contents of the
//! store. [`recompute`] rebuilds all of them in one pass and is invoked after
//! every mutation, so derived values are never stale.
//!
//! Pass order is campaigns, asset groups, ads. An ad reads the freshly
//! computed status of its asset group; an asset group only reads raw campaign
//! fields and the existence of ads. Partners and advertisers have no
//! dependents that read their derived status.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ad::db::AdStore;
use crate::ad::Ad;
use crate::advertiser::Advertiser;
use crate::asset_group::AssetGroup;
use crate::campaign::{Campaign, CampaignStatus};
use crate::database::{Entity, Store, Table};
use crate::partner::Partner;
use crate::typedid::TypedId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
    NotServing,
}

/// Why an entity is not serving.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingReason {
    Archived,
    CampaignNotActive,
    AdvertiserNotFound,
    AdvertiserArchived,
    CampaignNotFound,
    CampaignArchived,
    NoAds,
    AssetGroupNotFound,
    AssetGroupNotServing,
    AssetGroupArchived,
}

/// Kind-specific serving checks, run only for non-archived entities.
pub trait Servable: Entity {
    fn check(&self, store: &Store, reasons: &mut Vec<ServingReason>);
}

impl Servable for Partner {
    fn check(&self, _store: &Store, _reasons: &mut Vec<ServingReason>) {}
}

impl Servable for Advertiser {
    fn check(&self, _store: &Store, _reasons: &mut Vec<ServingReason>) {}
}

impl Servable for Campaign {
    fn check(&self, store: &Store, reasons: &mut Vec<ServingReason>) {
        if self.status != CampaignStatus::Active {
            reasons.push(ServingReason::CampaignNotActive);
        }

        match store.advertisers.get(self.advertiser_id) {
            None => reasons.push(ServingReason::AdvertiserNotFound),
            Some(advertiser) if advertiser.meta.archived => {
                reasons.push(ServingReason::AdvertiserArchived)
            }
            Some(_) => {}
        }
    }
}

impl Servable for AssetGroup {
    fn check(&self, store: &Store, reasons: &mut Vec<ServingReason>) {
        match store.campaigns.get(self.campaign_id) {
            None => reasons.push(ServingReason::CampaignNotFound),
            Some(campaign) => {
                if campaign.status != CampaignStatus::Active {
                    reasons.push(ServingReason::CampaignNotActive);
                }
                if campaign.meta.archived {
                    reasons.push(ServingReason::CampaignArchived);
                }
            }
        }

        if store.ads.count_ads_by_asset_group(self.id) == 0 {
            reasons.push(ServingReason::NoAds);
        }
    }
}

impl Servable for Ad {
    fn check(&self, store: &Store, reasons: &mut Vec<ServingReason>) {
        match store.asset_groups.get(self.asset_group_id) {
            None => reasons.push(ServingReason::AssetGroupNotFound),
            Some(asset_group) => {
                if asset_group.meta.serving_status != ServingStatus::Serving {
                    reasons.push(ServingReason::AssetGroupNotServing);
                }
                if asset_group.meta.archived {
                    reasons.push(ServingReason::AssetGroupArchived);
                }
            }
        }
    }
}

/// Derives the serving status of a single entity from the current store.
pub fn compute_serving<T: Servable>(entity: &T, store: &Store) -> (ServingStatus, Vec<ServingReason>) {
    if entity.meta().archived {
        return (ServingStatus::NotServing, vec![ServingReason::Archived]);
    }

    let mut reasons = vec![];
    entity.check(store, &mut reasons);

    if reasons.is_empty() {
        (ServingStatus::Serving, reasons)
    } else {
        (ServingStatus::NotServing, reasons)
    }
}

type Outcome<T> = (TypedId<T>, ServingStatus, Vec<ServingReason>);

fn evaluate<T: Servable>(table: &Table<T>, store: &Store) -> Vec<Outcome<T>> {
    table
        .iter()
        .map(|entity| {
            let (status, reasons) = compute_serving(entity, store);
            (entity.id(), status, reasons)
        })
        .collect()
}

fn apply<T: Servable>(table: &mut Table<T>, outcomes: Vec<Outcome<T>>) {
    for (id, status, reasons) in outcomes {
        if let Some(entity) = table.get_mut(id) {
            let meta = entity.meta_mut();
            meta.serving_status = status;
            meta.serving_reasons = reasons;
        }
    }
}

/// Recomputes the serving status and reasons of every entity in the store.
#[tracing::instrument(skip(store))]
pub fn recompute(store: &mut Store) {
    let outcomes = evaluate(&store.campaigns, store);
    apply(&mut store.campaigns, outcomes);

    let outcomes = evaluate(&store.asset_groups, store);
    apply(&mut store.asset_groups, outcomes);

    let outcomes = evaluate(&store.ads, store);
    apply(&mut store.ads, outcomes);

    let outcomes = evaluate(&store.partners, store);
    apply(&mut store.partners, outcomes);

    let outcomes = evaluate(&store.advertisers, store);
    apply(&mut store.advertisers, outcomes);

    debug!(
        campaigns = store.campaigns.len(),
        asset_groups = store.asset_groups.len(),
        ads = store.ads.len(),
        "recomputed serving status"
    );
}
