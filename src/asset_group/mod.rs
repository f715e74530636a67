use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::campaign::CampaignId;
use crate::database::{Entity, EntityMeta};
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type AssetGroupId = TypedId<AssetGroup>;

#[derive(Clone, Debug)]
pub struct AssetGroup {
    pub id: AssetGroupId,
    pub campaign_id: CampaignId,
    pub name: String,
    pub default_bid: Bid,
    pub targeting: Map<String, Value>,
    pub delivery_settings: Map<String, Value>,
    pub meta: EntityMeta,
}

impl TypedIdMarker for AssetGroup {
    fn tag() -> &'static str {
        "AGP"
    }
}

impl Entity for AssetGroup {
    fn id(&self) -> AssetGroupId {
        self.id
    }

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub amount: f64,
    pub currency: String,
}

impl Default for Bid {
    fn default() -> Bid {
        Bid {
            amount: 0.0,
            currency: DEFAULT_CURRENCY.to_owned(),
        }
    }
}

impl Bid {
    /// Fills in whatever the client left out. A blank currency counts as absent.
    pub fn normalize(body: BidBody) -> Bid {
        let currency = body
            .currency
            .filter(|currency| !currency.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());

        Bid {
            amount: body.amount.unwrap_or(0.0),
            currency,
        }
    }
}
