use serde::{Deserialize, Serialize};

use crate::asset_group::AssetGroupId;
use crate::creative::{CreativeMetadata, CreativeType};
use crate::database::{Entity, EntityMeta};
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type AdId = TypedId<Ad>;

/// Ads accept the same input kinds the ingestion pipeline produces.
pub type InputType = CreativeType;

#[derive(Clone, Debug)]
pub struct Ad {
    pub id: AdId,
    pub asset_group_id: AssetGroupId,
    pub name: String,
    pub ad_type: AdType,
    pub input_type: InputType,
    pub landing_url: Option<String>,
    pub brand_url: Option<String>,
    pub sponsored_by: Option<String>,
    pub cta_text: Option<String>,
    pub tag_text: Option<String>,
    pub filename: Option<String>,
    pub metadata: CreativeMetadata,
    pub macro_tokens: Vec<String>,
    pub tracking_tags: Vec<String>,
    pub substituted_preview: Option<String>,
    pub generated_vast_wrapper: Option<String>,
    /// Set when binary content was stored alongside the ad.
    pub content_url: Option<String>,
    pub meta: EntityMeta,
}

impl TypedIdMarker for Ad {
    fn tag() -> &'static str {
        "ADS"
    }
}

impl Entity for Ad {
    fn id(&self) -> AdId {
        self.id
    }

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdType {
    Display,
    Video,
}

impl Default for AdType {
    fn default() -> AdType {
        AdType::Display
    }
}

/// Uploaded bytes, kept outside the ad record itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdContent {
    pub bytes: Vec<u8>,
    pub content_type: String,
}
