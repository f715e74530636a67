use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::ad::{Ad, AdContent, AdId};
use crate::advertiser::Advertiser;
use crate::asset_group::AssetGroup;
use crate::campaign::Campaign;
use crate::partner::Partner;
use crate::serving::{ServingReason, ServingStatus};
use crate::typedid::{TypedId, TypedIdMarker};

/// The store shared between request handlers. Every mutation and the
/// recompute pass that follows it must happen under a single lock.
pub type SharedStore = Mutex<Store>;

/// Fields every entity carries regardless of kind.
#[derive(Clone, Debug)]
pub struct EntityMeta {
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub serving_status: ServingStatus,
    pub serving_reasons: Vec<ServingReason>,
}

impl EntityMeta {
    pub fn new(now: DateTime<Utc>) -> EntityMeta {
        EntityMeta {
            archived: false,
            created_at: now,
            modified_at: now,
            serving_status: ServingStatus::NotServing,
            serving_reasons: vec![],
        }
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    pub fn archive(&mut self) {
        self.archived = true;
        self.touch();
    }
}

pub trait Entity: TypedIdMarker + Sized {
    fn id(&self) -> TypedId<Self>;
    fn meta(&self) -> &EntityMeta;
    fn meta_mut(&mut self) -> &mut EntityMeta;
}

/// Insertion-ordered records of a single entity kind.
#[derive(Debug)]
pub struct Table<T: Entity> {
    rows: IndexMap<TypedId<T>, T>,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Table<T> {
        Table {
            rows: IndexMap::new(),
        }
    }
}

impl<T: Entity> Table<T> {
    pub fn insert(&mut self, entity: T) {
        self.rows.insert(entity.id(), entity);
    }

    pub fn get(&self, id: TypedId<T>) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: TypedId<T>) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: TypedId<T>) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// In-memory source of truth for the whole entity hierarchy. The store
/// enforces no invariants; managers check references before writing.
#[derive(Debug, Default)]
pub struct Store {
    pub partners: Table<Partner>,
    pub advertisers: Table<Advertiser>,
    pub campaigns: Table<Campaign>,
    pub asset_groups: Table<AssetGroup>,
    pub ads: Table<Ad>,
    ad_content: HashMap<AdId, AdContent>,
}

impl Store {
    pub fn new() -> Store {
        Store::default()
    }

    pub fn insert_ad_content(&mut self, ad_id: AdId, content: AdContent) {
        self.ad_content.insert(ad_id, content);
    }

    pub fn fetch_ad_content(&self, ad_id: AdId) -> Option<&AdContent> {
        self.ad_content.get(&ad_id)
    }

    pub fn has_ad_content(&self, ad_id: AdId) -> bool {
        self.ad_content.contains_key(&ad_id)
    }
}

/// Wire form of [`EntityMeta`], flattened into every entity body.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetaBody {
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub serving_status: ServingStatus,
    pub serving_reasons: Vec<ServingReason>,
}

impl EntityMetaBody {
    pub fn render(meta: EntityMeta) -> EntityMetaBody {
        EntityMetaBody {
            archived: meta.archived,
            created_at: meta.created_at,
            updated_at: meta.modified_at,
            serving_status: meta.serving_status,
            serving_reasons: meta.serving_reasons,
        }
    }
}
