use crate::database::{Entity, EntityMeta};
use crate::partner::PartnerId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type AdvertiserId = TypedId<Advertiser>;

#[derive(Clone, Debug)]
pub struct Advertiser {
    pub id: AdvertiserId,
    pub partner_id: PartnerId,
    pub name: String,
    pub meta: EntityMeta,
}

impl TypedIdMarker for Advertiser {
    fn tag() -> &'static str {
        "ADV"
    }
}

impl Entity for Advertiser {
    fn id(&self) -> AdvertiserId {
        self.id
    }

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
