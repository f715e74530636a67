use crate::database::{Entity, EntityMeta};
use crate::typedid::{TypedId, TypedIdMarker};

pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type PartnerId = TypedId<Partner>;

#[derive(Clone, Debug)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    pub meta: EntityMeta,
}

impl TypedIdMarker for Partner {
    fn tag() -> &'static str {
        "PTR"
    }
}

impl Entity for Partner {
    fn id(&self) -> PartnerId {
        self.id
    }

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
