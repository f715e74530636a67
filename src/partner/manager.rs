use chrono::Utc;

use crate::database::{EntityMeta, Store};
use crate::error::Error;
use crate::serving;
use crate::violations::validate_name;

use super::{Partner, PartnerId, UpdatePartnerBody};

#[tracing::instrument(skip(store))]
pub fn create_partner(store: &mut Store, name: String) -> Result<Partner, Error> {
    Error::check("Partner validation failed", validate_name(&name))?;

    let partner = Partner {
        id: PartnerId::new(),
        name,
        meta: EntityMeta::new(Utc::now()),
    };
    let partner_id = partner.id;

    store.partners.insert(partner);
    serving::recompute(store);

    expect_partner_by_id(store, partner_id)
}

#[tracing::instrument(skip(store))]
pub fn get_partners(store: &Store) -> Vec<Partner> {
    store.partners.iter().cloned().collect()
}

#[tracing::instrument(skip(store))]
pub fn get_partner_by_id(store: &Store, partner_id: PartnerId) -> Result<Partner, Error> {
    store
        .partners
        .get(partner_id)
        .cloned()
        .ok_or(Error::PartnerDoesNotExist { partner_id })
}

fn expect_partner_by_id(store: &Store, partner_id: PartnerId) -> Result<Partner, Error> {
    store
        .partners
        .get(partner_id)
        .cloned()
        .ok_or_else(|| Error::ExistentialState(format!("partner {} vanished", partner_id)))
}

#[tracing::instrument(skip(store))]
pub fn update_partner(
    store: &mut Store,
    partner_id: PartnerId,
    body: UpdatePartnerBody,
) -> Result<Partner, Error> {
    if let Some(name) = &body.name {
        Error::check("Partner validation failed", validate_name(name))?;
    }

    let partner = store
        .partners
        .get_mut(partner_id)
        .ok_or(Error::PartnerDoesNotExist { partner_id })?;

    if let Some(name) = body.name {
        partner.name = name;
    }
    partner.meta.touch();

    serving::recompute(store);

    expect_partner_by_id(store, partner_id)
}

#[tracing::instrument(skip(store))]
pub fn archive_partner(store: &mut Store, partner_id: PartnerId) -> Result<Partner, Error> {
    store
        .partners
        .get_mut(partner_id)
        .ok_or(Error::PartnerDoesNotExist { partner_id })?
        .meta
        .archive();

    serving::recompute(store);

    expect_partner_by_id(store, partner_id)
}
