use chrono::Utc;

use crate::database::{EntityMeta, Store};
use crate::error::Error;
use crate::partner::PartnerId;
use crate::serving;
use crate::violations::validate_name;

use super::{Advertiser, AdvertiserId, UpdateAdvertiserBody};

fn assert_partner_exists(store: &Store, partner_id: PartnerId) -> Result<(), Error> {
    if !store.partners.contains(partner_id) {
        return Err(Error::PartnerExpected { partner_id });
    }

    Ok(())
}

#[tracing::instrument(skip(store))]
pub fn create_advertiser(
    store: &mut Store,
    partner_id: PartnerId,
    name: String,
) -> Result<Advertiser, Error> {
    assert_partner_exists(store, partner_id)?;
    Error::check("Advertiser validation failed", validate_name(&name))?;

    let advertiser = Advertiser {
        id: AdvertiserId::new(),
        partner_id,
        name,
        meta: EntityMeta::new(Utc::now()),
    };
    let advertiser_id = advertiser.id;

    store.advertisers.insert(advertiser);
    serving::recompute(store);

    get_advertiser_by_id(store, advertiser_id)
}

#[tracing::instrument(skip(store))]
pub fn get_advertisers(store: &Store) -> Vec<Advertiser> {
    store.advertisers.iter().cloned().collect()
}

#[tracing::instrument(skip(store))]
pub fn get_advertiser_by_id(
    store: &Store,
    advertiser_id: AdvertiserId,
) -> Result<Advertiser, Error> {
    store
        .advertisers
        .get(advertiser_id)
        .cloned()
        .ok_or(Error::AdvertiserDoesNotExist { advertiser_id })
}

#[tracing::instrument(skip(store))]
pub fn update_advertiser(
    store: &mut Store,
    advertiser_id: AdvertiserId,
    body: UpdateAdvertiserBody,
) -> Result<Advertiser, Error> {
    if !store.advertisers.contains(advertiser_id) {
        return Err(Error::AdvertiserDoesNotExist { advertiser_id });
    }
    if let Some(partner_id) = body.partner_id {
        assert_partner_exists(store, partner_id)?;
    }
    if let Some(name) = &body.name {
        Error::check("Advertiser validation failed", validate_name(name))?;
    }

    let advertiser = store
        .advertisers
        .get_mut(advertiser_id)
        .ok_or(Error::AdvertiserDoesNotExist { advertiser_id })?;

    if let Some(partner_id) = body.partner_id {
        advertiser.partner_id = partner_id;
    }
    if let Some(name) = body.name {
        advertiser.name = name;
    }
    advertiser.meta.touch();

    serving::recompute(store);

    get_advertiser_by_id(store, advertiser_id)
}

#[tracing::instrument(skip(store))]
pub fn archive_advertiser(
    store: &mut Store,
    advertiser_id: AdvertiserId,
) -> Result<Advertiser, Error> {
    store
        .advertisers
        .get_mut(advertiser_id)
        .ok_or(Error::AdvertiserDoesNotExist { advertiser_id })?
        .meta
        .archive();

    serving::recompute(store);

    get_advertiser_by_id(store, advertiser_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partner::manager::create_partner;

    #[test]
    fn create_advertiser_requires_existing_partner() {
        let mut store = Store::new();
        let partner_id = PartnerId::new();

        let result = create_advertiser(&mut store, partner_id, "Acme".into());

        assert_eq!(result.unwrap_err(), Error::PartnerExpected { partner_id });
        assert!(store.advertisers.is_empty());
    }

    #[test]
    fn update_advertiser_rejects_dangling_partner() {
        let mut store = Store::new();
        let partner = create_partner(&mut store, "Partner".into()).unwrap();
        let advertiser = create_advertiser(&mut store, partner.id, "Acme".into()).unwrap();
        let missing = PartnerId::new();

        let result = update_advertiser(
            &mut store,
            advertiser.id,
            UpdateAdvertiserBody {
                partner_id: Some(missing),
                name: None,
            },
        );

        assert_eq!(result.unwrap_err(), Error::PartnerExpected { partner_id: missing });
        assert_eq!(
            store.advertisers.get(advertiser.id).unwrap().partner_id,
            partner.id
        );
    }

    #[test]
    fn update_advertiser_bumps_modified_at() {
        let mut store = Store::new();
        let partner = create_partner(&mut store, "Partner".into()).unwrap();
        let advertiser = create_advertiser(&mut store, partner.id, "Acme".into()).unwrap();

        let updated = update_advertiser(
            &mut store,
            advertiser.id,
            UpdateAdvertiserBody {
                partner_id: None,
                name: Some("Acme Corp".into()),
            },
        )
        .unwrap();

        assert_eq!(updated.name, "Acme Corp".to_string());
        assert!(updated.meta.modified_at >= advertiser.meta.modified_at);
        assert_eq!(updated.meta.created_at, advertiser.meta.created_at);
    }
}
