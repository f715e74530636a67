use actix_web::web::{Data, Json, Path};
use actix_web::{get, patch, post, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::database::{EntityMetaBody, SharedStore};
use crate::error::Error;
use crate::partner::PartnerId;

use super::{manager, Advertiser, AdvertiserId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdvertiserBody {
    pub partner_id: PartnerId,
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdvertiserBody {
    pub partner_id: Option<PartnerId>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertiserBody {
    pub id: AdvertiserId,
    pub partner_id: PartnerId,
    pub name: String,
    #[serde(flatten)]
    pub meta: EntityMetaBody,
}

impl AdvertiserBody {
    pub fn render(advertiser: Advertiser) -> AdvertiserBody {
        AdvertiserBody {
            id: advertiser.id,
            partner_id: advertiser.partner_id,
            name: advertiser.name,
            meta: EntityMetaBody::render(advertiser.meta),
        }
    }
}

#[get("/v1/advertisers")]
#[tracing::instrument(skip(db))]
async fn get_advertisers(db: Data<SharedStore>) -> Result<Json<Vec<AdvertiserBody>>, Error> {
    let advertisers = manager::get_advertisers(&db.lock());

    let body = advertisers.into_iter().map(AdvertiserBody::render).collect();

    Ok(Json(body))
}

#[post("/v1/advertisers")]
#[tracing::instrument(skip(db))]
async fn create_advertiser(
    db: Data<SharedStore>,
    body: Json<CreateAdvertiserBody>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();

    let advertiser = manager::create_advertiser(&mut db.lock(), body.partner_id, body.name)?;

    Ok(HttpResponse::Created().json(AdvertiserBody::render(advertiser)))
}

#[get("/v1/advertisers/{advertiser_id}")]
#[tracing::instrument(skip(db))]
async fn get_advertiser_by_id(
    db: Data<SharedStore>,
    params: Path<AdvertiserId>,
) -> Result<Json<AdvertiserBody>, Error> {
    let advertiser_id = params.into_inner();

    let advertiser = manager::get_advertiser_by_id(&db.lock(), advertiser_id)?;

    Ok(Json(AdvertiserBody::render(advertiser)))
}

#[patch("/v1/advertisers/{advertiser_id}")]
#[tracing::instrument(skip(db))]
async fn update_advertiser(
    db: Data<SharedStore>,
    params: Path<AdvertiserId>,
    body: Json<UpdateAdvertiserBody>,
) -> Result<Json<AdvertiserBody>, Error> {
    let advertiser_id = params.into_inner();
    let body = body.into_inner();

    let advertiser = manager::update_advertiser(&mut db.lock(), advertiser_id, body)?;

    Ok(Json(AdvertiserBody::render(advertiser)))
}

#[post("/v1/advertisers/{advertiser_id:[^/:]+}:archive")]
#[tracing::instrument(skip(db))]
async fn archive_advertiser(
    db: Data<SharedStore>,
    params: Path<AdvertiserId>,
) -> Result<Json<AdvertiserBody>, Error> {
    let advertiser_id = params.into_inner();

    let advertiser = manager::archive_advertiser(&mut db.lock(), advertiser_id)?;

    Ok(Json(AdvertiserBody::render(advertiser)))
}
