use actix_web::web::{Data, Json, Path};
use actix_web::{get, patch, post, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::database::{EntityMetaBody, SharedStore};
use crate::error::Error;

use super::{manager, Partner, PartnerId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatePartnerBody {
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdatePartnerBody {
    pub name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerBody {
    pub id: PartnerId,
    pub name: String,
    #[serde(flatten)]
    pub meta: EntityMetaBody,
}

impl PartnerBody {
    pub fn render(partner: Partner) -> PartnerBody {
        PartnerBody {
            id: partner.id,
            name: partner.name,
            meta: EntityMetaBody::render(partner.meta),
        }
    }
}

#[get("/v1/partners")]
#[tracing::instrument(skip(db))]
async fn get_partners(db: Data<SharedStore>) -> Result<Json<Vec<PartnerBody>>, Error> {
    let partners = manager::get_partners(&db.lock());

    let body = partners.into_iter().map(PartnerBody::render).collect();

    Ok(Json(body))
}

#[post("/v1/partners")]
#[tracing::instrument(skip(db))]
async fn create_partner(
    db: Data<SharedStore>,
    body: Json<CreatePartnerBody>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();

    let partner = manager::create_partner(&mut db.lock(), body.name)?;

    Ok(HttpResponse::Created().json(PartnerBody::render(partner)))
}

#[get("/v1/partners/{partner_id}")]
#[tracing::instrument(skip(db))]
async fn get_partner_by_id(
    db: Data<SharedStore>,
    params: Path<PartnerId>,
) -> Result<Json<PartnerBody>, Error> {
    let partner_id = params.into_inner();

    let partner = manager::get_partner_by_id(&db.lock(), partner_id)?;

    Ok(Json(PartnerBody::render(partner)))
}

#[patch("/v1/partners/{partner_id}")]
#[tracing::instrument(skip(db))]
async fn update_partner(
    db: Data<SharedStore>,
    params: Path<PartnerId>,
    body: Json<UpdatePartnerBody>,
) -> Result<Json<PartnerBody>, Error> {
    let partner_id = params.into_inner();
    let body = body.into_inner();

    let partner = manager::update_partner(&mut db.lock(), partner_id, body)?;

    Ok(Json(PartnerBody::render(partner)))
}

#[post("/v1/partners/{partner_id:[^/:]+}:archive")]
#[tracing::instrument(skip(db))]
async fn archive_partner(
    db: Data<SharedStore>,
    params: Path<PartnerId>,
) -> Result<Json<PartnerBody>, Error> {
    let partner_id = params.into_inner();

    let partner = manager::archive_partner(&mut db.lock(), partner_id)?;

    Ok(Json(PartnerBody::render(partner)))
}
