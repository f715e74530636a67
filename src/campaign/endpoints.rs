use actix_web::web::{Data, Json, Path};
use actix_web::{get, patch, post, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::advertiser::AdvertiserId;
use crate::database::{EntityMetaBody, SharedStore};
use crate::error::Error;

use super::{manager, Campaign, CampaignId, CampaignStatus};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignBody {
    pub advertiser_id: AdvertiserId,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub targeting: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignBody {
    pub advertiser_id: Option<AdvertiserId>,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub targeting: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBody {
    pub id: CampaignId,
    pub advertiser_id: AdvertiserId,
    pub name: String,
    pub status: CampaignStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub targeting: Map<String, Value>,
    #[serde(flatten)]
    pub meta: EntityMetaBody,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            advertiser_id: campaign.advertiser_id,
            name: campaign.name,
            status: campaign.status,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            targeting: campaign.targeting,
            meta: EntityMetaBody::render(campaign.meta),
        }
    }
}

#[get("/v1/campaigns")]
#[tracing::instrument(skip(db))]
async fn get_campaigns(db: Data<SharedStore>) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_campaigns(&db.lock());

    let body = campaigns.into_iter().map(CampaignBody::render).collect();

    Ok(Json(body))
}

#[post("/v1/campaigns")]
#[tracing::instrument(skip(db))]
async fn create_campaign(
    db: Data<SharedStore>,
    body: Json<CreateCampaignBody>,
) -> Result<HttpResponse, Error> {
    let campaign = manager::create_campaign(&mut db.lock(), body.into_inner())?;

    Ok(HttpResponse::Created().json(CampaignBody::render(campaign)))
}

#[get("/v1/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn get_campaign_by_id(
    db: Data<SharedStore>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::get_campaign_by_id(&db.lock(), campaign_id)?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[patch("/v1/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn update_campaign(
    db: Data<SharedStore>,
    params: Path<CampaignId>,
    body: Json<UpdateCampaignBody>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let body = body.into_inner();

    let campaign = manager::update_campaign(&mut db.lock(), campaign_id, body)?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[post("/v1/campaigns/{campaign_id:[^/:]+}:activate")]
#[tracing::instrument(skip(db))]
async fn activate_campaign(
    db: Data<SharedStore>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign =
        manager::set_campaign_status(&mut db.lock(), campaign_id, CampaignStatus::Active)?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[post("/v1/campaigns/{campaign_id:[^/:]+}:deactivate")]
#[tracing::instrument(skip(db))]
async fn deactivate_campaign(
    db: Data<SharedStore>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign =
        manager::set_campaign_status(&mut db.lock(), campaign_id, CampaignStatus::Inactive)?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[post("/v1/campaigns/{campaign_id:[^/:]+}:archive")]
#[tracing::instrument(skip(db))]
async fn archive_campaign(
    db: Data<SharedStore>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::archive_campaign(&mut db.lock(), campaign_id)?;

    Ok(Json(CampaignBody::render(campaign)))
}
