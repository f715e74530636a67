use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, patch, post, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::campaign::CampaignId;
use crate::database::{EntityMetaBody, SharedStore};
use crate::error::Error;

use super::{manager, AssetGroup, AssetGroupId, Bid};

/// A bid as submitted; missing parts are defaulted by [`Bid::normalize`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BidBody {
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetGroupBody {
    pub campaign_id: CampaignId,
    pub name: String,
    #[serde(default)]
    pub default_bid: Option<BidBody>,
    #[serde(default)]
    pub targeting: Option<Map<String, Value>>,
    #[serde(default)]
    pub delivery_settings: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetGroupBody {
    pub campaign_id: Option<CampaignId>,
    pub name: Option<String>,
    pub default_bid: Option<BidBody>,
    pub targeting: Option<Map<String, Value>>,
    pub delivery_settings: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroupBody {
    pub id: AssetGroupId,
    pub campaign_id: CampaignId,
    pub name: String,
    pub default_bid: Bid,
    pub targeting: Map<String, Value>,
    pub delivery_settings: Map<String, Value>,
    #[serde(flatten)]
    pub meta: EntityMetaBody,
}

impl AssetGroupBody {
    pub fn render(asset_group: AssetGroup) -> AssetGroupBody {
        AssetGroupBody {
            id: asset_group.id,
            campaign_id: asset_group.campaign_id,
            name: asset_group.name,
            default_bid: asset_group.default_bid,
            targeting: asset_group.targeting,
            delivery_settings: asset_group.delivery_settings,
            meta: EntityMetaBody::render(asset_group.meta),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroupQuery {
    pub campaign_id: Option<CampaignId>,
}

#[get("/v1/asset-groups")]
#[tracing::instrument(skip(db))]
async fn get_asset_groups(
    db: Data<SharedStore>,
    query: Query<AssetGroupQuery>,
) -> Result<Json<Vec<AssetGroupBody>>, Error> {
    let asset_groups = manager::get_asset_groups(&db.lock(), query.campaign_id);

    let body = asset_groups
        .into_iter()
        .map(AssetGroupBody::render)
        .collect();

    Ok(Json(body))
}

#[post("/v1/asset-groups")]
#[tracing::instrument(skip(db))]
async fn create_asset_group(
    db: Data<SharedStore>,
    body: Json<CreateAssetGroupBody>,
) -> Result<HttpResponse, Error> {
    let asset_group = manager::create_asset_group(&mut db.lock(), body.into_inner())?;

    Ok(HttpResponse::Created().json(AssetGroupBody::render(asset_group)))
}

#[get("/v1/asset-groups/{asset_group_id}")]
#[tracing::instrument(skip(db))]
async fn get_asset_group_by_id(
    db: Data<SharedStore>,
    params: Path<AssetGroupId>,
) -> Result<Json<AssetGroupBody>, Error> {
    let asset_group_id = params.into_inner();

    let asset_group = manager::get_asset_group_by_id(&db.lock(), asset_group_id)?;

    Ok(Json(AssetGroupBody::render(asset_group)))
}

#[patch("/v1/asset-groups/{asset_group_id}")]
#[tracing::instrument(skip(db))]
async fn update_asset_group(
    db: Data<SharedStore>,
    params: Path<AssetGroupId>,
    body: Json<UpdateAssetGroupBody>,
) -> Result<Json<AssetGroupBody>, Error> {
    let asset_group_id = params.into_inner();
    let body = body.into_inner();

    let asset_group = manager::update_asset_group(&mut db.lock(), asset_group_id, body)?;

    Ok(Json(AssetGroupBody::render(asset_group)))
}

#[post("/v1/asset-groups/{asset_group_id:[^/:]+}:archive")]
#[tracing::instrument(skip(db))]
async fn archive_asset_group(
    db: Data<SharedStore>,
    params: Path<AssetGroupId>,
) -> Result<Json<AssetGroupBody>, Error> {
    let asset_group_id = params.into_inner();

    let asset_group = manager::archive_asset_group(&mut db.lock(), asset_group_id)?;

    Ok(Json(AssetGroupBody::render(asset_group)))
}
