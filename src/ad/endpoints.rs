use actix_web::http::header::CONTENT_TYPE;
use actix_web::web::{Bytes, Data, Json, Path, Query};
use actix_web::{get, patch, post, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::asset_group::AssetGroupId;
use crate::config::ApiConfig;
use crate::creative::bulk::BulkMode;
use crate::creative::CreativeMetadata;
use crate::database::{EntityMetaBody, SharedStore};
use crate::error::Error;
use crate::violations::Violation;

use super::manager::BulkUpload;
use super::{manager, Ad, AdId, AdType, InputType};

/// Query parameters accompanying a raw file upload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileAdQuery {
    pub asset_group_id: AssetGroupId,
    pub name: String,
    pub ad_type: Option<AdType>,
    pub input_type: InputType,
    pub filename: Option<String>,
    pub landing_url: Option<String>,
    pub brand_url: Option<String>,
    pub sponsored_by: Option<String>,
    pub cta_text: Option<String>,
    /// JSON array of tags, encoded as a single string.
    pub tracking_tags: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagAdBody {
    pub asset_group_id: AssetGroupId,
    pub name: String,
    #[serde(default)]
    pub ad_type: Option<AdType>,
    pub input_type: InputType,
    pub tag_text: String,
    #[serde(default)]
    pub landing_url: Option<String>,
    #[serde(default)]
    pub brand_url: Option<String>,
    #[serde(default)]
    pub sponsored_by: Option<String>,
    #[serde(default)]
    pub cta_text: Option<String>,
    #[serde(default)]
    pub tracking_tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadQuery {
    pub asset_group_id: AssetGroupId,
    pub mode: BulkMode,
    pub filename: Option<String>,
    pub create: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdBody {
    pub asset_group_id: Option<AssetGroupId>,
    pub name: Option<String>,
    pub ad_type: Option<AdType>,
    pub input_type: Option<InputType>,
    pub landing_url: Option<String>,
    pub brand_url: Option<String>,
    pub sponsored_by: Option<String>,
    pub cta_text: Option<String>,
    pub tag_text: Option<String>,
    pub filename: Option<String>,
    pub metadata: Option<CreativeMetadata>,
    pub tracking_tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdBody {
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
    pub macro_tokens_detected: Vec<String>,
    pub tracking_tags: Vec<String>,
    pub substituted_preview: Option<String>,
    pub generated_vast_wrapper: Option<String>,
    pub content_url: Option<String>,
    #[serde(flatten)]
    pub meta: EntityMetaBody,
}

impl AdBody {
    pub fn render(ad: Ad) -> AdBody {
        AdBody {
            id: ad.id,
            asset_group_id: ad.asset_group_id,
            name: ad.name,
            ad_type: ad.ad_type,
            input_type: ad.input_type,
            landing_url: ad.landing_url,
            brand_url: ad.brand_url,
            sponsored_by: ad.sponsored_by,
            cta_text: ad.cta_text,
            tag_text: ad.tag_text,
            filename: ad.filename,
            metadata: ad.metadata,
            macro_tokens_detected: ad.macro_tokens,
            tracking_tags: ad.tracking_tags,
            substituted_preview: ad.substituted_preview,
            generated_vast_wrapper: ad.generated_vast_wrapper,
            content_url: ad.content_url,
            meta: EntityMetaBody::render(ad.meta),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemBody {
    pub filename: String,
    pub tracking_tags: Vec<String>,
    pub errors: Vec<Violation>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadBody {
    pub global_errors: Vec<Violation>,
    pub items: Vec<BulkItemBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Vec<AdBody>>,
}

impl BulkUploadBody {
    pub fn render(upload: BulkUpload) -> BulkUploadBody {
        BulkUploadBody {
            global_errors: upload.archive.errors.into_violations(),
            items: upload
                .archive
                .items
                .into_iter()
                .map(|item| BulkItemBody {
                    filename: item.filename,
                    tracking_tags: item.tracking_tags,
                    errors: item.errors.into_violations(),
                })
                .collect(),
            created: upload
                .created
                .map(|ads| ads.into_iter().map(AdBody::render).collect()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdQuery {
    pub asset_group_id: Option<AssetGroupId>,
}

#[get("/v1/ads")]
#[tracing::instrument(skip(db))]
async fn get_ads(db: Data<SharedStore>, query: Query<AdQuery>) -> Result<Json<Vec<AdBody>>, Error> {
    let ads = manager::get_ads(&db.lock(), query.asset_group_id);

    let body = ads.into_iter().map(AdBody::render).collect();

    Ok(Json(body))
}

#[post("/v1/ads")]
#[tracing::instrument(skip(db, config, request, payload), fields(len = payload.len()))]
async fn create_file_ad(
    db: Data<SharedStore>,
    config: Data<ApiConfig>,
    request: HttpRequest,
    query: Query<CreateFileAdQuery>,
    payload: Bytes,
) -> Result<HttpResponse, Error> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let ad = manager::create_file_ad(
        &mut db.lock(),
        &config.content_base_url,
        query.into_inner(),
        content_type,
        payload.to_vec(),
    )?;

    Ok(HttpResponse::Created().json(AdBody::render(ad)))
}

#[post("/v1/ads/tag")]
#[tracing::instrument(skip(db))]
async fn create_tag_ad(
    db: Data<SharedStore>,
    body: Json<CreateTagAdBody>,
) -> Result<HttpResponse, Error> {
    let ad = manager::create_tag_ad(&mut db.lock(), body.into_inner())?;

    Ok(HttpResponse::Created().json(AdBody::render(ad)))
}

#[post("/v1/ads/bulk")]
#[tracing::instrument(skip(db, config, payload), fields(len = payload.len()))]
async fn bulk_upload_ads(
    db: Data<SharedStore>,
    config: Data<ApiConfig>,
    query: Query<BulkUploadQuery>,
    payload: Bytes,
) -> Result<Json<BulkUploadBody>, Error> {
    let upload = manager::bulk_upload_ads(
        &mut db.lock(),
        &config.content_base_url,
        query.into_inner(),
        payload.to_vec(),
    )?;

    Ok(Json(BulkUploadBody::render(upload)))
}

#[get("/v1/ads/{ad_id}/content")]
#[tracing::instrument(skip(db))]
async fn get_ad_content(db: Data<SharedStore>, params: Path<AdId>) -> Result<HttpResponse, Error> {
    let ad_id = params.into_inner();

    let content = manager::get_ad_content(&db.lock(), ad_id)?;

    Ok(HttpResponse::Ok()
        .content_type(content.content_type)
        .body(content.bytes))
}

#[get("/v1/ads/{ad_id}")]
#[tracing::instrument(skip(db))]
async fn get_ad_by_id(db: Data<SharedStore>, params: Path<AdId>) -> Result<Json<AdBody>, Error> {
    let ad_id = params.into_inner();

    let ad = manager::get_ad_by_id(&db.lock(), ad_id)?;

    Ok(Json(AdBody::render(ad)))
}

#[patch("/v1/ads/{ad_id}")]
#[tracing::instrument(skip(db))]
async fn update_ad(
    db: Data<SharedStore>,
    params: Path<AdId>,
    body: Json<UpdateAdBody>,
) -> Result<Json<AdBody>, Error> {
    let ad_id = params.into_inner();
    let body = body.into_inner();

    let ad = manager::update_ad(&mut db.lock(), ad_id, body)?;

    Ok(Json(AdBody::render(ad)))
}

#[post("/v1/ads/{ad_id:[^/:]+}:archive")]
#[tracing::instrument(skip(db))]
async fn archive_ad(db: Data<SharedStore>, params: Path<AdId>) -> Result<Json<AdBody>, Error> {
    let ad_id = params.into_inner();

    let ad = manager::archive_ad(&mut db.lock(), ad_id)?;

    Ok(Json(AdBody::render(ad)))
}
