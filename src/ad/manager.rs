use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::asset_group::AssetGroupId;
use crate::creative::bulk::{parse_bulk_archive, BulkArchive, BulkMode};
use crate::creative::validate::validate_tracking_tags;
use crate::creative::{self, Creative, CreativeType, FileUpload};
use crate::database::{EntityMeta, Store};
use crate::error::Error;
use crate::serving;
use crate::violations::validate_name;

use super::db::AdStore;
use super::{
    Ad, AdContent, AdId, AdType, BulkUploadQuery, CreateFileAdQuery, CreateTagAdBody,
    UpdateAdBody,
};

const FALLBACK_FILENAME: &str = "file";

fn assert_asset_group_exists(store: &Store, asset_group_id: AssetGroupId) -> Result<(), Error> {
    if !store.asset_groups.contains(asset_group_id) {
        return Err(Error::AssetGroupExpected { asset_group_id });
    }

    Ok(())
}

pub fn ad_content_url(content_base: &str, ad_id: AdId) -> String {
    format!("{}/ads/{}/content", content_base.trim_end_matches('/'), ad_id)
}

/// Reads tracking tags submitted as a JSON array in a single text field.
/// Blank entries are dropped and anything that is not an array yields no tags.
pub fn parse_tracking_tags(raw: Option<&str>) -> Vec<String> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return vec![],
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => values
            .into_iter()
            .map(|value| match value {
                Value::String(text) => text.trim().to_owned(),
                other => other.to_string().trim().to_owned(),
            })
            .filter(|tag| !tag.is_empty())
            .collect(),
        _ => vec![],
    }
}

struct AdDetails {
    asset_group_id: AssetGroupId,
    name: String,
    ad_type: AdType,
    landing_url: Option<String>,
    brand_url: Option<String>,
    sponsored_by: Option<String>,
    cta_text: Option<String>,
    tag_text: Option<String>,
    filename: Option<String>,
}

fn assemble_ad(id: AdId, details: AdDetails, creative: Creative, content_url: Option<String>) -> Ad {
    Ad {
        id,
        asset_group_id: details.asset_group_id,
        name: details.name,
        ad_type: details.ad_type,
        input_type: creative.creative_type,
        landing_url: details.landing_url,
        brand_url: details.brand_url,
        sponsored_by: details.sponsored_by,
        cta_text: details.cta_text,
        tag_text: details.tag_text,
        filename: details.filename,
        metadata: creative.metadata,
        macro_tokens: creative.macro_tokens,
        tracking_tags: creative.tracking_tags,
        substituted_preview: creative.substituted_preview,
        generated_vast_wrapper: creative.generated_vast,
        content_url,
        meta: EntityMeta::new(Utc::now()),
    }
}

#[tracing::instrument(skip(store, bytes), fields(len = bytes.len()))]
pub fn create_file_ad(
    store: &mut Store,
    content_base: &str,
    query: CreateFileAdQuery,
    content_type: Option<String>,
    bytes: Vec<u8>,
) -> Result<Ad, Error> {
    assert_asset_group_exists(store, query.asset_group_id)?;
    Error::check("Ad validation failed", validate_name(&query.name))?;

    let tracking_tags = parse_tracking_tags(query.tracking_tags.as_deref());
    let content_type = content_type
        .filter(|content_type| !content_type.is_empty())
        .unwrap_or_else(|| match query.input_type {
            CreativeType::VideoFile => "video/mp4".to_owned(),
            _ => "image/png".to_owned(),
        });
    let filename = query
        .filename
        .filter(|filename| !filename.is_empty())
        .unwrap_or_else(|| FALLBACK_FILENAME.to_owned());

    let ad_id = AdId::new();
    let content_url = ad_content_url(content_base, ad_id);

    let creative = creative::ingest_file(
        FileUpload {
            creative_type: query.input_type,
            filename: &filename,
            content_type: &content_type,
            bytes: &bytes,
        },
        tracking_tags,
        &content_url,
    )?;

    let details = AdDetails {
        asset_group_id: query.asset_group_id,
        name: query.name,
        ad_type: query.ad_type.unwrap_or_default(),
        landing_url: query.landing_url,
        brand_url: query.brand_url,
        sponsored_by: query.sponsored_by,
        cta_text: query.cta_text,
        tag_text: None,
        filename: Some(filename),
    };
    let ad = assemble_ad(ad_id, details, creative, Some(content_url));

    store.ads.insert(ad);
    store.insert_ad_content(ad_id, AdContent { bytes, content_type });
    serving::recompute(store);

    get_ad_by_id(store, ad_id)
}

#[tracing::instrument(skip(store, body))]
pub fn create_tag_ad(store: &mut Store, body: CreateTagAdBody) -> Result<Ad, Error> {
    assert_asset_group_exists(store, body.asset_group_id)?;
    Error::check("Ad validation failed", validate_name(&body.name))?;

    let creative = creative::ingest_tag(
        body.input_type,
        &body.tag_text,
        body.tracking_tags.unwrap_or_default(),
    )?;

    let ad_id = AdId::new();
    let details = AdDetails {
        asset_group_id: body.asset_group_id,
        name: body.name,
        ad_type: body.ad_type.unwrap_or_default(),
        landing_url: body.landing_url,
        brand_url: body.brand_url,
        sponsored_by: body.sponsored_by,
        cta_text: body.cta_text,
        tag_text: Some(body.tag_text),
        filename: None,
    };
    let ad = assemble_ad(ad_id, details, creative, None);

    store.ads.insert(ad);
    serving::recompute(store);

    get_ad_by_id(store, ad_id)
}

/// Outcome of a bulk upload. `created` is only present when creation was
/// requested and the whole archive passed.
#[derive(Debug)]
pub struct BulkUpload {
    pub archive: BulkArchive,
    pub created: Option<Vec<Ad>>,
}

#[tracing::instrument(skip(store, bytes), fields(len = bytes.len()))]
pub fn bulk_upload_ads(
    store: &mut Store,
    content_base: &str,
    query: BulkUploadQuery,
    bytes: Vec<u8>,
) -> Result<BulkUpload, Error> {
    assert_asset_group_exists(store, query.asset_group_id)?;

    let is_zip = query
        .filename
        .as_deref()
        .map(|filename| filename.to_lowercase().ends_with(".zip"))
        .unwrap_or(false);
    if !is_zip {
        return Err(Error::invalid_field(
            "Bulk upload requires a ZIP file",
            "file",
            "Upload a .zip file.",
        ));
    }

    let archive = parse_bulk_archive(&bytes, query.mode);

    if !query.create.unwrap_or(false) || !archive.is_clean() {
        return Ok(BulkUpload {
            archive,
            created: None,
        });
    }

    let ad_type = match query.mode {
        BulkMode::Display => AdType::Display,
        BulkMode::Video => AdType::Video,
    };
    let mut ad_ids = Vec::with_capacity(archive.items.len());

    for item in &archive.items {
        let ad_id = AdId::new();
        let content_url = ad_content_url(content_base, ad_id);
        let creative = creative::from_bulk_item(item, query.mode, &content_url);

        let name = item
            .filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&item.filename)
            .to_owned();
        let details = AdDetails {
            asset_group_id: query.asset_group_id,
            name,
            ad_type,
            landing_url: None,
            brand_url: None,
            sponsored_by: None,
            cta_text: None,
            tag_text: None,
            filename: Some(item.filename.clone()),
        };

        store.ads.insert(assemble_ad(ad_id, details, creative, Some(content_url)));
        store.insert_ad_content(
            ad_id,
            AdContent {
                bytes: item.bytes.clone(),
                content_type: item.content_type.clone(),
            },
        );
        ad_ids.push(ad_id);
    }

    serving::recompute(store);
    info!(created = ad_ids.len(), "created ads from bulk upload");

    let created = ad_ids
        .into_iter()
        .map(|ad_id| get_ad_by_id(store, ad_id))
        .collect::<Result<Vec<Ad>, Error>>()?;

    Ok(BulkUpload {
        archive,
        created: Some(created),
    })
}

#[tracing::instrument(skip(store))]
pub fn get_ads(store: &Store, asset_group_id: Option<AssetGroupId>) -> Vec<Ad> {
    match asset_group_id {
        Some(asset_group_id) => store
            .ads
            .fetch_ads_by_asset_group(asset_group_id)
            .into_iter()
            .cloned()
            .collect(),
        None => store.ads.iter().cloned().collect(),
    }
}

#[tracing::instrument(skip(store))]
pub fn get_ad_by_id(store: &Store, ad_id: AdId) -> Result<Ad, Error> {
    store
        .ads
        .get(ad_id)
        .cloned()
        .ok_or(Error::AdDoesNotExist { ad_id })
}

#[tracing::instrument(skip(store))]
pub fn get_ad_content(store: &Store, ad_id: AdId) -> Result<AdContent, Error> {
    if !store.ads.contains(ad_id) {
        return Err(Error::AdDoesNotExist { ad_id });
    }

    store
        .fetch_ad_content(ad_id)
        .cloned()
        .ok_or(Error::AdContentDoesNotExist { ad_id })
}

#[tracing::instrument(skip(store, body))]
pub fn update_ad(store: &mut Store, ad_id: AdId, body: UpdateAdBody) -> Result<Ad, Error> {
    if !store.ads.contains(ad_id) {
        return Err(Error::AdDoesNotExist { ad_id });
    }
    if let Some(asset_group_id) = body.asset_group_id {
        assert_asset_group_exists(store, asset_group_id)?;
    }
    if let Some(name) = &body.name {
        Error::check("Ad validation failed", validate_name(name))?;
    }
    if let Some(tracking_tags) = &body.tracking_tags {
        Error::check("Invalid tracking tags", validate_tracking_tags(tracking_tags))?;
    }

    let ad = store
        .ads
        .get_mut(ad_id)
        .ok_or(Error::AdDoesNotExist { ad_id })?;

    if let Some(asset_group_id) = body.asset_group_id {
        ad.asset_group_id = asset_group_id;
    }
    if let Some(name) = body.name {
        ad.name = name;
    }
    if let Some(ad_type) = body.ad_type {
        ad.ad_type = ad_type;
    }
    if let Some(input_type) = body.input_type {
        ad.input_type = input_type;
    }
    if let Some(landing_url) = body.landing_url {
        ad.landing_url = Some(landing_url);
    }
    if let Some(brand_url) = body.brand_url {
        ad.brand_url = Some(brand_url);
    }
    if let Some(sponsored_by) = body.sponsored_by {
        ad.sponsored_by = Some(sponsored_by);
    }
    if let Some(cta_text) = body.cta_text {
        ad.cta_text = Some(cta_text);
    }
    if let Some(tag_text) = body.tag_text {
        ad.tag_text = Some(tag_text);
    }
    if let Some(filename) = body.filename {
        ad.filename = Some(filename);
    }
    if let Some(metadata) = body.metadata {
        ad.metadata = metadata;
    }
    if let Some(tracking_tags) = body.tracking_tags {
        ad.tracking_tags = tracking_tags;
    }
    ad.meta.touch();

    serving::recompute(store);

    get_ad_by_id(store, ad_id)
}

#[tracing::instrument(skip(store))]
pub fn archive_ad(store: &mut Store, ad_id: AdId) -> Result<Ad, Error> {
    store
        .ads
        .get_mut(ad_id)
        .ok_or(Error::AdDoesNotExist { ad_id })?
        .meta
        .archive();

    serving::recompute(store);

    get_ad_by_id(store, ad_id)
}
