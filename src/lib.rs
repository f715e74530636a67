use actix_web::web::{self, Data, JsonConfig, PathConfig, PayloadConfig, QueryConfig, ServiceConfig};
use actix_web::{App, HttpServer, ResponseError};
use parking_lot::Mutex;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod ad;
pub mod advertiser;
pub mod asset_group;
pub mod campaign;
pub mod config;
pub mod creative;
pub mod database;
pub mod error;
pub mod partner;
pub mod report;
pub mod seed;
pub mod serving;
pub mod typedid;
pub mod violations;

pub use ad::{AdBody, BulkUploadBody, CreateTagAdBody};
pub use advertiser::{AdvertiserBody, CreateAdvertiserBody};
pub use asset_group::{AssetGroupBody, CreateAssetGroupBody};
pub use campaign::{CampaignBody, CreateCampaignBody};
pub use config::ApiConfig;
pub use database::{SharedStore, Store};
pub use error::Error;
pub use partner::{CreatePartnerBody, PartnerBody};

/// Registers every route along with the extractor settings they rely on.
pub fn configure(
    store: Data<SharedStore>,
    config: Data<ApiConfig>,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let limit = config.max_upload_bytes;

        cfg.app_data(store)
            .app_data(config)
            .app_data(PayloadConfig::new(limit))
            .app_data(JsonConfig::default().limit(limit).error_handler(|err, _req| {
                // format json errors with custom format
                Error::InvalidJson(err).into()
            }))
            .app_data(PathConfig::default().error_handler(|err, _req| {
                // format path errors with custom format
                Error::InvalidPath(err).into()
            }))
            .app_data(QueryConfig::default().error_handler(|err, _req| {
                // format query errors with custom format
                Error::InvalidQuery(err).into()
            }))
            .service(partner::endpoints::get_partners)
            .service(partner::endpoints::create_partner)
            .service(partner::endpoints::get_partner_by_id)
            .service(partner::endpoints::update_partner)
            .service(partner::endpoints::archive_partner)
            .service(advertiser::endpoints::get_advertisers)
            .service(advertiser::endpoints::create_advertiser)
            .service(advertiser::endpoints::get_advertiser_by_id)
            .service(advertiser::endpoints::update_advertiser)
            .service(advertiser::endpoints::archive_advertiser)
            .service(campaign::endpoints::get_campaigns)
            .service(campaign::endpoints::create_campaign)
            .service(campaign::endpoints::get_campaign_by_id)
            .service(campaign::endpoints::update_campaign)
            .service(campaign::endpoints::activate_campaign)
            .service(campaign::endpoints::deactivate_campaign)
            .service(campaign::endpoints::archive_campaign)
            .service(asset_group::endpoints::get_asset_groups)
            .service(asset_group::endpoints::create_asset_group)
            .service(asset_group::endpoints::get_asset_group_by_id)
            .service(asset_group::endpoints::update_asset_group)
            .service(asset_group::endpoints::archive_asset_group)
            .service(ad::endpoints::get_ads)
            .service(ad::endpoints::create_file_ad)
            .service(ad::endpoints::create_tag_ad)
            .service(ad::endpoints::bulk_upload_ads)
            .service(ad::endpoints::get_ad_content)
            .service(ad::endpoints::get_ad_by_id)
            .service(ad::endpoints::update_ad)
            .service(ad::endpoints::archive_ad)
            .service(report::endpoints::query_report)
            .default_service(web::to(|| async { Error::PathDoesNotExist.error_response() }));
    }
}

pub async fn run(config: ApiConfig) -> Result<(), Error> {
    let mut store = Store::new();
    if config.seed_demo_data {
        seed::seed(&mut store)?;
    }

    let store = Data::new(Mutex::new(store));
    let bind = config.bind();
    let config = Data::new(config);

    info!("listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(configure(store.clone(), config.clone()))
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
