use actix_web::post;
use actix_web::web::Json;

use crate::error::Error;

use super::{run_report, Report, ReportQuery};

#[post("/v1/reports/query")]
#[tracing::instrument]
async fn query_report(body: Json<ReportQuery>) -> Result<Json<Report>, Error> {
    let report = run_report(&body)?;

    Ok(Json(report))
}
