use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use serde::{Serialize, Serializer};

use crate::ad::AdId;
use crate::advertiser::AdvertiserId;
use crate::asset_group::AssetGroupId;
use crate::campaign::CampaignId;
use crate::partner::PartnerId;
use crate::violations::{Verdict, Violation};

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    ValidationFailed {
        detail: String,
        violations: Vec<Violation>,
    },
    PartnerExpected {
        partner_id: PartnerId,
    },
    AdvertiserExpected {
        advertiser_id: AdvertiserId,
    },
    CampaignExpected {
        campaign_id: CampaignId,
    },
    AssetGroupExpected {
        asset_group_id: AssetGroupId,
    },

    // 404
    PathDoesNotExist,
    PartnerDoesNotExist {
        partner_id: PartnerId,
    },
    AdvertiserDoesNotExist {
        advertiser_id: AdvertiserId,
    },
    CampaignDoesNotExist {
        campaign_id: CampaignId,
    },
    AssetGroupDoesNotExist {
        asset_group_id: AssetGroupId,
    },
    AdDoesNotExist {
        ad_id: AdId,
    },
    AdContentDoesNotExist {
        ad_id: AdId,
    },

    // 500
    ExistentialState(String),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    /// Turns a failed verdict into an error, passing a clean one through.
    pub fn check(detail: &str, verdict: Verdict) -> Result<(), Error> {
        if verdict.is_valid() {
            return Ok(());
        }

        Err(Error::ValidationFailed {
            detail: detail.to_string(),
            violations: verdict.into_violations(),
        })
    }

    pub fn invalid_field(detail: &str, field: &str, message: &str) -> Error {
        Error::ValidationFailed {
            detail: detail.to_string(),
            violations: vec![Violation::new(field, message)],
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidQuery(_) => "E4001003",
            Error::ValidationFailed { .. } => "E4001004",
            Error::PartnerExpected { .. } => "E4001005",
            Error::AdvertiserExpected { .. } => "E4001006",
            Error::CampaignExpected { .. } => "E4001007",
            Error::AssetGroupExpected { .. } => "E4001008",
            Error::PathDoesNotExist => "E4041000",
            Error::PartnerDoesNotExist { .. } => "E4041001",
            Error::AdvertiserDoesNotExist { .. } => "E4041002",
            Error::CampaignDoesNotExist { .. } => "E4041003",
            Error::AssetGroupDoesNotExist { .. } => "E4041004",
            Error::AdDoesNotExist { .. } => "E4041005",
            Error::AdContentDoesNotExist { .. } => "E4041006",
            Error::ExistentialState(_) => "E5001000",
            Error::IoError(_) => "E5001003",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::ValidationFailed { .. } => "The request failed validation",
            Error::PartnerExpected { .. } => "The referenced partner does not exist",
            Error::AdvertiserExpected { .. } => "The referenced advertiser does not exist",
            Error::CampaignExpected { .. } => "The referenced campaign does not exist",
            Error::AssetGroupExpected { .. } => "The referenced asset group does not exist",
            Error::PathDoesNotExist => "The requested path was not found",
            Error::PartnerDoesNotExist { .. } => "The requested partner was not found",
            Error::AdvertiserDoesNotExist { .. } => "The requested advertiser was not found",
            Error::CampaignDoesNotExist { .. } => "The requested campaign was not found",
            Error::AssetGroupDoesNotExist { .. } => "The requested asset group was not found",
            Error::AdDoesNotExist { .. } => "The requested ad was not found",
            Error::AdContentDoesNotExist { .. } => "The requested ad has no stored content",
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Error::PartnerExpected { .. } => StatusCode::BAD_REQUEST,
            Error::AdvertiserExpected { .. } => StatusCode::BAD_REQUEST,
            Error::CampaignExpected { .. } => StatusCode::BAD_REQUEST,
            Error::AssetGroupExpected { .. } => StatusCode::BAD_REQUEST,
            Error::PathDoesNotExist => StatusCode::NOT_FOUND,
            Error::PartnerDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::AdvertiserDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::CampaignDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::AssetGroupDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::AdDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::AdContentDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
