use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use thiserror;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // client errors
    #[error("no image file provided")]
    MissingImagePart,
    #[error("artwork not found")]
    ArtworkNotFound,

    #[error("invalid multipart request: {0}")]
    MultipartError(#[from] axum::extract::multipart::MultipartError),

    // auth errors
    #[error("Unauthorized")]
    Unauthorized,

    // store errors
    #[error("database error: {0}")]
    SQLXError(#[from] sqlx::Error),
    #[error("query build error: {0}")]
    SeaQueryError(#[from] sea_query::error::Error),

    #[error("aws sdk put object error: {0}")]
    AWSSDKPutObjectError(
        #[from] aws_sdk_s3::error::SdkError<aws_sdk_s3::operation::put_object::PutObjectError>,
    ),
    #[error("aws sdk delete object error: {0}")]
    AWSSDKDeleteObjectError(
        #[from]
        aws_sdk_s3::error::SdkError<aws_sdk_s3::operation::delete_object::DeleteObjectError>,
    ),
    #[error("aws sdk credentials error: {0}")]
    AWSSDKCredentialsError(#[from] aws_credential_types::provider::error::CredentialsError),

    #[error("http error: {0}")]
    HTTPError(#[from] http::Error),
    #[error("hyper error: {0}")]
    HyperError(#[from] hyper::Error),
    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),

    // startup errors
    #[error("config deserialization error: {0}")]
    ConfigError(#[from] serde_yaml::Error),
    #[error("invalid cors origin: {0}")]
    InvalidCorsOrigin(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::MissingImagePart => StatusCode::BAD_REQUEST,
            Error::MultipartError(_) => StatusCode::BAD_REQUEST,
            Error::ArtworkNotFound => StatusCode::NOT_FOUND,
            Error::Unauthorized => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        }

        let body = ErrorBody {
            error: format!("{self}"),
        };
        (status, axum::Json(body)).into_response()
    }
}
