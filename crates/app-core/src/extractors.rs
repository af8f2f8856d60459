//! Custom Axum extractors whose rejections render as [`AppError`].

use axum::body::Body;
use axum::extract::{FromRequest, Json, Multipart};
use axum::http::Request;
use serde::de::DeserializeOwned;

use super::error::AppError;

#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

pub struct AppMultipart(pub Multipart);

impl<S> FromRequest<S> for AppMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        Ok(Self(multipart))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct ThemeBody {
        theme: String,
    }

    #[tokio::test]
    async fn test_app_json_success() {
        let request = Request::builder()
            .method(Method::PUT)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"theme":"dark"}"#))
            .unwrap();

        let AppJson(parsed) = AppJson::<ThemeBody>::from_request(request, &()).await.unwrap();
        assert_eq!(parsed, ThemeBody { theme: "dark".to_string() });
    }

    #[tokio::test]
    async fn test_app_json_error() {
        let request = Request::builder()
            .method(Method::PUT)
            .header("content-type", "application/json")
            .body(Body::from("{invalid json}"))
            .unwrap();

        let result = AppJson::<ThemeBody>::from_request(request, &()).await;
        assert!(matches!(result, Err(AppError::RequestFormat(_))));
    }

    #[tokio::test]
    async fn test_app_multipart_success() {
        let body = "--XBOUNDARY\r\n\
                    Content-Disposition: form-data; name=\"full_name\"\r\n\r\n\
                    Rani\r\n\
                    --XBOUNDARY--\r\n";
        let request = Request::builder()
            .method(Method::POST)
            .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let AppMultipart(mut multipart) = AppMultipart::from_request(request, &()).await.unwrap();
        let field = multipart.next_field().await.unwrap().unwrap();
        assert_eq!(field.name(), Some("full_name"));
        assert_eq!(field.text().await.unwrap(), "Rani");
    }

    #[tokio::test]
    async fn test_app_multipart_wrong_content_type() {
        let request = Request::builder()
            .method(Method::POST)
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let result = AppMultipart::from_request(request, &()).await;
        assert!(matches!(result, Err(AppError::RequestFormat(_))));
    }
}
