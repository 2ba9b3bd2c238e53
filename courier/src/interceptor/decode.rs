use async_trait::async_trait;
use courier_core::Request;
use serde::de::DeserializeOwned;
use smol_str::SmolStr;
use tracing::debug;

use crate::chain::{Chain, Flow, HttpResponse};
use crate::error::{CallError, DecodeErrorKind};
use crate::interceptor::Interceptor;
use crate::operation::Operation;

/// Decodes a JSON body into `T`, reporting where decoding stopped.
///
/// Dates are expected as RFC 3339 strings, the format `chrono`'s serde
/// support reads.
///
/// ```
/// use courier::{CallError, interceptor::decode};
///
/// #[derive(Debug, serde::Deserialize)]
/// struct Repo { owner: Owner }
/// #[derive(Debug, serde::Deserialize)]
/// struct Owner { id: u64 }
///
/// let error = decode::<Repo>(br#"{"owner":{"id":"x"}}"#, "repo").unwrap_err();
/// match error {
///     CallError::Decode { path, .. } => assert_eq!(path, "owner.id"),
///     other => panic!("unexpected {other}"),
/// }
/// ```
pub fn decode<T: DeserializeOwned>(body: &[u8], request: &str) -> Result<T, CallError> {
    let deserializer = &mut serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(deserializer).map_err(|error| {
        let path = error.path().to_string();
        let source = error.into_inner();
        CallError::Decode {
            request: SmolStr::new(request),
            path,
            kind: DecodeErrorKind::classify(&source),
            source,
        }
    })
}

/// Decodes the latest response into the request's payload type.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadDecodeInterceptor;

#[async_trait]
impl<R: Request> Interceptor<R> for PayloadDecodeInterceptor {
    async fn intercept(
        &self,
        chain: Chain<'_, R>,
        operation: &mut Operation,
        response: Option<HttpResponse<R::Payload>>,
    ) -> Flow {
        let Some(mut response) = response else {
            return chain.fail(operation, CallError::NoResponse, None).await;
        };
        match decode::<R::Payload>(&response.raw.body, operation.name()) {
            Ok(payload) => {
                response.parsed = Some(payload);
                chain.proceed(operation, Some(response)).await
            }
            Err(error) => {
                debug!(
                    request = operation.name(),
                    body = %String::from_utf8_lossy(&response.raw.body),
                    "undecodable response body"
                );
                chain.fail(operation, error, Some(&response.raw)).await
            }
        }
    }

    fn name(&self) -> &'static str {
        "payload_decode"
    }
}
