//! Reading service: the two round trips the UI needs.
//!
//! - submit: ID token -> `{max, min, bpm}` -> one authenticated POST
//! - fetch_all: one public GET -> decoded readings
//!
//! No retries and no caching; every call is one network request.

use log::debug;

use crate::api_client::RecordApi;
use crate::auth::TokenProvider;
use crate::error::ApiError;
use crate::record_parser::parse_records;
use crate::types::{Reading, SubmitRequest};

pub struct ReadingService<A, T> {
    api: A,
    tokens: T,
}

impl<A: RecordApi, T: TokenProvider> ReadingService<A, T> {
    pub fn new(api: A, tokens: T) -> Self {
        Self { api, tokens }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Submit one reading. Fails with [`ApiError::AuthRequired`] before any
    /// request is made when there is no ID token.
    pub async fn submit(&self, systolic: i32, diastolic: i32, pulse: i32) -> Result<(), ApiError> {
        let token = self
            .tokens
            .current_id_token()
            .await
            .ok_or(ApiError::AuthRequired)?;

        let request = SubmitRequest::from(&Reading::new(systolic, diastolic, pulse));
        self.api.post_record(&request, &token).await
    }

    /// Fetch and decode the full history. Bad lines are dropped, so only the
    /// fetch itself can fail.
    pub async fn fetch_all(&self) -> Result<Vec<Reading>, ApiError> {
        let raw = self.api.fetch_records_text().await?;
        let readings = parse_records(&raw);
        debug!(
            "Decoded {} readings from {} lines",
            readings.len(),
            raw.lines().count()
        );
        Ok(readings)
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    use std::sync::Mutex;

    use super::*;

    /// Records every call; answers with canned statuses.
    #[derive(Default)]
    pub struct MockApi {
        pub posts: Mutex<Vec<(SubmitRequest, String)>>,
        pub fetches: Mutex<usize>,
        /// None = 2xx
        pub post_status: Option<u16>,
        pub fetch_body: String,
        pub fetch_status: Option<u16>,
        pub transport_down: bool,
    }

    impl MockApi {
        pub fn post_count(&self) -> usize {
            self.posts.lock().unwrap().len()
        }

        fn outcome(&self, status: Option<u16>) -> Result<(), ApiError> {
            if self.transport_down {
                return Err(ApiError::Transport("connection refused".to_string()));
            }
            match status {
                Some(status) => Err(ApiError::Rejected {
                    status,
                    message: "stubbed".to_string(),
                }),
                None => Ok(()),
            }
        }
    }

    impl RecordApi for MockApi {
        async fn post_record(&self, request: &SubmitRequest, id_token: &str) -> Result<(), ApiError> {
            self.posts
                .lock()
                .unwrap()
                .push((*request, format!("Bearer {}", id_token)));
            self.outcome(self.post_status)
        }

        async fn fetch_records_text(&self) -> Result<String, ApiError> {
            *self.fetches.lock().unwrap() += 1;
            self.outcome(self.fetch_status)?;
            Ok(self.fetch_body.clone())
        }
    }

    pub struct StaticToken(pub Option<&'static str>);

    impl TokenProvider for StaticToken {
        async fn current_id_token(&self) -> Option<String> {
            self.0.map(|t| t.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::{MockApi, StaticToken};
    use super::*;

    fn service(api: MockApi, token: Option<&'static str>) -> ReadingService<MockApi, StaticToken> {
        ReadingService::new(api, StaticToken(token))
    }

    #[tokio::test]
    async fn test_submit_without_token_makes_no_call() {
        let svc = service(MockApi::default(), None);

        let err = svc.submit(120, 80, 70).await.unwrap_err();

        assert_eq!(err, ApiError::AuthRequired);
        assert_eq!(svc.api().post_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_encodes_payload_and_bearer() {
        let svc = service(MockApi::default(), Some("id-token"));

        svc.submit(131, 86, 64).await.unwrap();

        let posts = svc.api().posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        let (req, auth) = &posts[0];
        assert_eq!(*req, SubmitRequest { max: 131, min: 86, bpm: 64 });
        assert_eq!(auth, "Bearer id-token");
    }

    #[tokio::test]
    async fn test_submit_rejection_carries_status() {
        for status in [400u16, 401, 500] {
            let api = MockApi {
                post_status: Some(status),
                ..Default::default()
            };
            let svc = service(api, Some("t"));

            let err = svc.submit(120, 80, 70).await.unwrap_err();
            assert!(err.to_string().contains(&status.to_string()));
            assert_eq!(svc.api().post_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_submit_transport_failure_not_retried() {
        let api = MockApi {
            transport_down: true,
            ..Default::default()
        };
        let svc = service(api, Some("t"));

        let err = svc.submit(120, 80, 70).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(svc.api().post_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submits_are_independent() {
        let svc = service(MockApi::default(), Some("t"));

        let (a, b) = tokio::join!(svc.submit(120, 80, 70), svc.submit(120, 80, 70));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(svc.api().post_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_all_decodes() {
        let api = MockApi {
            fetch_body: "2024-01-15\t08:30\t120\t80\t70".to_string(),
            ..Default::default()
        };
        let svc = service(api, None);

        let readings = svc.fetch_all().await.unwrap();

        assert_eq!(
            readings,
            vec![Reading {
                systolic: 120,
                diastolic: 80,
                pulse: 70,
                recorded_at: Some("2024-01-15 08:30".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_fetch_all_empty_body() {
        let api = MockApi {
            fetch_body: "\n  \n".to_string(),
            ..Default::default()
        };
        assert!(service(api, None).fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_failure() {
        for status in [404u16, 500] {
            let api = MockApi {
                fetch_status: Some(status),
                fetch_body: "2024-01-15\t08:30\t120\t80\t70".to_string(),
                ..Default::default()
            };
            let svc = service(api, None);

            let err = svc.fetch_all().await.unwrap_err();
            assert!(err.to_string().contains(&status.to_string()));
            assert_eq!(*svc.api().fetches.lock().unwrap(), 1);
        }
    }
}
