//! Draft creation and publish submission

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wechat_publisher_domain::{Credential, DraftArticle, Platform, PlatformError};

use super::WechatClient;

#[derive(Serialize)]
struct AddDraftRequest<'a> {
    articles: [&'a DraftArticle; 1],
}

#[derive(Deserialize)]
struct AddDraftResponse {
    media_id: Option<String>,
    errmsg: Option<String>,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    media_id: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

#[async_trait]
impl Platform for WechatClient {
    async fn create_draft(
        &self,
        credential: &Credential,
        draft: &DraftArticle,
    ) -> Result<String, PlatformError> {
        let response = self
            .client
            .post(self.url("/cgi-bin/draft/add"))
            .query(&[("access_token", credential.expose())])
            .json(&AddDraftRequest { articles: [draft] })
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let parsed: AddDraftResponse = serde_json::from_str(&body)
            .map_err(|_| PlatformError::DraftRejected(body.clone()))?;

        match parsed.media_id.filter(|m| !m.is_empty()) {
            Some(media_id) => {
                tracing::info!(media_id = %media_id, "Draft created");
                Ok(media_id)
            }
            None => Err(PlatformError::DraftRejected(parsed.errmsg.unwrap_or(body))),
        }
    }

    async fn submit_publish(
        &self,
        credential: &Credential,
        media_id: &str,
    ) -> Result<(), PlatformError> {
        let response = self
            .client
            .post(self.url("/cgi-bin/freepublish/submit"))
            .query(&[("access_token", credential.expose())])
            .json(&SubmitRequest { media_id })
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let parsed: SubmitResponse =
            serde_json::from_str(&body).map_err(|_| PlatformError::PublishRejected {
                code: -1,
                message: body.clone(),
            })?;

        // A body without errcode counts as success
        if parsed.errcode != 0 {
            return Err(PlatformError::PublishRejected {
                code: parsed.errcode,
                message: parsed.errmsg,
            });
        }

        tracing::info!(media_id, "Publish submitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> WechatClient {
        WechatClient::with_base_url(
            "wx-app".to_string(),
            SecretString::new("wx-secret".into()),
            server.uri(),
            5,
        )
    }

    fn credential() -> Credential {
        Credential::new(SecretString::new("ACCESS".into()))
    }

    fn sample_draft() -> DraftArticle {
        DraftArticle {
            title: "标题".to_string(),
            author: "作者".to_string(),
            content: "<p>正文</p>".to_string(),
            digest: "摘要".to_string(),
            content_source_url: String::new(),
            thumb_media_id: "thumb".to_string(),
            pic_crop_235_1: "0_0_1_1".to_string(),
            pic_crop_1_1: "0_0_1_1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_draft_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/cgi-bin/draft/add"))
            .and(query_param("access_token", "ACCESS"))
            .and(body_json(serde_json::json!({
                "articles": [{
                    "title": "标题",
                    "author": "作者",
                    "content": "<p>正文</p>",
                    "digest": "摘要",
                    "content_source_url": "",
                    "thumb_media_id": "thumb",
                    "pic_crop_235_1": "0_0_1_1",
                    "pic_crop_1_1": "0_0_1_1"
                }]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"media_id": "MEDIA"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let media_id = client(&mock_server)
            .create_draft(&credential(), &sample_draft())
            .await
            .unwrap();

        assert_eq!(media_id, "MEDIA");
    }

    #[tokio::test]
    async fn test_create_draft_rejection_keeps_errmsg() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/cgi-bin/draft/add"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 40007,
                "errmsg": "invalid media_id"
            })))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server)
            .create_draft(&credential(), &sample_draft())
            .await;

        assert!(matches!(result, Err(PlatformError::DraftRejected(msg)) if msg == "invalid media_id"));
    }

    #[tokio::test]
    async fn test_submit_publish_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/cgi-bin/freepublish/submit"))
            .and(query_param("access_token", "ACCESS"))
            .and(body_json(serde_json::json!({"media_id": "MEDIA"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 0,
                "errmsg": "ok",
                "publish_id": "100000001"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        client(&mock_server)
            .submit_publish(&credential(), "MEDIA")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_submit_publish_nonzero_errcode() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/cgi-bin/freepublish/submit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 48001,
                "errmsg": "api unauthorized"
            })))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server)
            .submit_publish(&credential(), "MEDIA")
            .await;

        match result {
            Err(PlatformError::PublishRejected { code, message }) => {
                assert_eq!(code, 48001);
                assert_eq!(message, "api unauthorized");
            }
            other => panic!("expected PublishRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_publish_without_errcode_succeeds() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/cgi-bin/freepublish/submit"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"publish_id": "1"})),
            )
            .mount(&mock_server)
            .await;

        assert!(
            client(&mock_server)
                .submit_publish(&credential(), "MEDIA")
                .await
                .is_ok()
        );
    }
}
