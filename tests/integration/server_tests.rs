//! Collector HTTP surface tests

#[cfg(test)]
mod tests {
    use crate::common::TestDatabase;
    use crate::common::fixtures::{TEST_KEY, memory_service, service_over, signed};
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use metric_service::core::models::{Metric, MetricKind};
    use metric_service::server::{AppState, HttpServer};
    use metric_service::services::MetricService;
    use metric_service::utils::crypto::{
        ENCRYPTION_HEADER, ENCRYPTION_SCHEME, PayloadDecryptor, PayloadEncryptor,
        verify_hmac_signature,
    };
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
    use rsa::{RsaPrivateKey, RsaPublicKey};
    use std::sync::Arc;

    const BODY_LIMIT: usize = 1024 * 1024;

    fn data(service: Arc<MetricService>) -> web::Data<AppState> {
        web::Data::new(AppState::new(service, None))
    }

    #[actix_web::test]
    async fn test_json_update_and_query() {
        let service = memory_service(None);
        let app = test::init_service(HttpServer::create_app(data(service), BODY_LIMIT)).await;

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/update/")
                .set_json(Metric::counter("PollCount", 5))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let req = test::TestRequest::post()
            .uri("/value/")
            .set_json(serde_json::json!({"id": "PollCount", "type": "counter"}))
            .to_request();
        let stored: Metric = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stored.delta, Some(10));
        assert_eq!(stored.hash, None);
    }

    #[actix_web::test]
    async fn test_update_returns_signed_metric() {
        let service = memory_service(Some(TEST_KEY));
        let app = test::init_service(HttpServer::create_app(data(service), BODY_LIMIT)).await;

        let req = test::TestRequest::post()
            .uri("/update")
            .set_json(signed(Metric::gauge("testGauge", 12.5), TEST_KEY))
            .to_request();
        let stored: Metric = test::call_and_read_body_json(&app, req).await;

        let hash = stored.hash.as_deref().unwrap();
        assert!(verify_hmac_signature(TEST_KEY, "testGauge:gauge:12.500", hash).unwrap());
    }

    #[actix_web::test]
    async fn test_hash_mismatch_is_rejected_without_side_effects() {
        let service = memory_service(Some(TEST_KEY));
        let app =
            test::init_service(HttpServer::create_app(data(service.clone()), BODY_LIMIT)).await;

        let mut metric = signed(Metric::gauge("testGauge", 12.5), TEST_KEY);
        metric.value = Some(13.5);
        let req = test::TestRequest::post()
            .uri("/update/")
            .set_json(&metric)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        // missing hash counts as a mismatch when a key is configured
        let req = test::TestRequest::post()
            .uri("/update/")
            .set_json(Metric::gauge("testGauge", 12.5))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        assert!(service.get_all_metrics().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_positional_update_status_codes() {
        let app = test::init_service(HttpServer::create_app(
            data(memory_service(None)),
            BODY_LIMIT,
        ))
        .await;

        let cases = [
            ("/update/counter/hits/3", StatusCode::OK),
            ("/update/gauge/temp/21.5", StatusCode::OK),
            ("/update/histogram/x/1", StatusCode::NOT_IMPLEMENTED),
            ("/update/counter/hits/abc", StatusCode::BAD_REQUEST),
            ("/update/counter/hits/1.5", StatusCode::BAD_REQUEST),
            ("/update/gauge/temp/none", StatusCode::BAD_REQUEST),
        ];
        for (uri, expected) in cases {
            let resp =
                test::call_service(&app, test::TestRequest::post().uri(uri).to_request()).await;
            assert_eq!(resp.status(), expected, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_text_value_endpoint() {
        let app = test::init_service(HttpServer::create_app(
            data(memory_service(None)),
            BODY_LIMIT,
        ))
        .await;

        let req = test::TestRequest::post()
            .uri("/update/gauge/temp/21.5")
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/value/gauge/temp").to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "21.5");

        let req = test::TestRequest::get().uri("/value/counter/temp").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/value/summary/temp").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_IMPLEMENTED
        );
    }

    #[actix_web::test]
    async fn test_json_value_kind_mismatch_is_not_found() {
        let app = test::init_service(HttpServer::create_app(
            data(memory_service(None)),
            BODY_LIMIT,
        ))
        .await;

        let req = test::TestRequest::post()
            .uri("/update/counter/hits/1")
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/value")
            .set_json(serde_json::json!({"id": "hits", "type": "gauge"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_batch_and_dump() {
        let app = test::init_service(HttpServer::create_app(
            data(memory_service(None)),
            BODY_LIMIT,
        ))
        .await;

        let batch = vec![
            Metric::gauge("Alloc", 12.5),
            Metric::counter("PollCount", 1),
            Metric::counter("PollCount", 1),
        ];
        let req = test::TestRequest::post()
            .uri("/updates/")
            .set_json(&batch)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(
            resp.headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        assert_eq!(test::read_body(resp).await, "Alloc = 12.5\nPollCount = 2\n");
    }

    #[actix_web::test]
    async fn test_batch_with_one_bad_entry_writes_nothing() {
        let service = memory_service(Some(TEST_KEY));
        let app =
            test::init_service(HttpServer::create_app(data(service.clone()), BODY_LIMIT)).await;

        let mut tampered = signed(Metric::counter("PollCount", 1), TEST_KEY);
        tampered.delta = Some(100);
        let batch = vec![signed(Metric::gauge("Alloc", 1.0), TEST_KEY), tampered];

        let req = test::TestRequest::post()
            .uri("/updates")
            .set_json(&batch)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        assert!(service.get_all_metrics().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_malformed_batch_is_bad_request() {
        let app = test::init_service(HttpServer::create_app(
            data(memory_service(None)),
            BODY_LIMIT,
        ))
        .await;

        let req = test::TestRequest::post()
            .uri("/updates/")
            .insert_header(("content-type", "application/json"))
            .set_payload("not json")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_encrypted_batch() {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let public_pem = RsaPublicKey::from(&private_key)
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        let private_pem = private_key.to_pkcs8_pem(LineEnding::LF).unwrap();

        let encryptor = PayloadEncryptor::from_pem(&public_pem).unwrap();
        let decryptor = PayloadDecryptor::from_pem(private_pem.as_str()).unwrap();

        let service = memory_service(None);
        let state = web::Data::new(AppState::new(service.clone(), Some(decryptor)));
        let app = test::init_service(HttpServer::create_app(state, BODY_LIMIT)).await;

        let json = serde_json::to_vec(&vec![Metric::counter("Secret", 4)]).unwrap();
        let req = test::TestRequest::post()
            .uri("/updates/")
            .insert_header(("content-type", "application/octet-stream"))
            .insert_header((ENCRYPTION_HEADER, ENCRYPTION_SCHEME))
            .set_payload(encryptor.encrypt(&json).unwrap())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let stored = service.get_metric(&MetricKind::Counter, "Secret").await.unwrap();
        assert_eq!(stored.delta, Some(4));
    }

    #[actix_web::test]
    async fn test_encrypted_batch_without_key_is_rejected() {
        let app = test::init_service(HttpServer::create_app(
            data(memory_service(None)),
            BODY_LIMIT,
        ))
        .await;

        let req = test::TestRequest::post()
            .uri("/updates/")
            .insert_header((ENCRYPTION_HEADER, ENCRYPTION_SCHEME))
            .set_payload(vec![0u8; 32])
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_ping_reflects_database_state() {
        let db = TestDatabase::new().await;
        let service = service_over(db.repository(), None);
        let app =
            test::init_service(HttpServer::create_app(data(service.clone()), BODY_LIMIT)).await;

        let req = test::TestRequest::get().uri("/ping").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        service.shutdown().await.unwrap();

        let req = test::TestRequest::get().uri("/ping").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_gzip_request_body_is_decoded() {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write;

        let service = memory_service(None);
        let app =
            test::init_service(HttpServer::create_app(data(service.clone()), BODY_LIMIT)).await;

        let json = serde_json::to_vec(&vec![Metric::gauge("Zipped", 2.5)]).unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json).unwrap();
        let body = encoder.finish().unwrap();

        let req = test::TestRequest::post()
            .uri("/updates/")
            .insert_header(("content-type", "application/json"))
            .insert_header(("content-encoding", "gzip"))
            .set_payload(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let stored = service.get_metric(&MetricKind::Gauge, "Zipped").await.unwrap();
        assert_eq!(stored.value, Some(2.5));
    }
}
