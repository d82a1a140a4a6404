use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn register_returns_created_user_without_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "alice",
                    "fullname": "Alice Wonder",
                    "password": PASSWORD,
                    "avatar": "https://cdn.test/alice.png",
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["statusCode"], 201);
        assert_eq!(res.body["message"], "User registered successfully");
        assert_eq!(res.body["data"]["username"], "alice");
        assert_eq!(res.body["data"]["fullname"], "Alice Wonder");
        assert_eq!(res.body["data"]["avatar"], "https://cdn.test/alice.png");
        assert!(res.body["data"].get("password").is_none());
        assert!(!res.text.contains(PASSWORD));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_user("alice").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "fullname": "Another", "password": PASSWORD}),
            )
            .await;

        res.assert_error(409, "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn invalid_username_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "al ice", "fullname": "Alice", "password": PASSWORD}),
            )
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "fullname": "Alice", "password": "short"}),
            )
            .await;

        res.assert_error(400, "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Password must be 8-128 characters");
    }

    #[tokio::test]
    async fn malformed_json_is_an_error_envelope() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(app.url(routes::REGISTER))
            .header("Content-Type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        let res = crate::common::TestResponse::from_response(res).await;

        res.assert_error(400, "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn login_returns_token_and_user() {
        let app = TestApp::spawn().await;
        app.create_user("alice").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "alice", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Logged in successfully");
        assert!(res.body["data"]["token"].as_str().unwrap().len() > 20);
        assert_eq!(res.body["data"]["user"]["username"], "alice");
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let app = TestApp::spawn().await;
        app.create_user("alice").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "alice", "password": "wrongpassword"}),
            )
            .await;

        res.assert_error(401, "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_user_is_invalid_credentials() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "ghost", "password": PASSWORD}),
            )
            .await;

        res.assert_error(401, "INVALID_CREDENTIALS");
    }
}

mod current_user {
    use super::*;

    #[tokio::test]
    async fn me_returns_profile() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app.get_with_token(routes::ME, &alice.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["id"], alice.id.as_str());
        assert_eq!(res.body["data"]["username"], alice.username.as_str());
    }

    #[tokio::test]
    async fn missing_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        res.assert_error(401, "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        res.assert_error(401, "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn non_bearer_scheme() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .client
            .get(app.url(routes::ME))
            .header("Authorization", format!("Token {}", alice.token))
            .send()
            .await
            .unwrap();
        let res = crate::common::TestResponse::from_response(res).await;

        res.assert_error(401, "TOKEN_INVALID");
    }
}

mod surface {
    use super::*;

    #[tokio::test]
    async fn unknown_route_is_not_found_envelope() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token("/api/v1/nothing-here").await;

        res.assert_error(404, "NOT_FOUND");
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token("/api-docs/openapi.json").await;

        assert_eq!(res.status, 200);
        let paths = res.body["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/auth/login"));
        assert!(paths.contains_key("/api/v1/videos/{video_id}/publish"));
        assert!(paths.contains_key("/api/v1/subscriptions/c/{channel_id}"));
    }
}
