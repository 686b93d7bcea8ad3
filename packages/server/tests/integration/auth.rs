use serde_json::json;

use crate::common::{TestApp, routes};

mod signup {
    use super::*;

    #[tokio::test]
    async fn new_user_can_sign_up_with_valid_details() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::SIGNUP,
                &json!({"username": "ana", "email": "ana@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["username"], "ana");
        assert!(res.body.get("password").is_none());
    }

    #[tokio::test]
    async fn cannot_sign_up_with_a_taken_username() {
        let app = TestApp::spawn().await;

        let first = app
            .post_without_token(
                routes::SIGNUP,
                &json!({"username": "ana", "email": "ana@example.com", "password": "securepass"}),
            )
            .await;
        assert_eq!(first.status, 201, "First signup failed: {}", first.text);

        let res = app
            .post_without_token(
                routes::SIGNUP,
                &json!({"username": "ana", "email": "other@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn cannot_sign_up_with_a_taken_email() {
        let app = TestApp::spawn().await;

        let first = app
            .post_without_token(
                routes::SIGNUP,
                &json!({"username": "ana", "email": "ana@example.com", "password": "securepass"}),
            )
            .await;
        assert_eq!(first.status, 201, "First signup failed: {}", first.text);

        let res = app
            .post_without_token(
                routes::SIGNUP,
                &json!({"username": "bia", "email": "ANA@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn cannot_sign_up_with_a_short_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::SIGNUP,
                &json!({"username": "ana", "email": "ana@example.com", "password": "short"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_fields_are_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::SIGNUP, &json!({"username": "ana"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn returns_a_token_for_valid_credentials() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("ana", "securepass").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "ana", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(res.body["username"], "ana");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("ana", "securepass").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "ana", "password": "wrongpass"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_user_is_rejected_the_same_way() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "nobody", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn returns_the_authenticated_user() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("ana", "securepass").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "ana");
        assert!(res.body["id"].is_number());
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_a_forged_token() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-real-token").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}
