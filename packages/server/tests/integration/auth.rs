use common::Role;
use serde_json::json;

use crate::common::{PASSWORD, TestApp, forge_token, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn student_login_returns_token_and_profile_name() {
        let app = TestApp::spawn().await;
        app.create_student("asha@college.edu", "21CS117").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "asha@college.edu", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["accessToken"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(res.body["name"], "Student 21CS117");
        assert_eq!(res.body["email"], "asha@college.edu");
        assert_eq!(res.body["role"], "student");
    }

    #[tokio::test]
    async fn faculty_login_uses_a_role_stub_for_the_name() {
        let app = TestApp::spawn().await;
        app.create_account("prof@college.edu", Role::Faculty, None).await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "prof@college.edu", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Faculty");
        assert_eq!(res.body["role"], "faculty");
    }

    #[tokio::test]
    async fn login_sets_an_http_only_cookie() {
        let app = TestApp::spawn().await;
        app.create_student("asha@college.edu", "21CS117").await;

        let res = app
            .client
            .post(app.url(routes::LOGIN))
            .json(&json!({"email": "asha@college.edu", "password": PASSWORD}))
            .send()
            .await
            .unwrap();

        let cookie = res
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .expect("login should set a cookie")
            .to_string();
        assert!(cookie.starts_with("access_token="), "{cookie}");
        assert!(cookie.contains("HttpOnly"), "{cookie}");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let app = TestApp::spawn().await;
        app.create_student("asha@college.edu", "21CS117").await;

        let wrong_password = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "asha@college.edu", "password": "not-it"}),
            )
            .await;
        let unknown_email = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "nobody@college.edu", "password": PASSWORD}),
            )
            .await;

        assert_eq!(wrong_password.status, 401);
        assert_eq!(unknown_email.status, 401);
        assert_eq!(wrong_password.body["code"], "INVALID_CREDENTIALS");
        assert_eq!(wrong_password.body, unknown_email.body);
    }

    #[tokio::test]
    async fn malformed_email_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "not-an-email", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_password_field_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::LOGIN, &json!({"email": "asha@college.edu"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_401_token_missing() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::MY_INTERNSHIPS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_403_token_invalid() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::MY_INTERNSHIPS, "not.a.jwt").await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn expired_token_is_403_not_401() {
        let app = TestApp::spawn().await;
        app.create_student("asha@college.edu", "21CS117").await;
        let expired = forge_token("asha@college.edu", Role::Student, 3601);

        for path in [routes::MY_INTERNSHIPS, routes::VERIFY, routes::ALL_INTERNSHIPS] {
            let res = app.get_with_token(path, &expired).await;
            assert_eq!(res.status, 403, "{path}: {}", res.text);
            assert_eq!(res.body["code"], "TOKEN_INVALID", "{path}");
        }
    }

    #[tokio::test]
    async fn token_within_its_hour_is_accepted() {
        let app = TestApp::spawn().await;
        app.create_student("asha@college.edu", "21CS117").await;
        let token = forge_token("asha@college.edu", Role::Student, 3500);

        let res = app.get_with_token(routes::MY_INTERNSHIPS, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let app = TestApp::spawn().await;
        let identity = server::utils::jwt::Identity {
            id: "x".into(),
            name: "x".into(),
            email: "asha@college.edu".into(),
            role: Role::Student,
        };
        let token = server::utils::jwt::sign(
            &identity,
            chrono::Utc::now().timestamp(),
            3600,
            "some-other-secret",
        )
        .unwrap();

        let res = app.get_with_token(routes::MY_INTERNSHIPS, &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod session {
    use super::*;

    fn cookie_client() -> reqwest::Client {
        reqwest::Client::builder().cookie_store(true).build().unwrap()
    }

    #[tokio::test]
    async fn cookie_alone_authenticates_requests() {
        let app = TestApp::spawn().await;
        app.create_student("asha@college.edu", "21CS117").await;
        let client = cookie_client();

        let login = client
            .post(app.url(routes::LOGIN))
            .json(&json!({"email": "asha@college.edu", "password": PASSWORD}))
            .send()
            .await
            .unwrap();
        assert_eq!(login.status(), 200);

        let res = client
            .get(app.url(routes::MY_INTERNSHIPS))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }

    #[tokio::test]
    async fn verify_returns_decoded_identity() {
        let app = TestApp::spawn().await;
        let token = app.create_student("asha@college.edu", "21CS117").await;

        let res = app.get_with_token(routes::VERIFY, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["user"]["email"], "asha@college.edu");
        assert_eq!(res.body["user"]["role"], "student");
    }

    #[tokio::test]
    async fn logout_clears_the_cookie() {
        let app = TestApp::spawn().await;
        app.create_student("asha@college.edu", "21CS117").await;
        let client = cookie_client();

        client
            .post(app.url(routes::LOGIN))
            .json(&json!({"email": "asha@college.edu", "password": PASSWORD}))
            .send()
            .await
            .unwrap();

        let logout = client.post(app.url(routes::LOGOUT)).send().await.unwrap();
        assert_eq!(logout.status(), 200);

        let res = client.get(app.url(routes::VERIFY)).send().await.unwrap();
        assert_eq!(res.status(), 401);
    }
}
