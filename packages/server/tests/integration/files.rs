use common::{DocumentType, Role};

use crate::common::{TestApp, file_content};

const EMAIL: &str = "asha@college.edu";

async fn stored_link(app: &TestApp, token: &str) -> String {
    app.submit_internship(token, &[("offer.pdf", "offerLetter")]).await;
    app.stored_profile(EMAIL).await.internships[0].documents[&DocumentType::OfferLetter]
        .link
        .clone()
}

#[tokio::test]
async fn owner_can_download_stored_document() {
    let app = TestApp::spawn().await;
    let token = app.create_student(EMAIL, "21CS117").await;
    let link = stored_link(&app, &token).await;

    let res = app.client.get(&link).bearer_auth(&token).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/pdf");
    assert_eq!(res.bytes().await.unwrap().to_vec(), file_content("offer.pdf"));
}

#[tokio::test]
async fn faculty_can_download_any_students_document() {
    let app = TestApp::spawn().await;
    let token = app.create_student(EMAIL, "21CS117").await;
    let link = stored_link(&app, &token).await;
    let faculty = app.create_staff("prof@college.edu", Role::Faculty).await;

    let res = app.client.get(&link).bearer_auth(&faculty).send().await.unwrap();

    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn other_student_cannot_download() {
    let app = TestApp::spawn().await;
    let token = app.create_student(EMAIL, "21CS117").await;
    let link = stored_link(&app, &token).await;
    let other = app.create_student("ravi@college.edu", "21CS118").await;

    let res = app.client.get(&link).bearer_auth(&other).send().await.unwrap();

    assert_eq!(res.status(), 403);
}

#[tokio::test]
async fn download_requires_a_token() {
    let app = TestApp::spawn().await;
    let token = app.create_student(EMAIL, "21CS117").await;
    let link = stored_link(&app, &token).await;

    let res = app.client.get(&link).send().await.unwrap();

    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn missing_file_is_404() {
    let app = TestApp::spawn().await;
    let token = app.create_student(EMAIL, "21CS117").await;

    let res = app
        .get_with_token("/api/user/files/21CS117/nothing.pdf", &token)
        .await;

    assert_eq!(res.status, 404);
}
