use common::Role;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn faculty_sees_every_student_sorted_by_register_number() {
    let app = TestApp::spawn().await;
    let zed = app.create_student("zed@college.edu", "21CS200").await;
    let amy = app.create_student("amy@college.edu", "21CS100").await;
    app.submit_internship(&zed, &[("a.pdf", "offerLetter")]).await;
    app.submit_internship(&amy, &[("b.pdf", "offerLetter")]).await;
    let faculty = app.create_staff("prof@college.edu", Role::Faculty).await;

    let res = app.get_with_token(routes::ALL_INTERNSHIPS, &faculty).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["success"], true);
    let details = res.body["studentDetails"].as_array().unwrap();
    let registers: Vec<&str> = details
        .iter()
        .map(|p| p["registerNumber"].as_str().unwrap())
        .collect();
    assert_eq!(registers, ["21CS100", "21CS200"]);
    assert_eq!(details[0]["internships"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_may_list_all_internships() {
    let app = TestApp::spawn().await;
    let admin = app.create_staff("admin@college.edu", Role::Admin).await;

    let res = app.get_with_token(routes::ALL_INTERNSHIPS, &admin).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["studentDetails"], serde_json::json!([]));
}

#[tokio::test]
async fn student_cannot_list_all_internships() {
    let app = TestApp::spawn().await;
    let token = app.create_student("asha@college.edu", "21CS117").await;

    let res = app.get_with_token(routes::ALL_INTERNSHIPS, &token).await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn faculty_cannot_use_student_reads() {
    let app = TestApp::spawn().await;
    let faculty = app.create_staff("prof@college.edu", Role::Faculty).await;

    let res = app.get_with_token(routes::MY_INTERNSHIPS, &faculty).await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}
