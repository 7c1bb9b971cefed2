use common::{DocumentType, Role};
use common::gateway::FileStore;

use crate::common::{
    TestApp, Verdict, forge_token, full_fields, internship_form, routes,
};

const EMAIL: &str = "asha@college.edu";

mod submit {
    use super::*;

    #[tokio::test]
    async fn every_declared_document_is_stored_and_resolvable() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        let files: Vec<(String, &str)> = DocumentType::ALL
            .iter()
            .map(|doc| (format!("{}.pdf", doc.key()), doc.key()))
            .collect();
        let files: Vec<(&str, &str)> = files.iter().map(|(f, d)| (f.as_str(), *d)).collect();

        let res = app
            .post_form_with_token(routes::UPLOAD, internship_form(&full_fields(), &files), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Internship details uploaded successfully");
        let outcomes = res.body["files"].as_array().unwrap();
        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.iter().all(|o| o["status"] == "uploaded"));

        let profile = app.stored_profile(EMAIL).await;
        assert_eq!(profile.internships.len(), 1);
        let record = &profile.internships[0];
        assert_eq!(record.documents.len(), 6);
        for status in record.documents.values() {
            assert!(app.files.resolve(&status.link).await.unwrap(), "{}", status.link);
        }
    }

    #[tokio::test]
    async fn response_record_matches_the_stored_record() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("offer.pdf", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let stored = app.stored_profile(EMAIL).await.internships.remove(0);
        assert_eq!(res.body["data"], serde_json::to_value(&stored).unwrap());
        assert_eq!(stored.fields.company_name, "Acme Corp");
        assert_eq!(stored.fields.start_date, "2024-06-01");
    }

    #[tokio::test]
    async fn stored_file_names_use_register_suffix_and_document_key() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;

        app.submit_internship(&token, &[("my offer.pdf", "offerLetter")]).await;

        let record = app.stored_profile(EMAIL).await.internships.remove(0);
        let link = &record.documents[&DocumentType::OfferLetter].link;
        let name = link.rsplit('/').next().unwrap();
        assert!(link.contains("/21CS117/"), "{link}");
        assert!(name.starts_with("117-offerLetter-"), "{name}");
        assert!(name.ends_with(".pdf"), "{name}");
    }

    #[tokio::test]
    async fn matching_classification_marks_document_verified() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        app.classifier
            .script("report.pdf", Verdict::reports("Document Type: Internship Report"));
        app.classifier
            .script("cert.pdf", Verdict::reports("Offer Letter"));

        app.submit_internship(
            &token,
            &[("report.pdf", "internshipReport"), ("cert.pdf", "completionCertificate")],
        )
        .await;

        let record = app.stored_profile(EMAIL).await.internships.remove(0);
        assert!(record.documents[&DocumentType::InternshipReport].verified);
        assert!(!record.documents[&DocumentType::CompletionCertificate].verified);
    }

    #[tokio::test]
    async fn classifier_timeout_still_succeeds_unverified() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        app.classifier.script("offer.pdf", Verdict::Hangs);

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("offer.pdf", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["files"][0]["status"], "uploaded");
        assert_eq!(res.body["files"][0]["verified"], false);
        assert_eq!(res.body["data"]["documents"]["offerLetter"]["verified"], false);
    }

    #[tokio::test]
    async fn two_files_of_one_type_keep_only_the_second() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        app.classifier.script("first.pdf", Verdict::reports("internshipReport"));
        app.classifier.script("second.pdf", Verdict::reports("offerLetter"));

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(
                    &full_fields(),
                    &[("first.pdf", "offerLetter"), ("second.pdf", "offerLetter")],
                ),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let second_link = res.body["files"][1]["link"].as_str().unwrap().to_string();
        let record = app.stored_profile(EMAIL).await.internships.remove(0);
        assert_eq!(record.documents.len(), 1);
        let offer = &record.documents[&DocumentType::OfferLetter];
        assert_eq!(offer.link, second_link);
        assert!(offer.verified);
        assert_eq!(offer.extracted_text.as_deref(), Some("text of second.pdf"));
    }

    #[tokio::test]
    async fn same_type_files_never_share_a_stored_name() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;

        for _ in 0..10 {
            let res = app
                .post_form_with_token(
                    routes::UPLOAD,
                    internship_form(
                        &full_fields(),
                        &[("first.pdf", "offerLetter"), ("second.pdf", "offerLetter")],
                    ),
                    &token,
                )
                .await;

            assert_eq!(res.status, 200, "{}", res.text);
            let files = res.body["files"].as_array().unwrap();
            assert_eq!(files[0]["status"], "uploaded");
            assert_eq!(files[1]["status"], "uploaded");
            let first = files[0]["link"].as_str().unwrap();
            let second = files[1]["link"].as_str().unwrap();
            assert_ne!(first, second);
            assert!(app.files.resolve(first).await.unwrap());
            assert!(app.files.resolve(second).await.unwrap());
        }
    }

    #[tokio::test]
    async fn untagged_file_is_skipped_and_reported() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;

        let form = internship_form(&full_fields(), &[("offer.pdf", "offerLetter")]).part(
            "documents",
            reqwest::multipart::Part::bytes(b"%PDF-1.4".to_vec()).file_name("mystery.pdf"),
        );
        let res = app.post_form_with_token(routes::UPLOAD, form, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let files = res.body["files"].as_array().unwrap();
        assert_eq!(files[0]["status"], "uploaded");
        assert_eq!(files[1]["filename"], "mystery.pdf");
        assert_eq!(files[1]["status"], "skipped");
        let record = app.stored_profile(EMAIL).await.internships.remove(0);
        assert_eq!(record.documents.len(), 1);
    }

    #[tokio::test]
    async fn mirror_receives_one_row_per_student() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;

        let first = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("a.pdf", "offerLetter")]),
                &token,
            )
            .await;
        let second = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("b.pdf", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(first.body["mirror"], "appended");
        assert_eq!(second.body["mirror"], "updated");
        assert_eq!(app.mirror.row_count(), 1);
        assert_eq!(app.stored_profile(EMAIL).await.internships.len(), 2);
    }

    #[tokio::test]
    async fn mirror_failure_is_reported_not_raised() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        app.mirror.fail_writes();

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("a.pdf", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["mirror"], "failed");
        assert_eq!(app.stored_profile(EMAIL).await.internships.len(), 1);
    }
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn first_missing_field_is_named() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        let fields: Vec<_> = full_fields()
            .into_iter()
            .filter(|(name, _)| !matches!(*name, "startDate" | "location"))
            .collect();

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&fields, &[("a.pdf", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Missing required field: startDate");
        assert!(app.stored_profile(EMAIL).await.internships.is_empty());
    }

    #[tokio::test]
    async fn blank_field_counts_as_missing() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        let mut fields = full_fields();
        fields[0] = ("role", "   ");

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&fields, &[("a.pdf", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Missing required field: role");
    }

    #[tokio::test]
    async fn submission_without_files_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;

        let res = app
            .post_form_with_token(routes::UPLOAD, internship_form(&full_fields(), &[]), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.stored_profile(EMAIL).await.internships.is_empty());
    }

    #[tokio::test]
    async fn more_than_six_files_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        let names: Vec<String> = (0..7).map(|i| format!("f{i}.pdf")).collect();
        let files: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "offerLetter")).collect();

        let res = app
            .post_form_with_token(routes::UPLOAD, internship_form(&full_fields(), &files), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.stored_profile(EMAIL).await.internships.is_empty());
    }

    #[tokio::test]
    async fn disallowed_extension_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("payload.exe", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        let form = internship_form(&full_fields(), &[]).text("documentType_big.pdf", "offerLetter").part(
            "documents",
            reqwest::multipart::Part::bytes(vec![b'x'; 65 * 1024]).file_name("big.pdf"),
        );

        let res = app.post_form_with_token(routes::UPLOAD, form, &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.stored_profile(EMAIL).await.internships.is_empty());
    }

    #[tokio::test]
    async fn student_without_profile_gets_404() {
        let app = TestApp::spawn().await;
        app.create_account(EMAIL, Role::Student, None).await;
        let token = app.login(EMAIL).await;

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("a.pdf", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod access {
    use super::*;

    #[tokio::test]
    async fn faculty_cannot_submit_and_nothing_changes() {
        let app = TestApp::spawn().await;
        app.create_student(EMAIL, "21CS117").await;
        let faculty = app.create_staff("prof@college.edu", Role::Faculty).await;
        let before = app.all_profiles().await;

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("a.pdf", "offerLetter")]),
                &faculty,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert_eq!(app.all_profiles().await, before);
        assert_eq!(app.mirror.row_count(), 0);
    }

    #[tokio::test]
    async fn forged_faculty_token_for_a_student_email_is_denied() {
        let app = TestApp::spawn().await;
        app.create_student(EMAIL, "21CS117").await;
        let token = forge_token(EMAIL, Role::Faculty, 0);

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("a.pdf", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert!(app.stored_profile(EMAIL).await.internships.is_empty());
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn all_uploads_failing_saves_nothing() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        app.files.fail_uploads_of("offerLetter");

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("a.pdf", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "UPSTREAM_UNAVAILABLE");
        assert!(app.stored_profile(EMAIL).await.internships.is_empty());
        assert_eq!(app.mirror.row_count(), 0);
    }

    #[tokio::test]
    async fn one_failed_upload_is_reported_per_file() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        app.files.fail_uploads_of("offerLetter");

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(
                    &full_fields(),
                    &[("a.pdf", "offerLetter"), ("b.pdf", "internshipReport")],
                ),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["files"][0]["status"], "failed");
        assert!(res.body["files"][0]["error"].is_string());
        assert_eq!(res.body["files"][1]["status"], "uploaded");
        let record = app.stored_profile(EMAIL).await.internships.remove(0);
        assert!(!record.documents.contains_key(&DocumentType::OfferLetter));
        assert!(record.documents.contains_key(&DocumentType::InternshipReport));
    }

    #[tokio::test]
    async fn record_write_failure_lists_uploaded_files() {
        let app = TestApp::spawn().await;
        let token = app.create_student(EMAIL, "21CS117").await;
        app.store.fail_record_writes();

        let res = app
            .post_form_with_token(
                routes::UPLOAD,
                internship_form(&full_fields(), &[("a.pdf", "offerLetter")]),
                &token,
            )
            .await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "PARTIALLY_COMMITTED");
        let uploaded = res.body["uploaded"].as_array().unwrap();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(uploaded[0]["filename"], "a.pdf");
        assert_eq!(uploaded[0]["documentType"], "offerLetter");
        let link = uploaded[0]["link"].as_str().unwrap();
        assert!(app.files.resolve(link).await.unwrap());
        assert!(app.stored_profile(EMAIL).await.internships.is_empty());
    }
}
