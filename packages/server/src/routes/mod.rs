use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::UploadConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(upload: &UploadConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(auth_routes())
        .nest("/student", student_routes(upload))
        .nest("/faculty", faculty_routes())
        .routes(routes!(handlers::files::download_file))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::logout))
        .routes(routes!(handlers::auth::verify))
}

fn student_routes(upload: &UploadConfig) -> OpenApiRouter<AppState> {
    let reads = OpenApiRouter::new()
        .routes(routes!(handlers::student::list_my_internships))
        .routes(routes!(handlers::student::get_my_internship));

    let uploads = OpenApiRouter::new()
        .routes(routes!(handlers::student::submit_internship))
        .routes(routes!(handlers::student::update_my_internship))
        .layer(handlers::student::upload_body_limit(upload));

    reads.merge(uploads)
}

fn faculty_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::faculty::list_all_internships))
}
