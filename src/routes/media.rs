use rocket::{
    form::Form, fs::TempFile, post, routes, tokio::io::AsyncReadExt, FromForm, Route, State,
};
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::{
    models::{auth::CurrentUser, response::APIResponse, storage::DiskStorage},
    services::{media, Context, ServiceError},
};

pub fn routes() -> Vec<Route> {
    routes![upload_media]
}

#[derive(FromForm)]
struct Upload<'r> {
    file: TempFile<'r>,
}

#[post("/medias", data = "<upload>")]
async fn upload_media(
    db: &State<DatabaseConnection>,
    files: &State<DiskStorage>,
    user: CurrentUser,
    upload: Form<Upload<'_>>,
) -> APIResponse {
    let ctx = Context::new(db, &user.0, files.inner());
    let file = &upload.file;

    let mut bytes = Vec::with_capacity(file.len() as usize);
    let read = match file.open().await {
        Ok(reader) => Box::pin(reader).read_to_end(&mut bytes).await,
        Err(e) => Err(e),
    };
    if let Err(e) = read {
        warn!(error = %e, "failed to read uploaded file");
        return ServiceError::from(e).into();
    }

    let extension = file
        .content_type()
        .and_then(|ct| ct.extension())
        .map(|ext| ext.as_str());

    media::upload(&ctx, &bytes, extension).await.into()
}
