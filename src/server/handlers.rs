//! HTTP handlers
//!
//! Translates requests into storage operations. Every mutating route answers
//! with a redirect and reports its outcome as a flash message.

use axum::body::{Body, Bytes};
use axum::extract::{Form, Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use log::{debug, warn};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::error::WebError;
use crate::server::context::RequestContext;
use crate::server::core::AppState;
use crate::server::render::{self, ListingView, client_url};
use crate::session::recover_identity;
use crate::storage::{
    create_folder as create_folder_on_disk, delete_entry, list_directory, open_for_download,
    parent_path, write_file,
};

const MSG_UPLOADED: &str = "File uploaded successfully!";
const MSG_DELETED: &str = "Item deleted successfully!";
const MSG_DELETE_FAILED: &str = "Error deleting item!";
const MSG_FOLDER_CREATED: &str = "Folder created successfully!";
const MSG_INVALID_USER: &str = "Invalid user ID";

pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Listing of the client's root folder
pub async fn home(State(state): State<AppState>, ctx: RequestContext) -> Response {
    show_listing(state, ctx, String::new()).await
}

/// Listing of a sub-folder of the client's root
pub async fn browse(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(folder_path): Path<String>,
) -> Response {
    show_listing(state, ctx, folder_path).await
}

async fn show_listing(state: AppState, mut ctx: RequestContext, folder_path: String) -> Response {
    let result = render_listing(&state, &mut ctx, &folder_path).await;
    ctx.finish(&state, result)
}

async fn render_listing(
    state: &AppState,
    ctx: &mut RequestContext,
    folder_path: &str,
) -> Result<Response, WebError> {
    let id = ctx.identity();
    let root = state.locator.client_root(&id).await?;
    let entries = list_directory(&root, folder_path, state.config.confine_paths).await?;
    let flashes = ctx.take_flashes();

    let html = render::index_page(&ListingView {
        client_id: id.as_str(),
        current_path: folder_path,
        entries: &entries,
        flashes: &flashes,
    });
    Ok(Html(html).into_response())
}

/// Rebinds this browser to an existing client id
pub async fn recover_session(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Path(user_id): Path<String>,
) -> Response {
    match recover_identity(ctx.session_mut(), &state.locator, &user_id).await {
        Ok(id) => ctx.flash(format!("Welcome back! Session recovered for user {}", id)),
        Err(e) => {
            warn!("Session recovery failed: {}", e);
            ctx.flash(MSG_INVALID_USER);
        }
    }
    ctx.finish(&state, Redirect::to("/"))
}

/// Every client root with its recursive file count
pub async fn admin(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let clients = state.locator.list_clients().await?;
    Ok(Html(render::admin_page(&clients)))
}

pub async fn upload(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    multipart: Multipart,
) -> Response {
    let result = store_upload(&state, &mut ctx, multipart).await;
    ctx.finish(&state, result)
}

async fn store_upload(
    state: &AppState,
    ctx: &mut RequestContext,
    mut multipart: Multipart,
) -> Result<Response, WebError> {
    let mut current_path = String::new();
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::Validation(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("current_path") => {
                current_path = field
                    .text()
                    .await
                    .map_err(|e| WebError::Validation(e.body_text()))?;
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let contents = field
                    .bytes()
                    .await
                    .map_err(|e| WebError::Validation(e.body_text()))?;
                upload = Some((file_name, contents));
            }
            _ => {}
        }
    }

    match upload {
        Some((file_name, contents)) if !file_name.is_empty() => {
            let id = ctx.identity();
            let root = state.locator.client_root(&id).await?;
            write_file(
                &root,
                &current_path,
                &file_name,
                &contents,
                state.config.confine_paths,
            )
            .await?;
            ctx.flash(MSG_UPLOADED);
        }
        _ => debug!("Upload request without a named file part"),
    }

    Ok(Redirect::to(&client_url("/", &current_path)).into_response())
}

/// Streams a file back as an attachment
pub async fn download(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Path(filepath): Path<String>,
) -> Response {
    let result = stream_download(&state, &mut ctx, &filepath).await;
    ctx.finish(&state, result)
}

async fn stream_download(
    state: &AppState,
    ctx: &mut RequestContext,
    filepath: &str,
) -> Result<Response, WebError> {
    let id = ctx.identity();
    let root = state.locator.client_root(&id).await?;
    let download = open_for_download(&root, filepath, state.config.confine_paths).await?;

    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
        (CONTENT_DISPOSITION, attachment_disposition(&download.file_name)),
        (CONTENT_LENGTH, HeaderValue::from(download.len)),
    ];
    let body = Body::from_stream(ReaderStream::new(download.file));
    Ok((headers, body).into_response())
}

/// `Content-Disposition` value preserving the original file name
fn attachment_disposition(file_name: &str) -> HeaderValue {
    let is_plain = |c: char| (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\';

    let value = if file_name.chars().all(is_plain) {
        format!("attachment; filename=\"{}\"", file_name)
    } else {
        let fallback: String = file_name
            .chars()
            .map(|c| if is_plain(c) { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            utf8_percent_encode(file_name, NON_ALPHANUMERIC)
        )
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Deletes a file or empty folder, then returns to the parent folder
pub async fn delete(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Path(filepath): Path<String>,
) -> Response {
    let result = remove_entry(&state, &mut ctx, &filepath).await;
    ctx.finish(&state, result)
}

async fn remove_entry(
    state: &AppState,
    ctx: &mut RequestContext,
    filepath: &str,
) -> Result<Response, WebError> {
    let id = ctx.identity();
    let root = state.locator.client_root(&id).await?;

    // The cause only goes to the log; the client sees one generic message.
    match delete_entry(&root, filepath, state.config.confine_paths).await {
        Ok(_) => ctx.flash(MSG_DELETED),
        Err(e) => {
            warn!("Delete of {:?} for client {} failed: {}", filepath, id, e);
            ctx.flash(MSG_DELETE_FAILED);
        }
    }

    let parent = parent_path(filepath);
    Ok(Redirect::to(&client_url("/", parent)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderForm {
    #[serde(default)]
    pub current_path: String,
    pub folder_name: Option<String>,
}

pub async fn create_folder(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Form(form): Form<CreateFolderForm>,
) -> Response {
    let result = make_folder(&state, &mut ctx, form).await;
    ctx.finish(&state, result)
}

async fn make_folder(
    state: &AppState,
    ctx: &mut RequestContext,
    form: CreateFolderForm,
) -> Result<Response, WebError> {
    match form.folder_name.as_deref() {
        Some(folder_name) if !folder_name.is_empty() => {
            let id = ctx.identity();
            let root = state.locator.client_root(&id).await?;
            create_folder_on_disk(
                &root,
                &form.current_path,
                folder_name,
                state.config.confine_paths,
            )
            .await?;
            ctx.flash(MSG_FOLDER_CREATED);
        }
        _ => debug!("Create-folder request without a folder name"),
    }

    Ok(Redirect::to(&client_url("/", &form.current_path)).into_response())
}

#[cfg(test)]
mod tests {
    use super::attachment_disposition;

    #[test]
    fn plain_names_use_simple_disposition() {
        assert_eq!(
            attachment_disposition("report 2025.txt"),
            "attachment; filename=\"report 2025.txt\""
        );
    }

    #[test]
    fn unusual_names_get_encoded_variant() {
        let value = attachment_disposition("résumé \"v2\".pdf");
        let value = value.to_str().unwrap();
        assert!(value.starts_with("attachment; filename=\"r_sum_ _v2_.pdf\"; filename*=UTF-8''"));
        assert!(value.contains("r%C3%A9sum%C3%A9"));
    }
}
