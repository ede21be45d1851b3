//! HTML rendering
//!
//! Minimal server-rendered pages for the listing, admin and error views.

use crate::storage::results::{ClientSummary, Entry};
use crate::storage::validation::{join_client_path, parent_path};
use axum::http::StatusCode;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped inside a single URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Everything the listing page shows
pub struct ListingView<'a> {
    pub client_id: &'a str,
    pub current_path: &'a str,
    pub entries: &'a [Entry],
    pub flashes: &'a [String],
}

/// Escapes text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds `prefix` followed by `path` with every segment percent-encoded.
pub fn client_url(prefix: &str, path: &str) -> String {
    let encoded: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| utf8_percent_encode(s, PATH_SEGMENT).to_string())
        .collect();
    format!("{}{}", prefix, encoded.join("/"))
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}

fn entry_row(current_path: &str, entry: &Entry) -> String {
    let entry_path = join_client_path(current_path, &entry.name);
    let name = escape_html(&entry.name);
    let delete = escape_html(&client_url("/delete/", &entry_path));
    if entry.is_folder {
        let open = escape_html(&client_url("/", &entry_path));
        format!(
            "<tr><td><a href=\"{open}\">{name}/</a></td><td>-</td><td><a href=\"{delete}\">delete</a></td></tr>\n"
        )
    } else {
        let download = escape_html(&client_url("/download/", &entry_path));
        format!(
            "<tr><td><a href=\"{download}\">{name}</a></td><td>{:.1} KB</td><td><a href=\"{delete}\">delete</a></td></tr>\n",
            entry.size_kb
        )
    }
}

fn forms(current: &str) -> String {
    format!(
        "<form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"hidden\" name=\"current_path\" value=\"{current}\">\n\
         <input type=\"file\" name=\"file\">\n\
         <button type=\"submit\">Upload</button>\n\
         </form>\n\
         <form action=\"/create-folder\" method=\"post\">\n\
         <input type=\"hidden\" name=\"current_path\" value=\"{current}\">\n\
         <input type=\"text\" name=\"folder_name\" placeholder=\"New folder\">\n\
         <button type=\"submit\">Create folder</button>\n\
         </form>\n"
    )
}

pub fn index_page(view: &ListingView<'_>) -> String {
    let current = escape_html(view.current_path);

    let mut body = String::from("<h1>Web File Manager</h1>\n");
    body.push_str(&format!(
        "<p>Your ID: <code>{}</code> (open <code>/user/&lt;id&gt;</code> in another browser to recover this session)</p>\n",
        escape_html(view.client_id)
    ));

    for message in view.flashes {
        body.push_str(&format!("<p class=\"flash\">{}</p>\n", escape_html(message)));
    }

    body.push_str(&format!("<h2>/{}</h2>\n", current));
    if !view.current_path.trim_matches('/').is_empty() {
        let parent = parent_path(view.current_path.trim_end_matches('/'));
        body.push_str(&format!(
            "<p><a href=\"{}\">..</a></p>\n",
            escape_html(&client_url("/", parent))
        ));
    }

    if view.entries.is_empty() {
        body.push_str("<p>This folder is empty.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Name</th><th>Size</th><th></th></tr>\n");
        for entry in view.entries {
            body.push_str(&entry_row(view.current_path, entry));
        }
        body.push_str("</table>\n");
    }

    body.push_str(&forms(&current));
    page("Web File Manager", &body)
}

pub fn admin_page(clients: &[ClientSummary]) -> String {
    let lines: Vec<String> = clients
        .iter()
        .map(|c| format!("{}: {} files", escape_html(&c.folder), c.file_count))
        .collect();
    page("Active Users", &format!("<h2>Active Users:</h2>{}\n", lines.join("<br>")))
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    page(
        message,
        &format!(
            "<h1>{} {}</h1>\n<p><a href=\"/\">Back to your files</a></p>\n",
            status.as_u16(),
            escape_html(message)
        ),
    )
}
