use axum::extract::State;
use axum::response::Html;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path};
use crate::models::{AffiliatePage, CreateAffiliatePage};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAffiliateResponse {
    pub success: bool,
    pub slug: String,
    pub public_url: String,
}

pub async fn create_affiliate(
    State(state): State<AppState>,
    Json(req): Json<CreateAffiliatePage>,
) -> Result<Json<CreateAffiliateResponse>> {
    for link in req.links() {
        if !is_http_url(link) {
            return Err(AppError::BadRequest(msg::INVALID_LINK.into()));
        }
    }

    let conn = state.affiliates.get()?;
    let page = queries::create_affiliate_page(&conn, &req)?;

    tracing::info!("Created affiliate page {}", page.slug);

    let public_url = format!("{}/afiliado/{}", state.base_url, page.slug);
    Ok(Json(CreateAffiliateResponse {
        success: true,
        slug: page.slug,
        public_url,
    }))
}

pub async fn affiliate_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let conn = state.affiliates.get()?;
    let page =
        queries::get_affiliate_page_by_slug(&conn, &slug)?.or_not_found(msg::PAGE_NOT_FOUND)?;

    Ok(Html(render_page(&page)))
}

/// Accepts only absolute http(s) URLs. Anything else (javascript:, data:,
/// relative paths) never reaches a rendered page.
fn is_http_url(link: &str) -> bool {
    let rest = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"));
    rest.is_some_and(|host| !host.is_empty())
}

/// Minimal entity escaping for attribute and text positions.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Server-rendered public page: the main link as the hero action plus
/// three secondary buttons. Stored links are escaped into attributes.
fn render_page(page: &AffiliatePage) -> String {
    let main = escape_html(&page.main_link);
    let button1 = escape_html(&page.button1_link);
    let button2 = escape_html(&page.button2_link);
    let button3 = escape_html(&page.button3_link);

    format!(
        r#"<!DOCTYPE html>
<html lang="pt">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Página de Afiliado</title>
<style>
  body {{ font-family: sans-serif; background: #0d1117; color: #e6edf3; display: flex; justify-content: center; padding: 40px 16px; }}
  .card {{ max-width: 420px; width: 100%; text-align: center; }}
  a.main {{ display: block; background: #238636; color: #fff; text-decoration: none; padding: 16px; margin: 24px 0; border-radius: 8px; font-size: 1.2em; font-weight: bold; }}
  a.button {{ display: block; background: #21262d; color: #e6edf3; text-decoration: none; padding: 12px; margin: 12px 0; border-radius: 8px; border: 1px solid #30363d; }}
</style>
</head>
<body>
<div class="card">
  <h1>Comece por aqui</h1>
  <a class="main" href="{main}" rel="noopener nofollow">Cadastre-se agora</a>
  <a class="button" href="{button1}" rel="noopener nofollow">Link 1</a>
  <a class="button" href="{button2}" rel="noopener nofollow">Link 2</a>
  <a class="button" href="{button3}" rel="noopener nofollow">Link 3</a>
</div>
</body>
</html>
"#
    )
}
