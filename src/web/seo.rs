//! Crawler files: robots.txt and sitemap.xml

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::sync::Arc;

use super::AppState;
use crate::error::Result;

pub fn robots_txt(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /admin/\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
        base_url
    )
}

fn push_url(xml: &mut String, loc: &str, lastmod: DateTime<Utc>, changefreq: &str, priority: &str) {
    let _ = write!(
        xml,
        "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
        html_escape::encode_text(loc),
        lastmod.format("%Y-%m-%d"),
        changefreq,
        priority
    );
}

/// Home and admin pages, then one entry per catalog video
pub fn sitemap_xml(base_url: &str, videos: &[(String, DateTime<Utc>)], now: DateTime<Utc>) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    push_url(&mut xml, base_url, now, "daily", "1.0");
    push_url(&mut xml, &format!("{}/admin", base_url), now, "monthly", "0.3");
    for (id, created_at) in videos {
        push_url(&mut xml, &format!("{}/video/{}", base_url, id), *created_at, "weekly", "0.8");
    }
    xml.push_str("</urlset>\n");
    xml
}

pub async fn robots(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots_txt(&state.config.public_base_url()),
    )
}

pub async fn sitemap(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let videos = state.db.video_index().await?;
    let xml = sitemap_xml(&state.config.public_base_url(), &videos, Utc::now());
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}
