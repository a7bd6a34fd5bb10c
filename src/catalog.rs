//! Catalog listing and mutation
//!
//! Thumbnail resolution happens here, before the store is touched, so a
//! failed insert never leaves anything to undo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{Database, Video};
use crate::error::{AppError, Result};
use crate::paging::PageRequest;
use crate::video::probe::{find_thumbnail, Probe};

/// Admin submission for a new catalog entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVideo {
    pub title: Option<String>,
    pub url: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub videos: Vec<Video>,
    pub has_more: bool,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// List one page of the catalog, filtered by `search` when it is non-blank
pub async fn list(db: &Database, search: Option<&str>, request: PageRequest) -> Result<CatalogPage> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    let (videos, total) = db.list_videos(search, &request).await?;

    Ok(CatalogPage {
        videos,
        has_more: request.has_more(total),
        total,
        page: request.page,
        limit: request.limit,
    })
}

pub async fn create<P>(db: &Database, probe: &P, input: CreateVideo, now: DateTime<Utc>) -> Result<Video>
where
    P: Probe + ?Sized,
{
    let (title, url) = match (non_empty(input.title), non_empty(input.url)) {
        (Some(title), Some(url)) => (title, url),
        _ => return Err(AppError::Validation("Title and URL are required".to_string())),
    };

    if db.find_video_by_url(&url).await?.is_some() {
        return Err(AppError::Duplicate("Video with this URL already exists".to_string()));
    }

    let thumbnail = match non_empty(input.thumbnail) {
        Some(thumbnail) => Some(thumbnail),
        None => {
            let found = find_thumbnail(probe, &url).await;
            debug!("Resolved thumbnail for {}: {:?}", url, found);
            found
        }
    };

    let video = Video {
        id: Uuid::new_v4().to_string(),
        title,
        url,
        thumbnail,
        created_at: now,
    };
    db.insert_video(&video).await?;

    info!("Added video {} ({})", video.id, video.url);
    Ok(video)
}

pub async fn delete(db: &Database, id: &str) -> Result<()> {
    db.delete_video(id).await?;
    info!("Deleted video {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::video::probe::tests::FakeProbe;
    use chrono::Duration;

    fn submission(title: &str, url: &str) -> CreateVideo {
        CreateVideo {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            thumbnail: None,
        }
    }

    #[tokio::test]
    async fn create_probes_for_missing_thumbnail() {
        let db = test_db().await;
        let probe = FakeProbe::with_available(&["https://img.youtube.com/vi/abc/hqdefault.jpg"]);

        let video = create(&db, &probe, submission("  Cat  ", "https://youtu.be/abc"), Utc::now())
            .await
            .unwrap();

        assert_eq!(video.title, "Cat");
        assert_eq!(video.thumbnail.as_deref(), Some("https://img.youtube.com/vi/abc/hqdefault.jpg"));
        let stored = db.get_video(&video.id).await.unwrap();
        assert_eq!(stored.url, "https://youtu.be/abc");
        assert_eq!(stored.thumbnail, video.thumbnail);
    }

    #[tokio::test]
    async fn explicit_thumbnail_skips_probing() {
        let db = test_db().await;
        let probe = FakeProbe::default();
        let mut input = submission("Cat", "https://youtu.be/abc");
        input.thumbnail = Some("https://cdn.example.com/cat.png".to_string());

        let video = create(&db, &probe, input, Utc::now()).await.unwrap();

        assert_eq!(video.thumbnail.as_deref(), Some("https://cdn.example.com/cat.png"));
        assert!(probe.calls().is_empty());
    }

    #[tokio::test]
    async fn vimeo_gets_no_thumbnail() {
        let db = test_db().await;
        let probe = FakeProbe::default();
        let video = create(&db, &probe, submission("Short film", "https://vimeo.com/76979871"), Utc::now())
            .await
            .unwrap();
        assert_eq!(video.thumbnail, None);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let db = test_db().await;
        let probe = FakeProbe::default();

        for input in [
            CreateVideo::default(),
            submission("", "https://youtu.be/abc"),
            submission("Title", "   "),
        ] {
            let err = create(&db, &probe, input, Utc::now()).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(db.count_videos().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn second_create_with_same_url_conflicts() {
        let db = test_db().await;
        let probe = FakeProbe::default();

        create(&db, &probe, submission("One", "https://youtu.be/dup"), Utc::now()).await.unwrap();
        let err = create(&db, &probe, submission("Two", "https://youtu.be/dup"), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Duplicate(_)));
        assert_eq!(db.count_videos().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn listing_splits_into_ceil_pages() {
        let db = test_db().await;
        let probe = FakeProbe::default();
        let start = Utc::now();
        for n in 0..10 {
            let input = submission(&format!("Clip {}", n), &format!("https://example.com/{}.mp4", n));
            create(&db, &probe, input, start + Duration::seconds(n)).await.unwrap();
        }

        let mut sizes = Vec::new();
        for page in 1..=3 {
            let result = list(&db, None, PageRequest::new(Some(page), Some(4), 6, 100)).await.unwrap();
            assert_eq!(result.total, 10);
            sizes.push((result.videos.len(), result.has_more));
        }
        assert_eq!(sizes, vec![(4, true), (4, true), (2, false)]);

        let first = list(&db, None, PageRequest::new(Some(1), Some(4), 6, 100)).await.unwrap();
        assert_eq!(first.videos[0].title, "Clip 9");
    }

    #[tokio::test]
    async fn blank_search_lists_everything() {
        let db = test_db().await;
        let probe = FakeProbe::default();
        create(&db, &probe, submission("Funny Cat", "https://youtu.be/a"), Utc::now()).await.unwrap();
        create(&db, &probe, submission("Dog", "https://youtu.be/b"), Utc::now()).await.unwrap();

        let all = list(&db, Some("   "), PageRequest::new(None, None, 6, 100)).await.unwrap();
        assert_eq!(all.total, 2);

        let cats = list(&db, Some("CAT"), PageRequest::new(None, None, 6, 100)).await.unwrap();
        assert_eq!(cats.total, 1);
        assert_eq!(cats.videos[0].title, "Funny Cat");
        assert!(!cats.has_more);
    }

    #[tokio::test]
    async fn empty_catalog_first_page() {
        let db = test_db().await;
        let page = list(&db, None, PageRequest::new(Some(1), None, 6, 100)).await.unwrap();
        assert!(page.videos.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let db = test_db().await;
        let probe = FakeProbe::default();
        let video = create(&db, &probe, submission("Gone", "https://youtu.be/gone"), Utc::now())
            .await
            .unwrap();

        delete(&db, &video.id).await.unwrap();
        assert!(matches!(delete(&db, &video.id).await, Err(AppError::NotFound(_))));
    }
}
