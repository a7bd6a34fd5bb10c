//! Catalog queries

use chrono::{DateTime, Utc};

use super::{from_millis, Database, Video};
use crate::error::{AppError, Result};
use crate::paging::PageRequest;

type VideoRow = (String, String, String, Option<String>, i64);

fn video_from_row((id, title, url, thumbnail, created_at): VideoRow) -> Video {
    Video {
        id,
        title,
        url,
        thumbnail,
        created_at: from_millis(created_at),
    }
}

/// Case folding used for the searchable columns and the search needle.
/// SQLite's LIKE only folds ASCII, so both sides are lowercased here.
fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Substring pattern for LIKE with wildcards in the needle escaped
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl Database {
    /// One page of videos, newest first, plus the number of videos matching `search`.
    /// Matching is a case-insensitive substring test on title or url.
    pub async fn list_videos(&self, search: Option<&str>, page: &PageRequest) -> Result<(Vec<Video>, i64)> {
        let (rows, total): (Vec<VideoRow>, (i64,)) = match search {
            Some(search) => {
                let pattern = like_pattern(&fold(search));
                let rows: Vec<VideoRow> = sqlx::query_as(
                    r#"
                    SELECT id, title, url, thumbnail, created_at
                    FROM videos
                    WHERE title_folded LIKE ? ESCAPE '\' OR url_folded LIKE ? ESCAPE '\'
                    ORDER BY created_at DESC, rowid DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .bind(page.limit)
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

                let total: (i64,) = sqlx::query_as(
                    r#"SELECT COUNT(*) FROM videos WHERE title_folded LIKE ? ESCAPE '\' OR url_folded LIKE ? ESCAPE '\'"#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

                (rows, total)
            }
            None => {
                let rows: Vec<VideoRow> = sqlx::query_as(
                    r#"
                    SELECT id, title, url, thumbnail, created_at
                    FROM videos
                    ORDER BY created_at DESC, rowid DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(page.limit)
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;

                let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM videos")
                    .fetch_one(&self.pool)
                    .await?;

                (rows, total)
            }
        };

        Ok((rows.into_iter().map(video_from_row).collect(), total.0))
    }

    pub async fn get_video(&self, id: &str) -> Result<Video> {
        let row: Option<VideoRow> =
            sqlx::query_as("SELECT id, title, url, thumbnail, created_at FROM videos WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(video_from_row)
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    pub async fn find_video_by_url(&self, url: &str) -> Result<Option<Video>> {
        let row: Option<VideoRow> =
            sqlx::query_as("SELECT id, title, url, thumbnail, created_at FROM videos WHERE url = ?")
                .bind(url)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(video_from_row))
    }

    /// Insert a video; a url already in the catalog is rejected as a duplicate
    pub async fn insert_video(&self, video: &Video) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO videos (id, title, url, thumbnail, created_at, title_folded, url_folded)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&video.id)
        .bind(&video.title)
        .bind(&video.url)
        .bind(&video.thumbnail)
        .bind(video.created_at.timestamp_millis())
        .bind(fold(&video.title))
        .bind(fold(&video.url))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Duplicate(
                "Video with this URL already exists".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a video by id. Deleting an id that does not exist is an error.
    pub async fn delete_video(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Video not found".to_string()));
        }
        Ok(())
    }

    pub async fn count_videos(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM videos")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Ids and creation times of every video, newest first
    pub async fn video_index(&self) -> Result<Vec<(String, DateTime<Utc>)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT id, created_at FROM videos ORDER BY created_at DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id, ts)| (id, from_millis(ts))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use chrono::Duration;

    fn video(n: i64, title: &str, url: &str) -> Video {
        Video {
            id: format!("id-{}", n),
            title: title.to_string(),
            url: url.to_string(),
            thumbnail: None,
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap() + Duration::seconds(n),
        }
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("cat"), "%cat%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[tokio::test]
    async fn pages_through_newest_first() {
        let db = test_db().await;
        for n in 0..7 {
            db.insert_video(&video(n, &format!("Clip {}", n), &format!("https://youtu.be/v{}", n)))
                .await
                .unwrap();
        }

        let mut seen = Vec::new();
        for page in 1..=3 {
            let request = PageRequest::new(Some(page), Some(3), 6, 100);
            let (videos, total) = db.list_videos(None, &request).await.unwrap();
            assert_eq!(total, 7);
            assert_eq!(request.has_more(total), page < 3);
            seen.extend(videos.into_iter().map(|v| v.id));
        }

        let expected: Vec<String> = (0..7).rev().map(|n| format!("id-{}", n)).collect();
        assert_eq!(seen, expected);

        let beyond = PageRequest::new(Some(4), Some(3), 6, 100);
        let (videos, total) = db.list_videos(None, &beyond).await.unwrap();
        assert!(videos.is_empty());
        assert!(!beyond.has_more(total));
    }

    #[tokio::test]
    async fn search_matches_title_or_url_ignoring_case() {
        let db = test_db().await;
        db.insert_video(&video(1, "Funny Cat", "https://youtu.be/a")).await.unwrap();
        db.insert_video(&video(2, "Dog show", "https://example.com/CATwalk.mp4")).await.unwrap();
        db.insert_video(&video(3, "Birds", "https://vimeo.com/3")).await.unwrap();

        let request = PageRequest::new(None, None, 6, 100);
        for needle in ["cat", "CAT"] {
            let (videos, total) = db.list_videos(Some(needle), &request).await.unwrap();
            assert_eq!(total, 2);
            let ids: Vec<_> = videos.iter().map(|v| v.id.as_str()).collect();
            assert_eq!(ids, vec!["id-2", "id-1"]);
        }

        db.insert_video(&video(4, "Éclair Über Straße", "https://youtu.be/e")).await.unwrap();
        for needle in ["Éclair", "éclair", "ÉCLAIR", "ÜBER", "straße"] {
            let (videos, total) = db.list_videos(Some(needle), &request).await.unwrap();
            assert_eq!(total, 1, "searching {}", needle);
            assert_eq!(videos[0].id, "id-4");
        }

        let (videos, total) = db.list_videos(Some("%"), &request).await.unwrap();
        assert!(videos.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn duplicate_url_is_rejected() {
        let db = test_db().await;
        db.insert_video(&video(1, "First", "https://youtu.be/same")).await.unwrap();

        let err = db
            .insert_video(&video(2, "Second", "https://youtu.be/same"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
        assert_eq!(db.count_videos().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn get_and_delete_report_missing_ids() {
        let db = test_db().await;
        db.insert_video(&video(1, "Only", "https://youtu.be/only")).await.unwrap();

        assert_eq!(db.get_video("id-1").await.unwrap().title, "Only");
        assert!(matches!(db.get_video("nope").await, Err(AppError::NotFound(_))));

        db.delete_video("id-1").await.unwrap();
        assert!(matches!(db.delete_video("id-1").await, Err(AppError::NotFound(_))));
        assert!(matches!(db.get_video("id-1").await, Err(AppError::NotFound(_))));
    }
}
