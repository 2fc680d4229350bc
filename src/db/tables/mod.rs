//! Database table operations

mod listen_table;
mod release_table;
mod tag_table;
mod track_table;
mod user_table;

pub use listen_table::ListenTable;
pub use release_table::ReleaseTable;
pub use tag_table::TagTable;
pub use track_table::TrackTable;
pub use user_table::UserTable;

/// Publish a release with `tracks` numbered tracks, for tests
#[cfg(test)]
pub(crate) async fn seed_release(
    pool: &sqlx::SqlitePool,
    artist: &str,
    title: &str,
    tags: &[&str],
    tracks: usize,
) -> crate::models::Release {
    use crate::models::{NewRelease, NewTrack};

    let new = NewRelease {
        title: title.to_string(),
        artist: artist.to_string(),
        cover_url: None,
        description: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        tracks: (1..=tracks)
            .map(|i| NewTrack {
                title: format!("{} {}", title, i),
                track_number: None,
                duration: 200,
                file_url: format!("/media/{}-{}.mp3", title, i),
            })
            .collect(),
    };

    let id = ReleaseTable::create(pool, &new).await.unwrap();
    ReleaseTable::get(pool, &id).await.unwrap().unwrap()
}
