//! Player identity helpers

/// Derive the identity of a player component.
///
/// Players showing the same track share an identity across pages, so a
/// player mounted on a new page can pick up the running playback.
pub fn player_id(track_id: Option<&str>, src: &str) -> String {
    if let Some(id) = track_id.filter(|id| !id.is_empty()) {
        return format!("player-{}", id);
    }

    let file_name = src.rsplit('/').next().unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();

    if stem.is_empty() {
        "player-unknown".to_string()
    } else {
        format!("player-{}", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_prefers_track_id() {
        assert_eq!(player_id(Some("abc"), "/media/x.mp3"), "player-abc");
    }

    #[test]
    fn test_player_id_from_source() {
        assert_eq!(player_id(None, "/media/rel/night-drive.mp3"), "player-night-drive");
        assert_eq!(player_id(Some(""), "song.flac"), "player-song");
    }

    #[test]
    fn test_player_id_unknown() {
        assert_eq!(player_id(None, ""), "player-unknown");
        assert_eq!(player_id(None, "/media/"), "player-unknown");
    }
}
