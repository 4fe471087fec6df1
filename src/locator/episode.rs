//! Season/episode matching on release file names.

use crate::types::RequestedEpisode;
use regex::Regex;

/// Case-insensitive matcher for one requested episode
///
/// Recognized notations, with any amount of zero padding:
/// - `S01E03`, `s1e3`, `S01.E03`, `S01 E03`, `S01_E03`
/// - `1x03`, `01x3`
/// - `Episode 3`, `Episode.03`, `Ep 3`, `Ep03`
///
/// The first two carry their own season and are checked against the file name only. The
/// episode-word form carries none, so it is rejected when the path names another season
/// (`Show.S02.Ep03.mkv`, `Season 2/Episode 3.mkv`).
#[derive(Clone, Debug)]
pub struct EpisodeMatcher {
    season: u32,
    with_season: Vec<Regex>,
    episode_only: Option<Regex>,
    season_token: Option<Regex>,
}

impl EpisodeMatcher {
    /// Build the patterns for an episode
    pub fn new(episode: RequestedEpisode) -> Self {
        let RequestedEpisode { season, episode } = episode;
        let with_season = [
            format!(r"(?i)s0*{season}[\s._-]*e0*{episode}(?:[^0-9]|$)"),
            format!(r"(?i)(?:^|[^0-9])0*{season}x0*{episode}(?:[^0-9]|$)"),
        ];

        // Patterns are built from integers only and always compile
        Self {
            season,
            with_season: with_season
                .iter()
                .filter_map(|source| Regex::new(source).ok())
                .collect(),
            episode_only: Regex::new(&format!(
                r"(?i)(?:^|[^a-z])ep(?:isode)?[\s._-]*0*{episode}(?:[^0-9]|$)"
            ))
            .ok(),
            season_token: Regex::new(r"(?i)(?:^|[^a-z0-9])(?:s|season)[\s._-]*0*(\d{1,3})(?:[^0-9]|$)")
                .ok(),
        }
    }

    /// Whether a file refers to the episode
    ///
    /// `path` is the file's path below the job root, or just its name.
    pub fn matches(&self, path: &str) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path);
        if self.with_season.iter().any(|p| p.is_match(name)) {
            return true;
        }

        self.episode_only.as_ref().is_some_and(|p| p.is_match(name))
            && !self.names_other_season(path)
    }

    fn names_other_season(&self, path: &str) -> bool {
        let Some(token) = &self.season_token else {
            return false;
        };
        token
            .captures_iter(path)
            .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
            .any(|season| season != self.season)
    }
}
