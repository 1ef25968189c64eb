//! `ID=URL[=NAME]` track arguments.

use std::fmt;
use std::str::FromStr;

use url::Url;

use tuneload_core::{DownloadId, DownloadRequest};

/// One track requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSpec {
    /// Id the track is downloaded and recorded under.
    pub id: DownloadId,
    /// Remote locator.
    pub url: String,
    /// Local file name.
    pub name: String,
}

impl TrackSpec {
    /// Build the scheduler request for this track.
    pub fn to_request(&self) -> DownloadRequest {
        DownloadRequest::new(self.id.clone(), self.url.clone(), self.name.clone())
    }
}

impl fmt::Display for TrackSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}={}", self.id, self.url, self.name)
    }
}

impl FromStr for TrackSpec {
    type Err = String;

    /// The id runs up to the first `=`. A trailing `=NAME` is split off only
    /// when NAME has no `/` and what precedes it is still a valid URL.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (id, rest) = value
            .split_once('=')
            .ok_or_else(|| format!("expected ID=URL[=NAME], got '{value}'"))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(format!("missing track id in '{value}'"));
        }

        let (url, name) = match rest.rsplit_once('=') {
            Some((url, name))
                if !name.is_empty() && !name.contains('/') && parse_http(url).is_ok() =>
            {
                (parse_http(url)?, name.to_string())
            }
            _ => {
                let url = parse_http(rest)?;
                let name = default_name(&url)
                    .ok_or_else(|| format!("cannot derive a file name from '{rest}', add =NAME"))?;
                (url, name)
            }
        };

        Ok(Self {
            id: DownloadId::new(id),
            url: url.to_string(),
            name,
        })
    }
}

fn parse_http(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| format!("invalid URL '{value}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported URL scheme '{other}' in '{value}'")),
    }
}

fn default_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .rfind(|segment| !segment.is_empty())
        .map(str::to_string)
}
