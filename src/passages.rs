use crate::difficulty::Difficulty;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::path::PathBuf;

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages");

#[derive(Debug, thiserror::Error)]
pub enum PassageError {
    #[error("passage file {0} not found")]
    Missing(String),

    #[error("unable to read passage file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no passages available for {0} difficulty")]
    Empty(Difficulty),
}

/// Where passage collections come from
#[derive(Debug, Clone, Default)]
pub enum PassageSource {
    /// Collections compiled into the binary
    #[default]
    Bundled,
    /// A directory holding `easy.txt`, `medium.txt` and `hard.txt`
    Directory(PathBuf),
    /// In-memory collections, one passage per line
    Memory(HashMap<Difficulty, String>),
}

impl PassageSource {
    pub fn from_dir_or_bundled(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(path) => PassageSource::Directory(path),
            None => PassageSource::Bundled,
        }
    }

    /// Load every passage for a tier. An absent, unreadable or blank
    /// collection is an error since no session can start without one.
    pub fn load(&self, difficulty: Difficulty) -> Result<Vec<String>, PassageError> {
        let file_name = difficulty.passage_file();
        let raw = match self {
            PassageSource::Bundled => PASSAGE_DIR
                .get_file(file_name)
                .and_then(|f| f.contents_utf8())
                .map(str::to_string)
                .ok_or_else(|| PassageError::Missing(file_name.to_string()))?,
            PassageSource::Directory(dir) => {
                let path = dir.join(file_name);
                std::fs::read_to_string(&path).map_err(|source| {
                    if source.kind() == std::io::ErrorKind::NotFound {
                        PassageError::Missing(path.display().to_string())
                    } else {
                        PassageError::Unreadable {
                            path: path.display().to_string(),
                            source,
                        }
                    }
                })?
            }
            PassageSource::Memory(map) => map
                .get(&difficulty)
                .cloned()
                .ok_or_else(|| PassageError::Missing(file_name.to_string()))?,
        };

        let passages = parse_passages(&raw);
        if passages.is_empty() {
            return Err(PassageError::Empty(difficulty));
        }
        Ok(passages)
    }

    /// Pick one passage uniformly at random. Repeats across draws are allowed.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<String, PassageError> {
        let passages = self.load(difficulty)?;
        let passage = passages
            .choose(rng)
            .cloned()
            .ok_or(PassageError::Empty(difficulty))?;
        tracing::debug!(%difficulty, pool = passages.len(), "drew passage");
        Ok(passage)
    }
}

pub fn parse_passages(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
