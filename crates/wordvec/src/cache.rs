use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::format::{read_binary, read_text, write_binary};
use crate::{Vocabulary, WordVecConfig, WordVecError};

/// Which file a vocabulary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularySource {
    BinaryCache,
    TextModel,
}

/// Loads the vocabulary, preferring the binary cache and populating it on a miss.
pub fn load_vocabulary(cfg: &WordVecConfig) -> Result<Vocabulary, WordVecError> {
    load_with_source(cfg).map(|(vocab, _)| vocab)
}

/// Like [`load_vocabulary`] but also reports which file was read.
///
/// An unreadable binary cache is treated as a miss: the text model is parsed and
/// the cache rewritten. Failing to write the cache is logged, not returned.
pub fn load_with_source(
    cfg: &WordVecConfig,
) -> Result<(Vocabulary, VocabularySource), WordVecError> {
    let start = Instant::now();

    if cfg.binary_path.exists() {
        match read_binary_file(&cfg.binary_path) {
            Ok(vocab) => {
                info!(
                    path = %cfg.binary_path.display(),
                    terms = vocab.len(),
                    dims = vocab.dims(),
                    elapsed_micros = start.elapsed().as_micros(),
                    "wordvec_cache_hit"
                );
                return Ok((vocab, VocabularySource::BinaryCache));
            }
            Err(err) => {
                warn!(
                    path = %cfg.binary_path.display(),
                    error = %err,
                    "wordvec_cache_unreadable"
                );
            }
        }
    }

    let vocab = read_text_file(&cfg.text_path).map_err(|err| WordVecError::ModelUnavailable {
        path: cfg.text_path.clone(),
        reason: err.to_string(),
    })?;
    info!(
        path = %cfg.text_path.display(),
        terms = vocab.len(),
        dims = vocab.dims(),
        elapsed_micros = start.elapsed().as_micros(),
        "wordvec_text_loaded"
    );

    if cfg.persist_binary {
        match persist_binary(&vocab, &cfg.binary_path) {
            Ok(()) => info!(path = %cfg.binary_path.display(), "wordvec_cache_written"),
            Err(err) => warn!(
                path = %cfg.binary_path.display(),
                error = %err,
                "wordvec_cache_write_failed"
            ),
        }
    }

    Ok((vocab, VocabularySource::TextModel))
}

/// Writes `vocab` to `target` through a temporary sibling file and an atomic rename,
/// so concurrent first loads never observe a half-written cache.
pub fn persist_binary(vocab: &Vocabulary, target: &Path) -> Result<(), WordVecError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    write_binary(vocab, BufWriter::new(tmp.as_file_mut()))?;
    tmp.as_file().sync_all()?;
    debug!(tmp = %tmp.path().display(), target = %target.display(), "wordvec_cache_rename");
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

fn read_text_file(path: &Path) -> Result<Vocabulary, WordVecError> {
    let file = File::open(path)?;
    read_text(BufReader::new(file)).map_err(|source| WordVecError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn read_binary_file(path: &Path) -> Result<Vocabulary, WordVecError> {
    let file = File::open(path)?;
    read_binary(BufReader::new(file)).map_err(|source| WordVecError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_text_model(dir: &Path) -> PathBuf {
        let path = dir.join("Word2VecModel.vec");
        fs::write(&path, "2 3\nrust 1 2 3\nborrow 4 5 6\n").unwrap();
        path
    }

    fn config_in(dir: &Path) -> WordVecConfig {
        WordVecConfig {
            text_path: write_text_model(dir),
            binary_path: dir.join("model.bin"),
            persist_binary: true,
        }
    }

    #[test]
    fn first_load_populates_cache_then_hits_it() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());

        let (first, source) = load_with_source(&cfg).unwrap();
        assert_eq!(source, VocabularySource::TextModel);
        assert!(cfg.binary_path.exists());

        let (second, source) = load_with_source(&cfg).unwrap();
        assert_eq!(source, VocabularySource::BinaryCache);
        assert_eq!(first, second);
    }

    #[test]
    fn persist_disabled_leaves_no_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = WordVecConfig {
            persist_binary: false,
            ..config_in(dir.path())
        };
        load_vocabulary(&cfg).unwrap();
        assert!(!cfg.binary_path.exists());
    }

    #[test]
    fn corrupt_cache_falls_back_and_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        fs::write(&cfg.binary_path, b"not a model").unwrap();

        let (vocab, source) = load_with_source(&cfg).unwrap();
        assert_eq!(source, VocabularySource::TextModel);
        assert_eq!(vocab.len(), 2);

        let (_, source) = load_with_source(&cfg).unwrap();
        assert_eq!(source, VocabularySource::BinaryCache);
    }

    #[test]
    fn nothing_loadable_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = WordVecConfig {
            text_path: dir.path().join("missing.vec"),
            binary_path: dir.path().join("missing.bin"),
            persist_binary: true,
        };
        let err = load_vocabulary(&cfg).unwrap_err();
        assert!(err.is_model_unavailable());
    }

    #[test]
    fn corrupt_text_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let text_path = dir.path().join("broken.vec");
        fs::write(&text_path, "2 3\nrust 1 2\n").unwrap();
        let cfg = WordVecConfig {
            text_path,
            binary_path: dir.path().join("model.bin"),
            persist_binary: true,
        };
        assert!(load_vocabulary(&cfg).unwrap_err().is_model_unavailable());
        assert!(!cfg.binary_path.exists());
    }

    #[test]
    fn absurd_cache_header_falls_back_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        fs::write(&cfg.binary_path, format!("{} 2\n", usize::MAX)).unwrap();

        let (vocab, source) = load_with_source(&cfg).unwrap();
        assert_eq!(source, VocabularySource::TextModel);
        assert_eq!(vocab.get("borrow"), Some(&[4.0, 5.0, 6.0][..]));
    }

    #[test]
    fn absurd_text_header_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        for header in [format!("{} 2\n", usize::MAX), format!("1 {}\n", usize::MAX)] {
            let text_path = dir.path().join("huge.vec");
            fs::write(&text_path, header).unwrap();
            let cfg = WordVecConfig {
                text_path,
                binary_path: dir.path().join("model.bin"),
                persist_binary: true,
            };
            assert!(load_vocabulary(&cfg).unwrap_err().is_model_unavailable());
        }
    }

    #[test]
    fn persist_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut vocab = Vocabulary::new(1);
        vocab.insert("a", &[1.0]).unwrap();
        let target = dir.path().join("nested").join("cache").join("model.bin");
        persist_binary(&vocab, &target).unwrap();
        assert!(target.exists());
    }
}
