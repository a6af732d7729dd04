//! JSON-lines history repository.
//!
//! Layout: `{dir}/{conversation_id}.jsonl`, one serialized `Turn` per line.
//! Each append is a single write of complete lines. A partial last line left
//! by a crash is skipped on load and cut off before the next append, so it
//! never ends up in the middle of the file.

use std::path::{Path, PathBuf};

use std::io::SeekFrom;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use dobi_core::history::repository::HistoryRepository;
use dobi_types::chat::{ConversationId, Turn};
use dobi_types::error::RepositoryError;

const EXTENSION: &str = "jsonl";

pub struct FileHistoryRepository {
    dir: PathBuf,
}

impl FileHistoryRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &ConversationId) -> PathBuf {
        self.dir.join(format!("{}.{EXTENSION}", id.as_str()))
    }
}

fn io_err(path: &Path, e: std::io::Error) -> RepositoryError {
    RepositoryError::Io(format!("{}: {e}", path.display()))
}

/// Cut the file back to its last newline if it ends mid-line.
///
/// Leaves the cursor at the end of the file.
async fn trim_torn_tail(file: &mut File, path: &Path) -> std::io::Result<()> {
    let len = file.metadata().await?.len();
    if len == 0 {
        return Ok(());
    }

    file.seek(SeekFrom::End(-1)).await?;
    if file.read_u8().await? == b'\n' {
        return Ok(());
    }

    let mut content = Vec::with_capacity(len as usize);
    file.seek(SeekFrom::Start(0)).await?;
    file.read_to_end(&mut content).await?;
    let keep = content
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);

    tracing::warn!(
        path = %path.display(),
        dropped_bytes = content.len() - keep,
        "dropping truncated history line before append"
    );
    file.set_len(keep as u64).await?;
    file.seek(SeekFrom::End(0)).await?;
    Ok(())
}

impl HistoryRepository for FileHistoryRepository {
    async fn load(&self, id: &ConversationId) -> Result<Vec<Turn>, RepositoryError> {
        let path = self.path_for(id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&path, e)),
        };

        let mut turns = Vec::new();
        let mut lines = content.lines().enumerate().peekable();
        while let Some((n, line)) = lines.next() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Turn>(line) {
                Ok(turn) => turns.push(turn),
                // A crash mid-append leaves a partial last line.
                Err(e) if lines.peek().is_none() => {
                    tracing::warn!(conversation = %id, line = n + 1, error = %e, "skipping truncated history line");
                }
                Err(e) => {
                    return Err(RepositoryError::Query(format!(
                        "{}:{}: {e}",
                        path.display(),
                        n + 1
                    )));
                }
            }
        }
        Ok(turns)
    }

    async fn append(&self, id: &ConversationId, turns: &[Turn]) -> Result<(), RepositoryError> {
        if turns.is_empty() {
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_err(&self.dir, e))?;

        let mut buf = String::new();
        for turn in turns {
            let line = serde_json::to_string(turn)
                .map_err(|e| RepositoryError::Query(format!("failed to serialize turn: {e}")))?;
            buf.push_str(&line);
            buf.push('\n');
        }

        let path = self.path_for(id);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .await
            .map_err(|e| io_err(&path, e))?;
        trim_torn_tail(&mut file, &path)
            .await
            .map_err(|e| io_err(&path, e))?;
        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| io_err(&path, e))?;
        file.flush().await.map_err(|e| io_err(&path, e))?;

        tracing::debug!(conversation = %id, turns = turns.len(), "appended turns");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ConversationId>, RepositoryError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&self.dir, e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_err(&self.dir, e))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            // Files whose stem is not a valid id were not written by us.
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| ConversationId::new(s).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use dobi_types::chat::TurnRole;

    use super::*;

    fn cid(s: &str) -> ConversationId {
        ConversationId::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_conversation_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileHistoryRepository::new(dir.path().join("chat_history"));
        assert!(repo.load(&cid("fa1010")).await.unwrap().is_empty());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileHistoryRepository::new(dir.path());
        let id = cid("fa1010");

        for i in 0..5 {
            let turn = if i % 2 == 0 {
                Turn::user(format!("q{i}"))
            } else {
                Turn::assistant(format!("a{i}"))
            };
            repo.append(&id, &[turn]).await.unwrap();
        }

        let turns = repo.load(&id).await.unwrap();
        assert_eq!(turns.len(), 5);
        let texts: Vec<&str> = turns.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["q0", "a1", "q2", "a3", "q4"]);
        assert_eq!(turns[1].role, TurnRole::Assistant);
    }

    #[tokio::test]
    async fn test_file_is_jsonl_named_after_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileHistoryRepository::new(dir.path());
        repo.append(&cid("abc"), &[Turn::user("안녕"), Turn::assistant("반가워요")])
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("abc.jsonl")).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_conversations_are_isolated_and_listed() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileHistoryRepository::new(dir.path());
        repo.append(&cid("b"), &[Turn::user("x")]).await.unwrap();
        repo.append(&cid("a"), &[Turn::user("y")]).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(repo.load(&cid("a")).await.unwrap().len(), 1);
        assert_eq!(repo.list().await.unwrap(), vec![cid("a"), cid("b")]);
    }

    #[tokio::test]
    async fn test_truncated_last_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileHistoryRepository::new(dir.path());
        let id = cid("c");
        repo.append(&id, &[Turn::user("ok")]).await.unwrap();
        let path = dir.path().join("c.jsonl");
        let mut raw = std::fs::read_to_string(&path).unwrap();
        raw.push_str("{\"role\":\"assis");
        std::fs::write(&path, raw).unwrap();

        let turns = repo.load(&id).await.unwrap();
        assert_eq!(turns.len(), 1);
    }

    #[tokio::test]
    async fn test_appends_after_truncated_line_stay_readable() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileHistoryRepository::new(dir.path());
        let id = cid("torn");
        repo.append(&id, &[Turn::user("ok")]).await.unwrap();
        let path = dir.path().join("torn.jsonl");
        let mut raw = std::fs::read_to_string(&path).unwrap();
        raw.push_str("{\"role\":\"assis");
        std::fs::write(&path, raw).unwrap();

        repo.append(&id, &[Turn::user("q2")]).await.unwrap();
        repo.append(&id, &[Turn::assistant("a2")]).await.unwrap();

        let turns = repo.load(&id).await.unwrap();
        let texts: Vec<&str> = turns.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["ok", "q2", "a2"]);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("assis{"));
        assert_eq!(raw.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_torn_only_line_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileHistoryRepository::new(dir.path());
        std::fs::write(dir.path().join("e.jsonl"), "{\"role\":").unwrap();

        repo.append(&cid("e"), &[Turn::user("first")]).await.unwrap();
        let turns = repo.load(&cid("e")).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].text, "first");
    }

    #[tokio::test]
    async fn test_empty_batch_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileHistoryRepository::new(dir.path().join("h"));
        repo.append(&cid("none"), &[]).await.unwrap();
        assert!(!dir.path().join("h").join("none.jsonl").exists());
    }

    #[tokio::test]
    async fn test_corrupt_middle_line_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileHistoryRepository::new(dir.path());
        let line = serde_json::to_string(&Turn::user("ok")).unwrap();
        std::fs::write(dir.path().join("d.jsonl"), format!("garbage\n{line}\n")).unwrap();

        let err = repo.load(&cid("d")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
    }
}
