use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::dates::{format_date, parse_date, MonthKey};
use crate::models::{Holding, Id, RecurringExpense, Transaction};

use super::{CheckMarkerStore, Storage, TransactionSink};

/// JSON file-based storage implementation.
///
/// Directory structure:
/// ```text
/// data/
///   transactions/
///     {YYYY-MM}.jsonl
///   recurring/
///     {id}.json
///   holdings.json
///   markers/
///     {user}.last_check
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    base_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn transactions_dir(&self) -> PathBuf {
        self.base_path.join("transactions")
    }

    fn transactions_file(&self, month: MonthKey) -> PathBuf {
        self.transactions_dir().join(format!("{month}.jsonl"))
    }

    fn recurring_dir(&self) -> PathBuf {
        self.base_path.join("recurring")
    }

    fn recurring_file(&self, id: &Id) -> Result<PathBuf> {
        let safe = Id::from_string_checked(id.as_str())?;
        Ok(self.recurring_dir().join(format!("{safe}.json")))
    }

    fn holdings_file(&self) -> PathBuf {
        self.base_path.join("holdings.json")
    }

    /// Check marker for one user, stored under `markers/`.
    pub fn check_marker(&self, user_id: &str) -> Result<FileCheckMarker> {
        let user = Id::from_string_checked(user_id)?;
        Ok(FileCheckMarker::new(
            self.base_path
                .join("markers")
                .join(format!("{user}.last_check")),
        ))
    }

    async fn read_json<T: for<'de> serde::Deserialize<'de>>(&self, path: &Path) -> Result<Option<T>> {
        match fs::read_to_string(path).await {
            Ok(content) => {
                let value = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read file"),
        }
    }

    async fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        ensure_parent(path).await?;
        let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        fs::write(path, content)
            .await
            .context("Failed to write file")?;
        Ok(())
    }

    async fn read_jsonl<T: for<'de> serde::Deserialize<'de>>(&self, path: &Path) -> Result<Vec<T>> {
        let file = match fs::File::open(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("Failed to open file"),
        };

        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut items: Vec<T> = Vec::new();

        while let Some(line) = lines.next_line().await.context("Failed to read line")? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(item) => items.push(item),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Skipping malformed JSONL line");
                }
            }
        }

        Ok(items)
    }

    async fn append_jsonl<T: serde::Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        ensure_parent(path).await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .context("Failed to open file for append")?;

        for item in items {
            let line = serde_json::to_string(item).context("Failed to serialize item")?;
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
        }

        Ok(())
    }

    async fn write_jsonl<T: serde::Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        ensure_parent(path).await?;

        let mut content = String::new();
        for item in items {
            let line = serde_json::to_string(item).context("Failed to serialize item")?;
            content.push_str(&line);
            content.push('\n');
        }

        fs::write(path, content)
            .await
            .context("Failed to write JSONL file")?;
        Ok(())
    }

    /// Files in `dir` with the given extension, sorted by name.
    async fn list_files(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("Failed to read directory"),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) == Some(extension) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .context("Failed to create directory")?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl Storage for JsonFileStorage {
    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let mut all = Vec::new();
        for file in self.list_files(&self.transactions_dir(), "jsonl").await? {
            let mut txns: Vec<Transaction> = self.read_jsonl(&file).await?;
            all.append(&mut txns);
        }
        Ok(super::dedupe_by_id(all))
    }

    async fn append_transactions(&self, txns: &[Transaction]) -> Result<()> {
        let mut by_month: std::collections::BTreeMap<MonthKey, Vec<&Transaction>> =
            std::collections::BTreeMap::new();
        for tx in txns {
            by_month.entry(MonthKey::of(tx.date)).or_default().push(tx);
        }
        for (month, group) in by_month {
            self.append_jsonl(&self.transactions_file(month), &group)
                .await?;
        }
        Ok(())
    }

    async fn delete_transaction(&self, id: &Id) -> Result<bool> {
        let mut removed = false;
        for file in self.list_files(&self.transactions_dir(), "jsonl").await? {
            let txns: Vec<Transaction> = self.read_jsonl(&file).await?;
            let before = txns.len();
            let kept: Vec<Transaction> = txns.into_iter().filter(|tx| &tx.id != id).collect();
            if kept.len() != before {
                self.write_jsonl(&file, &kept).await?;
                removed = true;
            }
        }
        Ok(removed)
    }

    async fn list_recurring_expenses(&self) -> Result<Vec<RecurringExpense>> {
        let mut expenses = Vec::new();
        for file in self.list_files(&self.recurring_dir(), "json").await? {
            match self.read_json::<RecurringExpense>(&file).await {
                Ok(Some(expense)) => expenses.push(expense),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(path = %file.display(), error = %err, "Skipping unreadable recurring expense");
                }
            }
        }
        Ok(expenses)
    }

    async fn get_recurring_expense(&self, id: &Id) -> Result<Option<RecurringExpense>> {
        self.read_json(&self.recurring_file(id)?).await
    }

    async fn save_recurring_expense(&self, expense: &RecurringExpense) -> Result<()> {
        self.write_json(&self.recurring_file(&expense.id)?, expense)
            .await
    }

    async fn delete_recurring_expense(&self, id: &Id) -> Result<bool> {
        match fs::remove_file(self.recurring_file(id)?).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).context("Failed to delete recurring expense"),
        }
    }

    async fn list_holdings(&self) -> Result<Vec<Holding>> {
        let mut holdings: Vec<Holding> = self
            .read_json(&self.holdings_file())
            .await?
            .unwrap_or_default();
        holdings.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(holdings)
    }

    async fn save_holding(&self, holding: &Holding) -> Result<()> {
        let mut holdings: Vec<Holding> = self
            .read_json(&self.holdings_file())
            .await?
            .unwrap_or_default();
        match holdings.iter_mut().find(|h| h.id == holding.id) {
            Some(existing) => *existing = holding.clone(),
            None => holdings.push(holding.clone()),
        }
        self.write_json(&self.holdings_file(), &holdings).await
    }
}

#[async_trait::async_trait]
impl TransactionSink for JsonFileStorage {
    /// Appends to the month file for `date`.
    async fn persist(&self, transaction: &Transaction, date: NaiveDate) -> Result<()> {
        self.append_jsonl(
            &self.transactions_file(MonthKey::of(date)),
            std::slice::from_ref(transaction),
        )
        .await
    }
}

/// Check marker kept as a one-line `YYYY-MM-DD` file.
#[derive(Debug, Clone)]
pub struct FileCheckMarker {
    path: PathBuf,
}

impl FileCheckMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CheckMarkerStore for FileCheckMarker {
    async fn last_check(&self) -> Result<Option<NaiveDate>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => {
                let date = parse_date(&content).with_context(|| {
                    format!("Corrupt check marker at {}", self.path.display())
                })?;
                Ok(Some(date))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read check marker"),
        }
    }

    async fn set_last_check(&self, date: NaiveDate) -> Result<()> {
        ensure_parent(&self.path).await?;
        fs::write(&self.path, format_date(date))
            .await
            .context("Failed to write check marker")?;
        Ok(())
    }
}
