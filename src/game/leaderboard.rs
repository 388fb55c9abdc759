use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error};

use super::error::LeaderboardError;

pub const LEADERBOARD_FILE_NAME: &str = "leaderboard.txt";
pub const LEADERBOARD_CAPACITY: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardRecord {
    pub name: String,
    pub moves: u32,
}

impl LeaderboardRecord {
    pub fn new(name: impl Into<String>, moves: u32) -> Self {
        LeaderboardRecord {
            name: name.into(),
            moves,
        }
    }
}

/// Top scores kept in a `name,moves` text file. Nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct Leaderboard {
    path: PathBuf,
}

impl Leaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Leaderboard { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<LeaderboardRecord>, LeaderboardError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse_records(&raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(LeaderboardError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Current ranking, read fresh. Unreadable or malformed files read as empty.
    pub fn top_n(&self) -> Vec<LeaderboardRecord> {
        match self.load() {
            Ok(mut records) => {
                records.truncate(LEADERBOARD_CAPACITY);
                records
            }
            Err(err) => {
                error!("{err}");
                Vec::new()
            }
        }
    }

    /// Adds a score, keeps the best six and rewrites the file.
    pub fn record(
        &self,
        name: &str,
        moves: u32,
    ) -> Result<Vec<LeaderboardRecord>, LeaderboardError> {
        let existing = self.load()?;
        let ranked = rank(existing, LeaderboardRecord::new(sanitize_name(name), moves));
        write_atomic(&self.path, &serialize_records(&ranked)).map_err(|source| {
            LeaderboardError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        debug!("recorded {name} with {moves} moves");
        Ok(ranked)
    }
}

/// Appends `entry`, orders by moves keeping insertion order on ties, and keeps the best six.
pub fn rank(
    mut records: Vec<LeaderboardRecord>,
    entry: LeaderboardRecord,
) -> Vec<LeaderboardRecord> {
    records.push(entry);
    records.sort_by_key(|record| record.moves);
    records.truncate(LEADERBOARD_CAPACITY);
    records
}

fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|ch| match ch {
            ',' | '\n' | '\r' => ' ',
            _ => ch,
        })
        .collect()
}

fn parse_record(raw: &str) -> Option<LeaderboardRecord> {
    let (name, moves) = raw.split_once(',')?;
    if moves.contains(',') {
        return None;
    }
    Some(LeaderboardRecord {
        name: name.to_string(),
        moves: moves.trim().parse().ok()?,
    })
}

fn parse_records(raw: &str) -> Result<Vec<LeaderboardRecord>, LeaderboardError> {
    let mut records = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record = parse_record(trimmed).ok_or_else(|| LeaderboardError::Malformed {
            line: idx + 1,
            content: trimmed.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

fn serialize_records(records: &[LeaderboardRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&format!("{},{}\n", record.name, record.moves));
    }
    out
}

fn write_atomic(path: &Path, data: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use temp_dir::TempDir;

    use super::*;

    fn board(dir: &TempDir) -> Leaderboard {
        Leaderboard::new(dir.child(LEADERBOARD_FILE_NAME))
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(board(&dir).top_n().is_empty());
    }

    #[test]
    fn record_persists_sorted_ranking() {
        let dir = TempDir::new().unwrap();
        let leaderboard = board(&dir);
        leaderboard.record("Bea", 12).unwrap();
        leaderboard.record("Alice", 7).unwrap();

        assert_eq!(
            leaderboard.top_n(),
            vec![
                LeaderboardRecord::new("Alice", 7),
                LeaderboardRecord::new("Bea", 12)
            ]
        );
        let raw = fs::read_to_string(leaderboard.path()).unwrap();
        assert_eq!(raw, "Alice,7\nBea,12\n");
    }

    #[test]
    fn keeps_the_six_smallest_scores() {
        let dir = TempDir::new().unwrap();
        let leaderboard = board(&dir);
        for moves in [15, 3, 22, 8, 11, 4, 30, 9, 6, 19] {
            leaderboard.record(&format!("p{moves}"), moves).unwrap();
        }

        let moves: Vec<u32> = leaderboard.top_n().iter().map(|r| r.moves).collect();
        assert_eq!(moves, vec![3, 4, 6, 8, 9, 11]);
    }

    #[test]
    fn equal_scores_keep_insertion_order() {
        let dir = TempDir::new().unwrap();
        let leaderboard = board(&dir);
        leaderboard.record("first", 5).unwrap();
        leaderboard.record("second", 5).unwrap();
        leaderboard.record("first", 5).unwrap();

        let names: Vec<String> = leaderboard.top_n().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["first", "second", "first"]);
    }

    #[test]
    fn identical_entries_are_both_kept() {
        let ranked = rank(
            vec![LeaderboardRecord::new("Alice", 9)],
            LeaderboardRecord::new("Alice", 9),
        );
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn worse_score_falls_off_a_full_board() {
        let full: Vec<LeaderboardRecord> = (1..=6)
            .map(|moves| LeaderboardRecord::new("x", moves))
            .collect();
        let ranked = rank(full.clone(), LeaderboardRecord::new("late", 6));
        assert_eq!(ranked, full);
    }

    #[test]
    fn malformed_line_empties_the_ranking() {
        let dir = TempDir::new().unwrap();
        let leaderboard = board(&dir);
        fs::write(leaderboard.path(), "Alice,7\nnot a score\nBea,9\n").unwrap();

        assert!(leaderboard.top_n().is_empty());
        assert!(matches!(
            leaderboard.load(),
            Err(LeaderboardError::Malformed { line: 2, .. })
        ));
    }

    #[test]
    fn record_on_malformed_file_leaves_it_alone() {
        let dir = TempDir::new().unwrap();
        let leaderboard = board(&dir);
        fs::write(leaderboard.path(), "Alice,lots\n").unwrap();

        assert!(leaderboard.record("Bea", 4).is_err());
        assert_eq!(fs::read_to_string(leaderboard.path()).unwrap(), "Alice,lots\n");
    }

    #[test]
    fn names_cannot_break_the_format() {
        let dir = TempDir::new().unwrap();
        let leaderboard = board(&dir);
        leaderboard.record("Smith, Jo\n", 10).unwrap();

        assert_eq!(
            leaderboard.top_n(),
            vec![LeaderboardRecord::new("Smith  Jo", 10)]
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        let records = parse_records("Alice,7\n\nBea,8\n").unwrap();
        assert_eq!(records.len(), 2);
        assert!(parse_record("a,b,3").is_none());
        assert!(parse_record("Alice,-2").is_none());
    }
}
