//! Shared fixtures for migration integration tests.
//!
//! The sample corpus has nine rows, seven of them foreign words. With a group
//! size of 3 this gives:
//!
//! | group | word     | rank | row | old id      | new id      |
//! |-------|----------|------|-----|-------------|-------------|
//! | 1     | メール   | 2    | 2   | ckw-g01-2   | ckw-g01-2   |
//! | 1     | クリック | 2    | 3   | ckw-g01-2   | ckw-g01-3   |
//! | 1     | ページ   | 4    | 4   | ckw-g01-4   | ckw-g01-4   |
//! | 2     | ゲーム   | 6    | 6   | ckw-g02-6   | ckw-g02-6   |
//! | 2     | テスト   | 7    | 7   | ckw-g02-7   | ckw-g02-7   |
//! | 2     | データ   | 7    | 8   | ckw-g02-7   | ckw-g02-8   |
//! | 3     | サイト   | 9    | 9   | ckw-g03-9   | ckw-g03-9   |

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use cardprep_core::MigrationConfig;
use tempfile::TempDir;

pub const CORPUS: &str = "rank\tlemma\tpos\twType\n\
1\tの\t助詞-格助詞\t和\n\
2\tメール\t名詞-普通名詞-サ変可能\t外\n\
2\tクリック\t名詞-普通名詞-サ変可能\t外\n\
4\tページ\t名詞-普通名詞-助数詞可能\t外\n\
5\tが\t助詞-格助詞\t和\n\
6\tゲーム\t名詞-普通名詞-一般\t外\n\
7\tテスト\t名詞-普通名詞-サ変可能\t外\n\
7\tデータ\t名詞-普通名詞-一般\t外\n\
9\tサイト\t名詞-普通名詞-一般\t外\n";

/// Scratch directory holding a corpus plus card and lesson collections.
pub struct Workspace {
    _dir: TempDir,
    pub config: MigrationConfig,
}

impl Workspace {
    /// Workspace with the sample corpus and skeleton files in the old scheme.
    pub fn new() -> Self {
        let ws = Self::empty();
        ws.write_card(
            "common_katakana_l01.yaml",
            &[("ckw-g01-2", "メール"), ("ckw-g01-2", "クリック"), ("ckw-g01-4", "ページ")],
        );
        ws.write_card(
            "common_katakana_l02.yaml",
            &[("ckw-g02-6", "ゲーム"), ("ckw-g02-7", "テスト"), ("ckw-g02-7", "データ")],
        );
        ws.write_card("common_katakana_l03.yaml", &[("ckw-g03-9", "サイト")]);
        ws.write_lesson(1, &["ckw-g01-2", "ckw-g01-2", "ckw-g01-4"]);
        ws.write_lesson(2, &["ckw-g02-6", "ckw-g02-7", "ckw-g02-7"]);
        ws.write_lesson(3, &["ckw-g03-9"]);
        ws
    }

    /// Workspace with the sample corpus and empty collection directories.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join("cards")).expect("create cards dir");
        fs::create_dir_all(root.join("lessons")).expect("create lessons dir");
        fs::write(root.join("corpus.tsv"), CORPUS).expect("write corpus");

        let mut config = MigrationConfig {
            prefix: "ckw".to_string(),
            group_size: 3,
            max_entries: None,
            records_dir: root.join("cards"),
            groups_dir: root.join("lessons"),
            ..MigrationConfig::default()
        };
        config.source.path = root.join("corpus.tsv");

        Self { _dir: dir, config }
    }

    pub fn card_path(&self, name: &str) -> PathBuf {
        self.config.records_dir.join(name)
    }

    pub fn lesson_path(&self, n: u32) -> PathBuf {
        self.config
            .groups_dir
            .join(format!("lesson_common_katakana_{n:02}.yaml"))
    }

    pub fn write_card(&self, name: &str, cards: &[(&str, &str)]) {
        fs::write(self.card_path(name), card_file(cards)).expect("write card file");
    }

    pub fn write_lesson(&self, n: u32, ids: &[&str]) {
        fs::write(self.lesson_path(n), lesson_file(n, ids)).expect("write lesson file");
    }

    /// Contents of every card and lesson file, in path order.
    pub fn snapshot(&self) -> Vec<(PathBuf, String)> {
        let mut files = snapshot_dir(&self.config.records_dir);
        files.extend(snapshot_dir(&self.config.groups_dir));
        files
    }

    pub fn snapshot_records(&self) -> Vec<(PathBuf, String)> {
        snapshot_dir(&self.config.records_dir)
    }
}

fn snapshot_dir(dir: &Path) -> Vec<(PathBuf, String)> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .collect();
    paths.sort();
    paths
        .into_iter()
        .map(|path| {
            let content = read(&path);
            (path, content)
        })
        .collect()
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read file")
}

/// Card file in the skeleton layout.
pub fn card_file(cards: &[(&str, &str)]) -> String {
    cards
        .iter()
        .map(|(id, answer)| {
            format!(
                "- id: {id}\n  prompt: \"\"\n  answers:\n    - {answer}\n  hint: \"noun\"\n  stage: -1\n  unlocks: '9999-12-31T23:59:59+00:00'\n  befuddlers: []\n"
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lesson file with a membership list.
pub fn lesson_file(n: u32, ids: &[&str]) -> String {
    let members: String = ids.iter().map(|id| format!("  - {id}\n")).collect();
    format!(
        "# Lesson {n}\nid: lesson_common_katakana_{n:02}\ntitle: Common Katakana {n}\nids:\n{members}unlocks: '9999-12-31T23:59:59+00:00'\n"
    )
}
