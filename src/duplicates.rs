//! Duplicate manga detection.
//!
//! The pairwise title scan is O(n²), so callers on the UI thread hand it to
//! `DuplicateWorker`, which runs one request on a background thread and sends
//! back exactly one response over an `mpsc` channel.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{Result, anyhow};
use log::{debug, info};
use regex::Regex;

use crate::library::Manga;

/// `Alternative Titles:` style marker at the start of a description line,
/// capturing whatever follows it on the same line.
static ALT_TITLES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:alternative|alternate|alt\.?|other)[ \t]+(?:titles?|names?)[ \t]*:[ \t]*(.*)$")
        .unwrap()
});

/// Separators inside an alternative-title list.
static ALT_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[;•·\n]").unwrap());

/// Lowercase, trim and collapse inner whitespace.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Alternative titles listed in a description.
///
/// The list starts after the marker and runs until the first blank line.
/// Entries may be separated by newlines, bullets or semicolons.
pub fn alternative_titles(description: &str) -> Vec<String> {
    let mut titles = Vec::new();
    for caps in ALT_TITLES_RE.captures_iter(description) {
        let Some(whole) = caps.get(0) else { continue };
        let inline = caps.get(1).map_or("", |m| m.as_str());
        let following: String = description[whole.end()..]
            .lines()
            .skip(1)
            .take_while(|l| !l.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        for part in ALT_SPLIT_RE
            .split(inline)
            .chain(ALT_SPLIT_RE.split(&following))
        {
            let part = part.trim().trim_start_matches(['-', '*']).trim();
            if !part.is_empty() {
                titles.push(part.to_string());
            }
        }
    }
    titles
}

/// Mangas that share a title, in library order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Normalised title of the group's first member.
    pub title: String,
    pub manga_ids: Vec<i64>,
}

fn title_set(manga: &Manga, check_alternative_titles: bool) -> HashSet<String> {
    let mut set = HashSet::new();
    set.insert(normalize_title(&manga.title));
    if check_alternative_titles
        && let Some(desc) = &manga.description
    {
        set.extend(alternative_titles(desc).iter().map(|t| normalize_title(t)));
    }
    set.remove("");
    set
}

/// Find groups of mangas with matching titles.
///
/// Matching is transitive: if A matches B and B matches C, all three end up
/// in one group. Only groups with two or more members are returned.
pub fn find_duplicates(mangas: &[Manga], check_alternative_titles: bool) -> Vec<DuplicateGroup> {
    let start = Instant::now();
    let titles: Vec<HashSet<String>> = mangas
        .iter()
        .map(|m| title_set(m, check_alternative_titles))
        .collect();

    let mut parent: Vec<usize> = (0..mangas.len()).collect();
    for i in 0..mangas.len() {
        for j in (i + 1)..mangas.len() {
            if !titles[i].is_disjoint(&titles[j]) {
                union(&mut parent, i, j);
            }
        }
    }

    // Group by root; the smallest index of each set comes first, so groups
    // come out ordered by their first member.
    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for i in 0..mangas.len() {
        let root = find(&mut parent, i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(i),
            None => groups.push((root, vec![i])),
        }
    }

    let result: Vec<DuplicateGroup> = groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(_, members)| DuplicateGroup {
            title: normalize_title(&mangas[members[0]].title),
            manga_ids: members.iter().map(|&i| mangas[i].id).collect(),
        })
        .collect();

    info!(
        "dupes: scanned {} mangas in {:.1}ms, {} groups (alt titles: {check_alternative_titles})",
        mangas.len(),
        start.elapsed().as_secs_f64() * 1000.0,
        result.len()
    );
    result
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // keep the smaller index as root
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Input of a duplicate scan.
#[derive(Debug, Clone)]
pub struct DuplicateRequest {
    pub mangas: Vec<Manga>,
    pub check_alternative_titles: bool,
}

/// Pending result of a scan running on the worker thread.
pub struct DuplicateTask {
    rx: mpsc::Receiver<Vec<DuplicateGroup>>,
    handle: Option<JoinHandle<()>>,
}

pub struct DuplicateWorker;

impl DuplicateWorker {
    /// Start a scan on a background thread.
    pub fn spawn(request: DuplicateRequest) -> DuplicateTask {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            debug!("dupes worker: started ({} mangas)", request.mangas.len());
            let groups = find_duplicates(&request.mangas, request.check_alternative_titles);
            let _ = tx.send(groups);
            debug!("dupes worker: done");
        });
        DuplicateTask {
            rx,
            handle: Some(handle),
        }
    }
}

impl DuplicateTask {
    /// Block until the worker responds.
    pub fn wait(mut self) -> Result<Vec<DuplicateGroup>> {
        let result = self
            .rx
            .recv()
            .map_err(|_| anyhow!("duplicate worker exited without a result"));
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("duplicate worker panicked"))?;
        }
        result
    }

    /// Non-blocking poll. `Ok(None)` while the scan is still running.
    pub fn try_result(&mut self) -> Result<Option<Vec<DuplicateGroup>>> {
        match self.rx.try_recv() {
            Ok(groups) => Ok(Some(groups)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(anyhow!("duplicate worker exited without a result"))
            }
        }
    }
}
