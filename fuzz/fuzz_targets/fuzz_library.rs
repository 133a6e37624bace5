#![no_main]

use libfuzzer_sys::fuzz_target;
use mangaview::duplicates::find_duplicates;
use mangaview::library::Library;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(lib) = Library::from_toml(text) else {
        return;
    };

    for ch in &lib.chapters {
        assert!(ch.page_count == 0 || ch.last_page_read < ch.page_count);
    }
    if !lib.chapters.is_empty() {
        assert!(lib.resume_index() < lib.chapters.len());
    }

    // Every manga lands in at most one group; groups have two or more members.
    let groups = find_duplicates(&lib.mangas, true);
    for group in &groups {
        assert!(group.manga_ids.len() >= 2);
    }
    let members: usize = groups.iter().map(|g| g.manga_ids.len()).sum();
    assert!(members <= lib.mangas.len());
});
